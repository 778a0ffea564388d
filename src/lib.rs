//! chart-lod: decimation and level-of-detail core for very large time series.
//!
//! The crate reduces series of up to ~10^8 samples to what a viewport can
//! usefully show while keeping peaks, valleys and overall shape. It is split
//! into a pure `core` (decimation algorithms, windowing, shared types) and a
//! stateful `api` (result cache, LOD pyramids, chunk streaming and the render
//! strategy selector). Nothing here draws or reads files; hosts hand in raw
//! arrays or a [`api::DataSource`] and receive arrays back.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{
    DataSource, DecimationCache, LodManager, PerformanceRenderer, RendererConfig,
    StreamingChunkManager, StreamingConfig,
};
pub use crate::core::{
    DecimationMethod, DecimationParams, DecimationResult, ViewportWindow, decimate,
};
pub use error::{DecimationError, LodError, LodResult};
