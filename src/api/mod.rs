mod cache;
mod config;
mod lod;
mod renderer;
mod streaming;

pub use cache::{
    DecimationCache, DecimationCacheKey, DecimationCacheStats, FINGERPRINT_PREFIX_LEN,
    content_fingerprint,
};
pub use config::{RendererConfig, StreamingConfig};
pub use lod::{LodLevel, LodManager, level_target_points};
pub use renderer::{PerformanceRenderer, PerformanceStats, RenderStrategy};
pub use streaming::{ChunkInfo, ChunkState, DataSource, RangeFetch, StreamingChunkManager};
