pub mod decimation;
pub mod types;
pub mod windowing;

pub use decimation::{
    DecimationEngine, DecimationMethod, DecimationParams, Decimator, decimate,
};
pub use types::{
    DecimationResult, ViewportWindow, datetime_to_unix_seconds, timestamps_from_datetimes,
};
pub use windowing::{index_range_in_time_window, normalized_window};
