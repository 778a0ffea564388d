use thiserror::Error;

/// Boxed error produced by an external [`crate::api::DataSource`].
pub type DataSourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type DecimationOutcome<T> = Result<T, DecimationError>;

pub type LodResult<T> = Result<T, LodError>;

/// Contract violations reported by the decimation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimationError {
    #[error("insufficient data: need at least 2 samples, got {len}")]
    InsufficientData { len: usize },

    #[error("mismatched lengths: timestamps={timestamps}, values={values}")]
    MismatchedLengths { timestamps: usize, values: usize },

    #[error("invalid target: target_points must be > 0, got {target}")]
    InvalidTarget { target: usize },

    #[error("unsupported decimation method: {0}")]
    UnsupportedMethod(String),

    #[error("invalid decimation params: {0}")]
    InvalidParams(String),
}

#[derive(Debug, Error)]
pub enum LodError {
    #[error(transparent)]
    Decimation(#[from] DecimationError),

    #[error("failed to load chunk {chunk}: {source}")]
    ChunkLoadFailed {
        chunk: usize,
        #[source]
        source: DataSourceError,
    },

    #[error("invalid viewport: x_min={x_min}, x_max={x_max}, pixel_width={pixel_width}")]
    InvalidViewport {
        x_min: f64,
        x_max: f64,
        pixel_width: usize,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
