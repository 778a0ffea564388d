//! Opt-in tracing setup for hosts embedding `chart-lod`.
//!
//! Library code only emits `tracing` events (`chart_lod::api::*` targets carry
//! cache, chunk and render diagnostics). Hosts either call one of the helpers
//! below or install their own subscriber.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
        return install(filter);
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

/// Same as [`init_default_tracing`] with explicit filter directives,
/// e.g. `"chart_lod::api=trace"`. Invalid directives fall back to [`DEFAULT_FILTER`].
#[must_use]
pub fn init_tracing_with_filter(directives: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_new(directives)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
        return install(filter);
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}

#[cfg(feature = "telemetry")]
fn install(filter: tracing_subscriber::EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .is_ok()
}
