use chart_lod::api::{RendererConfig, StreamingConfig};
use chart_lod::core::{DecimationMethod, DecimationParams};
use chart_lod::error::{DecimationError, LodError};

#[test]
fn renderer_config_json_round_trip() {
    let config = RendererConfig::new()
        .with_limits(2_000, 200_000)
        .with_target_display_points(1_500)
        .with_method(DecimationMethod::PeakAware)
        .with_params(DecimationParams::default().with_peak_percentile(90.0))
        .with_cache_max_size(16);

    let json = config.to_json_pretty().expect("serialize");
    assert!(json.contains("\"method\": \"peak_aware\""));
    let parsed = RendererConfig::from_json_str(&json).expect("parse");
    assert_eq!(parsed, config);
}

#[test]
fn empty_renderer_json_uses_defaults() {
    let parsed = RendererConfig::from_json_str("{}").expect("defaults");
    assert_eq!(parsed, RendererConfig::default());
    assert_eq!(parsed.direct_render_limit, 10_000);
    assert_eq!(parsed.decimation_limit, 1_000_000);
    assert_eq!(parsed.target_display_points, 5_000);
    assert_eq!(parsed.lod_levels, 4);
    assert_eq!(parsed.method, DecimationMethod::Lttb);
    assert_eq!(parsed.cache_max_size, 100);
}

#[test]
fn streaming_config_requires_total_size() {
    let err = StreamingConfig::from_json_str("{}").expect_err("missing total_size");
    assert!(matches!(err, LodError::InvalidConfig(_)));

    let parsed =
        StreamingConfig::from_json_str(r#"{"total_size": 2500000, "method": "min_max"}"#)
            .expect("parse");
    assert_eq!(parsed.total_size, 2_500_000);
    assert_eq!(parsed.chunk_size, 100_000);
    assert_eq!(parsed.preload_window, 2);
    assert_eq!(parsed.method, DecimationMethod::MinMax);
    assert_eq!(parsed.preview_points(), 500);
}

#[test]
fn unknown_method_name_is_rejected() {
    let err = RendererConfig::from_json_str(r#"{"method": "bezier"}"#).expect_err("bad method");
    assert!(matches!(err, LodError::InvalidConfig(_)));

    let err = "bezier".parse::<DecimationMethod>().expect_err("bad name");
    assert_eq!(err, DecimationError::UnsupportedMethod("bezier".to_owned()));
    assert_eq!(
        " Peak_Aware ".parse::<DecimationMethod>(),
        Ok(DecimationMethod::PeakAware)
    );
}

#[test]
fn out_of_range_values_fail_validation() {
    let err = RendererConfig::from_json_str(r#"{"target_display_points": 1}"#)
        .expect_err("target too small");
    assert!(matches!(err, LodError::InvalidConfig(_)));

    let err = RendererConfig::new()
        .with_params(DecimationParams::default().with_peak_percentile(120.0))
        .validate()
        .expect_err("percentile out of range");
    assert!(matches!(
        err,
        LodError::Decimation(DecimationError::InvalidParams(_))
    ));

    let err = StreamingConfig::new(10)
        .with_target_display_points(0)
        .validate()
        .expect_err("zero target");
    assert!(matches!(err, LodError::InvalidConfig(_)));
}
