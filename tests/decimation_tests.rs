use approx::assert_relative_eq;
use chart_lod::core::{
    DecimationMethod, DecimationParams, decimate, timestamps_from_datetimes,
};
use chart_lod::error::DecimationError;
use chrono::{TimeZone, Utc};

fn sine_series(n: usize, cycles: f64) -> (Vec<f64>, Vec<f64>) {
    let timestamps: Vec<f64> = (0..n).map(|i| i as f64 * 0.01).collect();
    let values = (0..n)
        .map(|i| (std::f64::consts::TAU * cycles * i as f64 / n as f64).sin())
        .collect();
    (timestamps, values)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

#[test]
fn lttb_keeps_sine_amplitude_on_large_reduction() {
    let (ts, ys) = sine_series(100_000, 10.0);
    let result = decimate(&ts, &ys, 1_000, DecimationMethod::Lttb, &DecimationParams::default())
        .expect("decimate");

    assert!(result.len() <= 1_000);
    assert_eq!(result.timestamps.len(), result.values.len());
    let source_max = max_of(&ys);
    assert_relative_eq!(max_of(&result.values), source_max, max_relative = 0.01);
}

#[test]
fn short_series_is_returned_whole_by_every_method() {
    let ts = vec![0.0, 1.0, 2.0, 3.0, 4.0];
    let ys = vec![3.0, -1.0, 4.0, 1.0, -5.0];
    for method in DecimationMethod::ALL {
        let result = decimate(&ts, &ys, 10, method, &DecimationParams::default())
            .expect("decimate");
        assert_eq!(result.timestamps, ts, "{method}");
        assert_eq!(result.values, ys, "{method}");
        assert_eq!(result.selected_indices, Some(vec![0, 1, 2, 3, 4]), "{method}");
    }
}

#[test]
fn endpoint_preserving_methods_keep_first_and_last_sample() {
    let (ts, ys) = sine_series(5_000, 3.0);
    for method in [
        DecimationMethod::Lttb,
        DecimationMethod::Uniform,
        DecimationMethod::Adaptive,
        DecimationMethod::PeakAware,
    ] {
        for target in [2, 3, 17, 400] {
            let result = decimate(&ts, &ys, target, method, &DecimationParams::default())
                .expect("decimate");
            let indices = result.selected_indices.expect("indices");
            assert_eq!(indices.first(), Some(&0), "{method} target={target}");
            assert_eq!(indices.last(), Some(&4_999), "{method} target={target}");
            assert!(indices.len() <= target, "{method} target={target}");
        }
    }
}

#[test]
fn min_max_preserves_global_extrema() {
    let (ts, mut ys) = sine_series(10_000, 7.0);
    ys[1_234] = 42.0;
    ys[8_765] = -42.0;
    let result = decimate(&ts, &ys, 100, DecimationMethod::MinMax, &DecimationParams::default())
        .expect("decimate");

    assert!(result.len() <= 100);
    assert_eq!(max_of(&result.values), 42.0);
    assert_eq!(min_of(&result.values), -42.0);
    assert!(result.timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn peak_aware_keeps_isolated_spikes() {
    let n = 20_000;
    let ts: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let mut ys = vec![0.0; n];
    for (i, y) in ys.iter_mut().enumerate() {
        *y = ((i % 50) as f64) * 0.01;
    }
    let spikes = [3_001, 9_999, 15_432];
    for &s in &spikes {
        ys[s] = 25.0;
    }
    let result = decimate(&ts, &ys, 64, DecimationMethod::PeakAware, &DecimationParams::default())
        .expect("decimate");
    let indices = result.selected_indices.expect("indices");
    for s in spikes {
        assert!(indices.contains(&s), "spike {s} dropped");
    }
    assert_eq!(indices.len(), 64);
}

#[test]
fn selected_indices_point_back_into_source() {
    let (ts, ys) = sine_series(3_000, 2.0);
    for method in DecimationMethod::ALL {
        let result = decimate(&ts, &ys, 250, method, &DecimationParams::default())
            .expect("decimate");
        let indices = result.selected_indices.clone().expect("indices");
        assert_eq!(indices.len(), result.len());
        for (out, &src) in indices.iter().enumerate() {
            assert_eq!(result.timestamps[out], ts[src], "{method}");
            assert_eq!(result.values[out], ys[src], "{method}");
        }
    }
}

#[test]
fn contract_violations_are_reported() {
    let params = DecimationParams::default();

    let err = decimate(&[0.0], &[1.0], 5, DecimationMethod::Lttb, &params).expect_err("short");
    assert_eq!(err, DecimationError::InsufficientData { len: 1 });

    let err = decimate(&[0.0, 1.0], &[1.0, 2.0, 3.0], 5, DecimationMethod::Uniform, &params)
        .expect_err("mismatch");
    assert_eq!(
        err,
        DecimationError::MismatchedLengths {
            timestamps: 2,
            values: 3
        }
    );

    let err = decimate(&[0.0, 1.0], &[1.0, 2.0], 0, DecimationMethod::MinMax, &params)
        .expect_err("zero target");
    assert_eq!(err, DecimationError::InvalidTarget { target: 0 });
}

#[test]
fn adaptive_threshold_is_validated() {
    let params = DecimationParams::default().with_variance_threshold(1.5);
    let err = decimate(
        &[0.0, 1.0, 2.0],
        &[0.0, 1.0, 0.0],
        2,
        DecimationMethod::Adaptive,
        &params,
    )
    .expect_err("threshold out of range");
    assert!(format!("{err}").contains("variance threshold"));
}

#[test]
fn datetimes_convert_to_unix_seconds() {
    let times = [
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid"),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 30).single().expect("valid"),
    ];
    let ts = timestamps_from_datetimes(&times);
    assert_eq!(ts, vec![1_704_067_200.0, 1_704_067_230.0]);
}
