mod common;

use adrt_core::{adrt, iadrt_fmg, iadrt_fmg_iter, iadrt_fmg_step, AdrtConfig, ErrorKind, StepEngine};
use common::fixtures::{max_abs_diff, random, unique_batch, unique_image};
use ndarray::{Array2, Array3, Array4, Axis, Ix2};

#[test]
fn converges_on_unique_image_f64() {
    common::init_logging();
    let img = unique_image(8);
    let report = iadrt_fmg(&adrt(&img).unwrap(), Some(50)).unwrap();
    let est = report.estimate.into_dimensionality::<Ix2>().unwrap();
    assert!(max_abs_diff(&est, &img) < 1e-3);
    assert!(report.residual <= report.residuals[0]);
}

#[test]
fn converges_on_unique_image_f32() {
    let img = unique_image(8).mapv(|v| v as f32);
    let report = iadrt_fmg(&adrt(&img).unwrap(), Some(50)).unwrap();
    assert!(report.steps <= 50);
    let err = report
        .estimate
        .iter()
        .zip(img.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max);
    assert!(err < 1e-3, "max error {err}");
}

#[test]
fn zero_input_stops_within_two_steps() {
    let report = iadrt_fmg(&Array3::<f64>::zeros((4, 31, 16)), None).unwrap();
    assert!(report.steps <= 2);
    assert!(report.estimate.iter().all(|&v| v == 0.0));
}

#[test]
fn max_iters_bounds_step_count() {
    common::init_logging();
    let fwd = adrt(&unique_image(16)).unwrap();
    for k in [1usize, 2, 3, 4, 7] {
        assert_eq!(iadrt_fmg(&fwd, Some(k)).unwrap().steps, k);
    }
}

#[test]
fn max_iters_estimate_matches_kth_iterate() {
    let fwd = adrt(&unique_image(16)).unwrap();
    for k in 1usize..=4 {
        let report = iadrt_fmg(&fwd, Some(k)).unwrap();
        let mut iter = iadrt_fmg_iter(&fwd).unwrap();
        let kth = iter.nth(k - 1).unwrap();
        assert_eq!(iter.steps(), k);
        assert_eq!(report.steps, iter.steps());
        assert_eq!(report.estimate, kth);
    }
}

#[test]
fn iterator_first_item_is_single_step() {
    let fwd = adrt(&unique_batch(2, 8)).unwrap();
    let first = iadrt_fmg_iter(&fwd).unwrap().next().unwrap();
    assert_eq!(first, iadrt_fmg_step(&fwd).unwrap());
    assert_eq!(first.shape(), &[2, 8, 8]);
}

#[test]
fn iterator_residual_shrinks() {
    let img = unique_image(16);
    let fwd = adrt(&img).unwrap();
    let estimates: Vec<_> = iadrt_fmg_iter(&fwd).unwrap().take(5).collect();
    let errors: Vec<f64> = estimates
        .iter()
        .map(|e| max_abs_diff(&e.clone().into_dimensionality::<Ix2>().unwrap(), &img))
        .collect();
    assert!(errors[4] < errors[0], "errors {errors:?}");
}

#[test]
fn accepts_noisy_data() {
    let img = unique_image(16);
    let noise: Array3<f64> = random((4, 31, 16), 13);
    let noisy = adrt(&img).unwrap() + &noise.into_dyn().mapv(|v| 0.01 * v);
    let report = iadrt_fmg(&noisy, Some(20)).unwrap();
    assert_eq!(report.estimate.shape(), &[16, 16]);
    assert!(report.estimate.iter().all(|v| v.is_finite()));
    assert!(report.residual <= report.residuals[0]);
    assert!(report.steps <= 20);
}

#[test]
fn batched_step_matches_single_steps() {
    let fwd = adrt(&unique_batch(3, 8)).unwrap();
    let batched = iadrt_fmg_step(&fwd).unwrap();
    for b in 0..3 {
        let single = iadrt_fmg_step(fwd.index_axis(Axis(0), b)).unwrap();
        assert_eq!(batched.index_axis(Axis(0), b), single);
    }
}

#[test]
fn config_limit_is_honoured() {
    let config = AdrtConfig::from_json_str(r#"{"threading": false, "fmg": {"max_iters": 3}}"#).unwrap();
    let engine = StepEngine::from_config(&config);
    let report = engine
        .iadrt_fmg(&adrt(&unique_image(8)).unwrap(), config.fmg.max_iters)
        .unwrap();
    assert_eq!(report.steps, 3);
}

#[test]
fn rejects_invalid_arguments() {
    let single = Array3::<f64>::zeros((4, 15, 8));
    assert_eq!(iadrt_fmg(&single, Some(0)).unwrap_err().kind(), ErrorKind::Validation);
    let batch = Array4::<f64>::zeros((1, 4, 15, 8));
    assert_eq!(iadrt_fmg(&batch, None).unwrap_err().kind(), ErrorKind::Validation);
    let image = Array2::<f64>::zeros((8, 8));
    assert_eq!(iadrt_fmg(&image, None).unwrap_err().kind(), ErrorKind::Shape);
    assert!(AdrtConfig::from_json_str(r#"{"fmg": {"max_iters": 2.0}}"#).is_err());
}
