mod common;

use adrt_core::{adrt, adrt_step, iadrt, num_iters, quadrant_mean, ErrorKind};
use approx::assert_abs_diff_eq;
use common::fixtures::{random, unique_batch, unique_image};
use ndarray::{Array2, Array3};

fn round_trip(img: &Array2<f64>) -> ndarray::ArrayD<f64> {
    quadrant_mean(&iadrt(&adrt(img).unwrap(), ..).unwrap()).unwrap()
}

#[test]
fn recovers_zeros_and_ones() {
    for n in [16usize, 32] {
        let zeros = Array2::<f64>::zeros((n, n));
        assert_eq!(round_trip(&zeros), zeros.into_dyn());
        let ones = Array2::<f64>::ones((n, n));
        assert_abs_diff_eq!(round_trip(&ones), ones.into_dyn(), epsilon = 1e-9);
    }
}

#[test]
fn recovers_unique_images() {
    for n in [1usize, 16, 32] {
        let img = unique_image(n);
        assert_abs_diff_eq!(round_trip(&img), img.into_dyn(), epsilon = 1e-6);
    }
}

#[test]
fn recovers_random_images() {
    let img: Array2<f64> = random((32, 32), 21);
    assert_abs_diff_eq!(round_trip(&img), img.into_dyn(), epsilon = 1e-9);
}

#[test]
fn recovers_f32_images() {
    let img = random((16, 16), 17).mapv(|v| v as f32);
    let rec = quadrant_mean(&iadrt(&adrt(&img).unwrap(), ..).unwrap()).unwrap();
    assert_abs_diff_eq!(rec, img.into_dyn(), epsilon = 1e-3);

    let batch = unique_batch(2, 8).mapv(|v| v as f32);
    let rec = quadrant_mean(&iadrt(&adrt(&batch).unwrap(), ..).unwrap()).unwrap();
    assert_abs_diff_eq!(rec, batch.into_dyn(), epsilon = 1e-2);
}

#[test]
fn each_quadrant_recovers_its_embedding() {
    let img = unique_image(8);
    let inv = iadrt(&adrt(&img).unwrap(), ..).unwrap();
    let stack = adrt_core::truncate(&inv).unwrap();
    for q in 0..4 {
        assert_abs_diff_eq!(
            stack.index_axis(ndarray::Axis(0), q),
            img.view().into_dyn(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn recovers_batches() {
    let batch = unique_batch(3, 16);
    let inv = iadrt(&adrt(&batch).unwrap(), ..).unwrap();
    let rec = quadrant_mean(&inv).unwrap();
    assert_abs_diff_eq!(rec, batch.into_dyn(), epsilon = 1e-6);
}

#[test]
fn chained_levels_equal_full_inverse() {
    let img: Array2<f64> = random((16, 16), 5);
    let fwd = adrt(&img).unwrap();
    let mut chained = fwd.clone();
    for level in 0..num_iters(16) {
        chained = iadrt(&chained, level..level + 1).unwrap();
    }
    assert_abs_diff_eq!(chained, iadrt(&fwd, ..).unwrap(), epsilon = 1e-12);
}

#[test]
fn partial_forward_is_undone_by_matching_levels() {
    let img: Array3<f64> = random((2, 16, 16), 9);
    let mut partial = adrt_core::adrt_init(&img).unwrap();
    for level in 0..2 {
        partial = adrt_step(&partial, level).unwrap();
    }
    let undone = iadrt(&partial, 2..4).unwrap();
    assert_abs_diff_eq!(undone, adrt_core::adrt_init(&img).unwrap(), epsilon = 1e-12);
}

#[test]
fn rejects_invalid_inputs() {
    let err = iadrt(&Array3::<f64>::zeros((4, 31, 15)), ..).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
    let err = iadrt(&Array2::<f64>::zeros((16, 16)), ..).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
    let err = iadrt(&Array3::<f64>::zeros((4, 31, 16)), 1..5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
