use ndarray::{Array, Array2, Array3, Dimension, ShapeBuilder};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Image whose pixels are `0, 1, 2, ...` in row-major order.
pub fn unique_image(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(i, j)| (i * n + j) as f64)
}

/// Batch of distinct unique images.
pub fn unique_batch(batch: usize, n: usize) -> Array3<f64> {
    Array3::from_shape_fn((batch, n, n), |(b, i, j)| ((b * n + i) * n + j) as f64)
}

/// Seeded uniform samples in `[-1, 1)`.
pub fn random<Sh, D>(shape: Sh, seed: u64) -> Array<f64, D>
where
    Sh: ShapeBuilder<Dim = D>,
    D: Dimension,
{
    let mut rng = StdRng::seed_from_u64(seed);
    Array::random_using(shape, Uniform::new(-1.0, 1.0), &mut rng)
}

/// Largest absolute elementwise difference.
pub fn max_abs_diff<D: Dimension>(a: &Array<f64, D>, b: &Array<f64, D>) -> f64 {
    assert_eq!(a.shape(), b.shape(), "shape mismatch");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
