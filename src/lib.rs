//! Approximate discrete Radon transform (ADRT).
//!
//! The ADRT sums an `N x N` image along digital lines at `O(N)` angles per
//! quadrant in `O(N^2 log N)` time. This crate provides:
//!
//! - the forward transform ([`adrt`]) and its single levels ([`adrt_step`]),
//! - backprojection, the adjoint operator ([`bdrt`], [`bdrt_step`]),
//! - an exact inverse for genuine forward outputs ([`iadrt`]),
//! - a full-multigrid approximate inverse for perturbed data ([`iadrt_fmg`]),
//! - quadrant layout helpers and Radon-domain coordinate mappings.
//!
//! Images have shape `(B?, N, N)` with `N` a power of two; transformed data
//! has shape `(B?, 4, 2N-1, N)`. The optional leading batch axis is carried
//! through every operation. The free functions here use
//! [`StepEngine::default()`], which runs independent planes on the rayon pool;
//! build a [`StepEngine`] from an [`AdrtConfig`] to control that.
//!
//! ```
//! use adrt_core::{adrt, iadrt, quadrant_mean};
//! use ndarray::Array2;
//!
//! let img = Array2::from_shape_fn((16, 16), |(i, j)| (i * 16 + j) as f64);
//! let radon = adrt(&img)?;
//! assert_eq!(radon.shape(), &[4, 31, 16]);
//! let back = quadrant_mean(&iadrt(&radon, ..)?)?;
//! assert!((back[[3, 5]] - img[[3, 5]]).abs() < 1e-9);
//! # Ok::<(), adrt_core::AdrtError>(())
//! ```

use std::ops::RangeBounds;

use ndarray::{ArrayD, AsArray, Dimension};

pub mod config;
pub mod coord;
pub mod error;
pub mod fmg;
pub mod inverse;
pub mod io;
pub mod layout;
pub mod scalar;
mod shape;
pub mod step;
pub mod transform;

pub use config::{AdrtConfig, FmgOptions};
pub use coord::{coord_adrt_to_cart, coord_adrt_to_cart_hcat, coord_cart_to_adrt, AdrtIndex, CartesianCoord};
pub use error::{AdrtError, ErrorKind, Result};
pub use fmg::{FmgIter, FmgReport, FmgSummary};
pub use io::{load_npy, save_npy, NpyArray};
pub use layout::{adrt_init, quadrant_mean, stitch_adrt, truncate, unstitch_adrt};
pub use scalar::AdrtScalar;
pub use shape::num_iters;
pub use step::StepEngine;
pub use transform::{AdrtIter, BdrtIter};

/// Forward transform with the default engine, see [`StepEngine::adrt`].
pub fn adrt<'a, T, D>(image: impl AsArray<'a, T, D>) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().adrt(image)
}

/// See [`StepEngine::adrt_step`].
pub fn adrt_step<'a, T, D>(a: impl AsArray<'a, T, D>, level: usize) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().adrt_step(a, level)
}

/// See [`StepEngine::adrt_iter`].
pub fn adrt_iter<'a, T, D>(image: impl AsArray<'a, T, D>) -> Result<AdrtIter<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().adrt_iter(image)
}

/// Backprojection with the default engine, see [`StepEngine::bdrt`].
pub fn bdrt<'a, T, D>(a: impl AsArray<'a, T, D>, levels: impl RangeBounds<usize>) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().bdrt(a, levels)
}

/// See [`StepEngine::bdrt_step`].
pub fn bdrt_step<'a, T, D>(a: impl AsArray<'a, T, D>, level: usize) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().bdrt_step(a, level)
}

/// See [`StepEngine::bdrt_iter`].
pub fn bdrt_iter<'a, T, D>(a: impl AsArray<'a, T, D>) -> Result<BdrtIter<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().bdrt_iter(a)
}

/// Exact inverse with the default engine, see [`StepEngine::iadrt`].
pub fn iadrt<'a, T, D>(a: impl AsArray<'a, T, D>, levels: impl RangeBounds<usize>) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().iadrt(a, levels)
}

/// See [`StepEngine::iadrt_fmg_step`].
pub fn iadrt_fmg_step<'a, T, D>(a: impl AsArray<'a, T, D>) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().iadrt_fmg_step(a)
}

/// See [`StepEngine::iadrt_fmg_iter`].
pub fn iadrt_fmg_iter<'a, T, D>(a: impl AsArray<'a, T, D>) -> Result<FmgIter<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().iadrt_fmg_iter(a)
}

/// Multigrid inverse with the default engine, see [`StepEngine::iadrt_fmg`].
pub fn iadrt_fmg<'a, T, D>(a: impl AsArray<'a, T, D>, max_iters: Option<usize>) -> Result<FmgReport<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    StepEngine::default().iadrt_fmg(a, max_iters)
}
