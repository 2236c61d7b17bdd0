//! Single-level forward and backprojection steps.
//!
//! Every level works on each `(batch, quadrant)` plane independently, so the
//! planes are dispatched to rayon when threading is enabled.

use log::trace;
use ndarray::{Array4, ArrayD, ArrayView2, ArrayView4, ArrayViewMut2, AsArray, Axis, Dimension};
use rayon::prelude::*;

use crate::config::AdrtConfig;
use crate::error::Result;
use crate::scalar::AdrtScalar;
use crate::shape::{check_level, num_iters, quadrant_batch, unbatch};

/// Executes ADRT levels with an explicit threading policy.
///
/// All transform entry points hang off this type. The free functions at the
/// crate root use `StepEngine::default()`, which has threading enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepEngine {
    threading: bool,
}

impl Default for StepEngine {
    fn default() -> Self {
        Self { threading: true }
    }
}

impl StepEngine {
    pub fn new(threading: bool) -> Self {
        Self { threading }
    }

    pub fn from_config(config: &AdrtConfig) -> Self {
        Self::new(config.threading)
    }

    pub fn threading_enabled(&self) -> bool {
        self.threading
    }

    /// Advance a quadrant array `(B?, 4, 2N-1, N)` from level `level` to
    /// `level + 1`.
    ///
    /// For output column `c = s * 2L + a` with `L = 2^level`, `k = a / 2` and
    /// `shift = a - k`, the result is
    /// `in[r, 2sL + k] + in[r - shift, (2s+1)L + k]`, with the second term
    /// read as zero for `r < shift`.
    pub fn adrt_step<'a, T, D>(&self, a: impl AsArray<'a, T, D>, level: usize) -> Result<ArrayD<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (a, batched) = quadrant_batch(a.into().into_dyn(), true)?;
        check_level(level, a.len_of(Axis(3)))?;
        Ok(unbatch(self.adrt_step_batched(a, level), batched))
    }

    /// One backprojection level, the exact transpose of
    /// `adrt_step(_, num_iters(N) - 1 - level)`.
    pub fn bdrt_step<'a, T, D>(&self, a: impl AsArray<'a, T, D>, level: usize) -> Result<ArrayD<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (a, batched) = quadrant_batch(a.into().into_dyn(), true)?;
        check_level(level, a.len_of(Axis(3)))?;
        Ok(unbatch(self.bdrt_step_batched(a, level), batched))
    }

    pub(crate) fn adrt_step_batched<T: AdrtScalar>(&self, a: ArrayView4<'_, T>, level: usize) -> Array4<T> {
        trace!("StepEngine::adrt_step level={} shape={:?}", level, a.shape());
        self.map_planes(a, |src, dst| adrt_plane(src, dst, level))
    }

    pub(crate) fn bdrt_step_batched<T: AdrtScalar>(&self, a: ArrayView4<'_, T>, level: usize) -> Array4<T> {
        trace!("StepEngine::bdrt_step level={} shape={:?}", level, a.shape());
        let levels = num_iters(a.len_of(Axis(3)));
        self.map_planes(a, |src, dst| bdrt_plane(src, dst, levels - 1 - level))
    }

    /// Apply `kernel` to every `(batch, quadrant)` plane of `a`, writing into
    /// a zero-filled output of the same shape.
    pub(crate) fn map_planes<T, F>(&self, a: ArrayView4<'_, T>, kernel: F) -> Array4<T>
    where
        T: AdrtScalar,
        F: Fn(ArrayView2<'_, T>, ArrayViewMut2<'_, T>) + Sync,
    {
        let (_, _, rows, cols) = a.dim();
        let plane = (1, 1, rows, cols);
        let mut out = Array4::zeros(a.raw_dim());
        let planes: Vec<_> = a
            .exact_chunks(plane)
            .into_iter()
            .zip(out.exact_chunks_mut(plane))
            .map(|(src, dst)| {
                (
                    src.index_axis_move(Axis(0), 0).index_axis_move(Axis(0), 0),
                    dst.index_axis_move(Axis(0), 0).index_axis_move(Axis(0), 0),
                )
            })
            .collect();
        if self.threading && planes.len() > 1 {
            planes.into_par_iter().for_each(|(src, dst)| kernel(src, dst));
        } else {
            planes.into_iter().for_each(|(src, dst)| kernel(src, dst));
        }
        out
    }
}

fn adrt_plane<T: AdrtScalar>(src: ArrayView2<'_, T>, mut dst: ArrayViewMut2<'_, T>, level: usize) {
    let (rows, cols) = src.dim();
    let half = 1usize << level;
    let span = 2 * half;
    for c in 0..cols {
        let (section, angle) = (c / span, c % span);
        let k = angle / 2;
        let shift = angle - k;
        let left = section * span + k;
        let right = left + half;
        for r in 0..rows {
            let mut v = src[[r, left]];
            if r >= shift {
                v += src[[r - shift, right]];
            }
            dst[[r, c]] = v;
        }
    }
}

// `level` here is the forward level being transposed.
fn bdrt_plane<T: AdrtScalar>(src: ArrayView2<'_, T>, mut dst: ArrayViewMut2<'_, T>, level: usize) {
    let (rows, cols) = src.dim();
    let half = 1usize << level;
    let span = 2 * half;
    for c in 0..cols {
        let (section, rem) = (c / span, c % span);
        let base = section * span;
        if rem < half {
            let (even, odd) = (base + 2 * rem, base + 2 * rem + 1);
            for r in 0..rows {
                dst[[r, c]] = src[[r, even]] + src[[r, odd]];
            }
        } else {
            let k = rem - half;
            let (even, odd) = (base + 2 * k, base + 2 * k + 1);
            for r in 0..rows {
                let mut v = T::zero();
                if r + k < rows {
                    v += src[[r + k, even]];
                }
                if r + k + 1 < rows {
                    v += src[[r + k + 1, odd]];
                }
                dst[[r, c]] = v;
            }
        }
    }
}
