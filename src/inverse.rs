//! Exact inverse of the forward transform.

use std::ops::{Range, RangeBounds};

use log::{debug, trace};
use ndarray::{Array4, ArrayD, ArrayView2, ArrayView4, ArrayViewMut2, AsArray, Axis, Dimension};

use crate::error::Result;
use crate::scalar::AdrtScalar;
use crate::shape::{level_range, num_iters, quadrant_batch, unbatch};
use crate::step::StepEngine;

impl StepEngine {
    /// Undo forward levels of a quadrant array `(B?, 4, 2N-1, N)`.
    ///
    /// Inverse level `j` undoes forward level `num_iters(N) - 1 - j`, so
    /// `iadrt(a, i..i + 1)` chained over all `i` equals `iadrt(a, ..)`. The
    /// input must be a genuine (possibly partial) forward output; arbitrary
    /// data is not rejected but gives meaningless results. Each quadrant is
    /// inverted independently, recover the image with
    /// [`quadrant_mean`](crate::quadrant_mean).
    pub fn iadrt<'a, T, D>(&self, a: impl AsArray<'a, T, D>, levels: impl RangeBounds<usize>) -> Result<ArrayD<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (a, batched) = quadrant_batch(a.into().into_dyn(), true)?;
        let n = a.len_of(Axis(3));
        let levels = level_range(levels, n)?;
        debug!(
            "StepEngine::iadrt start n={} batch={} levels={:?} dtype={}",
            n,
            a.len_of(Axis(0)),
            levels,
            T::DTYPE
        );
        Ok(unbatch(self.iadrt_batched(a, levels), batched))
    }

    pub(crate) fn iadrt_batched<T: AdrtScalar>(&self, a: ArrayView4<'_, T>, levels: Range<usize>) -> Array4<T> {
        let total = num_iters(a.len_of(Axis(3)));
        let mut out = a.to_owned();
        for level in levels {
            trace!("StepEngine::iadrt level={} shape={:?}", level, out.shape());
            out = self.map_planes(out.view(), |src, dst| iadrt_plane(src, dst, total - 1 - level));
        }
        out
    }
}

// Undo forward level `level` on one plane. For each pair of merged columns the
// right half is a running sum of differences, the left half follows from it.
fn iadrt_plane<T: AdrtScalar>(src: ArrayView2<'_, T>, mut dst: ArrayViewMut2<'_, T>, level: usize) {
    let (rows, cols) = src.dim();
    let half = 1usize << level;
    let span = 2 * half;
    for section in 0..cols / span {
        let base = section * span;
        for k in 0..half {
            let (even, odd) = (base + 2 * k, base + 2 * k + 1);
            let (left, right) = (base + k, base + k + half);
            let mut acc = T::zero();
            for m in 0..rows.saturating_sub(k) {
                acc += src[[m + k, even]] - src[[m + k, odd]];
                dst[[m, right]] = acc;
            }
            for r in 0..rows {
                let mut v = src[[r, even]];
                if r >= k {
                    v -= dst[[r - k, right]];
                }
                dst[[r, left]] = v;
            }
        }
    }
}
