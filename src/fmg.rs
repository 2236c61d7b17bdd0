//! Full-multigrid approximate inverse.
//!
//! Unlike [`StepEngine::iadrt`], the multigrid inverse accepts quadrant arrays
//! that are not exact forward outputs (noisy or otherwise perturbed data). A
//! single step restricts the data down to `1 x 1`, then walks back up the
//! grid, correcting the prolonged estimate at every level with a high-pass
//! filtered backprojection of the forward residual.

use log::debug;
use ndarray::{s, Array3, Array4, ArrayD, ArrayView3, ArrayView4, AsArray, Axis, CowArray, Dimension, IxDyn};
use serde::Serialize;

use crate::error::{AdrtError, Result};
use crate::layout::quadrant_mean_batched;
use crate::scalar::AdrtScalar;
use crate::shape::{num_iters, quadrant_batch, unbatch, unbatch_view};
use crate::step::StepEngine;

impl StepEngine {
    /// One multigrid pass over a quadrant array `(B?, 4, 2N-1, N)`.
    ///
    /// Returns an image estimate `(B?, N, N)`.
    pub fn iadrt_fmg_step<'a, T, D>(&self, a: impl AsArray<'a, T, D>) -> Result<ArrayD<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (a, batched) = quadrant_batch(a.into().into_dyn(), true)?;
        Ok(unbatch(self.fmg_step_batched(a), batched))
    }

    /// Unbounded sequence of refined estimates.
    ///
    /// The first item is `iadrt_fmg_step(a)`, every further item adds
    /// `iadrt_fmg_step(a - adrt(estimate))` to the previous estimate.
    pub fn iadrt_fmg_iter<'a, T, D>(&self, a: impl AsArray<'a, T, D>) -> Result<FmgIter<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (a, batched) = quadrant_batch(a.into().into_dyn(), true)?;
        Ok(FmgIter::new(*self, a, batched))
    }

    /// Iterate multigrid steps until the residual `|adrt(x) - a|` stops
    /// decreasing, or `max_iters` steps have been taken.
    ///
    /// Only a single quadrant array `(4, 2N-1, N)` is accepted. When the
    /// residual fails to decrease, the previous estimate is returned.
    ///
    /// # Errors
    ///
    /// Validation error for a batched input or `max_iters == Some(0)`, shape
    /// error for anything that is not a quadrant array.
    pub fn iadrt_fmg<'a, T, D>(&self, a: impl AsArray<'a, T, D>, max_iters: Option<usize>) -> Result<FmgReport<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let a = a.into().into_dyn();
        if a.ndim() == 4 {
            return Err(AdrtError::InvalidArgument {
                arg: "a",
                reason: "batched inputs are not supported, pass a single (4, 2N-1, N) array".to_string(),
            });
        }
        if max_iters == Some(0) {
            return Err(AdrtError::InvalidArgument {
                arg: "max_iters",
                reason: "must be positive".to_string(),
            });
        }
        let (a, _) = quadrant_batch(a, true)?;
        let n = a.len_of(Axis(3));
        debug!(
            "StepEngine::iadrt_fmg start n={} max_iters={:?} dtype={}",
            n,
            max_iters,
            T::DTYPE
        );

        let mut iter = FmgIter::new(*self, a, false);
        let mut residuals = Vec::new();
        let mut estimate = iter.advance().clone();
        let mut best = self.residual_norm(estimate.view(), a);
        residuals.push(best);
        debug!("StepEngine::iadrt_fmg step=1 residual={:.6e}", best);
        while max_iters.map_or(true, |max| residuals.len() < max) {
            let candidate = iter.advance();
            let norm = self.residual_norm(candidate.view(), a);
            residuals.push(norm);
            debug!("StepEngine::iadrt_fmg step={} residual={:.6e}", residuals.len(), norm);
            if !(norm < best) {
                debug!(
                    "StepEngine::iadrt_fmg stop: residual did not decrease ({:.6e} >= {:.6e})",
                    norm, best
                );
                return Ok(FmgReport::new(estimate, iter.steps(), best, residuals));
            }
            estimate = candidate.clone();
            best = norm;
        }
        debug!("StepEngine::iadrt_fmg stop: reached max_iters={}", iter.steps());
        Ok(FmgReport::new(estimate, iter.steps(), best, residuals))
    }

    fn residual_norm<T: AdrtScalar>(&self, estimate: ArrayView3<'_, T>, target: ArrayView4<'_, T>) -> f64 {
        let forward = self.adrt_batched(estimate);
        forward
            .iter()
            .zip(target.iter())
            .map(|(&f, &t)| (f.widen() - t.widen()).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    pub(crate) fn fmg_step_batched<T: AdrtScalar>(&self, a: ArrayView4<'_, T>) -> Array3<T> {
        let levels = num_iters(a.len_of(Axis(3)));
        let mut stack = Vec::with_capacity(levels);
        let mut current = a.to_owned();
        for _ in 0..levels {
            let coarse = restrict(current.view());
            stack.push(current);
            current = coarse;
        }

        let mut estimate = current.index_axis(Axis(1), 0).to_owned();
        let mut size = 1usize;
        while let Some(entry) = stack.pop() {
            size *= 2;
            estimate = prolong(estimate.view());
            let residual = self.adrt_batched(estimate.view()) - &entry;
            let scale = T::cast(1.0 / (size - 1) as f64);
            let back = self.bdrt_batched(residual.view(), 0..num_iters(size));
            let correction = quadrant_mean_batched(back.view()).mapv_into(|v| v * scale);
            estimate = estimate - highpass(correction.view());
        }
        estimate
    }
}

/// Halve a quadrant array: `(B, 4, 2N-1, N) -> (B, 4, N-1, N/2)`.
fn restrict<T: AdrtScalar>(a: ArrayView4<'_, T>) -> Array4<T> {
    let n = a.len_of(Axis(3));
    let quarter = T::cast(0.25);
    let even = a.slice(s![.., .., 0..2 * (n - 1);2, ..;2]);
    let odd = a.slice(s![.., .., 1..2 * (n - 1);2, ..;2]);
    (&even + &odd).mapv_into(|v| v * quarter)
}

/// Replicate every pixel into a `2 x 2` block.
fn prolong<T: AdrtScalar>(x: ArrayView3<'_, T>) -> Array3<T> {
    let (batch, rows, cols) = x.dim();
    let mut out = Array3::zeros((batch, 2 * rows, 2 * cols));
    for (dr, dc) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        out.slice_mut(s![.., dr..;2, dc..;2]).assign(&x);
    }
    out
}

/// 3x3 high-pass filter with reflecting borders. Needs sides of at least 2.
fn highpass<T: AdrtScalar>(x: ArrayView3<'_, T>) -> Array3<T> {
    let (edge, side, center) = (
        T::cast(-1.0 / 16.0),
        T::cast(-1.0 / 8.0),
        T::cast(3.0 / 4.0),
    );
    let (_, rows, cols) = x.dim();
    let prev = |i: usize| if i == 0 { 1 } else { i - 1 };
    let next = |i: usize, len: usize| if i + 1 == len { len - 2 } else { i + 1 };
    let mut out = Array3::zeros(x.raw_dim());
    for (img, mut dst) in x.outer_iter().zip(out.outer_iter_mut()) {
        for i in 0..rows {
            let (pi, ni) = (prev(i), next(i, rows));
            for j in 0..cols {
                let (pj, nj) = (prev(j), next(j, cols));
                dst[[i, j]] = center * img[[i, j]]
                    + side * (img[[pi, j]] + img[[ni, j]] + img[[i, pj]] + img[[i, nj]])
                    + edge * (img[[pi, pj]] + img[[pi, nj]] + img[[ni, pj]] + img[[ni, nj]]);
            }
        }
    }
    out
}

/// Sequence of multigrid estimates, see [`StepEngine::iadrt_fmg_iter`].
#[derive(Debug)]
pub struct FmgIter<T> {
    engine: StepEngine,
    target: Array4<T>,
    estimate: Option<Array3<T>>,
    batched: bool,
    steps: usize,
}

impl<T: AdrtScalar> FmgIter<T> {
    fn new(engine: StepEngine, a: ArrayView4<'_, T>, batched: bool) -> Self {
        Self {
            engine,
            target: a.to_owned(),
            estimate: None,
            batched,
            steps: 0,
        }
    }

    /// Number of multigrid steps applied so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn advance(&mut self) -> &Array3<T> {
        let next = match self.estimate.take() {
            None => self.engine.fmg_step_batched(self.target.view()),
            Some(estimate) => {
                let residual = &self.target - &self.engine.adrt_batched(estimate.view());
                estimate + self.engine.fmg_step_batched(residual.view())
            }
        };
        self.steps += 1;
        self.estimate.insert(next)
    }

    /// Compute the next estimate. With `copy == false` the item borrows the
    /// iterator's internal state instead of copying it.
    pub fn next_with(&mut self, copy: bool) -> Option<CowArray<'_, T, IxDyn>> {
        let batched = self.batched;
        let view = unbatch_view(self.advance().view(), batched);
        Some(if copy {
            CowArray::from(view.to_owned())
        } else {
            CowArray::from(view)
        })
    }
}

impl<T: AdrtScalar> Iterator for FmgIter<T> {
    type Item = ArrayD<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let batched = self.batched;
        Some(unbatch(self.advance().clone(), batched))
    }
}

/// Outcome of [`StepEngine::iadrt_fmg`].
#[derive(Clone, Debug)]
pub struct FmgReport<T> {
    /// Best image estimate `(N, N)`.
    pub estimate: ArrayD<T>,
    /// Number of multigrid steps evaluated, including a rejected final one.
    pub steps: usize,
    /// Residual norm of `estimate`.
    pub residual: f64,
    /// Residual norm after every step, in order.
    pub residuals: Vec<f64>,
}

/// Serializable digest of an [`FmgReport`], without the estimate itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FmgSummary {
    pub size: usize,
    pub dtype: &'static str,
    pub steps: usize,
    pub residual: f64,
    pub residuals: Vec<f64>,
}

impl<T: AdrtScalar> FmgReport<T> {
    fn new(estimate: Array3<T>, steps: usize, residual: f64, residuals: Vec<f64>) -> Self {
        Self {
            estimate: unbatch(estimate, false),
            steps,
            residual,
            residuals,
        }
    }

    pub fn summary(&self) -> FmgSummary {
        FmgSummary {
            size: self.estimate.shape().last().copied().unwrap_or(0),
            dtype: T::DTYPE,
            steps: self.steps,
            residual: self.residual,
            residuals: self.residuals.clone(),
        }
    }
}
