//! Forward transform and backprojection over ranges of levels.

use std::ops::{Range, RangeBounds};

use log::debug;
use ndarray::{Array4, ArrayD, ArrayView3, ArrayView4, AsArray, Axis, CowArray, Dimension, IxDyn};

use crate::error::Result;
use crate::layout::init_batched;
use crate::scalar::AdrtScalar;
use crate::shape::{image_batch, level_range, num_iters, quadrant_batch, unbatch, unbatch_view};
use crate::step::StepEngine;

impl StepEngine {
    /// Approximate discrete Radon transform of an image `(B?, N, N)`.
    ///
    /// Returns the quadrant array `(B?, 4, 2N-1, N)`. Each quadrant covers
    /// `pi/4` radians of angle; rows index intercepts and columns slopes.
    pub fn adrt<'a, T, D>(&self, image: impl AsArray<'a, T, D>) -> Result<ArrayD<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (image, batched) = image_batch(image.into().into_dyn())?;
        let (batch, n, _) = image.dim();
        debug!(
            "StepEngine::adrt start n={} batch={} levels={} dtype={}",
            n,
            batch,
            num_iters(n),
            T::DTYPE
        );
        Ok(unbatch(self.adrt_batched(image), batched))
    }

    /// Backprojection over `levels` (for example `..` for the full operator).
    ///
    /// The full-range backprojection is the adjoint of [`StepEngine::adrt`]
    /// composed with its initial embedding. Use
    /// [`quadrant_mean`](crate::quadrant_mean) to bring the result back to
    /// image space.
    pub fn bdrt<'a, T, D>(&self, a: impl AsArray<'a, T, D>, levels: impl RangeBounds<usize>) -> Result<ArrayD<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (a, batched) = quadrant_batch(a.into().into_dyn(), true)?;
        let n = a.len_of(Axis(3));
        let levels = level_range(levels, n)?;
        debug!(
            "StepEngine::bdrt start n={} batch={} levels={:?} dtype={}",
            n,
            a.len_of(Axis(0)),
            levels,
            T::DTYPE
        );
        Ok(unbatch(self.bdrt_batched(a, levels), batched))
    }

    /// Observe the forward transform level by level.
    ///
    /// The first item is the initialized array, followed by one item per level.
    pub fn adrt_iter<'a, T, D>(&self, image: impl AsArray<'a, T, D>) -> Result<AdrtIter<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (image, batched) = image_batch(image.into().into_dyn())?;
        Ok(AdrtIter::new(*self, image, batched))
    }

    /// Observe the full backprojection level by level, one item per level.
    pub fn bdrt_iter<'a, T, D>(&self, a: impl AsArray<'a, T, D>) -> Result<BdrtIter<T>>
    where
        T: AdrtScalar,
        D: Dimension,
    {
        let (a, batched) = quadrant_batch(a.into().into_dyn(), true)?;
        Ok(BdrtIter::new(*self, a, batched))
    }

    pub(crate) fn adrt_batched<T: AdrtScalar>(&self, image: ArrayView3<'_, T>) -> Array4<T> {
        let mut a = init_batched(image);
        for level in 0..num_iters(image.len_of(Axis(2))) {
            a = self.adrt_step_batched(a.view(), level);
        }
        a
    }

    pub(crate) fn bdrt_batched<T: AdrtScalar>(&self, a: ArrayView4<'_, T>, levels: Range<usize>) -> Array4<T> {
        let mut out = a.to_owned();
        for level in levels {
            out = self.bdrt_step_batched(out.view(), level);
        }
        out
    }
}

fn snapshot<T: AdrtScalar>(state: &Array4<T>, batched: bool, copy: bool) -> CowArray<'_, T, IxDyn> {
    let view = unbatch_view(state.view(), batched);
    if copy {
        CowArray::from(view.to_owned())
    } else {
        CowArray::from(view)
    }
}

/// Level-by-level forward transform, see [`StepEngine::adrt_iter`].
#[derive(Debug)]
pub struct AdrtIter<T> {
    engine: StepEngine,
    state: Array4<T>,
    batched: bool,
    started: bool,
    level: usize,
    levels: usize,
}

impl<T: AdrtScalar> AdrtIter<T> {
    fn new(engine: StepEngine, image: ArrayView3<'_, T>, batched: bool) -> Self {
        Self {
            engine,
            state: init_batched(image),
            batched,
            started: false,
            level: 0,
            levels: num_iters(image.len_of(Axis(2))),
        }
    }

    fn advance(&mut self) -> bool {
        if !self.started {
            self.started = true;
            return true;
        }
        if self.level >= self.levels {
            return false;
        }
        self.state = self.engine.adrt_step_batched(self.state.view(), self.level);
        self.level += 1;
        true
    }

    /// Advance one level. With `copy == false` the item borrows the
    /// iterator's internal state instead of copying it.
    pub fn next_with(&mut self, copy: bool) -> Option<CowArray<'_, T, IxDyn>> {
        if !self.advance() {
            return None;
        }
        Some(snapshot(&self.state, self.batched, copy))
    }

    fn remaining(&self) -> usize {
        self.levels - self.level + usize::from(!self.started)
    }
}

impl<T: AdrtScalar> Iterator for AdrtIter<T> {
    type Item = ArrayD<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.advance() {
            return None;
        }
        Some(unbatch(self.state.clone(), self.batched))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl<T: AdrtScalar> ExactSizeIterator for AdrtIter<T> {}

/// Level-by-level backprojection, see [`StepEngine::bdrt_iter`].
#[derive(Debug)]
pub struct BdrtIter<T> {
    engine: StepEngine,
    state: Array4<T>,
    batched: bool,
    level: usize,
    levels: usize,
}

impl<T: AdrtScalar> BdrtIter<T> {
    fn new(engine: StepEngine, a: ArrayView4<'_, T>, batched: bool) -> Self {
        Self {
            engine,
            state: a.to_owned(),
            batched,
            level: 0,
            levels: num_iters(a.len_of(Axis(3))),
        }
    }

    fn advance(&mut self) -> bool {
        if self.level >= self.levels {
            return false;
        }
        self.state = self.engine.bdrt_step_batched(self.state.view(), self.level);
        self.level += 1;
        true
    }

    /// Advance one level. With `copy == false` the item borrows the
    /// iterator's internal state instead of copying it.
    pub fn next_with(&mut self, copy: bool) -> Option<CowArray<'_, T, IxDyn>> {
        if !self.advance() {
            return None;
        }
        Some(snapshot(&self.state, self.batched, copy))
    }
}

impl<T: AdrtScalar> Iterator for BdrtIter<T> {
    type Item = ArrayD<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.advance() {
            return None;
        }
        Some(unbatch(self.state.clone(), self.batched))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.levels - self.level;
        (n, Some(n))
    }
}

impl<T: AdrtScalar> ExactSizeIterator for BdrtIter<T> {}
