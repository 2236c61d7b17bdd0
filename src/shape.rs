//! Shape rules shared by every transform.
//!
//! Public entry points accept an optional leading batch axis. Internally all
//! kernels work on the batched form (`(B, N, N)` images, `(B, 4, 2N-1, N)`
//! quadrant arrays) and the batch axis is dropped again on the way out when
//! the caller did not supply one.

use std::ops::{Bound, Range, RangeBounds};

use ndarray::{Array, ArrayD, ArrayView, ArrayView3, ArrayView4, ArrayViewD, Axis, Dimension, Ix3, Ix4};

use crate::error::{AdrtError, Result};

/// Number of ADRT levels needed for an image of side `n`: `ceil(log2(n))`.
///
/// ```
/// assert_eq!(adrt_core::num_iters(1), 0);
/// assert_eq!(adrt_core::num_iters(16), 4);
/// assert_eq!(adrt_core::num_iters(17), 5);
/// ```
pub fn num_iters(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

/// Validate an image `(B?, N, N)` and return it in batched form.
pub(crate) fn image_batch<T>(image: ArrayViewD<'_, T>) -> Result<(ArrayView3<'_, T>, bool)> {
    let batched = match image.ndim() {
        2 => false,
        3 => true,
        got => {
            return Err(AdrtError::InvalidRank {
                what: "image",
                expected: "2 or 3",
                got,
            })
        }
    };
    let shape = image.shape();
    let n = shape[shape.len() - 1];
    if shape.contains(&0) || shape[shape.len() - 2] != n || !n.is_power_of_two() {
        return Err(AdrtError::InvalidImageShape {
            shape: shape.to_vec(),
        });
    }
    let image = if batched {
        image
    } else {
        image.insert_axis(Axis(0))
    };
    Ok((image.into_dimensionality::<Ix3>()?, batched))
}

/// Validate a quadrant array `(B?, 4, 2N-1, N)` and return it in batched form.
///
/// The transforms need `N` to be a power of two; the layout helpers do not.
pub(crate) fn quadrant_batch<T>(
    a: ArrayViewD<'_, T>,
    require_pow2: bool,
) -> Result<(ArrayView4<'_, T>, bool)> {
    let batched = match a.ndim() {
        3 => false,
        4 => true,
        got => {
            return Err(AdrtError::InvalidRank {
                what: "ADRT array",
                expected: "3 or 4",
                got,
            })
        }
    };
    let shape = a.shape();
    let nd = shape.len();
    let n = shape[nd - 1];
    let valid = !shape.contains(&0)
        && shape[nd - 3] == 4
        && shape[nd - 2] == 2 * n - 1
        && (!require_pow2 || n.is_power_of_two());
    if !valid {
        return Err(AdrtError::InvalidAdrtShape {
            shape: shape.to_vec(),
        });
    }
    let a = if batched { a } else { a.insert_axis(Axis(0)) };
    Ok((a.into_dimensionality::<Ix4>()?, batched))
}

/// Drop the leading batch axis again if the caller did not provide one.
pub(crate) fn unbatch<T, D: Dimension>(a: Array<T, D>, batched: bool) -> ArrayD<T> {
    let a = a.into_dyn();
    if batched {
        a
    } else {
        a.index_axis_move(Axis(0), 0)
    }
}

/// View counterpart of [`unbatch`].
pub(crate) fn unbatch_view<'a, T, D: Dimension>(
    a: ArrayView<'a, T, D>,
    batched: bool,
) -> ArrayViewD<'a, T> {
    let a = a.into_dyn();
    if batched {
        a
    } else {
        a.index_axis_move(Axis(0), 0)
    }
}

/// Resolve a level range against the number of levels for side `size`.
pub(crate) fn level_range(levels: impl RangeBounds<usize>, size: usize) -> Result<Range<usize>> {
    let total = num_iters(size);
    let start = match levels.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match levels.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => total,
    };
    if start > end || end > total {
        return Err(AdrtError::InvalidLevelRange {
            start,
            end,
            size,
            num_iters: total,
        });
    }
    Ok(start..end)
}

/// Check a single level index against `0..num_iters(size)`.
pub(crate) fn check_level(level: usize, size: usize) -> Result<()> {
    let total = num_iters(size);
    if level >= total {
        return Err(AdrtError::LevelOutOfRange {
            level,
            size,
            num_iters: total,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::{Array2, Array3, ArrayD, IxDyn};

    #[test]
    fn num_iters_matches_ceil_log2() {
        assert_eq!(num_iters(0), 0);
        assert_eq!(num_iters(1), 0);
        assert_eq!(num_iters(2), 1);
        assert_eq!(num_iters(3), 2);
        assert_eq!(num_iters(4), 2);
        assert_eq!(num_iters(5), 3);
        assert_eq!(num_iters(1024), 10);
        assert_eq!(num_iters(1025), 11);
    }

    #[test]
    fn image_batch_adds_and_detects_batch_axis() {
        let single = Array2::<f32>::zeros((8, 8));
        let (view, batched) = image_batch(single.view().into_dyn()).unwrap();
        assert!(!batched);
        assert_eq!(view.dim(), (1, 8, 8));

        let many = Array3::<f32>::zeros((3, 4, 4));
        let (view, batched) = image_batch(many.view().into_dyn()).unwrap();
        assert!(batched);
        assert_eq!(view.dim(), (3, 4, 4));
    }

    #[test]
    fn image_batch_rejects_bad_shapes() {
        for shape in [vec![16, 32], vec![31, 31], vec![0, 32, 32], vec![0, 0], vec![16], vec![2, 3, 16, 16]] {
            let a = ArrayD::<f64>::zeros(IxDyn(&shape));
            let err = image_batch(a.view()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Shape, "shape {shape:?}");
        }
    }

    #[test]
    fn quadrant_batch_rejects_bad_shapes() {
        for shape in [
            vec![4, 31, 15],
            vec![4, 30, 16],
            vec![3, 31, 16],
            vec![6, 5, 4, 31, 16],
            vec![0, 4, 31, 16],
            vec![4, 0, 0],
        ] {
            let a = ArrayD::<f32>::zeros(IxDyn(&shape));
            assert!(quadrant_batch(a.view(), true).is_err(), "shape {shape:?}");
        }
        let odd = ArrayD::<f32>::zeros(IxDyn(&[4, 33, 17]));
        assert!(quadrant_batch(odd.view(), true).is_err());
        assert!(quadrant_batch(odd.view(), false).is_ok());
    }

    #[test]
    fn level_range_resolves_bounds() {
        assert_eq!(level_range(.., 16).unwrap(), 0..4);
        assert_eq!(level_range(1.., 16).unwrap(), 1..4);
        assert_eq!(level_range(..=2, 16).unwrap(), 0..3);
        assert_eq!(level_range(2..2, 16).unwrap(), 2..2);
        assert!(level_range(0..5, 16).is_err());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = level_range(3..1, 16);
        assert_eq!(reversed.unwrap_err().kind(), ErrorKind::Validation);
    }
}
