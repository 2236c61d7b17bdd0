//! Quadrant layout of ADRT data.
//!
//! The ADRT of an `N x N` image is stored as four `(2N-1) x N` quadrants, one
//! per range of `pi/4` radians. Each quadrant starts out as a flipped and/or
//! transposed copy of the image in its first `N` rows:
//!
//! | quadrant | embedding                          |
//! |----------|------------------------------------|
//! | 0        | transpose of the column-flip       |
//! | 1        | row-flip                           |
//! | 2        | identity                           |
//! | 3        | transpose of the flip on both axes |
//!
//! [`truncate`] undoes the embedding, [`stitch_adrt`] and [`unstitch_adrt`]
//! rearrange the quadrants into one contiguous image and back.

use ndarray::{s, Array2, Array3, Array4, ArrayD, ArrayView3, ArrayView4, AsArray, Axis, Dimension, Ix3};

use crate::error::{AdrtError, Result};
use crate::scalar::AdrtScalar;
use crate::shape::{image_batch, quadrant_batch, unbatch};

/// Embed an image `(B?, N, N)` into a zero-filled quadrant array `(B?, 4, 2N-1, N)`.
///
/// This is the starting point of the forward transform; see
/// [`StepEngine::adrt_step`](crate::StepEngine::adrt_step).
pub fn adrt_init<'a, T, D>(image: impl AsArray<'a, T, D>) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    let (image, batched) = image_batch(image.into().into_dyn())?;
    Ok(unbatch(init_batched(image), batched))
}

/// Slice each quadrant to its leading `N x N` block and undo its embedding.
///
/// Output shape `(B?, 4, N, N)`. This inverts [`adrt_init`] and also brings
/// `bdrt`/`iadrt` outputs into a common orientation before averaging.
pub fn truncate<'a, T, D>(a: impl AsArray<'a, T, D>) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    let (a, batched) = quadrant_batch(a.into().into_dyn(), false)?;
    Ok(unbatch(truncate_batched(a), batched))
}

/// [`truncate`] followed by the mean over the four quadrants, `(B?, N, N)`.
pub fn quadrant_mean<'a, T, D>(a: impl AsArray<'a, T, D>) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    let (a, batched) = quadrant_batch(a.into().into_dyn(), false)?;
    Ok(unbatch(quadrant_mean_batched(a), batched))
}

/// Align the four quadrants into one contiguous array.
///
/// Quadrants 0 and 1 fill the top `2N-1` rows, quadrants 2 and 3 the bottom
/// `2N-1` rows; odd quadrants are flipped on both axes. The output has shape
/// `(B?, 3N-2, 4N)`, or `(B?, 3N-2, 4N-4)` when `remove_repeated` drops the
/// last column of every quadrant. Those columns are only redundant for genuine
/// ADRT outputs.
pub fn stitch_adrt<'a, T, D>(a: impl AsArray<'a, T, D>, remove_repeated: bool) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    let (a, batched) = quadrant_batch(a.into().into_dyn(), false)?;
    let (batch, _, rows, n) = a.dim();
    let out_rows = 3 * n - 2;
    let view_cols = n - usize::from(remove_repeated);
    let mut out = Array3::zeros((batch, out_rows, 4 * view_cols));
    for (quads, mut dst) in a.outer_iter().zip(out.outer_iter_mut()) {
        for q in 0..4 {
            let mut quadrant = quads.index_axis(Axis(0), q);
            if q % 2 == 1 {
                quadrant.invert_axis(Axis(0));
                quadrant.invert_axis(Axis(1));
            }
            let row0 = if q < 2 { 0 } else { out_rows - rows };
            dst.slice_mut(s![row0..row0 + rows, q * view_cols..(q + 1) * view_cols])
                .assign(&quadrant.slice(s![.., ..view_cols]));
        }
    }
    Ok(unbatch(out, batched))
}

/// Inverse of [`stitch_adrt`] for either setting of `remove_repeated`.
///
/// Input shape `(B?, 3N-2, 4N)` or `(B?, 3N-2, 4N-4)`. A removed column is
/// rebuilt from the first column of the next quadrant, flipped along the rows
/// when wrapping from quadrant 3 back to quadrant 0.
pub fn unstitch_adrt<'a, T, D>(a: impl AsArray<'a, T, D>) -> Result<ArrayD<T>>
where
    T: AdrtScalar,
    D: Dimension,
{
    let a = a.into().into_dyn();
    let batched = match a.ndim() {
        2 => false,
        3 => true,
        got => {
            return Err(AdrtError::InvalidRank {
                what: "stitched ADRT array",
                expected: "2 or 3",
                got,
            })
        }
    };
    let shape = a.shape().to_vec();
    let (rows, cols) = (shape[shape.len() - 2], shape[shape.len() - 1]);
    let n = (rows + 2) / 3;
    if n == 0 || rows != 3 * n - 2 || cols == 0 || (cols != 4 * n && cols != 4 * n - 4) {
        return Err(AdrtError::InvalidStitchedShape { shape });
    }
    let a = if batched { a } else { a.insert_axis(Axis(0)) };
    let a = a.into_dimensionality::<Ix3>()?;

    let removed = cols != 4 * n;
    let view_cols = cols / 4;
    let out_rows = 2 * n - 1;
    let mut out = Array4::zeros((a.len_of(Axis(0)), 4, out_rows, n));
    for (stitched, mut dst) in a.outer_iter().zip(out.outer_iter_mut()) {
        for q in 0..4 {
            let row0 = if q < 2 { 0 } else { rows - out_rows };
            let mut block = Array2::<T>::zeros((out_rows, n));
            block
                .slice_mut(s![.., ..view_cols])
                .assign(&stitched.slice(s![row0..row0 + out_rows, q * view_cols..(q + 1) * view_cols]));
            if removed {
                let mut neighbor = stitched.column(((q + 1) % 4) * view_cols);
                if q == 3 {
                    neighbor.invert_axis(Axis(0));
                }
                block
                    .column_mut(n - 1)
                    .assign(&neighbor.slice(s![row0..row0 + out_rows]));
            }
            let mut block = block.view();
            if q % 2 == 1 {
                block.invert_axis(Axis(0));
                block.invert_axis(Axis(1));
            }
            dst.index_axis_mut(Axis(0), q).assign(&block);
        }
    }
    Ok(unbatch(out, batched))
}

pub(crate) fn init_batched<T: AdrtScalar>(image: ArrayView3<'_, T>) -> Array4<T> {
    let (batch, n, _) = image.dim();
    let mut out = Array4::zeros((batch, 4, 2 * n - 1, n));
    for (img, mut quads) in image.outer_iter().zip(out.outer_iter_mut()) {
        quads
            .slice_mut(s![0, ..n, ..])
            .assign(&img.slice(s![.., ..;-1]).reversed_axes());
        quads.slice_mut(s![1, ..n, ..]).assign(&img.slice(s![..;-1, ..]));
        quads.slice_mut(s![2, ..n, ..]).assign(&img);
        quads
            .slice_mut(s![3, ..n, ..])
            .assign(&img.slice(s![..;-1, ..;-1]).reversed_axes());
    }
    out
}

pub(crate) fn truncate_batched<T: AdrtScalar>(a: ArrayView4<'_, T>) -> Array4<T> {
    let (batch, _, _, n) = a.dim();
    let mut out = Array4::zeros((batch, 4, n, n));
    for (quads, mut dst) in a.outer_iter().zip(out.outer_iter_mut()) {
        dst.slice_mut(s![0, .., ..])
            .assign(&quads.slice(s![0, ..n;-1, ..]).reversed_axes());
        dst.slice_mut(s![1, .., ..]).assign(&quads.slice(s![1, ..n;-1, ..]));
        dst.slice_mut(s![2, .., ..]).assign(&quads.slice(s![2, ..n, ..]));
        dst.slice_mut(s![3, .., ..])
            .assign(&quads.slice(s![3, ..n;-1, ..;-1]).reversed_axes());
    }
    out
}

pub(crate) fn quadrant_mean_batched<T: AdrtScalar>(a: ArrayView4<'_, T>) -> Array3<T> {
    let quarter = T::cast(0.25);
    truncate_batched(a)
        .sum_axis(Axis(1))
        .mapv_into(|v| v * quarter)
}
