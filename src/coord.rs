//! Radon-domain coordinates of ADRT entries and the reverse lookup.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use ndarray::{concatenate, s, Array, Array1, Array2, Array3, ArrayView1, AsArray, Axis, Dimension, Ix1, Ix2, Ix3};

use crate::error::{AdrtError, Result};
use crate::scalar::AdrtScalar;

/// Angle and offset of every ADRT entry.
///
/// `angle` is broadcastable against `offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct CartesianCoord<D: Dimension> {
    pub angle: Array<f64, D>,
    pub offset: Array<f64, D>,
}

/// Nearest ADRT entry for a batch of Radon-domain points.
#[derive(Clone, Debug, PartialEq)]
pub struct AdrtIndex {
    pub quadrant: Array1<u8>,
    /// Intercept row; may fall outside `0..2N-1` for points off the image.
    pub height: Array1<i64>,
    pub slope: Array1<u64>,
    /// Scale between digital line sums and line integrals, `1 / cos`.
    pub factor: Array1<f64>,
}

fn check_radon_size(n: usize) -> Result<()> {
    if n < 2 || !n.is_power_of_two() {
        return Err(AdrtError::InvalidRadonSize { size: n });
    }
    Ok(())
}

// Base slope angles in [0, pi/4] and offsets of the lines of one quadrant.
fn base_coords(n: usize) -> (Array1<f64>, Array2<f64>) {
    let nf = n as f64;
    let slopes = Array1::from_shape_fn(n, |c| c as f64 / (nf - 1.0));
    let theta = slopes.mapv(f64::atan);
    let offset = Array2::from_shape_fn((2 * n - 1, n), |(j, c)| {
        let height = 1.0 - (j as f64 + 0.5) / nf;
        let ns = slopes[c];
        ((height + (1.0 - 0.5 / nf) * ns) / (1.0 + ns) - 0.5) * (theta[c].cos() + theta[c].sin())
    });
    (theta, offset)
}

/// Coordinates shaped like the ADRT output: `angle (4, 1, n)`,
/// `offset (4, 2n-1, n)`.
///
/// Quadrant angles are `theta - pi/2`, `-theta`, `theta` and `pi/2 - theta`
/// for base angles `theta = atan(c / (n-1))`.
pub fn coord_adrt_to_cart(n: usize) -> Result<CartesianCoord<Ix3>> {
    check_radon_size(n)?;
    let (theta, h0) = base_coords(n);
    let mut angle = Array3::zeros((4, 1, n));
    angle.slice_mut(s![0, 0, ..]).assign(&theta.mapv(|t| t - FRAC_PI_2));
    angle.slice_mut(s![1, 0, ..]).assign(&theta.mapv(|t| -t));
    angle.slice_mut(s![2, 0, ..]).assign(&theta);
    angle.slice_mut(s![3, 0, ..]).assign(&theta.mapv(|t| FRAC_PI_2 - t));

    let mut offset = Array3::zeros((4, 2 * n - 1, n));
    for q in 0..4 {
        let sign = if q % 2 == 0 { 1.0 } else { -1.0 };
        offset
            .index_axis_mut(Axis(0), q)
            .assign(&h0.mapv(|h| sign * h));
    }
    Ok(CartesianCoord { angle, offset })
}

/// The same coordinates concatenated horizontally with increasing angle.
///
/// Odd quadrants are column-reversed. The result has `4n` columns, or `4n-3`
/// when `remove_repeated` drops the last column of the first three quadrants
/// (the angles shared with the following quadrant).
pub fn coord_adrt_to_cart_hcat(n: usize, remove_repeated: bool) -> Result<CartesianCoord<Ix2>> {
    check_radon_size(n)?;
    let (theta, h0) = base_coords(n);
    let keep = n - usize::from(remove_repeated);

    let theta_offset = theta.mapv(|t| t - FRAC_PI_2);
    let theta_rev = theta.slice(s![..;-1]).mapv(|t| -t);
    let offset_rev = theta_offset.slice(s![..;-1]).mapv(|t| -t);
    let angle = concatenate(
        Axis(0),
        &[
            theta_offset.slice(s![..keep]),
            theta_rev.slice(s![..keep]),
            theta.slice(s![..keep]),
            offset_rev.view(),
        ],
    )?
    .insert_axis(Axis(0));

    let h0_rev = h0.slice(s![.., ..;-1]).mapv(|h| -h);
    let offset = concatenate(
        Axis(1),
        &[
            h0.slice(s![.., ..keep]),
            h0_rev.slice(s![.., ..keep]),
            h0.slice(s![.., ..keep]),
            h0_rev.view(),
        ],
    )?;
    Ok(CartesianCoord { angle, offset })
}

// Sign with sgn(0) = 0.
fn sgn(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Find the ADRT entry nearest to each Radon-domain point `(theta, t)`.
///
/// # Errors
///
/// Validation error when `n` is not a power of two of at least 2 or any
/// `|theta| > pi/2`, shape error when `theta` and `t` differ in length.
pub fn coord_cart_to_adrt<'a, 'b, T>(
    theta: impl AsArray<'a, T, Ix1>,
    t: impl AsArray<'b, T, Ix1>,
    n: usize,
) -> Result<AdrtIndex>
where
    T: AdrtScalar,
{
    let theta: ArrayView1<'a, T> = theta.into();
    let t: ArrayView1<'b, T> = t.into();
    check_radon_size(n)?;
    if theta.len() != t.len() {
        return Err(AdrtError::LengthMismatch {
            theta: theta.len(),
            t: t.len(),
        });
    }
    if let Some(&bad) = theta.iter().find(|th| th.widen().abs() > FRAC_PI_2) {
        return Err(AdrtError::ThetaOutOfRange { theta: bad.widen() });
    }

    let nf = n as f64;
    let len = theta.len();
    let mut index = AdrtIndex {
        quadrant: Array1::zeros(len),
        height: Array1::zeros(len),
        slope: Array1::zeros(len),
        factor: Array1::zeros(len),
    };
    for (i, (&th, &ti)) in theta.iter().zip(t.iter()).enumerate() {
        let (th, ti) = (th.widen(), ti.widen());
        let signs = (sgn(th), sgn(th - FRAC_PI_4), sgn(th + FRAC_PI_4));
        let th0 = th.abs() - (th - FRAC_PI_4).abs() - (th + FRAC_PI_4).abs() + FRAC_PI_2;
        let sigma = signs.0 - signs.1 - signs.2;
        let quadrant = (3.0 - signs.0 - signs.1 - signs.2) / 2.0;
        let (tan, cos) = (th0.tan(), th0.cos());
        let height = (0.5 * (1.0 + tan) - sigma * ti / cos) * nf + 0.5 * (sigma - 1.0);

        index.quadrant[i] = quadrant.floor() as u8;
        index.height[i] = height.floor() as i64;
        index.slope[i] = (tan * (nf - 1.0)).round_ties_even() as u64;
        index.factor[i] = 1.0 / cos;
    }
    Ok(index)
}
