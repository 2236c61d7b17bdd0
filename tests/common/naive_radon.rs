use ndarray::{Array3, ArrayView2};

/// Pixels `(row, col)` visited by the digital line with intercept `h` and
/// slope class `a` over `n` columns. Rows may fall outside the image.
pub fn digital_line(n: usize, h: i64, a: usize) -> Vec<(i64, usize)> {
    if n == 1 {
        return vec![(h, 0)];
    }
    let k = a / 2;
    let shift = (a - k) as i64;
    let half = n / 2;
    let mut pixels = digital_line(half, h, k);
    pixels.extend(
        digital_line(half, h - shift, k)
            .into_iter()
            .map(|(r, c)| (r, c + half)),
    );
    pixels
}

/// Sum every digital line of one embedded quadrant, `(2n-1, n)`.
pub fn quadrant_line_sums(embedded: ArrayView2<'_, f64>) -> ndarray::Array2<f64> {
    let n = embedded.ncols();
    ndarray::Array2::from_shape_fn((2 * n - 1, n), |(h, a)| {
        digital_line(n, h as i64, a)
            .into_iter()
            .filter(|&(r, _)| r >= 0 && (r as usize) < n)
            .map(|(r, c)| embedded[[r as usize, c]])
            .sum()
    })
}

/// Reference ADRT of a single image, built from the quadrant embeddings.
pub fn naive_adrt(image: ArrayView2<'_, f64>) -> Array3<f64> {
    let n = image.ncols();
    let embeddings = [
        image.slice(ndarray::s![.., ..;-1]).reversed_axes().to_owned(),
        image.slice(ndarray::s![..;-1, ..]).to_owned(),
        image.to_owned(),
        image.slice(ndarray::s![..;-1, ..;-1]).reversed_axes().to_owned(),
    ];
    let mut out = Array3::zeros((4, 2 * n - 1, n));
    for (q, embedded) in embeddings.iter().enumerate() {
        out.index_axis_mut(ndarray::Axis(0), q)
            .assign(&quadrant_line_sums(embedded.view()));
    }
    out
}
