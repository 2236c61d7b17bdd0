//! Element types accepted by the transforms.

use ndarray::NdFloat;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Floating-point element type supported by every ADRT routine.
///
/// Implemented for `f32` and `f64` only; the element type of the input is
/// preserved end to end.
pub trait AdrtScalar: NdFloat + Default + Send + Sync + sealed::Sealed {
    /// NumPy-style name of the type, used in logs.
    const DTYPE: &'static str;

    /// Convert from `f64`, rounding to nearest for `f32`.
    fn cast(v: f64) -> Self;

    fn widen(self) -> f64;
}

impl AdrtScalar for f32 {
    const DTYPE: &'static str = "float32";

    #[inline]
    fn cast(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }
}

impl AdrtScalar for f64 {
    const DTYPE: &'static str = "float64";

    #[inline]
    fn cast(v: f64) -> Self {
        v
    }

    #[inline]
    fn widen(self) -> f64 {
        self
    }
}
