//! `.npy` input and output with the element type decided at runtime.

use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::{read_npy, write_npy, ReadNpyError};

use crate::error::{AdrtError, Result};

/// An array read from disk, tagged with its element type.
#[derive(Clone, Debug, PartialEq)]
pub enum NpyArray {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl NpyArray {
    pub fn shape(&self) -> &[usize] {
        match self {
            NpyArray::F32(a) => a.shape(),
            NpyArray::F64(a) => a.shape(),
        }
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            NpyArray::F32(_) => "float32",
            NpyArray::F64(_) => "float64",
        }
    }
}

impl From<ArrayD<f32>> for NpyArray {
    fn from(a: ArrayD<f32>) -> Self {
        NpyArray::F32(a)
    }
}

impl From<ArrayD<f64>> for NpyArray {
    fn from(a: ArrayD<f64>) -> Self {
        NpyArray::F64(a)
    }
}

/// Read a `.npy` file holding `float32` or `float64` data of any rank.
///
/// Any other stored type is reported as [`AdrtError::UnsupportedDtype`].
pub fn load_npy(path: impl AsRef<Path>) -> Result<NpyArray> {
    let path = path.as_ref();
    match read_npy::<_, ArrayD<f32>>(path) {
        Ok(a) => return Ok(NpyArray::F32(a)),
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        Err(e) => return Err(e.into()),
    }
    match read_npy::<_, ArrayD<f64>>(path) {
        Ok(a) => Ok(NpyArray::F64(a)),
        Err(ReadNpyError::WrongDescriptor(_)) => Err(AdrtError::UnsupportedDtype {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Write an array in `.npy` format, keeping its element type.
pub fn save_npy(path: impl AsRef<Path>, array: &NpyArray) -> Result<()> {
    match array {
        NpyArray::F32(a) => write_npy(path, a)?,
        NpyArray::F64(a) => write_npy(path, a)?,
    }
    Ok(())
}
