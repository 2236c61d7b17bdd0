//! Error types for adrt-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`AdrtError`].
pub type Result<T> = std::result::Result<T, AdrtError>;

/// Broad class of an [`AdrtError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unsupported element type.
    Type,
    /// Array shape does not fit the operation.
    Shape,
    /// A parameter is out of range.
    Validation,
    /// Reading or writing external data failed.
    Io,
}

/// Errors that can occur in ADRT operations.
#[derive(Error, Debug)]
pub enum AdrtError {
    /// Element type other than `f32`/`f64` found at the I/O boundary.
    #[error("unsupported element type in {path:?}: only float32 and float64 are accepted")]
    UnsupportedDtype {
        /// File the array was read from.
        path: PathBuf,
    },

    /// Wrong number of dimensions.
    #[error("invalid number of dimensions for {what}: expected {expected}, got {got}")]
    InvalidRank {
        /// Kind of array being checked.
        what: &'static str,
        /// Accepted ranks.
        expected: &'static str,
        /// Actual rank.
        got: usize,
    },

    /// Image not square, not a power of two, or with a zero axis.
    #[error("ADRT input must be square with side a power of two, got shape {shape:?}")]
    InvalidImageShape {
        /// Offending shape.
        shape: Vec<usize>,
    },

    /// Array does not have the `(B?, 4, 2N-1, N)` layout.
    #[error("array must have a valid ADRT shape (B?, 4, 2N-1, N), got {shape:?}")]
    InvalidAdrtShape {
        /// Offending shape.
        shape: Vec<usize>,
    },

    /// Stitched array has neither `4N` nor `4N-4` columns over `3N-2` rows.
    #[error("unsuitable shape for ADRT unstitching {shape:?}")]
    InvalidStitchedShape {
        /// Offending shape.
        shape: Vec<usize>,
    },

    /// Paired coordinate arrays differ in length.
    #[error("length mismatch: theta has {theta} entries, t has {t}")]
    LengthMismatch {
        /// Number of angles.
        theta: usize,
        /// Number of offsets.
        t: usize,
    },

    /// Level index outside `0..num_iters`.
    #[error("level {level} out of range for size {size} ({num_iters} levels)")]
    LevelOutOfRange {
        /// Requested level.
        level: usize,
        /// Image side length.
        size: usize,
        /// Number of levels available.
        num_iters: usize,
    },

    /// Level range reversed or past the last level.
    #[error("level range {start}..{end} invalid for size {size} ({num_iters} levels)")]
    InvalidLevelRange {
        /// First level (inclusive).
        start: usize,
        /// Last level (exclusive).
        end: usize,
        /// Image side length.
        size: usize,
        /// Number of levels available.
        num_iters: usize,
    },

    /// Radon-domain size below two or not a power of two.
    #[error("invalid Radon domain size {size}, must be a power of two and at least 2")]
    InvalidRadonSize {
        /// Offending size.
        size: usize,
    },

    /// Angle outside `[-pi/2, pi/2]`.
    #[error("theta must lie in [-pi/2, pi/2], got {theta}")]
    ThetaOutOfRange {
        /// First offending angle.
        theta: f64,
    },

    /// Invalid argument provided to an operation.
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name.
        arg: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Internal reshape of a standard-layout buffer failed.
    #[error("array layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),

    /// Malformed configuration file.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Reading a `.npy` file failed.
    #[error("failed to read npy: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    /// Writing a `.npy` file failed.
    #[error("failed to write npy: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    /// Plain I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AdrtError {
    /// Class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdrtError::UnsupportedDtype { .. } => ErrorKind::Type,
            AdrtError::InvalidRank { .. }
            | AdrtError::InvalidImageShape { .. }
            | AdrtError::InvalidAdrtShape { .. }
            | AdrtError::InvalidStitchedShape { .. }
            | AdrtError::LengthMismatch { .. }
            | AdrtError::Layout(_) => ErrorKind::Shape,
            AdrtError::LevelOutOfRange { .. }
            | AdrtError::InvalidLevelRange { .. }
            | AdrtError::InvalidRadonSize { .. }
            | AdrtError::ThetaOutOfRange { .. }
            | AdrtError::InvalidArgument { .. } => ErrorKind::Validation,
            AdrtError::Config(_)
            | AdrtError::ReadNpy(_)
            | AdrtError::WriteNpy(_)
            | AdrtError::Io(_) => ErrorKind::Io,
        }
    }
}
