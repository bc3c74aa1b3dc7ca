//! Error types for coefficient lookup, noise sampling and batch evaluation

use std::fmt;
use std::path::PathBuf;

/// Main error type for all reconstruction operations
#[derive(Debug)]
pub enum BlackoutError {
    /// Failed to load the target image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Target pixels don't fit the evaluator layout
    InvalidTarget {
        /// Description of what's wrong with the target
        reason: String,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Binomial coefficient requested outside the 256x256 table
    CoefficientOutOfRange {
        /// Requested trial count
        n: usize,
        /// Requested success count
        k: usize,
    },

    /// Binomial coefficient read before the table was populated
    TableNotPopulated {
        /// Requested trial count
        n: usize,
        /// Requested success count
        k: usize,
    },

    /// Parameter matrix dimensions disagree with the buffer layout
    ShapeMismatch {
        /// Which matrix or buffer was checked
        what: &'static str,
        /// Dimensions the layout requires
        expected: (usize, usize),
        /// Dimensions that were supplied
        found: (usize, usize),
    },

    /// The evaluation worker pool could not be started
    WorkerPool {
        /// Requested worker count
        workers: usize,
        /// Underlying rayon error
        source: rayon::ThreadPoolBuildError,
    },

    /// A single candidate failed during a batch evaluation
    Evaluation {
        /// Index of the candidate within its batch
        candidate: usize,
        /// Underlying failure
        source: Box<BlackoutError>,
    },

    /// Numerical computation produced invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for BlackoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidTarget { reason } => {
                write!(f, "Invalid target image: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::CoefficientOutOfRange { n, k } => {
                write!(
                    f,
                    "Binomial coefficient C({n},{k}) is outside the cached range (max 255)"
                )
            }
            Self::TableNotPopulated { n, k } => {
                write!(
                    f,
                    "Binomial coefficient C({n},{k}) was read before the table was precomputed"
                )
            }
            Self::ShapeMismatch {
                what,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Shape mismatch for {what}: expected {}x{}, found {}x{}",
                    expected.0, expected.1, found.0, found.1
                )
            }
            Self::WorkerPool { workers, source } => {
                write!(f, "Failed to start pool of {workers} workers: {source}")
            }
            Self::Evaluation { candidate, source } => {
                write!(f, "Evaluation of candidate {candidate} failed: {source}")
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for BlackoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::WorkerPool { source, .. } => Some(source),
            Self::Evaluation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Convenience type alias for reconstruction results
pub type Result<T> = std::result::Result<T, BlackoutError>;

impl From<image::ImageError> for BlackoutError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for BlackoutError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> BlackoutError {
    BlackoutError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> BlackoutError {
    BlackoutError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

/// Wrap a failure with the batch index of the candidate that produced it
pub fn evaluation_error(candidate: usize, source: BlackoutError) -> BlackoutError {
    BlackoutError::Evaluation {
        candidate,
        source: Box::new(source),
    }
}
