//! Error types for the warp core.
//!
//! Every failure is deterministic: the same input always produces the same
//! error, so none of these are worth retrying.

use thiserror::Error;

/// Errors from the matrix engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Dimension mismatch: cannot multiply {left:?} by {right:?}")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("Matrix is singular, cannot invert")]
    SingularMatrix,
}

/// Errors from homography estimation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HomographyError {
    #[error("Not enough correspondences: {count} (need at least {required})")]
    InsufficientCorrespondences { count: usize, required: usize },
    #[error("Homography system could not be solved: {0}")]
    SingularSystem(#[source] MatrixError),
}

/// Errors from polygon triangulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriangulationError {
    #[error("No valid ear found among {remaining} remaining vertices; polygon is not simple")]
    TriangulationFailed { remaining: usize },
}

/// Errors from refreshing a warp fragment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FragmentError {
    #[error("Fragment homography failed: {0}")]
    Homography(#[from] HomographyError),
    #[error("Fragment mesh failed: {0}")]
    Triangulation(#[from] TriangulationError),
}
