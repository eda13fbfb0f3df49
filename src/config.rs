//! Solver configuration.

use serde::{Deserialize, Serialize};

/// Pivot row selection during Gauss-Jordan elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotStrategy {
    /// First row at or below the diagonal with a nonzero entry.
    /// Reproducible, but poorly conditioned systems lose precision.
    FirstNonZero,
    /// Row with the largest absolute entry (partial pivoting).
    LargestMagnitude,
}

impl Default for PivotStrategy {
    fn default() -> Self {
        PivotStrategy::FirstNonZero
    }
}

/// Homography estimator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Pivoting used when solving the DLT system. `FirstNonZero`
    /// reproduces the unpivoted elimination bit for bit, but corner
    /// coordinates that round to tiny nonzero values make it unstable.
    pub pivot: PivotStrategy,
    /// Minimum correspondences required. Values below 4 are treated as 4.
    pub min_correspondences: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            pivot: PivotStrategy::LargestMagnitude,
            min_correspondences: 4,
        }
    }
}

impl EstimatorConfig {
    /// Effective minimum, never below the 4 points a homography needs.
    pub fn required_correspondences(&self) -> usize {
        self.min_correspondences.max(4)
    }
}

/// Ear-clipping triangulator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangulatorConfig {
    /// Pivoting used for the barycentric 3x3 solves. Defaults to
    /// `LargestMagnitude`: vertex coordinates often carry rounding noise
    /// where an exact zero belongs, and an unpivoted solve divides by it.
    pub pivot: PivotStrategy,
    /// A vertex within `epsilon` (in barycentric units) of an ear triangle
    /// counts as inside it, and neighbours whose angle has a sine below
    /// `epsilon` are treated as collinear.
    pub epsilon: f64,
}

impl Default for TriangulatorConfig {
    fn default() -> Self {
        Self {
            pivot: PivotStrategy::LargestMagnitude,
            epsilon: 1e-9,
        }
    }
}
