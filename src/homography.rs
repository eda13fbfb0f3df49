//! Homography estimation from point correspondences.
//!
//! Solves the direct linear transform with the bottom-right entry fixed
//! to 1. Four correspondences give an exact fit; more give the
//! least-squares fit through the pseudo-inverse. There is no outlier
//! rejection, so every correspondence is trusted.

use glam::{DVec2, Mat4};
use serde::{Deserialize, Serialize};

use crate::config::{EstimatorConfig, PivotStrategy};
use crate::error::{HomographyError, MatrixError};
use crate::matrix::Matrix;

/// Projective `w` below this is treated as a point at infinity.
const W_EPSILON: f64 = 1e-10;

/// A source point and the destination it should map to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    pub source: DVec2,
    pub destination: DVec2,
}

impl Correspondence {
    pub fn new(source: DVec2, destination: DVec2) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// 3x3 projective transform with entry (2,2) normalized to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    /// 3x3 homography matrix (row-major).
    pub matrix: [[f64; 3]; 3],
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Apply the homography to a point, with perspective division.
    /// Returns `None` when the point maps to infinity.
    pub fn transform_point(&self, point: DVec2) -> Option<DVec2> {
        let h = &self.matrix;
        let w = h[2][0] * point.x + h[2][1] * point.y + h[2][2];
        if w.abs() < W_EPSILON {
            return None;
        }
        let x = (h[0][0] * point.x + h[0][1] * point.y + h[0][2]) / w;
        let y = (h[1][0] * point.x + h[1][1] * point.y + h[1][2]) / w;
        Some(DVec2::new(x, y))
    }

    /// Inverse transform, rescaled so entry (2,2) is 1 where possible.
    pub fn inverse(&self) -> Result<Homography, MatrixError> {
        let inv = self.to_matrix().invert_with(PivotStrategy::LargestMagnitude)?;
        let scale = inv[(2, 2)];
        let scale = if scale.abs() > W_EPSILON { scale } else { 1.0 };

        let mut matrix = [[0.0; 3]; 3];
        for (r, row) in matrix.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = inv[(r, c)] / scale;
            }
        }
        Ok(Homography { matrix })
    }

    pub fn to_matrix(&self) -> Matrix {
        Matrix::from_rows(&self.matrix)
    }

    /// Embed into a 4x4 matrix acting on `(x, y, z, w)`: the homography
    /// occupies rows and columns 0, 1 and 3, and z passes through.
    /// This is the layout a fragment shader expects for its uniform.
    pub fn to_mat4(&self) -> Mat4 {
        const AXES: [usize; 3] = [0, 1, 3];
        let mut rows = [[0.0f32; 4]; 4];
        rows[2][2] = 1.0;
        for (r, &row_axis) in AXES.iter().enumerate() {
            for (c, &col_axis) in AXES.iter().enumerate() {
                rows[row_axis][col_axis] = self.matrix[r][c] as f32;
            }
        }
        Mat4::from_cols_array_2d(&rows).transpose()
    }

    /// Mean distance between mapped sources and their destinations.
    /// Sources that map to infinity are skipped.
    pub fn reprojection_error(&self, correspondences: &[Correspondence]) -> f64 {
        let distances: Vec<f64> = correspondences
            .iter()
            .filter_map(|c| {
                self.transform_point(c.source)
                    .map(|mapped| mapped.distance(c.destination))
            })
            .collect();

        if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        }
    }

    /// Check if this is approximately an identity transform.
    pub fn is_identity(&self, epsilon: f64) -> bool {
        let identity = Self::identity();
        self.matrix
            .iter()
            .flatten()
            .zip(identity.matrix.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

/// Estimates homographies from correspondence lists.
#[derive(Debug, Clone, Default)]
pub struct HomographyEstimator {
    pub config: EstimatorConfig,
}

impl HomographyEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Compute the homography mapping each source onto its destination.
    pub fn estimate(
        &self,
        correspondences: &[Correspondence],
    ) -> Result<Homography, HomographyError> {
        let count = correspondences.len();
        let required = self.config.required_correspondences();
        if count < required {
            return Err(HomographyError::InsufficientCorrespondences { count, required });
        }

        log::debug!(
            "Solving homography from {} correspondences ({}x8 system)",
            count,
            count * 2
        );

        let (a, b) = build_system(correspondences);

        // A 4-point system is square and inverted directly; anything larger
        // goes through the pseudo-inverse.
        let h = a
            .invert_with(self.config.pivot)
            .and_then(|a_inv| a_inv.multiply(&b))
            .map_err(HomographyError::SingularSystem)?;
        let h = h.as_slice();

        if h.iter().any(|v| !v.is_finite()) {
            return Err(HomographyError::SingularSystem(MatrixError::SingularMatrix));
        }

        let homography = Homography {
            matrix: [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]],
        };

        log::info!(
            "Homography computed from {} correspondences, error: {:.6}",
            count,
            homography.reprojection_error(correspondences)
        );

        Ok(homography)
    }
}

/// Estimate a homography with the default configuration.
pub fn estimate_homography(
    correspondences: &[Correspondence],
) -> Result<Homography, HomographyError> {
    HomographyEstimator::default().estimate(correspondences)
}

/// Build the `2n x 8` DLT coefficients and the `2n x 1` right-hand side.
fn build_system(correspondences: &[Correspondence]) -> (Matrix, Matrix) {
    let rows = correspondences.len() * 2;
    let mut a = Matrix::zero(rows, 8);
    let mut b = Matrix::zero(rows, 1);

    for (i, c) in correspondences.iter().enumerate() {
        let (x, y) = (c.source.x, c.source.y);
        let (dx, dy) = (c.destination.x, c.destination.y);
        let r0 = i * 2;
        let r1 = r0 + 1;

        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -x * dx;
        a[(r0, 7)] = -y * dx;
        b[(r0, 0)] = dx;

        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -x * dy;
        a[(r1, 7)] = -y * dy;
        b[(r1, 0)] = dy;
    }

    (a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> [DVec2; 4] {
        [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ]
    }

    fn perspective() -> Homography {
        Homography {
            matrix: [[1.2, 0.1, 0.05], [-0.05, 0.9, 0.1], [0.2, -0.1, 1.0]],
        }
    }

    fn correspondences_for(h: &Homography, sources: &[DVec2]) -> Vec<Correspondence> {
        sources
            .iter()
            .map(|&s| Correspondence::new(s, h.transform_point(s).unwrap()))
            .collect()
    }

    fn assert_matrix_close(a: &Homography, b: &Homography, tolerance: f64) {
        for r in 0..3 {
            for c in 0..3 {
                assert!(
                    (a.matrix[r][c] - b.matrix[r][c]).abs() < tolerance,
                    "entry ({}, {}): {} vs {}",
                    r,
                    c,
                    a.matrix[r][c],
                    b.matrix[r][c]
                );
            }
        }
    }

    #[test]
    fn test_identity_transform() {
        let identity = Homography::identity();
        let p = identity.transform_point(DVec2::new(100.0, 200.0)).unwrap();
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 200.0).abs() < 1e-9);
        assert!(identity.is_identity(1e-12));
    }

    #[test]
    fn test_scale_example() {
        let sources = unit_square();
        let correspondences: Vec<_> = sources
            .iter()
            .map(|&s| Correspondence::new(s, s * 2.0))
            .collect();

        let h = estimate_homography(&correspondences).unwrap();
        let expected = Homography {
            matrix: [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]],
        };
        assert_matrix_close(&h, &expected, 1e-9);
    }

    #[test]
    fn test_four_point_round_trip() {
        let truth = perspective();
        let correspondences = correspondences_for(&truth, &unit_square());

        let h = estimate_homography(&correspondences).unwrap();
        for c in &correspondences {
            let mapped = h.transform_point(c.source).unwrap();
            assert!(mapped.distance(c.destination) < 1e-4);
        }
        assert_matrix_close(&h, &truth, 1e-6);
    }

    #[test]
    fn test_overdetermined_fit() {
        let truth = perspective();
        let mut sources = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                sources.push(DVec2::new(x as f64 * 0.5, y as f64 * 0.5));
            }
        }
        let correspondences = correspondences_for(&truth, &sources);

        let h = estimate_homography(&correspondences).unwrap();
        assert_matrix_close(&h, &truth, 1e-6);
        assert!(h.reprojection_error(&correspondences) < 1e-6);
    }

    #[test]
    fn test_insufficient_correspondences() {
        let correspondences: Vec<_> = unit_square()[..3]
            .iter()
            .map(|&s| Correspondence::new(s, s))
            .collect();
        assert_eq!(
            estimate_homography(&correspondences).unwrap_err(),
            HomographyError::InsufficientCorrespondences {
                count: 3,
                required: 4
            }
        );
    }

    #[test]
    fn test_configured_minimum() {
        let estimator = HomographyEstimator::new(EstimatorConfig {
            min_correspondences: 5,
            ..Default::default()
        });
        let correspondences = correspondences_for(&perspective(), &unit_square());
        assert!(matches!(
            estimator.estimate(&correspondences),
            Err(HomographyError::InsufficientCorrespondences {
                count: 4,
                required: 5
            })
        ));
    }

    #[test]
    fn test_collinear_sources_are_singular() {
        let correspondences: Vec<_> = (0..4)
            .map(|i| {
                let s = DVec2::new(i as f64, 0.0);
                Correspondence::new(s, DVec2::new(i as f64, (i * i) as f64))
            })
            .collect();
        assert!(matches!(
            estimate_homography(&correspondences),
            Err(HomographyError::SingularSystem(_))
        ));
    }

    #[test]
    fn test_first_nonzero_pivot_agrees() {
        // Exact zeros in the unit square keep the unpivoted solve stable.
        let truth = perspective();
        let correspondences = correspondences_for(&truth, &unit_square());
        let estimator = HomographyEstimator::new(EstimatorConfig {
            pivot: PivotStrategy::FirstNonZero,
            ..Default::default()
        });
        let h = estimator.estimate(&correspondences).unwrap();
        assert_matrix_close(&h, &truth, 1e-6);
    }

    #[test]
    fn test_inverse_round_trip() {
        let h = perspective();
        let inv = h.inverse().unwrap();
        assert!((inv.matrix[2][2] - 1.0).abs() < 1e-12);

        let p = DVec2::new(0.3, 0.7);
        let back = inv.transform_point(h.transform_point(p).unwrap()).unwrap();
        assert!(back.distance(p) < 1e-9);
    }

    #[test]
    fn test_matrix_invert() {
        let h = Homography {
            matrix: [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 1.0]],
        };
        let inv = h.inverse().unwrap();
        assert!((inv.matrix[0][0] - 0.5).abs() < 1e-9);
        assert!((inv.matrix[1][1] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_at_infinity() {
        let h = Homography {
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 1.0]],
        };
        assert!(h.transform_point(DVec2::new(-1.0, 0.5)).is_none());
    }

    #[test]
    fn test_to_mat4_layout() {
        let h = perspective();
        let m = h.to_mat4();
        let v = m * glam::Vec4::new(0.5, 0.25, 7.0, 1.0);

        let expected = h.transform_point(DVec2::new(0.5, 0.25)).unwrap();
        assert!(((v.x / v.w) as f64 - expected.x).abs() < 1e-5);
        assert!(((v.y / v.w) as f64 - expected.y).abs() < 1e-5);
        assert!((v.z - 7.0).abs() < 1e-6);
    }
}
