//! Projection Mapping Warp Core
//!
//! Numerical core for warping projected content onto physical surfaces:
//! - Dense matrix engine with Gauss-Jordan and pseudo-inverse
//! - Homography estimation from point correspondences
//! - Ear-clipping triangulation of simple polygons
//! - Warp fragments combining both into renderable output

pub mod config;
pub mod error;
pub mod fragment;
pub mod homography;
pub mod matrix;
pub mod polygon;
pub mod triangulate;

pub use config::{EstimatorConfig, PivotStrategy, TriangulatorConfig};
pub use error::{FragmentError, HomographyError, MatrixError, TriangulationError};
pub use fragment::{Fragment, FragmentMesh, FragmentOutput, FragmentPoint};
pub use homography::{estimate_homography, Correspondence, Homography, HomographyEstimator};
pub use matrix::Matrix;
pub use triangulate::{triangulate, Triangle, Triangulator};
