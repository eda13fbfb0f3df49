//! Warp fragments.
//!
//! A fragment is a polygonal patch of the output surface. Each point pairs
//! the texture position it samples (`uv`) with where it is displayed
//! (`vertex`), both in `[-1, 1]` clip coordinates. Anchors take part in the
//! homography fit without adding polygon corners.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{FragmentError, HomographyError, TriangulationError};
use crate::homography::{Correspondence, Homography, HomographyEstimator};
use crate::polygon::regular_polygon;
use crate::triangulate::{flatten_indices, Triangulator};

/// A texture position and the display position it is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentPoint {
    pub uv: DVec2,
    pub vertex: DVec2,
}

impl FragmentPoint {
    /// Unwarped point: displayed where it samples.
    pub fn new(position: DVec2) -> Self {
        Self {
            uv: position,
            vertex: position,
        }
    }

    pub fn with_uv(uv: DVec2, vertex: DVec2) -> Self {
        Self { uv, vertex }
    }
}

/// Polygon outline plus extra anchor constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Polygon corners, in order.
    pub vertices: Vec<FragmentPoint>,
    /// Interior constraints for the homography.
    #[serde(default)]
    pub anchors: Vec<FragmentPoint>,
}

/// Renderable mesh for a fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentMesh {
    pub positions: Vec<DVec3>,
    pub uvs: Vec<DVec2>,
    pub indices: Vec<u32>,
}

/// Everything a renderer needs for one fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentOutput {
    pub mesh: FragmentMesh,
    pub homography: Homography,
}

/// Map `[-1, 1]` clip coordinates to `[0, 1]` texture space.
fn to_unit(p: DVec2) -> DVec2 {
    (p + DVec2::ONE) * 0.5
}

impl Fragment {
    pub fn new(vertices: Vec<FragmentPoint>) -> Self {
        Self {
            vertices,
            anchors: Vec::new(),
        }
    }

    /// Unwarped regular `n`-gon filling the clip square.
    pub fn regular(n: usize) -> Self {
        Self::new(regular_polygon(n).into_iter().map(FragmentPoint::new).collect())
    }

    /// Triangulated mesh of the displayed outline.
    pub fn mesh(&self, triangulator: &Triangulator) -> Result<FragmentMesh, TriangulationError> {
        let positions: Vec<DVec3> = self.vertices.iter().map(|p| p.vertex.extend(0.0)).collect();
        let triangles = triangulator.triangulate(&positions)?;

        Ok(FragmentMesh {
            uvs: self.vertices.iter().map(|p| to_unit(p.vertex)).collect(),
            positions,
            indices: flatten_indices(&triangles),
        })
    }

    /// Correspondences from display space back to texture space, vertices
    /// first, then anchors.
    pub fn correspondences(&self) -> Vec<Correspondence> {
        self.vertices
            .iter()
            .chain(&self.anchors)
            .map(|p| Correspondence::new(to_unit(p.vertex), to_unit(p.uv)))
            .collect()
    }

    /// Homography a fragment shader applies to find its texture lookup.
    pub fn homography(&self, estimator: &HomographyEstimator) -> Result<Homography, HomographyError> {
        estimator.estimate(&self.correspondences())
    }

    /// Rebuild mesh and homography together; fails without partial output.
    pub fn refresh(
        &self,
        triangulator: &Triangulator,
        estimator: &HomographyEstimator,
    ) -> Result<FragmentOutput, FragmentError> {
        let mesh = self.mesh(triangulator)?;
        let homography = self.homography(estimator).map_err(|e| {
            log::warn!("Fragment homography failed: {}", e);
            e
        })?;
        Ok(FragmentOutput { mesh, homography })
    }
}
