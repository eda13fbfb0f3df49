//! Ear-clipping triangulation of simple planar polygons.
//!
//! Works on an index ring over the input vertices. Each pass clips the
//! first ring position whose vertex is convex and whose ear triangle holds
//! no other ring vertex. Winding order does not matter: convexity is
//! decided by line-crossing parity, not by the sign of a turn.

use glam::DVec3;

use crate::config::TriangulatorConfig;
use crate::error::TriangulationError;
use crate::matrix::Matrix;

/// Indices of one output triangle into the input vertex list.
pub type Triangle = [usize; 3];

/// Ear-clipping triangulator.
#[derive(Debug, Clone, Default)]
pub struct Triangulator {
    pub config: TriangulatorConfig,
}

impl Triangulator {
    pub fn new(config: TriangulatorConfig) -> Self {
        Self { config }
    }

    /// Triangulate a simple polygon given by its ordered, coplanar vertices.
    ///
    /// Returns `n - 2` triangles for `n >= 3` vertices and nothing for
    /// fewer. Fails if a full pass over the remaining ring finds no ear,
    /// which only happens for self-intersecting or degenerate input.
    pub fn triangulate(&self, vertices: &[DVec3]) -> Result<Vec<Triangle>, TriangulationError> {
        let n = vertices.len();
        if n < 3 {
            return Ok(Vec::new());
        }

        log::debug!("Triangulating polygon with {} vertices", n);

        let mut ring: Vec<usize> = (0..n).collect();
        let mut triangles = Vec::with_capacity(n - 2);

        while ring.len() > 3 {
            let count = ring.len();
            let ear = (0..count)
                .find(|&i| self.is_ear(vertices, &ring, i))
                .ok_or(TriangulationError::TriangulationFailed { remaining: count })?;

            let triangle = [ring[(ear + count - 1) % count], ring[ear], ring[(ear + 1) % count]];
            log::trace!("Clipped ear {:?}", triangle);
            triangles.push(triangle);
            ring.remove(ear);
        }

        triangles.push([ring[0], ring[1], ring[2]]);
        Ok(triangles)
    }

    fn is_ear(&self, vertices: &[DVec3], ring: &[usize], i: usize) -> bool {
        self.is_convex(vertices, ring, i) && !self.ear_contains_vertex(vertices, ring, i)
    }

    /// Parity test on the line through vertex `i` and the midpoint of its
    /// neighbours. The vertex is convex when the line enters the interior
    /// there, i.e. the crossings behind the vertex (itself included) and
    /// the crossings ahead of it are both odd.
    ///
    /// Every vertex is assigned a side of the line, with vertices on the
    /// line counted as positive, and an edge crosses when its endpoints
    /// disagree. A line through a vertex or along an edge therefore still
    /// counts each boundary crossing exactly once.
    fn is_convex(&self, vertices: &[DVec3], ring: &[usize], i: usize) -> bool {
        let count = ring.len();
        let o = vertices[ring[i]];
        let oa = vertices[ring[(i + count - 1) % count]] - o;
        let ob = vertices[ring[(i + 1) % count]] - o;
        let oc = (oa + ob) * 0.5;

        // Collinear or coincident neighbours: no interior angle to test.
        let normal = oa.cross(ob);
        if is_negligible(normal, oa, ob, self.config.epsilon) {
            return false;
        }
        let side = |p: DVec3| oc.cross(p - o).dot(normal);

        let mut behind = 0;
        let mut ahead = 0;

        for j in 0..count {
            let k = (j + 1) % count;
            let start = vertices[ring[j]];
            let end = vertices[ring[k]];
            let (ds, de) = (side(start), side(end));
            if (ds >= 0.0) == (de >= 0.0) {
                continue;
            }

            // Edges at the vertex cross the line at the vertex itself.
            let t = if j == i || k == i {
                0.0
            } else {
                let hit = start + (end - start) * (ds / (ds - de));
                (hit - o).dot(oc) / oc.length_squared()
            };

            if t <= 0.0 {
                behind += 1;
            } else {
                ahead += 1;
            }
        }

        behind % 2 == 1 && ahead % 2 == 1
    }

    /// Whether any ring vertex other than the ear's own three lies inside or
    /// on the ear triangle. Boundary hits count, so a clipped diagonal never
    /// runs through another vertex.
    fn ear_contains_vertex(&self, vertices: &[DVec3], ring: &[usize], i: usize) -> bool {
        let eps = self.config.epsilon;
        let count = ring.len();
        let prev = (i + count - 1) % count;
        let next = (i + 1) % count;

        let o = vertices[ring[i]];
        let oa = vertices[ring[prev]] - o;
        let ob = vertices[ring[next]] - o;
        let normal = oa.cross(ob);

        // Zero-area ear. Barycentric coordinates solve against the basis
        // (oa, ob, normal), which is singular when the ear is flat.
        if is_negligible(normal, oa, ob, eps) {
            return true;
        }
        let Ok(inverse) = basis(oa, ob, normal).invert_with(self.config.pivot) else {
            return true;
        };

        (0..count)
            .filter(|&j| j != prev && j != i && j != next)
            .any(|j| {
                let op = vertices[ring[j]] - o;
                let Some(x) = apply(&inverse, op) else {
                    return false;
                };
                let (s, t) = (x.x, x.y);
                s >= -eps && t >= -eps && s + t <= 1.0 + eps
            })
    }
}

/// Triangulate with the default configuration.
pub fn triangulate(vertices: &[DVec3]) -> Result<Vec<Triangle>, TriangulationError> {
    Triangulator::default().triangulate(vertices)
}

/// Flatten triangles into a `u32` index buffer.
pub fn flatten_indices(triangles: &[Triangle]) -> Vec<u32> {
    triangles
        .iter()
        .flat_map(|t| t.iter().map(|&i| i as u32))
        .collect()
}

/// Whether `cross = a x b` is within rounding of zero, i.e. the sine of
/// the angle between `a` and `b` is at most `eps`.
fn is_negligible(cross: DVec3, a: DVec3, b: DVec3, eps: f64) -> bool {
    cross.length() <= eps * a.length() * b.length()
}

/// 3x3 matrix with the given vectors as columns.
fn basis(c0: DVec3, c1: DVec3, c2: DVec3) -> Matrix {
    Matrix::from_rows(&[[c0.x, c1.x, c2.x], [c0.y, c1.y, c2.y], [c0.z, c1.z, c2.z]])
}

fn apply(m: &Matrix, v: DVec3) -> Option<DVec3> {
    let x = m.multiply(&Matrix::column(&[v.x, v.y, v.z])).ok()?;
    Some(DVec3::new(x[(0, 0)], x[(1, 0)], x[(2, 0)]))
}
