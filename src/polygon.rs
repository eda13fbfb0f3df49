//! Polygon helpers: regular polygon generation and area measures.

use std::f64::consts::PI;

use glam::{DVec2, DVec3};

/// Regular `n`-gon with a half-step angular offset, so a square comes out
/// axis-aligned rather than diamond-shaped.
pub fn regular_polygon(n: usize) -> Vec<DVec2> {
    if n == 0 {
        return Vec::new();
    }
    regular_polygon_with_offset(n, PI / n as f64)
}

/// Regular `n`-gon starting at angle `offset`, vertex `i` at
/// `(sin θ, -cos θ)` with `θ = 2πi/n + offset`.
///
/// The result is rescaled so its largest positive coordinate is 1.
pub fn regular_polygon_with_offset(n: usize, offset: f64) -> Vec<DVec2> {
    let vertices: Vec<DVec2> = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64 + offset;
            DVec2::new(angle.sin(), -angle.cos())
        })
        .collect();

    let max = vertices
        .iter()
        .map(|v| v.x.max(v.y))
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return vertices;
    }
    vertices.into_iter().map(|v| v / max).collect()
}

/// Place 2D points on the z = 0 plane.
pub fn lift(points: &[DVec2]) -> Vec<DVec3> {
    points.iter().map(|p| p.extend(0.0)).collect()
}

/// Shoelace area. Positive for counter-clockwise winding.
pub fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum();
    twice * 0.5
}

/// Area of the triangle `abc` in 3D.
pub fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    (b - a).cross(c - a).length() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_square_is_axis_aligned() {
        let square = regular_polygon(4);
        assert_eq!(square.len(), 4);
        for v in &square {
            assert!((v.x.abs() - 1.0).abs() < 1e-9);
            assert!((v.y.abs() - 1.0).abs() < 1e-9);
        }
        assert!((signed_area(&square).abs() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_regular_polygon_scaled_to_unit() {
        for n in 3..10 {
            let poly = regular_polygon(n);
            let max = poly.iter().map(|v| v.x.max(v.y)).fold(f64::MIN, f64::max);
            assert!((max - 1.0).abs() < 1e-9, "n = {}", n);
        }
        assert!(regular_polygon(0).is_empty());
    }

    #[test]
    fn test_signed_area_winding() {
        let ccw = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        assert!((signed_area(&ccw) - 2.0).abs() < 1e-12);

        let cw: Vec<DVec2> = ccw.iter().rev().copied().collect();
        assert!((signed_area(&cw) + 2.0).abs() < 1e-12);
        assert_eq!(signed_area(&ccw[..2]), 0.0);
    }

    #[test]
    fn test_triangle_area() {
        let area = triangle_area(
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(2.0, 0.0, 1.0),
            DVec3::new(0.0, 3.0, 1.0),
        );
        assert!((area - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_lift() {
        let lifted = lift(&[DVec2::new(1.0, 2.0)]);
        assert_eq!(lifted, vec![DVec3::new(1.0, 2.0, 0.0)]);
    }
}
