//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use kdtrace_math::{clip_polygon_to_box, Aabb, Vec3};

use super::Viewable;
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// A single-sided-normal triangle. The outward normal follows the
/// counter-clockwise order `v0, v1, v2`.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [Vec3; 3],
    /// Pre-computed face normal (unit length)
    normal: Vec3,
    material: MaterialId,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> SceneResult<Self> {
        let normal = (v1 - v0).cross(v2 - v0).try_normalize().ok_or_else(|| {
            SceneError::DegenerateGeometry(format!("triangle {v0}, {v1}, {v2} has no area"))
        })?;
        Ok(Self {
            vertices: [v0, v1, v2],
            normal,
            material,
        })
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Viewable for Triangle {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        let (t, u, v) = intersect_triangle(&self.vertices, origin, direction, max_distance)?;
        let position = origin + direction * t;
        let point = VisiblePoint::new(position, self.normal, self.material, direction).with_uv(u, v);
        Some((t, point))
    }

    fn aabb(&self) -> Aabb {
        Aabb::from_point_cloud(self.vertices)
    }

    fn extent_in_box(&self, bounds: &Aabb) -> Option<Aabb> {
        clip_polygon_to_box(&self.vertices, bounds)
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}

/// Möller-Trumbore test of the ray against triangle `v0, v1, v2`.
///
/// Returns the distance and the barycentric weights of `v1` and `v2`.
pub(crate) fn intersect_triangle(
    vertices: &[Vec3; 3],
    origin: Vec3,
    direction: Vec3,
    max_distance: f64,
) -> Option<(f64, f64, f64)> {
    let [v0, v1, v2] = *vertices;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < 1e-12 {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if !(t > 0.0 && t < max_distance) {
        return None;
    }
    Some((t, u, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Triangle {
        Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            MaterialId(1),
        )
        .unwrap()
    }

    #[test]
    fn test_hit_both_sides() {
        let tri = triangle();
        let (t, hit) = tri
            .find_intersection(Vec3::new(0.25, 0.25, 2.0), -Vec3::Z, f64::INFINITY)
            .unwrap();
        assert!((t - 2.0).abs() < 1e-12);
        assert_eq!(hit.normal, Vec3::Z);
        assert!(hit.front_facing);
        let uv = hit.uv.unwrap();
        assert!((uv.x - 0.25).abs() < 1e-12 && (uv.y - 0.25).abs() < 1e-12);

        let (_, back) = tri
            .find_intersection(Vec3::new(0.25, 0.25, -2.0), Vec3::Z, f64::INFINITY)
            .unwrap();
        assert!(!back.front_facing);
    }

    #[test]
    fn test_miss_outside_edges() {
        let tri = triangle();
        assert!(tri
            .find_intersection(Vec3::new(0.75, 0.75, 2.0), -Vec3::Z, f64::INFINITY)
            .is_none());
        // Parallel to the plane
        assert!(tri
            .find_intersection(Vec3::new(-1.0, 0.25, 0.0), Vec3::X, f64::INFINITY)
            .is_none());
        assert!(tri
            .find_intersection(Vec3::new(0.25, 0.25, 2.0), -Vec3::Z, 1.0)
            .is_none());
    }

    #[test]
    fn test_tight_extent_in_box() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 4.0),
            Vec3::new(0.0, 4.0, 4.0),
            MaterialId(0),
        )
        .unwrap();
        // The slab z in [0, 1] only contains the corner near the origin
        let slab = Aabb::from_min_max(Vec3::splat(-10.0), Vec3::new(10.0, 10.0, 1.0));
        let extent = tri.extent_in_box(&slab).unwrap();
        assert!((extent.max() - Vec3::new(1.0, 1.0, 1.0)).length() < 1e-12);
        assert!(extent.max().x < tri.aabb().max().x);

        let above = Aabb::from_min_max(Vec3::new(-10.0, -10.0, 5.0), Vec3::splat(10.0));
        assert!(tri.extent_in_box(&above).is_none());
    }

    #[test]
    fn test_collinear_is_rejected() {
        let err = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, MaterialId(0));
        assert!(matches!(err, Err(SceneError::DegenerateGeometry(_))));
    }
}
