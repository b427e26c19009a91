//! Flat parallelogram.

use kdtrace_math::{clip_polygon_to_box, Aabb, Vec3};

use super::Viewable;
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// Parallelogram with consecutive corners `v0, v1, v2`; the fourth corner
/// is `v0 + v2 - v1`.
///
/// Texture coordinates run from `v1` (u = 0, v = 0) along `v1 -> v2` (u)
/// and `v1 -> v0` (v).
#[derive(Debug, Clone)]
pub struct Parallelogram {
    corner: Vec3,
    edge_u: Vec3,
    edge_v: Vec3,
    normal: Vec3,
    // Dual basis of (edge_u, edge_v) in the plane
    dual_u: Vec3,
    dual_v: Vec3,
    material: MaterialId,
}

impl Parallelogram {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> SceneResult<Self> {
        let edge_u = v2 - v1;
        let edge_v = v0 - v1;
        let normal = edge_u.cross(edge_v).try_normalize().ok_or_else(|| {
            SceneError::DegenerateGeometry(format!("parallelogram {v0}, {v1}, {v2} has no area"))
        })?;

        let uu = edge_u.dot(edge_u);
        let uv = edge_u.dot(edge_v);
        let vv = edge_v.dot(edge_v);
        let det = uu * vv - uv * uv;
        Ok(Self {
            corner: v1,
            edge_u,
            edge_v,
            normal,
            dual_u: (edge_u * vv - edge_v * uv) / det,
            dual_v: (edge_v * uu - edge_u * uv) / det,
            material,
        })
    }

    /// The four corners in order.
    pub fn corners(&self) -> [Vec3; 4] {
        [
            self.corner + self.edge_v,
            self.corner,
            self.corner + self.edge_u,
            self.corner + self.edge_u + self.edge_v,
        ]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Viewable for Parallelogram {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        let denom = direction.dot(self.normal);
        if denom == 0.0 {
            return None;
        }
        let t = (self.corner - origin).dot(self.normal) / denom;
        if !(t > 0.0 && t < max_distance) {
            return None;
        }

        let position = origin + direction * t;
        let rel = position - self.corner;
        let u = rel.dot(self.dual_u);
        let v = rel.dot(self.dual_v);
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }

        let point = VisiblePoint::new(position, self.normal, self.material, direction).with_uv(u, v);
        Some((t, point))
    }

    fn aabb(&self) -> Aabb {
        Aabb::from_point_cloud(self.corners())
    }

    fn extent_in_box(&self, bounds: &Aabb) -> Option<Aabb> {
        clip_polygon_to_box(&self.corners(), bounds)
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Floor square [-2, 2] x [-2, 2] at y = 0 facing up.
    fn floor() -> Parallelogram {
        Parallelogram::new(
            Vec3::new(-2.0, 0.0, -2.0),
            Vec3::new(-2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 2.0),
            MaterialId(0),
        )
        .unwrap()
    }

    #[test]
    fn test_fourth_corner_and_normal() {
        let floor = floor();
        assert_eq!(floor.corners()[3], Vec3::new(2.0, 0.0, -2.0));
        assert!((floor.normal() - Vec3::Y).length() < 1e-12);
        assert_eq!(floor.aabb().min(), Vec3::new(-2.0, 0.0, -2.0));
    }

    #[test]
    fn test_hit_and_uv() {
        let (t, hit) = floor()
            .find_intersection(Vec3::new(1.0, 3.0, 0.0), -Vec3::Y, f64::INFINITY)
            .unwrap();
        assert!((t - 3.0).abs() < 1e-12);
        let uv = hit.uv.unwrap();
        assert!((uv.x - 0.75).abs() < 1e-12);
        assert!((uv.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_misses() {
        let floor = floor();
        assert!(floor
            .find_intersection(Vec3::new(3.0, 3.0, 0.0), -Vec3::Y, f64::INFINITY)
            .is_none());
        assert!(floor
            .find_intersection(Vec3::new(0.0, 3.0, 0.0), Vec3::X, f64::INFINITY)
            .is_none());
    }

    #[test]
    fn test_skewed_extent_in_box() {
        // Tilted square whose bounding box is much larger than its slice
        let quad = Parallelogram::new(
            Vec3::new(0.0, 4.0, 4.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            MaterialId(0),
        )
        .unwrap();
        let cell = Aabb::from_min_max(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(5.0, 1.0, 5.0));
        let extent = quad.extent_in_box(&cell).unwrap();
        assert!((extent.max().z - 1.0).abs() < 1e-12);
        assert!((extent.max().y - 1.0).abs() < 1e-12);
    }
}
