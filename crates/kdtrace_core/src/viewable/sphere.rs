//! Sphere primitive.

use std::f64::consts::PI;

use kdtrace_math::{solve_quadratic, Aabb, Vec3};

use super::{first_root_in_range, Viewable};
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// A sphere with an outward-facing surface.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
    material: MaterialId,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64, material: MaterialId) -> SceneResult<Self> {
        if !(radius > 0.0) {
            return Err(SceneError::DegenerateGeometry(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        Ok(Self {
            center,
            radius,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// UV coordinates for a unit vector from the center.
    ///
    /// `u` runs around the y axis starting at -z, `v` from the south pole
    /// (0) to the north pole (1).
    fn uv(n: Vec3) -> (f64, f64) {
        let u = (n.x.atan2(-n.z) + PI) / (2.0 * PI);
        let v = 1.0 - n.y.clamp(-1.0, 1.0).acos() / PI;
        (u, v)
    }
}

impl Viewable for Sphere {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        let oc = origin - self.center;
        let b = 2.0 * direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;
        let roots = solve_quadratic(direction.length_squared(), b, c)?;
        let t = first_root_in_range(roots, max_distance)?;

        let position = origin + direction * t;
        let normal = ((position - self.center) / self.radius).normalize();
        let (u, v) = Self::uv(normal);
        let point = VisiblePoint::new(position, normal, self.material, direction).with_uv(u, v);
        Some((t, point))
    }

    fn aabb(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::from_min_max(self.center - r, self.center + r)
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}
