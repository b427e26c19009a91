//! Ellipsoid with arbitrary orientation.

use kdtrace_math::{solve_quadratic, Aabb, Vec3};

use super::{ellipsoidal_half_extent, first_root_in_range, Viewable};
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// Ellipsoid given by its center, two principal axis directions and the
/// three semi-axis lengths. The third axis is `axis_a × axis_b`.
#[derive(Debug, Clone)]
pub struct Ellipsoid {
    center: Vec3,
    axes: [Vec3; 3],
    radii: Vec3,
    material: MaterialId,
}

impl Ellipsoid {
    pub fn new(center: Vec3, axis_a: Vec3, axis_b: Vec3, radii: Vec3, material: MaterialId) -> SceneResult<Self> {
        if !(radii.min_element() > 0.0) {
            return Err(SceneError::DegenerateGeometry(format!(
                "ellipsoid radii must be positive, got {radii}"
            )));
        }
        let a = axis_a
            .try_normalize()
            .ok_or_else(|| SceneError::DegenerateGeometry("ellipsoid axis has zero length".into()))?;
        // Make the second axis orthogonal to the first
        let b = (axis_b - a * axis_b.dot(a))
            .try_normalize()
            .ok_or_else(|| SceneError::DegenerateGeometry("ellipsoid axes are parallel".into()))?;
        Ok(Self {
            center,
            axes: [a, b, a.cross(b)],
            radii,
            material,
        })
    }

    /// Coordinates of `v` in the frame where the ellipsoid is a unit sphere.
    fn to_unit(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            v.dot(self.axes[0]) / self.radii.x,
            v.dot(self.axes[1]) / self.radii.y,
            v.dot(self.axes[2]) / self.radii.z,
        )
    }
}

impl Viewable for Ellipsoid {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        let o = self.to_unit(origin - self.center);
        let d = self.to_unit(direction);
        let roots = solve_quadratic(d.length_squared(), 2.0 * o.dot(d), o.length_squared() - 1.0)?;
        let t = first_root_in_range(roots, max_distance)?;

        // Gradient of the implicit function, back in world space
        let p = o + d * t;
        let normal = (self.axes[0] * (p.x / self.radii.x)
            + self.axes[1] * (p.y / self.radii.y)
            + self.axes[2] * (p.z / self.radii.z))
            .normalize();

        let position = origin + direction * t;
        Some((t, VisiblePoint::new(position, normal, self.material, direction)))
    }

    fn aabb(&self) -> Aabb {
        let half = ellipsoidal_half_extent([
            self.axes[0] * self.radii.x,
            self.axes[1] * self.radii.y,
            self.axes[2] * self.radii.z,
        ]);
        Aabb::from_min_max(self.center - half, self.center + half)
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}
