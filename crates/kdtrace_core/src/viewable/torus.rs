//! Torus around an axis through its center.

use std::f64::consts::PI;

use kdtrace_math::{solve_quartic, Aabb, Vec3};

use super::Viewable;
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// Tube of radius `minor` swept around a circle of radius `major`.
#[derive(Debug, Clone)]
pub struct Torus {
    center: Vec3,
    axis: Vec3,
    major: f64,
    minor: f64,
    seam: Vec3,
    across: Vec3,
    material: MaterialId,
}

impl Torus {
    pub fn new(center: Vec3, axis: Vec3, major: f64, minor: f64, material: MaterialId) -> SceneResult<Self> {
        if !(minor > 0.0 && minor < major) {
            return Err(SceneError::DegenerateGeometry(format!(
                "torus radii {major} and {minor} must satisfy 0 < minor < major"
            )));
        }
        let axis = axis
            .try_normalize()
            .ok_or_else(|| SceneError::DegenerateGeometry("torus axis has zero length".into()))?;
        let (seam, across) = axis.any_orthonormal_pair();
        Ok(Self {
            center,
            axis,
            major,
            minor,
            seam,
            across,
            material,
        })
    }

    /// Coefficients of the monic quartic in `t` whose roots are the
    /// crossings of `rel + t * direction` with the surface.
    fn quartic(&self, rel: Vec3, direction: Vec3) -> [f64; 4] {
        let r2 = self.major * self.major;
        let e = rel.dot(direction);
        let g = rel.length_squared() + r2 - self.minor * self.minor;
        let pa = rel.dot(self.axis);
        let da = direction.dot(self.axis);
        [
            4.0 * e,
            4.0 * e * e + 2.0 * g - 4.0 * r2 * (1.0 - da * da),
            4.0 * e * g - 8.0 * r2 * (e - pa * da),
            g * g - 4.0 * r2 * (rel.length_squared() - pa * pa),
        ]
    }
}

impl Viewable for Torus {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        // Solve from where the ray enters the bounding box; a nearby origin
        // keeps the quartic well conditioned
        let (t_start, _) = self.aabb().ray_range(origin, direction, max_distance)?;
        let rel = origin + direction * t_start - self.center;
        let [a, b, c, d] = self.quartic(rel, direction);

        let t = solve_quartic(a, b, c, d)
            .into_iter()
            .map(|s| s + t_start)
            .find(|t| *t > 0.0 && *t < max_distance)?;

        let position = origin + direction * t;
        let local = position - self.center;
        let height = local.dot(self.axis);
        let radial = local - self.axis * height;
        let ring = radial.try_normalize()?;
        let normal = (local - ring * self.major).try_normalize()?;

        let around = local.dot(self.across).atan2(local.dot(self.seam));
        let tube = height.atan2(radial.length() - self.major);
        let point = VisiblePoint::new(position, normal, self.material, direction)
            .with_uv((around + PI) / (2.0 * PI), (tube + PI) / (2.0 * PI));
        Some((t, point))
    }

    fn aabb(&self) -> Aabb {
        let disk = (Vec3::ONE - self.axis * self.axis).max(Vec3::ZERO);
        let half = self.axis.abs() * self.minor
            + Vec3::new(disk.x.sqrt(), disk.y.sqrt(), disk.z.sqrt()) * (self.major + self.minor);
        Aabb::from_min_max(self.center - half, self.center + half)
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ring of radius 2 in the xz plane, tube radius 0.5.
    fn flat() -> Torus {
        Torus::new(Vec3::ZERO, Vec3::Y, 2.0, 0.5, MaterialId(0)).unwrap()
    }

    #[test]
    fn test_outer_and_inner_wall() {
        let torus = flat();
        let (t, hit) = torus
            .find_intersection(Vec3::new(5.0, 0.0, 0.0), -Vec3::X, f64::INFINITY)
            .unwrap();
        assert!((t - 2.5).abs() < 1e-9);
        assert!((hit.normal - Vec3::X).length() < 1e-9);
        assert!(hit.front_facing);

        // From the middle of the hole onto the inner wall
        let (t, hit) = torus
            .find_intersection(Vec3::ZERO, Vec3::X, f64::INFINITY)
            .unwrap();
        assert!((t - 1.5).abs() < 1e-9);
        assert!((hit.normal + Vec3::X).length() < 1e-9);
        assert!(hit.front_facing);
    }

    #[test]
    fn test_top_hit_and_hole() {
        let torus = flat();
        let (t, hit) = torus
            .find_intersection(Vec3::new(0.0, 5.0, 2.0), -Vec3::Y, f64::INFINITY)
            .unwrap();
        assert!((t - 4.5).abs() < 1e-9);
        assert!((hit.normal - Vec3::Y).length() < 1e-9);

        assert!(torus
            .find_intersection(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, f64::INFINITY)
            .is_none());
        assert!(torus
            .find_intersection(Vec3::new(5.0, 0.0, 0.0), -Vec3::X, 2.0)
            .is_none());
    }

    #[test]
    fn test_from_inside_tube() {
        let (t, hit) = flat()
            .find_intersection(Vec3::new(2.0, 0.0, 0.0), Vec3::Y, f64::INFINITY)
            .unwrap();
        assert!((t - 0.5).abs() < 1e-9);
        assert!(!hit.front_facing);
    }

    #[test]
    fn test_bounding_box() {
        let bounds = flat().aabb();
        assert_eq!(bounds.min(), Vec3::new(-2.5, -0.5, -2.5));
        assert_eq!(bounds.max(), Vec3::new(2.5, 0.5, 2.5));
    }

    #[test]
    fn test_fat_tube_is_rejected() {
        let err = Torus::new(Vec3::ZERO, Vec3::Y, 1.0, 1.5, MaterialId(0));
        assert!(matches!(err, Err(SceneError::DegenerateGeometry(_))));
    }
}
