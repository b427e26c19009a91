//! Right circular cone, optionally closed by a base disk.

use std::f64::consts::PI;

use kdtrace_math::{solve_quadratic, Aabb, Vec3};

use super::Viewable;
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// Cone with its tip at `apex`, opening along `axis` for `height`, with a
/// base of `radius`.
///
/// Without a base the cone is an open shell, like a lamp shade; its inside
/// can carry a separate material.
#[derive(Debug, Clone)]
pub struct Cone {
    apex: Vec3,
    axis: Vec3,
    height: f64,
    radius: f64,
    /// Squared ratio of radius to height
    slope2: f64,
    closed: bool,
    seam: Vec3,
    across: Vec3,
    material: MaterialId,
    inner_material: MaterialId,
}

impl Cone {
    pub fn new(apex: Vec3, axis: Vec3, height: f64, radius: f64, material: MaterialId) -> SceneResult<Self> {
        if !(radius > 0.0 && height > 0.0) {
            return Err(SceneError::DegenerateGeometry(format!(
                "cone radius {radius} and height {height} must be positive"
            )));
        }
        let axis = axis
            .try_normalize()
            .ok_or_else(|| SceneError::DegenerateGeometry("cone axis has zero length".into()))?;
        let (seam, across) = axis.any_orthonormal_pair();
        Ok(Self {
            apex,
            axis,
            height,
            radius,
            slope2: (radius / height).powi(2),
            closed: true,
            seam,
            across,
            material,
            inner_material: material,
        })
    }

    /// Leave the base open.
    pub fn without_base(mut self) -> Self {
        self.closed = false;
        self
    }

    /// Material seen from inside the cone.
    pub fn with_inner_material(mut self, material: MaterialId) -> Self {
        self.inner_material = material;
        self
    }

    /// Distances along the ray where it meets the slanted side between the
    /// apex and the base plane.
    fn side_hits(&self, rel: Vec3, direction: Vec3) -> impl Iterator<Item = f64> + '_ {
        let k = 1.0 + self.slope2;
        let ph = rel.dot(self.axis);
        let dh = direction.dot(self.axis);
        let a = 1.0 - k * dh * dh;
        let b = 2.0 * (rel.dot(direction) - k * ph * dh);
        let c = rel.length_squared() - k * ph * ph;

        let roots = if a.abs() < 1e-12 {
            // Parallel to the surface: a single crossing
            if b == 0.0 {
                [None, None]
            } else {
                [Some(-c / b), None]
            }
        } else {
            match solve_quadratic(a, b, c) {
                Some((t0, t1)) => [Some(t0), Some(t1)],
                None => [None, None],
            }
        };
        // Drop crossings with the mirrored cone beyond the apex
        roots
            .into_iter()
            .flatten()
            .filter(move |t| (0.0..=self.height).contains(&(ph + t * dh)))
    }

    fn base_hit(&self, rel: Vec3, direction: Vec3) -> Option<f64> {
        let dh = direction.dot(self.axis);
        if !self.closed || dh == 0.0 {
            return None;
        }
        let t = (self.height - rel.dot(self.axis)) / dh;
        let on_plane = rel + direction * t - self.axis * self.height;
        (on_plane.length_squared() <= self.radius * self.radius).then_some(t)
    }
}

impl Viewable for Cone {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        let rel = origin - self.apex;
        let in_range = |t: &f64| *t > 0.0 && *t < max_distance;

        let side = self.side_hits(rel, direction).filter(in_range).min_by(f64::total_cmp);
        let base = self.base_hit(rel, direction).filter(in_range);
        let (t, on_side) = match (side, base) {
            (Some(s), Some(b)) if b < s => (b, false),
            (Some(s), _) => (s, true),
            (None, Some(b)) => (b, false),
            (None, None) => return None,
        };

        let position = origin + direction * t;
        let local = position - self.apex;
        let h = local.dot(self.axis);
        let normal = if on_side {
            let radial = local - self.axis * h;
            (radial - self.axis * (self.slope2 * h))
                .try_normalize()
                .unwrap_or(-self.axis)
        } else {
            self.axis
        };

        let mut point = VisiblePoint::new(position, normal, self.material, direction);
        if !point.front_facing {
            point.material = self.inner_material;
        }
        if on_side {
            let angle = local.dot(self.across).atan2(local.dot(self.seam));
            point = point.with_uv((angle + PI) / (2.0 * PI), h / self.height);
        }
        Some((t, point))
    }

    fn aabb(&self) -> Aabb {
        let base = self.apex + self.axis * self.height;
        let disk = (Vec3::ONE - self.axis * self.axis).max(Vec3::ZERO);
        let half = Vec3::new(disk.x.sqrt(), disk.y.sqrt(), disk.z.sqrt()) * self.radius;
        Aabb::from_point_cloud([self.apex, base - half, base + half])
    }

    fn material(&self) -> MaterialId {
        self.material
    }

    fn inner_material(&self) -> MaterialId {
        self.inner_material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tip at y = 2, base of radius 1 on the plane y = 0.
    fn upright() -> Cone {
        Cone::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 2.0, 1.0, MaterialId(0)).unwrap()
    }

    #[test]
    fn test_side_hit() {
        let (t, hit) = upright()
            .find_intersection(Vec3::new(5.0, 1.0, 0.0), -Vec3::X, f64::INFINITY)
            .unwrap();
        // Halfway up the radius is 0.5
        assert!((t - 4.5).abs() < 1e-12);
        assert!((hit.normal - Vec3::new(2.0, 1.0, 0.0).normalize()).length() < 1e-12);
        assert!(hit.front_facing);
        assert!((hit.uv.unwrap().y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_base_and_open_base() {
        let cone = upright().with_inner_material(MaterialId(1));
        let origin = Vec3::new(0.2, -5.0, 0.0);

        let (t, hit) = cone.find_intersection(origin, Vec3::Y, f64::INFINITY).unwrap();
        assert!((t - 5.0).abs() < 1e-12);
        assert_eq!(hit.normal, -Vec3::Y);
        assert_eq!(hit.material, MaterialId(0));

        // Through the open base onto the inside wall, where the radius is 0.2
        let (t, hit) = cone
            .without_base()
            .find_intersection(origin, Vec3::Y, f64::INFINITY)
            .unwrap();
        assert!((t - 6.6).abs() < 1e-9);
        assert!(!hit.front_facing);
        assert_eq!(hit.material, MaterialId(1));
    }

    #[test]
    fn test_misses_mirrored_cone() {
        let cone = upright();
        // Above the apex the double cone would be hit
        assert!(cone
            .find_intersection(Vec3::new(5.0, 3.0, 0.0), -Vec3::X, f64::INFINITY)
            .is_none());
        assert!(cone
            .find_intersection(Vec3::new(5.0, 1.0, 0.0), -Vec3::X, 4.0)
            .is_none());
    }

    #[test]
    fn test_bounding_box() {
        let bounds = upright().aabb();
        assert_eq!(bounds.min(), Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(bounds.max(), Vec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_flat_cone_is_rejected() {
        let err = Cone::new(Vec3::ZERO, Vec3::Y, 0.0, 1.0, MaterialId(0));
        assert!(matches!(err, Err(SceneError::DegenerateGeometry(_))));
    }
}
