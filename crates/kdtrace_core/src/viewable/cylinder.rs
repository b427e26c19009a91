//! Capped right circular cylinder.

use std::f64::consts::PI;

use kdtrace_math::{solve_quadratic, Aabb, Vec3};

use super::Viewable;
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Surface {
    Side,
    TopCap,
    BottomCap,
}

/// Solid cylinder of `radius` around `axis`, centered on `center` and
/// `height` long, closed by two flat caps.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Vec3,
    axis: Vec3,
    radius: f64,
    half_height: f64,
    // Perpendicular basis measuring the angle for texture coordinates
    seam: Vec3,
    across: Vec3,
    material: MaterialId,
}

impl Cylinder {
    pub fn new(center: Vec3, axis: Vec3, radius: f64, height: f64, material: MaterialId) -> SceneResult<Self> {
        if !(radius > 0.0 && height > 0.0) {
            return Err(SceneError::DegenerateGeometry(format!(
                "cylinder radius {radius} and height {height} must be positive"
            )));
        }
        let axis = axis
            .try_normalize()
            .ok_or_else(|| SceneError::DegenerateGeometry("cylinder axis has zero length".into()))?;
        let (seam, across) = axis.any_orthonormal_pair();
        Ok(Self {
            center,
            axis,
            radius,
            half_height: 0.5 * height,
            seam,
            across,
            material,
        })
    }

    /// Parameter range where the ray is inside the infinite tube.
    fn side_range(&self, rel: Vec3, direction: Vec3) -> Option<(f64, f64)> {
        let o = rel - self.axis * rel.dot(self.axis);
        let d = direction - self.axis * direction.dot(self.axis);
        let a = d.length_squared();
        let c = o.length_squared() - self.radius * self.radius;
        if a == 0.0 {
            // Parallel to the axis
            return (c <= 0.0).then_some((f64::NEG_INFINITY, f64::INFINITY));
        }
        solve_quadratic(a, 2.0 * o.dot(d), c)
    }

    /// Parameter range where the ray is between the cap planes, with the
    /// cap crossed at each end.
    fn cap_range(&self, rel: Vec3, direction: Vec3) -> Option<((f64, Surface), (f64, Surface))> {
        let h = rel.dot(self.axis);
        let dh = direction.dot(self.axis);
        if dh == 0.0 {
            if h.abs() > self.half_height {
                return None;
            }
            return Some((
                (f64::NEG_INFINITY, Surface::Side),
                (f64::INFINITY, Surface::Side),
            ));
        }
        let t_bottom = (-self.half_height - h) / dh;
        let t_top = (self.half_height - h) / dh;
        Some(if dh > 0.0 {
            ((t_bottom, Surface::BottomCap), (t_top, Surface::TopCap))
        } else {
            ((t_top, Surface::TopCap), (t_bottom, Surface::BottomCap))
        })
    }

    fn normal_at(&self, position: Vec3, surface: Surface) -> Vec3 {
        match surface {
            Surface::TopCap => self.axis,
            Surface::BottomCap => -self.axis,
            Surface::Side => {
                let rel = position - self.center;
                (rel - self.axis * rel.dot(self.axis)).normalize()
            }
        }
    }
}

impl Viewable for Cylinder {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        let rel = origin - self.center;
        let (side_in, side_out) = self.side_range(rel, direction)?;
        let ((cap_in, cap_in_surface), (cap_out, cap_out_surface)) = self.cap_range(rel, direction)?;

        let (t_enter, enter_surface) = if side_in > cap_in {
            (side_in, Surface::Side)
        } else {
            (cap_in, cap_in_surface)
        };
        let (t_exit, exit_surface) = if side_out < cap_out {
            (side_out, Surface::Side)
        } else {
            (cap_out, cap_out_surface)
        };
        if t_enter > t_exit {
            return None;
        }

        let (t, surface) = if t_enter > 0.0 && t_enter < max_distance {
            (t_enter, enter_surface)
        } else if t_exit > 0.0 && t_exit < max_distance {
            (t_exit, exit_surface)
        } else {
            return None;
        };

        let position = origin + direction * t;
        let normal = self.normal_at(position, surface);
        let mut point = VisiblePoint::new(position, normal, self.material, direction);
        if surface == Surface::Side {
            let local = position - self.center;
            let angle = local.dot(self.across).atan2(local.dot(self.seam));
            let u = (angle + PI) / (2.0 * PI);
            let v = (local.dot(self.axis) + self.half_height) / (2.0 * self.half_height);
            point = point.with_uv(u, v);
        }
        Some((t, point))
    }

    fn aabb(&self) -> Aabb {
        // Each cap is a disk; its extent along world axis i is r * sin(angle to i)
        let disk = (Vec3::ONE - self.axis * self.axis).max(Vec3::ZERO);
        let half = self.axis.abs() * self.half_height
            + Vec3::new(disk.x.sqrt(), disk.y.sqrt(), disk.z.sqrt()) * self.radius;
        Aabb::from_min_max(self.center - half, self.center + half)
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}
