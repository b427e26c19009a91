//! Surface record filled in by a viewable's intersection routine.

use kdtrace_math::{Vec2, Vec3};

use crate::MaterialId;

/// Surface data at a ray hit.
///
/// `normal` is the outward unit normal of the surface, regardless of which
/// side the ray came from; `front_facing` records the side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisiblePoint {
    /// Point of intersection
    pub position: Vec3,
    /// Outward surface normal (unit length)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: MaterialId,
    /// Texture coordinates, for primitives that define them
    pub uv: Option<Vec2>,
    /// Whether the ray hit the outside of the surface
    pub front_facing: bool,
}

impl VisiblePoint {
    /// Build a hit record for a ray travelling along `direction`.
    pub fn new(position: Vec3, outward_normal: Vec3, material: MaterialId, direction: Vec3) -> Self {
        Self {
            position,
            normal: outward_normal,
            material,
            uv: None,
            front_facing: direction.dot(outward_normal) < 0.0,
        }
    }

    pub fn with_uv(mut self, u: f64, v: f64) -> Self {
        self.uv = Some(Vec2::new(u, v));
        self
    }

    /// The normal flipped, if necessary, to lie on the same side as `toward`.
    pub fn normal_toward(&self, toward: Vec3) -> Vec3 {
        if self.normal.dot(toward) < 0.0 {
            -self.normal
        } else {
            self.normal
        }
    }
}
