use crate::Vec3;

/// A ray in 3D space with an origin and a unit direction.
///
/// Rays are ephemeral: one is built for every primary, secondary and shadow
/// ray and dropped once it has been traced.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. `direction` must already be normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        debug_assert!(
            direction.is_normalized(),
            "ray direction must be unit length, got {direction}"
        );
        Self { origin, direction }
    }

    /// Ray from `origin` through `target`.
    ///
    /// Returns the ray and the distance to `target`, or `None` when the two
    /// points coincide.
    pub fn towards(origin: Vec3, target: Vec3) -> Option<(Self, f64)> {
        let delta = target - origin;
        let dist = delta.length();
        if dist == 0.0 || !dist.is_finite() {
            return None;
        }
        Some((Self { origin, direction: delta / dist }, dist))
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same ray with its origin pushed forward by `epsilon`.
    #[inline]
    pub fn offset(&self, epsilon: f64) -> Self {
        Self {
            origin: self.at(epsilon),
            direction: self.direction,
        }
    }
}
