//! Geometric objects a ray can hit.
//!
//! Every viewable answers three questions for the ray tracer and the kd-tree:
//! where a ray first hits it, how far it extends, and how far it extends
//! inside a given box.

use std::fmt;

use kdtrace_math::{Aabb, Vec3};

use crate::{MaterialId, VisiblePoint};

mod bezier_set;
mod cone;
mod cylinder;
mod ellipsoid;
mod parallelepiped;
mod parallelogram;
mod sphere;
mod torus;
mod triangle;

pub use bezier_set::{BezierSet, DEFAULT_BEZIER_SUBDIVISIONS};
pub use cone::Cone;
pub use cylinder::Cylinder;
pub use ellipsoid::Ellipsoid;
pub use parallelepiped::Parallelepiped;
pub use parallelogram::Parallelogram;
pub use sphere::Sphere;
pub use torus::Torus;
pub use triangle::Triangle;

/// An object in the scene.
pub trait Viewable: Send + Sync + fmt::Debug {
    /// First intersection of the ray `origin + t * direction` with
    /// `0 < t < max_distance`. `direction` is unit length.
    ///
    /// Returns the distance and the surface data at the hit.
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)>;

    /// Bounding box of the whole object.
    fn aabb(&self) -> Aabb;

    /// Bounding box of the part of the object inside `bounds`, or `None` if
    /// the object does not reach into `bounds`.
    ///
    /// The default clips the object's bounding box. Objects whose bounding
    /// box is loose (e.g. tilted planar shapes) should return something
    /// tighter.
    fn extent_in_box(&self, bounds: &Aabb) -> Option<Aabb> {
        let clipped = self.aabb().intersection(bounds);
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Material of the object's surface.
    fn material(&self) -> MaterialId;

    /// Material of the back of the surface, where it differs.
    fn inner_material(&self) -> MaterialId {
        self.material()
    }
}

/// Smallest of the two sorted roots lying in `(0, max_distance)`.
pub(crate) fn first_root_in_range(roots: (f64, f64), max_distance: f64) -> Option<f64> {
    let (t0, t1) = roots;
    if t0 > 0.0 && t0 < max_distance {
        Some(t0)
    } else if t1 > 0.0 && t1 < max_distance {
        Some(t1)
    } else {
        None
    }
}

/// Half-widths along the world axes of a shape spanned by `axes`, each
/// scaled by its half-length, e.g. an ellipsoid's principal semi-axes.
pub(crate) fn ellipsoidal_half_extent(axes: [Vec3; 3]) -> Vec3 {
    let squared = axes[0] * axes[0] + axes[1] * axes[1] + axes[2] * axes[2];
    Vec3::new(squared.x.sqrt(), squared.y.sqrt(), squared.z.sqrt())
}
