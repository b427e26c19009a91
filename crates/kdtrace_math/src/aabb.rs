use crate::{Interval, Vec3};

/// Axis-Aligned Bounding Box used for object extents and kd-tree cells.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Boxes are closed: a box of zero thickness along an axis is valid and still
/// contains the points on its face. A box is empty when any axis is empty.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an AABB from two corner points in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        }
    }

    /// Create an AABB from its minimum and maximum corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all(), "malformed box: {min} > {max}");
        Self {
            x: Interval::new(min.x, max.x),
            y: Interval::new(min.y, max.y),
            z: Interval::new(min.z, max.z),
        }
    }

    /// Smallest box containing all of the given points.
    pub fn from_point_cloud(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Aabb::EMPTY;
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// The region common to both boxes. May be empty.
    pub fn intersection(&self, other: &Aabb) -> Self {
        Self {
            x: self.x.intersect(&other.x),
            y: self.y.intersect(&other.y),
            z: self.z.intersect(&other.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    fn axis_interval_mut(&mut self, n: usize) -> &mut Interval {
        match n {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Returns true if the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Returns true if min <= max componentwise and no bound is NaN.
    pub fn is_valid(&self) -> bool {
        self.min().cmple(self.max()).all()
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Grow the box so that it contains `p`.
    pub fn include_point(&mut self, p: Vec3) {
        self.x.include(p.x);
        self.y.include(p.y);
        self.z.include(p.z);
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Total area of the six faces. Zero for empty boxes.
    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.max() - self.min();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Cut the box with the plane `axis = position`.
    ///
    /// Returns the parts below and above the plane. Both parts contain the
    /// plane itself.
    pub fn split(&self, axis: usize, position: f64) -> (Aabb, Aabb) {
        debug_assert!(self.axis_interval(axis).contains(position));
        let mut below = *self;
        let mut above = *self;
        below.axis_interval_mut(axis).max = position;
        above.axis_interval_mut(axis).min = position;
        (below, above)
    }

    /// Clip the ray `origin + t * direction`, `0 <= t <= max_distance`,
    /// against this box.
    ///
    /// Returns the entry and exit parameters, or `None` if the ray misses.
    /// Zero direction components and zero-thickness boxes are handled without
    /// producing NaNs.
    pub fn ray_range(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, f64)> {
        let mut t_enter = 0.0_f64;
        let mut t_exit = max_distance;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let o = origin[axis];
            let d = direction[axis];

            if d == 0.0 {
                if !slab.contains(o) {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (slab.min - o) * inv;
            let mut t1 = (slab.max - o) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        Some((t_enter, t_exit))
    }

    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.x.min, 0.0);
        assert_eq!(surrounding.x.max, 10.0);

        // EMPTY is the identity for surrounding
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
    }

    #[test]
    fn test_aabb_intersection() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::splat(4.0));
        let b = Aabb::from_points(Vec3::splat(2.0), Vec3::splat(6.0));
        let c = Aabb::from_points(Vec3::splat(5.0), Vec3::splat(6.0));

        assert_eq!(a.intersection(&b), Aabb::from_points(Vec3::splat(2.0), Vec3::splat(4.0)));
        assert!(a.intersection(&c).is_empty());
    }

    #[test]
    fn test_aabb_split() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(4.0, 2.0, 2.0));
        let (below, above) = aabb.split(0, 1.0);

        assert_eq!(below.x, Interval::new(0.0, 1.0));
        assert_eq!(above.x, Interval::new(1.0, 4.0));
        assert_eq!(below.y, aabb.y);
        assert_eq!(above.z, aabb.z);
    }

    #[test]
    fn test_aabb_surface_area() {
        let cube = Aabb::from_points(Vec3::ZERO, Vec3::splat(2.0));
        assert_eq!(cube.surface_area(), 24.0);

        // A flat box still has the area of its two faces
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 3.0, 0.0));
        assert_eq!(flat.surface_area(), 12.0);

        assert_eq!(Aabb::EMPTY.surface_area(), 0.0);
    }

    #[test]
    fn test_aabb_ray_range() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at center
        let (t0, t1) = aabb
            .ray_range(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, f64::INFINITY)
            .unwrap();
        assert!((t0 - 4.0).abs() < 1e-12);
        assert!((t1 - 6.0).abs() < 1e-12);

        // Ray pointing away
        assert!(aabb.ray_range(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z, f64::INFINITY).is_none());

        // Ray missing the box
        assert!(aabb.ray_range(Vec3::new(10.0, 0.0, 0.0), Vec3::Z, f64::INFINITY).is_none());

        // Distance bound stops short of the box
        assert!(aabb.ray_range(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 3.0).is_none());

        // Origin inside the box enters at zero
        let (t0, t1) = aabb.ray_range(Vec3::ZERO, Vec3::X, f64::INFINITY).unwrap();
        assert_eq!(t0, 0.0);
        assert!((t1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_aabb_ray_range_flat_box() {
        // A zero-thickness box is still hit by a ray crossing it
        let flat = Aabb::from_points(Vec3::new(-1.0, -1.0, 2.0), Vec3::new(1.0, 1.0, 2.0));
        let (t0, t1) = flat.ray_range(Vec3::ZERO, Vec3::Z, f64::INFINITY).unwrap();
        assert_eq!(t0, 2.0);
        assert_eq!(t1, 2.0);

        // Ray travelling inside the plane of the box
        let hit = flat.ray_range(Vec3::new(-5.0, 0.0, 2.0), Vec3::X, f64::INFINITY);
        assert!(hit.is_some());
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_aabb_longest_axis() {
        let aabb_x = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0));
        assert_eq!(aabb_x.longest_axis(), 0);

        let aabb_y = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(aabb_y.longest_axis(), 1);

        let aabb_z = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(aabb_z.longest_axis(), 2);
    }

    #[test]
    fn test_aabb_validity() {
        assert!(Aabb::from_points(Vec3::ZERO, Vec3::ONE).is_valid());
        assert!(!Aabb::EMPTY.is_valid());
        assert!(Aabb::EMPTY.is_empty());
    }
}
