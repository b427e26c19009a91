//! Clipping of planar convex polygons against boxes.
//!
//! Planar primitives have loose global bounding boxes; a kd-tree cell only
//! needs the part of the polygon that lies inside it.

use crate::{Aabb, Vec3};

/// Clip a convex planar polygon to `bounds` and return the bounding box of
/// what remains, or `None` if nothing of the polygon lies in the box.
///
/// Sutherland–Hodgman clipping against the six box planes. Points exactly on a
/// box face count as inside, so polygons lying in a face are kept.
pub fn clip_polygon_to_box(vertices: &[Vec3], bounds: &Aabb) -> Option<Aabb> {
    if vertices.is_empty() || bounds.is_empty() {
        return None;
    }

    let mut polygon = vertices.to_vec();
    let mut scratch = Vec::with_capacity(vertices.len() + 6);

    for axis in 0..3 {
        let slab = bounds.axis_interval(axis);
        clip_to_plane(&polygon, axis, slab.min, 1.0, &mut scratch);
        std::mem::swap(&mut polygon, &mut scratch);
        clip_to_plane(&polygon, axis, slab.max, -1.0, &mut scratch);
        std::mem::swap(&mut polygon, &mut scratch);
        if polygon.is_empty() {
            return None;
        }
    }

    // Round-off in the edge interpolation can leak just outside the box.
    let clipped = Aabb::from_point_cloud(polygon).intersection(bounds);
    (!clipped.is_empty()).then_some(clipped)
}

/// Keep the part of `polygon` where `side * (p[axis] - value) >= 0`.
fn clip_to_plane(polygon: &[Vec3], axis: usize, value: f64, side: f64, out: &mut Vec<Vec3>) {
    out.clear();
    let inside = |p: &Vec3| side * (p[axis] - value) >= 0.0;

    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        let a_in = inside(a);
        let b_in = inside(b);

        if a_in {
            out.push(*a);
        }
        if a_in != b_in {
            let t = (value - a[axis]) / (b[axis] - a[axis]);
            let mut crossing = a.lerp(*b, t);
            crossing[axis] = value;
            out.push(crossing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_xy() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_polygon_inside_box_is_unchanged() {
        let bounds = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(2.0));
        let clipped = clip_polygon_to_box(&unit_square_xy(), &bounds).unwrap();
        assert_eq!(clipped, Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_polygon_partially_inside() {
        let bounds = Aabb::from_points(Vec3::new(0.5, -1.0, -1.0), Vec3::new(3.0, 0.25, 1.0));
        let clipped = clip_polygon_to_box(&unit_square_xy(), &bounds).unwrap();
        assert_eq!(clipped, Aabb::from_points(Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 0.25, 0.0)));
    }

    #[test]
    fn test_triangle_corner_cut_is_tighter_than_box_overlap() {
        // The hypotenuse x + y = 1 keeps the triangle out of the corner near (1, 1).
        let triangle = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let bounds = Aabb::from_points(Vec3::new(0.6, 0.6, -1.0), Vec3::new(2.0, 2.0, 1.0));
        assert!(clip_polygon_to_box(&triangle, &bounds).is_none());

        let bounds = Aabb::from_points(Vec3::new(0.25, 0.25, -1.0), Vec3::new(2.0, 2.0, 1.0));
        let clipped = clip_polygon_to_box(&triangle, &bounds).unwrap();
        assert!((clipped.x.max - 0.75).abs() < 1e-12);
        assert!((clipped.y.max - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_outside_box() {
        let bounds = Aabb::from_points(Vec3::new(0.0, 0.0, 1.0), Vec3::splat(2.0));
        assert!(clip_polygon_to_box(&unit_square_xy(), &bounds).is_none());
    }

    #[test]
    fn test_polygon_lying_in_box_face_is_kept() {
        let bounds = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.5, 0.5, 1.0));
        let clipped = clip_polygon_to_box(&unit_square_xy(), &bounds).unwrap();
        assert_eq!(clipped, Aabb::from_points(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.0)));
    }
}
