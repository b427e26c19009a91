//! Parallelepiped: a box with parallelogram faces.

use kdtrace_math::{Aabb, Vec3};

use super::Viewable;
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// Solid spanned by three edge vectors from a base corner.
///
/// Intersected as the overlap of three slabs, one per pair of opposite faces.
#[derive(Debug, Clone)]
pub struct Parallelepiped {
    corner: Vec3,
    edges: [Vec3; 3],
    /// Unit normal of each face pair, pointing along its edge
    normals: [Vec3; 3],
    /// Plane offsets `normal · p` of the near and far face of each slab
    slabs: [(f64, f64); 3],
    material: MaterialId,
}

impl Parallelepiped {
    pub fn new(corner: Vec3, edge_a: Vec3, edge_b: Vec3, edge_c: Vec3, material: MaterialId) -> SceneResult<Self> {
        let edges = [edge_a, edge_b, edge_c];
        if edge_a.dot(edge_b.cross(edge_c)).abs() <= f64::EPSILON * edge_a.length() * edge_b.length() * edge_c.length()
        {
            return Err(SceneError::DegenerateGeometry(
                "parallelepiped edges are coplanar".into(),
            ));
        }

        let mut normals = [Vec3::ZERO; 3];
        let mut slabs = [(0.0, 0.0); 3];
        for i in 0..3 {
            let n = edges[(i + 1) % 3].cross(edges[(i + 2) % 3]).normalize();
            let n = if n.dot(edges[i]) < 0.0 { -n } else { n };
            let near = n.dot(corner);
            normals[i] = n;
            slabs[i] = (near, near + n.dot(edges[i]));
        }

        Ok(Self {
            corner,
            edges,
            normals,
            slabs,
            material,
        })
    }

    fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        (0..8).map(move |bits: usize| {
            (0..3)
                .filter(|i| bits & (1 << i) != 0)
                .fold(self.corner, |p, i| p + self.edges[i])
        })
    }
}

impl Viewable for Parallelepiped {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        let mut enter_normal = Vec3::ZERO;
        let mut exit_normal = Vec3::ZERO;

        for (n, &(near, far)) in self.normals.iter().zip(&self.slabs) {
            let o = n.dot(origin);
            let d = n.dot(direction);
            if d == 0.0 {
                if o < near || o > far {
                    return None;
                }
                continue;
            }

            let t_near = (near - o) / d;
            let t_far = (far - o) / d;
            // Moving along +n the ray crosses the near face first
            let (t0, n0, t1, n1) = if d > 0.0 {
                (t_near, -*n, t_far, *n)
            } else {
                (t_far, *n, t_near, -*n)
            };
            if t0 > t_enter {
                t_enter = t0;
                enter_normal = n0;
            }
            if t1 < t_exit {
                t_exit = t1;
                exit_normal = n1;
            }
            if t_enter > t_exit {
                return None;
            }
        }

        let (t, normal) = if t_enter > 0.0 && t_enter < max_distance {
            (t_enter, enter_normal)
        } else if t_exit > 0.0 && t_exit < max_distance {
            (t_exit, exit_normal)
        } else {
            return None;
        };

        let position = origin + direction * t;
        Some((t, VisiblePoint::new(position, normal, self.material, direction)))
    }

    fn aabb(&self) -> Aabb {
        Aabb::from_point_cloud(self.vertices())
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Parallelepiped {
        Parallelepiped::new(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z, MaterialId(0)).unwrap()
    }

    #[test]
    fn test_cube_faces() {
        let cube = unit_cube();
        let (t, hit) = cube
            .find_intersection(Vec3::new(0.5, 0.5, 3.0), -Vec3::Z, f64::INFINITY)
            .unwrap();
        assert!((t - 2.0).abs() < 1e-12);
        assert_eq!(hit.normal, Vec3::Z);
        assert!(hit.front_facing);

        let (t, hit) = cube
            .find_intersection(Vec3::new(-1.0, 0.5, 0.5), Vec3::X, f64::INFINITY)
            .unwrap();
        assert!((t - 1.0).abs() < 1e-12);
        assert_eq!(hit.normal, -Vec3::X);
    }

    #[test]
    fn test_from_inside_hits_exit_face() {
        let (t, hit) = unit_cube()
            .find_intersection(Vec3::splat(0.5), Vec3::Y, f64::INFINITY)
            .unwrap();
        assert!((t - 0.5).abs() < 1e-12);
        assert_eq!(hit.normal, Vec3::Y);
        assert!(!hit.front_facing);
    }

    #[test]
    fn test_left_handed_edges_keep_outward_normals() {
        let cube = Parallelepiped::new(Vec3::ZERO, Vec3::Y, Vec3::X, Vec3::Z, MaterialId(0)).unwrap();
        let (_, hit) = cube
            .find_intersection(Vec3::new(0.5, 0.5, 3.0), -Vec3::Z, f64::INFINITY)
            .unwrap();
        assert_eq!(hit.normal, Vec3::Z);
    }

    #[test]
    fn test_sheared_box() {
        let shear = Parallelepiped::new(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::Z,
            MaterialId(0),
        )
        .unwrap();
        assert_eq!(shear.aabb().max(), Vec3::new(2.0, 1.0, 1.0));

        // (0.2, 0.5) lies left of the slanted face x = y
        assert!(shear
            .find_intersection(Vec3::new(0.2, 0.5, 3.0), -Vec3::Z, f64::INFINITY)
            .is_none());
        assert!(shear
            .find_intersection(Vec3::new(1.2, 0.5, 3.0), -Vec3::Z, f64::INFINITY)
            .is_some());
    }

    #[test]
    fn test_coplanar_edges_rejected() {
        assert!(Parallelepiped::new(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0), MaterialId(0)).is_err());
    }
}
