//! Rational Bézier patches, tessellated into triangles.

use kdtrace_math::{clip_polygon_to_box, Aabb, DVec4, Vec2, Vec3};

use super::triangle::intersect_triangle;
use super::Viewable;
use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// Default number of steps each patch is cut into along `u` and `v`.
pub const DEFAULT_BEZIER_SUBDIVISIONS: usize = 16;

#[derive(Debug, Clone)]
struct Facet {
    vertices: [Vec3; 3],
    uvs: [Vec2; 3],
    normal: Vec3,
}

/// A surface made of rational Bézier patches.
///
/// Control points are homogeneous `(w x, w y, w z, w)`; a zero weight puts
/// the point at infinity, which lets a patch follow exact circular arcs.
/// Each patch is cut into a grid of flat triangles when it is added, and
/// keeps its own `[0, 1]` texture coordinates.
#[derive(Debug, Clone)]
pub struct BezierSet {
    subdivisions: usize,
    facets: Vec<Facet>,
    bounds: Aabb,
    material: MaterialId,
}

impl BezierSet {
    pub fn new(material: MaterialId) -> Self {
        Self::with_subdivisions(DEFAULT_BEZIER_SUBDIVISIONS, material)
    }

    pub fn with_subdivisions(subdivisions: usize, material: MaterialId) -> Self {
        Self {
            subdivisions: subdivisions.max(1),
            facets: Vec::new(),
            bounds: Aabb::EMPTY,
            material,
        }
    }

    /// Add a patch of `u_order * v_order` control points, stored row by row:
    /// point `(i, j)` is `control_points[j * u_order + i]`.
    pub fn add_patch(&mut self, u_order: usize, v_order: usize, control_points: &[DVec4]) -> SceneResult<()> {
        if u_order < 2 || v_order < 2 || control_points.len() != u_order * v_order {
            return Err(SceneError::DegenerateGeometry(format!(
                "bezier patch of order {u_order}x{v_order} needs that many control points, got {}",
                control_points.len()
            )));
        }

        let n = self.subdivisions;
        let mut grid = Vec::with_capacity((n + 1) * (n + 1));
        for j in 0..=n {
            for i in 0..=n {
                let uv = Vec2::new(i as f64, j as f64) / n as f64;
                grid.push((evaluate(u_order, v_order, control_points, uv)?, uv));
            }
        }

        let at = |i: usize, j: usize| grid[j * (n + 1) + i];
        for j in 0..n {
            for i in 0..n {
                let corners = [at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)];
                for [a, b, c] in [[0, 1, 2], [0, 2, 3]] {
                    let vertices = [corners[a].0, corners[b].0, corners[c].0];
                    // Collapsed rows, e.g. at the pole of a dome, give no facet
                    let Some(normal) = (vertices[1] - vertices[0])
                        .cross(vertices[2] - vertices[0])
                        .try_normalize()
                    else {
                        continue;
                    };
                    self.facets.push(Facet {
                        vertices,
                        uvs: [corners[a].1, corners[b].1, corners[c].1],
                        normal,
                    });
                    self.bounds = Aabb::surrounding(&self.bounds, &Aabb::from_point_cloud(vertices));
                }
            }
        }
        Ok(())
    }

    pub fn num_facets(&self) -> usize {
        self.facets.len()
    }
}

/// Point of a rational patch at `uv`, by de Casteljau over each row and then
/// over the row results.
fn evaluate(u_order: usize, v_order: usize, control_points: &[DVec4], uv: Vec2) -> SceneResult<Vec3> {
    let rows: Vec<DVec4> = control_points
        .chunks(u_order)
        .map(|row| de_casteljau(row.to_vec(), uv.x))
        .collect();
    debug_assert_eq!(rows.len(), v_order);
    let p = de_casteljau(rows, uv.y);
    if p.w.abs() < 1e-12 {
        return Err(SceneError::DegenerateGeometry(format!(
            "bezier patch has zero weight at {uv}"
        )));
    }
    Ok(p.truncate() / p.w)
}

fn de_casteljau(mut points: Vec<DVec4>, t: f64) -> DVec4 {
    for len in (1..points.len()).rev() {
        for k in 0..len {
            points[k] = points[k].lerp(points[k + 1], t);
        }
    }
    points[0]
}

impl Viewable for BezierSet {
    fn find_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<(f64, VisiblePoint)> {
        self.bounds.ray_range(origin, direction, max_distance)?;

        let mut best: Option<(f64, &Facet, f64, f64)> = None;
        for facet in &self.facets {
            let limit = best.map_or(max_distance, |(t, ..)| t);
            if let Some((t, u, v)) = intersect_triangle(&facet.vertices, origin, direction, limit) {
                best = Some((t, facet, u, v));
            }
        }

        let (t, facet, u, v) = best?;
        let [uv0, uv1, uv2] = facet.uvs;
        let uv = uv0 * (1.0 - u - v) + uv1 * u + uv2 * v;
        let position = origin + direction * t;
        let point = VisiblePoint::new(position, facet.normal, self.material, direction).with_uv(uv.x, uv.y);
        Some((t, point))
    }

    fn aabb(&self) -> Aabb {
        self.bounds
    }

    fn extent_in_box(&self, bounds: &Aabb) -> Option<Aabb> {
        self.facets
            .iter()
            .filter_map(|facet| clip_polygon_to_box(&facet.vertices, bounds))
            .reduce(|a, b| Aabb::surrounding(&a, &b))
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}
