//! Recursive ray tracing over a kd-tree.

use kdtrace_core::material::reflect;
use kdtrace_core::{direct_illuminate, Color, Light, SceneDescription, VisiblePoint};
use kdtrace_math::{Ray, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::kdtree::{KdTree, Visit};
use crate::renderer::RenderConfig;
use crate::sampling::light_displacements;
use crate::stats::RenderStats;

/// Distance a ray leaving a surface is pushed forward before testing.
pub const ISECT_EPSILON: f64 = 1.0e-6;

/// Points closer than this to a light are always lit.
const SHADOW_CLEAR_DISTANCE: f64 = 1.0e-7;

/// The closest object along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index of the object in the scene
    pub object: usize,
    /// Distance from the ray's true origin
    pub distance: f64,
    /// Surface data, with any texture applied
    pub point: VisiblePoint,
}

/// Per-render tracing context.
///
/// Holds the read-only scene and tree together with the random source and
/// counters of one render. Best-hit state lives on the stack of each
/// [`RayTracer::seek_intersection`] call, so separate tracers over the same
/// scene never interfere.
pub struct RayTracer<'a> {
    scene: &'a SceneDescription,
    tree: &'a KdTree,
    config: &'a RenderConfig,
    rng: StdRng,
    stats: RenderStats,
}

impl<'a> RayTracer<'a> {
    pub fn new(scene: &'a SceneDescription, tree: &'a KdTree, config: &'a RenderConfig) -> Self {
        Self {
            scene,
            tree,
            config,
            rng: StdRng::seed_from_u64(config.seed),
            stats: RenderStats::default(),
        }
    }

    pub fn scene(&self) -> &'a SceneDescription {
        self.scene
    }

    pub fn config(&self) -> &'a RenderConfig {
        self.config
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut RenderStats {
        &mut self.stats
    }

    /// Closest object hit by the ray from `pos` along unit `dir`.
    ///
    /// When `avoid` names the object the ray starts on, that object alone is
    /// tested from a point [`ISECT_EPSILON`] further along the ray, so its
    /// surface is not found again at distance zero. Every distance is
    /// measured from `pos`.
    pub fn seek_intersection(&mut self, pos: Vec3, dir: Vec3, avoid: Option<usize>) -> Option<Hit> {
        let ray = Ray::new(pos, dir);
        let shifted = ray.offset(ISECT_EPSILON);

        let scene = self.scene;
        let stats = &mut self.stats;
        let mut best: Option<(usize, f64, VisiblePoint)> = None;

        self.tree
            .traverse(ray.origin, ray.direction, f64::INFINITY, false, |object, stop| {
                stats.intersection_tests += 1;
                let (start, shift) = if avoid == Some(object) {
                    (shifted, ISECT_EPSILON)
                } else {
                    (ray, 0.0)
                };
                match scene
                    .viewable(object)
                    .find_intersection(start.origin, start.direction, stop - shift)
                {
                    Some((t, point)) => {
                        assert!(t >= 0.0, "object {object} reported hit distance {t}");
                        let t = t + shift;
                        if best.map_or(true, |(_, best_t, _)| t < best_t) {
                            best = Some((object, t, point));
                        }
                        Visit::Hit(t)
                    }
                    None => Visit::Miss,
                }
            });

        let (object, distance, mut point) = best?;
        scene.apply_texture(object, &mut point);
        Some(Hit {
            object,
            distance,
            point,
        })
    }

    /// Whether `point` can see `light` moved by `displacement`.
    ///
    /// The feeler runs from the light to the point. Blockers within
    /// [`ISECT_EPSILON`] of the point are ignored, which covers the surface
    /// the point lies on.
    pub fn shadow_feeler(&mut self, point: Vec3, light: &Light, displacement: Vec3) -> bool {
        let light_pos = light.position_from(point) + displacement;
        let Some((ray, dist)) = Ray::towards(light_pos, point) else {
            return true;
        };
        if dist < SHADOW_CLEAR_DISTANCE {
            return true;
        }

        self.stats.shadow_feelers += 1;
        let limit = dist - ISECT_EPSILON;
        if limit <= 0.0 {
            return true;
        }

        let scene = self.scene;
        let stats = &mut self.stats;
        let blocked = self
            .tree
            .traverse(ray.origin, ray.direction, limit, true, |object, _| {
                stats.intersection_tests += 1;
                match scene.viewable(object).find_intersection(ray.origin, ray.direction, limit) {
                    Some((t, _)) if t < limit => Visit::Abort,
                    _ => Visit::Miss,
                }
            });
        !blocked
    }

    /// Fraction of a light's shadow feelers that reach `point`.
    ///
    /// Feelers start from a grid of positions around the light, so partly
    /// hidden lights give soft shadow edges.
    pub fn percent_lit(&mut self, point: &VisiblePoint, light: &Light) -> f64 {
        let config = self.config;
        let shadow = &config.shadow;
        if shadow.grid <= 1 || shadow.light_radius <= 0.0 {
            let clear = self.shadow_feeler(point.position, light, Vec3::ZERO);
            return if clear { 1.0 } else { 0.0 };
        }

        let offsets = light_displacements(shadow.grid, shadow.light_radius, shadow.jitter, &mut self.rng);
        let clear = offsets
            .iter()
            .filter(|&&offset| self.shadow_feeler(point.position, light, offset))
            .count();
        clear as f64 / offsets.len() as f64
    }

    /// Local illumination of `hit` as seen from `view_pos`: ambient and
    /// emissive light plus the shadowed Phong contribution of every light.
    pub fn direct_illumination(&mut self, view_pos: Vec3, hit: &Hit) -> Color {
        let scene = self.scene;
        let point = &hit.point;
        let material = scene.material(point.material);

        let mut color = material.ambient * scene.global_ambient_light() + material.emissive;
        let view_side = (view_pos - point.position).dot(point.normal);

        for light in scene.lights() {
            let light_side = (light.position_from(point.position) - point.position).dot(point.normal);
            // An opaque surface hides lights on the far side of it, and
            // lights or viewers exactly in its plane
            let percent_lit = if !material.is_transmissive() && view_side * light_side <= 0.0 {
                0.0
            } else {
                self.percent_lit(point, light)
            };
            color += direct_illuminate(point, view_pos, light, material, percent_lit);
        }
        color
    }

    /// Color seen along the ray from `pos` in direction `dir`.
    ///
    /// `depth` counts the surfaces the path may still visit; at depth 1 no
    /// reflected or refracted rays are spawned.
    pub fn trace(&mut self, depth: u32, pos: Vec3, dir: Vec3, avoid: Option<usize>) -> Color {
        let scene = self.scene;
        let Some(hit) = self.seek_intersection(pos, dir, avoid) else {
            return scene.background_color();
        };

        let mut color = self.direct_illumination(pos, &hit);
        if depth <= 1 {
            return color;
        }

        let material = scene.material(hit.point.material);
        let to_viewer = -dir;

        if material.is_reflective() {
            let reflect_dir = reflect(dir, hit.point.normal).normalize();
            let filter = material.reflection_color(&hit.point, to_viewer, reflect_dir);
            self.stats.secondary_rays += 1;
            color += filter * self.trace(depth - 1, hit.point.position, reflect_dir, Some(hit.object));
        }

        if material.is_transmissive() {
            if let Some(transmit_dir) = material.refract_direction(hit.point.normal, dir) {
                let filter = material.transmission_color(&hit.point, to_viewer, transmit_dir);
                self.stats.secondary_rays += 1;
                color += filter * self.trace(depth - 1, hit.point.position, transmit_dir, Some(hit.object));
            }
        }

        color
    }
}
