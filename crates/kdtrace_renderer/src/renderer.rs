//! Render driver.
//!
//! Every pixel is sampled on a jittered `n * n` sub-pixel grid. Each sample
//! is paired with a jittered lens position from a second grid, in a random
//! order per pixel, and traced recursively. The averaged samples are
//! written to the [`PixelArray`], which is clamped once the frame is done.

use std::time::Instant;

use kdtrace_core::{Color, SceneDescription};
use kdtrace_math::Ray;
use serde::{Deserialize, Serialize};

use crate::kdtree::KdTree;
use crate::pixels::PixelArray;
use crate::sampling::{shuffled_pairs, stratified_square};
use crate::stats::RenderStats;
use crate::tracer::RayTracer;

/// Soft shadow sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Feelers per light are `grid * grid`; 0 or 1 casts a single feeler
    pub grid: u32,
    /// Half-width of the square the feelers start from, centered on the light
    pub light_radius: f64,
    /// Randomize feeler positions within their grid cells
    pub jitter: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            grid: 4,
            light_radius: 0.25,
            jitter: true,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Surfaces a camera ray may visit, counting the first; 1 disables
    /// reflection and refraction
    pub trace_depth: u32,
    /// Sub-pixel grid size; each pixel takes `subpixels * subpixels` samples
    pub subpixels: u32,
    /// Half-width of the lens in pixel steps; 0 is a pinhole camera
    pub aperture: f64,
    pub shadow: ShadowConfig,
    /// Seed of the sampling random number generator
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            trace_depth: 5,
            subpixels: 2,
            aperture: 0.0,
            shadow: ShadowConfig::default(),
            seed: 0,
        }
    }
}

/// Color of pixel (x, y), averaged over its samples.
pub fn render_pixel(tracer: &mut RayTracer, x: u32, y: u32) -> Color {
    let config = tracer.config();
    let camera = tracer.scene().camera();

    let n = config.subpixels.max(1);
    let jitter = n > 1;
    let pixel_samples = stratified_square(n, jitter, tracer.rng());
    let lens_samples = stratified_square(n, jitter, tracer.rng());
    let samples = shuffled_pairs(&pixel_samples, &lens_samples, tracer.rng());

    let mut color = Color::ZERO;
    let mut count = 0;
    for (sub, lens) in samples {
        let target = camera.pixel_position(
            f64::from(x) + sub.x - 0.5,
            f64::from(y) + sub.y - 0.5,
        );
        let origin = camera.position()
            + config.aperture
                * ((2.0 * lens.x - 1.0) * camera.pixel_du() + (2.0 * lens.y - 1.0) * camera.pixel_dv());
        let Some((ray, _)) = Ray::towards(origin, target) else {
            continue;
        };

        tracer.stats_mut().primary_rays += 1;
        color += tracer.trace(config.trace_depth, ray.origin, ray.direction, None);
        count += 1;
    }

    if count == 0 {
        return tracer.scene().background_color();
    }
    color / f64::from(count)
}

/// Render the scene's camera view into `pixels`.
///
/// `pixels` must match the camera resolution. `tree` must have been built
/// over `scene`.
pub fn render(
    scene: &SceneDescription,
    tree: &KdTree,
    config: &RenderConfig,
    pixels: &mut PixelArray,
) -> RenderStats {
    let camera = scene.camera();
    let (width, height) = (camera.pixel_width(), camera.pixel_height());
    assert_eq!(
        (pixels.width(), pixels.height()),
        (width, height),
        "pixel array does not match the camera resolution"
    );

    log::info!(
        "Rendering {}x{} with {} samples per pixel, trace depth {}",
        width,
        height,
        config.subpixels.max(1).pow(2),
        config.trace_depth
    );
    let start = Instant::now();

    let mut tracer = RayTracer::new(scene, tree, config);
    for y in 0..height {
        for x in 0..width {
            let color = render_pixel(&mut tracer, x, y);
            pixels.set_pixel(x, y, color);
        }
    }
    pixels.clamp_all_values();

    let stats = *tracer.stats();
    log::info!("Rendered in {:.2?}: {}", start.elapsed(), stats);
    stats
}
