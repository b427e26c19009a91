//! kdtrace renderer - kd-tree accelerated recursive ray tracing
//!
//! Objects of a [`SceneDescription`](kdtrace_core::SceneDescription) are
//! indexed by a [`KdTree`] built with a surface-area cost model. Rays walk
//! the tree front to back; the [`RayTracer`] uses those walks to find the
//! closest hit, cast soft shadow feelers and follow mirror and refracted
//! rays. [`render`] drives the tracer over every pixel of the camera view.
//!
//! ```no_run
//! use kdtrace_core::{Light, Material, SceneDescription, Sphere};
//! use kdtrace_math::Vec3;
//! use kdtrace_renderer::{render, KdTree, KdTreeConfig, PixelArray, RenderConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut scene = SceneDescription::new();
//! let white = scene.add_material(Material::new());
//! scene.add_viewable(Sphere::new(Vec3::ZERO, 1.0, white)?)?;
//! scene.add_light(Light::point(Vec3::new(5.0, 5.0, 10.0)));
//!
//! let tree = KdTree::for_scene(&scene, &KdTreeConfig::default());
//! let camera = scene.camera();
//! let mut pixels = PixelArray::new(camera.pixel_width(), camera.pixel_height());
//! render(&scene, &tree, &RenderConfig::default(), &mut pixels);
//! pixels.save("sphere.png")?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod kdtree;
mod pixels;
mod renderer;
pub mod sampling;
mod stats;
mod tracer;

pub use error::OutputError;
pub use kdtree::{KdTree, KdTreeConfig, KdTreeStats, Visit, MAX_TREE_DEPTH};
pub use pixels::PixelArray;
pub use renderer::{render, render_pixel, RenderConfig, ShadowConfig};
pub use stats::RenderStats;
pub use tracer::{Hit, RayTracer, ISECT_EPSILON};
