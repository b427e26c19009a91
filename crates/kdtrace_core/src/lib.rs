//! kdtrace core - scene description for the kd-tree ray tracer.
//!
//! This crate provides:
//!
//! - **Viewables**: the [`Viewable`] trait and its primitives (spheres,
//!   ellipsoids, triangles, parallelograms, parallelepipeds, cylinders,
//!   cones, tori and rational Bézier patch sets)
//! - **Shading inputs**: Phong [`Material`]s, [`Light`]s, procedural
//!   [`Texture`]s and [`direct_illuminate`]
//! - **Scene assembly**: [`SceneDescription`] and its [`CameraView`]
//!
//! # Example
//!
//! ```
//! use kdtrace_core::{Color, Light, Material, SceneDescription, Sphere};
//! use kdtrace_math::Vec3;
//!
//! let mut scene = SceneDescription::new();
//! let red = scene.add_material(Material::new().with_diffuse(Color::new(0.8, 0.1, 0.1)));
//! scene.add_viewable(Sphere::new(Vec3::ZERO, 1.0, red)?)?;
//! scene.add_light(Light::point(Vec3::new(5.0, 5.0, 5.0)));
//! assert_eq!(scene.num_viewables(), 1);
//! # Ok::<(), kdtrace_core::SceneError>(())
//! ```

pub mod camera;
pub mod error;
pub mod light;
pub mod lighting;
pub mod material;
pub mod scene;
pub mod texture;
pub mod viewable;
pub mod visible_point;

// Re-export commonly used types
pub use camera::CameraView;
pub use error::{SceneError, SceneResult};
pub use light::{Attenuation, Light, Spotlight};
pub use lighting::direct_illuminate;
pub use material::{Color, Material, MaterialId};
pub use scene::SceneDescription;
pub use texture::{Texture, TextureId};
pub use viewable::{
    BezierSet, Cone, Cylinder, Ellipsoid, Parallelepiped, Parallelogram, Sphere, Torus, Triangle, Viewable,
};
pub use visible_point::VisiblePoint;
