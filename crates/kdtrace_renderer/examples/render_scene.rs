//! Render a small room with mirrored, glass and textured objects.
//!
//! Usage: `cargo run --release --example render_scene -- [config.json] [output.png]`
//!
//! The optional JSON file holds a `RenderConfig`; missing fields keep
//! their defaults.

use anyhow::{Context, Result};
use kdtrace_core::{
    BezierSet, CameraView, Color, Cone, Cylinder, Ellipsoid, Light, Material, MaterialId,
    Parallelepiped, Parallelogram, SceneDescription, Sphere, Texture, Torus, Triangle,
};
use kdtrace_math::{DVec4, Vec3};
use kdtrace_renderer::{render, KdTree, KdTreeConfig, PixelArray, RenderConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?
        }
        None => RenderConfig::default(),
    };
    let output = args.next().unwrap_or_else(|| "render_scene.png".to_string());

    let scene = build_scene()?;
    log::info!(
        "Scene has {} objects and {} lights",
        scene.num_viewables(),
        scene.num_lights()
    );

    let tree = KdTree::for_scene(&scene, &KdTreeConfig::default());
    let camera = scene.camera();
    let mut pixels = PixelArray::new(camera.pixel_width(), camera.pixel_height());
    render(&scene, &tree, &config, &mut pixels);

    pixels.save(&output)?;
    Ok(())
}

fn build_scene() -> Result<SceneDescription> {
    let mut scene = SceneDescription::new()
        .with_global_ambient(Color::splat(0.2))
        .with_background(Color::ZERO);

    let yellow = scene.add_material(
        Material::new()
            .with_ambient_diffuse(Color::new(0.5, 0.5, 0.0))
            .with_specular(Color::splat(0.8))
            .with_reflective(Color::splat(0.6)),
    );
    let blue = scene.add_material(
        Material::new()
            .with_ambient_diffuse(Color::new(0.0, 0.2, 0.8))
            .with_specular(Color::splat(0.8))
            .with_reflective(Color::splat(0.6)),
    );
    let wall = scene.add_material(
        Material::new()
            .with_ambient_diffuse(Color::new(0.3, 0.3, 0.0))
            .with_specular(Color::splat(0.8))
            .with_reflective(Color::new(0.8, 0.8, 0.4)),
    );
    let white = scene.add_material(
        Material::new()
            .with_ambient_diffuse(Color::splat(0.7))
            .with_specular(Color::splat(0.6))
            .with_reflective(Color::splat(0.1)),
    );
    let black = scene.add_material(
        Material::new()
            .with_ambient_diffuse(Color::ZERO)
            .with_specular(Color::splat(0.95))
            .with_shininess(50.0),
    );
    let glass = scene.add_material(
        Material::new()
            .with_ambient_diffuse(Color::ZERO)
            .with_specular(Color::splat(0.3))
            .with_reflective(Color::splat(0.3))
            .with_transmissive(Color::ONE)
            .with_index_of_refraction(1.5)
            .with_shininess(20.0),
    );
    let mirror = scene.add_material(
        Material::new()
            .with_ambient_diffuse(Color::splat(0.05))
            .with_specular(Color::splat(0.6))
            .with_reflective(Color::splat(0.95)),
    );

    scene.add_light(Light::point(Vec3::new(7.0, 15.0, 12.0)));
    scene.add_light(Light::point(Vec3::new(-7.0, 25.0, 12.0)));

    // Checkered floor
    let checks = scene.add_texture(Texture::checkered(blue, 1.0 / 15.0, 1.0 / 9.0)?)?;
    scene.add_textured_viewable(
        Parallelogram::new(
            Vec3::new(-8.0, 0.0, 10.0),
            Vec3::new(8.0, 0.0, 10.0),
            Vec3::new(8.0, 0.0, -10.0),
            yellow,
        )?,
        checks,
    )?;

    // Back wall and triangular side walls
    scene.add_viewable(Parallelogram::new(
        Vec3::new(-8.0, 0.0, -10.0),
        Vec3::new(8.0, 0.0, -10.0),
        Vec3::new(8.0, 10.0, -10.0),
        white,
    )?)?;
    scene.add_viewable(Triangle::new(
        Vec3::new(-8.0, 0.0, -10.0),
        Vec3::new(-8.0, 10.0, -10.0),
        Vec3::new(-8.0, 0.0, 10.0),
        wall,
    )?)?;
    scene.add_viewable(Triangle::new(
        Vec3::new(8.0, 0.0, -10.0),
        Vec3::new(8.0, 0.0, 10.0),
        Vec3::new(8.0, 10.0, -10.0),
        wall,
    )?)?;

    scene.add_viewable(Sphere::new(Vec3::new(-5.5, 2.0, 3.0), 2.0, glass)?)?;
    scene.add_viewable(Sphere::new(Vec3::new(5.5, 2.0, 3.0), 2.0, white)?)?;

    // Mirrored column on a flat black base
    scene.add_viewable(Cylinder::new(Vec3::new(0.0, 2.4, -4.0), Vec3::Y, 1.5, 4.0, mirror)?)?;
    scene.add_viewable(Cylinder::new(Vec3::new(0.0, 0.2, -4.0), Vec3::Y, 2.0, 0.4, black)?)?;

    scene.add_viewable(Ellipsoid::new(
        Vec3::new(-6.0, 2.0, -8.0),
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::Y,
        Vec3::new(1.5, 0.7, 0.3),
        yellow,
    )?)?;
    scene.add_viewable(Parallelepiped::new(
        Vec3::new(2.0, 0.0, 4.5),
        Vec3::new(1.2, 0.0, -0.5),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.5, 0.0, 1.2),
        blue,
    )?)?;

    // Doughnut on the floor between the spheres
    scene.add_viewable(Torus::new(Vec3::new(0.0, 0.75, 1.5), Vec3::Y, 2.0, 0.75, blue)?)?;

    // Lamp shade hanging over the column, white inside
    scene.add_viewable(
        Cone::new(Vec3::new(3.5, 7.0, -6.0), -Vec3::Y, 1.5, 1.0, black)?
            .without_base()
            .with_inner_material(white),
    )?;

    scene.add_viewable(vase(white)?)?;

    scene.set_camera(
        CameraView::new()
            .with_position(Vec3::new(0.0, 6.0, 22.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
            .with_screen(10.0, 8.0, 6.0)
            .with_resolution(640, 480),
    )?;

    Ok(scene)
}

/// Vase of two rational patches: each profile row is a half circle whose
/// middle control point sits at infinity.
fn vase(material: MaterialId) -> Result<BezierSet> {
    let p = |x, y| DVec4::new(x, y, -4.0, 1.0);
    let far = |z| DVec4::new(0.0, 0.0, z, 0.0);
    let mut vase = BezierSet::new(material);
    for side in [1.0, -1.0] {
        vase.add_patch(
            3,
            4,
            &[
                p(-6.0, 0.0),
                far(side),
                p(-4.0, 0.0),
                p(-7.0, 1.0),
                far(2.0 * side),
                p(-3.0, 1.0),
                p(-5.5, 1.5),
                far(0.5 * side),
                p(-4.5, 1.5),
                p(-6.0, 2.0),
                far(side),
                p(-4.0, 2.0),
            ],
        )?;
    }
    Ok(vase)
}
