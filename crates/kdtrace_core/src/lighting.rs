//! Phong local illumination from a single light.

use kdtrace_math::Vec3;

use crate::{material::reflect, Color, Light, Material, VisiblePoint};

/// Contribution of `light` at `point` as seen from `view_pos`.
///
/// The ambient term is always added. Diffuse and specular terms are scaled by
/// `percent_lit` (the unshadowed fraction of the light, in `[0, 1]`) and by
/// the light's spot and distance falloff. No diffuse or specular light reaches
/// the viewer when the light is on the other side of the surface.
pub fn direct_illuminate(
    point: &VisiblePoint,
    view_pos: Vec3,
    light: &Light,
    material: &Material,
    percent_lit: f64,
) -> Color {
    let mut color = light.ambient * material.ambient;
    if percent_lit <= 0.0 {
        return color;
    }

    let Some(to_viewer) = (view_pos - point.position).try_normalize() else {
        return color;
    };
    let Some(to_light) = light.direction_from(point.position) else {
        return color;
    };

    let normal = point.normal_toward(to_viewer);
    let diffuse_cos = normal.dot(to_light);
    if diffuse_cos <= 0.0 {
        return color;
    }

    let falloff = light.falloff(point.position);
    if falloff <= 0.0 {
        return color;
    }

    let mut lit = light.diffuse * material.diffuse * diffuse_cos;

    if material.specular != Color::ZERO {
        let reflected = reflect(-to_light, normal);
        let specular_cos = reflected.dot(to_viewer);
        if specular_cos > 0.0 {
            lit += light.specular * material.specular * specular_cos.powf(material.shininess);
        }
    }

    color += lit * (percent_lit * falloff);
    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaterialId;

    fn red() -> Material {
        Material::new()
            .with_ambient(Color::new(0.2, 0.0, 0.0))
            .with_diffuse(Color::new(0.8, 0.0, 0.0))
            .with_specular(Color::splat(0.5))
            .with_shininess(10.0)
    }

    fn point_on_plane() -> VisiblePoint {
        VisiblePoint::new(Vec3::ZERO, Vec3::Z, MaterialId(0), -Vec3::Z)
    }

    #[test]
    fn test_head_on_light() {
        let light = Light::point(Vec3::new(0.0, 0.0, 5.0)).with_ambient(Color::splat(0.1));
        let c = direct_illuminate(&point_on_plane(), Vec3::new(0.0, 0.0, 10.0), &light, &red(), 1.0);

        // ambient + diffuse + full specular highlight
        assert!((c.x - (0.02 + 0.8 + 0.5)).abs() < 1e-12);
        assert!((c.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shadowed_is_ambient_only() {
        let light = Light::point(Vec3::new(0.0, 0.0, 5.0)).with_ambient(Color::splat(0.1));
        let c = direct_illuminate(&point_on_plane(), Vec3::new(0.0, 0.0, 10.0), &light, &red(), 0.0);
        assert_eq!(c, Color::new(0.02, 0.0, 0.0));
    }

    #[test]
    fn test_light_behind_surface() {
        let light = Light::point(Vec3::new(0.0, 0.0, -5.0));
        let c = direct_illuminate(&point_on_plane(), Vec3::new(0.0, 0.0, 10.0), &light, &red(), 1.0);
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_diffuse_follows_cosine() {
        let light = Light::point(Vec3::new(1.0, 0.0, 1.0) * 10.0).with_specular(Color::ZERO);
        let c = direct_illuminate(&point_on_plane(), Vec3::new(0.0, 0.0, 10.0), &light, &red(), 0.5);

        let expected = 0.8 * std::f64::consts::FRAC_1_SQRT_2 * 0.5;
        assert!((c.x - expected).abs() < 1e-12);
    }

    #[test]
    fn test_viewer_on_back_side_flips_normal() {
        // Both the light and the viewer are below the plane
        let light = Light::point(Vec3::new(0.0, 0.0, -5.0)).with_specular(Color::ZERO);
        let c = direct_illuminate(&point_on_plane(), Vec3::new(0.0, 0.0, -10.0), &light, &red(), 1.0);
        assert!((c.x - 0.8).abs() < 1e-12);
    }
}
