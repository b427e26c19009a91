//! Phong materials with mirror reflection and refraction.

use kdtrace_math::Vec3;

use crate::VisiblePoint;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Index of a material in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Surface material for the Phong lighting model.
///
/// Reflective and transmissive colors drive the recursive rays: a
/// non-black reflective color spawns a mirror ray and a non-black
/// transmissive color spawns a refracted ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    pub reflective: Color,
    pub transmissive: Color,
    /// Phong specular exponent
    pub shininess: f64,
    /// Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub index_of_refraction: f64,
    /// Scale reflection and transmission by Schlick's Fresnel approximation
    pub use_fresnel: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::splat(0.2),
            diffuse: Color::splat(0.8),
            specular: Color::ZERO,
            emissive: Color::ZERO,
            reflective: Color::ZERO,
            transmissive: Color::ZERO,
            shininess: 1.0,
            index_of_refraction: 1.0,
            use_fresnel: false,
        }
    }
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ambient and diffuse to the same color.
    pub fn with_ambient_diffuse(mut self, color: Color) -> Self {
        self.ambient = color;
        self.diffuse = color;
        self
    }

    pub fn with_ambient(mut self, color: Color) -> Self {
        self.ambient = color;
        self
    }

    pub fn with_diffuse(mut self, color: Color) -> Self {
        self.diffuse = color;
        self
    }

    pub fn with_specular(mut self, color: Color) -> Self {
        self.specular = color;
        self
    }

    pub fn with_emissive(mut self, color: Color) -> Self {
        self.emissive = color;
        self
    }

    pub fn with_reflective(mut self, color: Color) -> Self {
        self.reflective = color;
        self
    }

    pub fn with_transmissive(mut self, color: Color) -> Self {
        self.transmissive = color;
        self
    }

    pub fn with_shininess(mut self, exponent: f64) -> Self {
        self.shininess = exponent;
        self
    }

    pub fn with_index_of_refraction(mut self, ior: f64) -> Self {
        debug_assert!(ior > 0.0);
        self.index_of_refraction = ior;
        self
    }

    pub fn with_fresnel(mut self, use_fresnel: bool) -> Self {
        self.use_fresnel = use_fresnel;
        self
    }

    pub fn is_reflective(&self) -> bool {
        self.reflective != Color::ZERO
    }

    pub fn is_transmissive(&self) -> bool {
        self.transmissive != Color::ZERO
    }

    /// Filter applied to the color arriving along a mirror ray.
    ///
    /// `out_dir` points from the surface toward the viewer.
    pub fn reflection_color(&self, point: &VisiblePoint, out_dir: Vec3, _reflect_dir: Vec3) -> Color {
        if !self.use_fresnel {
            return self.reflective;
        }
        self.reflective * self.fresnel_reflectance(point, out_dir)
    }

    /// Filter applied to the color arriving along a refracted ray.
    pub fn transmission_color(&self, point: &VisiblePoint, out_dir: Vec3, _transmit_dir: Vec3) -> Color {
        if !self.use_fresnel {
            return self.transmissive;
        }
        self.transmissive * (1.0 - self.fresnel_reflectance(point, out_dir))
    }

    /// Direction of the ray refracted through the surface with `normal`.
    ///
    /// The side of the surface is taken from the sign of `normal · incident`:
    /// a ray travelling against the normal is entering the material. Returns
    /// `None` on total internal reflection.
    pub fn refract_direction(&self, normal: Vec3, incident: Vec3) -> Option<Vec3> {
        let (normal, eta) = if normal.dot(incident) <= 0.0 {
            (normal, 1.0 / self.index_of_refraction)
        } else {
            (-normal, self.index_of_refraction)
        };
        refract(incident, normal, eta)
    }

    /// Schlick's approximation for the reflected fraction of light.
    fn fresnel_reflectance(&self, point: &VisiblePoint, out_dir: Vec3) -> f64 {
        let cosine = out_dir.dot(point.normal);
        let (eta, cosine) = if cosine >= 0.0 {
            (1.0 / self.index_of_refraction, cosine)
        } else {
            (self.index_of_refraction, -cosine)
        };
        // Inside the denser medium past the critical angle everything reflects
        let sin2_t = eta * eta * (1.0 - cosine * cosine);
        if sin2_t > 1.0 {
            return 1.0;
        }
        reflectance(cosine, eta)
    }
}

fn reflectance(cosine: f64, eta: f64) -> f64 {
    let r0 = ((1.0 - eta) / (1.0 + eta)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface whose normal faces the incoming
/// side. `eta` is the ratio of indices (incident over transmitted).
#[inline]
pub fn refract(uv: Vec3, n: Vec3, eta: f64) -> Option<Vec3> {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = eta * (uv + cos_theta * n);
    let parallel_sq = 1.0 - r_out_perp.length_squared();
    if parallel_sq < 0.0 {
        return None;
    }
    let r_out_parallel = -parallel_sq.sqrt() * n;
    Some((r_out_perp + r_out_parallel).normalize())
}
