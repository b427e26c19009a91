//! Point, spot and directional lights.

use kdtrace_math::Vec3;

use crate::Color;

/// Distance used to stand in for "infinitely far" when a directional light
/// needs a position, e.g. as the origin of a shadow feeler.
pub const DIRECTIONAL_LIGHT_DISTANCE: f64 = 1.0e6;

/// Spotlight cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spotlight {
    /// Unit direction the spot points in
    pub direction: Vec3,
    /// Cosine of the cone half-angle; points outside the cone are unlit
    pub cos_cutoff: f64,
    /// Falloff exponent applied to the cosine toward the cone edge
    pub exponent: f64,
}

/// Distance attenuation `1 / (constant + linear d + quadratic d^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f64,
    pub linear: f64,
    pub quadratic: f64,
}

impl Attenuation {
    pub fn factor(&self, distance: f64) -> f64 {
        let denom = self.constant + distance * (self.linear + distance * self.quadratic);
        if denom > 0.0 {
            1.0 / denom
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Placement {
    Positional(Vec3),
    /// Unit direction from the scene toward the light
    Directional(Vec3),
}

/// A light source for Phong shading.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    placement: Placement,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub spotlight: Option<Spotlight>,
    pub attenuation: Option<Attenuation>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            placement: Placement::Positional(Vec3::ZERO),
            ambient: Color::ZERO,
            diffuse: Color::ONE,
            specular: Color::ONE,
            spotlight: None,
            attenuation: None,
        }
    }
}

impl Light {
    /// White point light at `position`.
    pub fn point(position: Vec3) -> Self {
        Self {
            placement: Placement::Positional(position),
            ..Default::default()
        }
    }

    /// White light at infinity, shining from `toward_light`.
    pub fn directional(toward_light: Vec3) -> Self {
        Self {
            placement: Placement::Directional(toward_light.normalize()),
            ..Default::default()
        }
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

    /// Restrict the light to a cone around `direction`.
    pub fn with_spotlight(mut self, direction: Vec3, cutoff_degrees: f64, exponent: f64) -> Self {
        self.spotlight = Some(Spotlight {
            direction: direction.normalize(),
            cos_cutoff: cutoff_degrees.to_radians().cos(),
            exponent,
        });
        self
    }

    pub fn with_attenuation(mut self, constant: f64, linear: f64, quadratic: f64) -> Self {
        self.attenuation = Some(Attenuation {
            constant,
            linear,
            quadratic,
        });
        self
    }

    pub fn is_directional(&self) -> bool {
        matches!(self.placement, Placement::Directional(_))
    }

    /// Position of the light as seen from `point`.
    ///
    /// Directional lights are placed far away along their direction.
    pub fn position_from(&self, point: Vec3) -> Vec3 {
        match self.placement {
            Placement::Positional(position) => position,
            Placement::Directional(dir) => point + dir * DIRECTIONAL_LIGHT_DISTANCE,
        }
    }

    /// Unit vector from `point` toward the light, or `None` if `point` is
    /// at the light itself.
    pub fn direction_from(&self, point: Vec3) -> Option<Vec3> {
        match self.placement {
            Placement::Positional(position) => (position - point).try_normalize(),
            Placement::Directional(dir) => Some(dir),
        }
    }

    /// Spotlight and distance falloff for light arriving at `point`.
    pub fn falloff(&self, point: Vec3) -> f64 {
        let mut factor = 1.0;
        if let Placement::Positional(position) = self.placement {
            if let Some(spot) = &self.spotlight {
                let Some(to_point) = (point - position).try_normalize() else {
                    return factor;
                };
                let cos = to_point.dot(spot.direction);
                if cos < spot.cos_cutoff {
                    return 0.0;
                }
                factor *= cos.powf(spot.exponent);
            }
            if let Some(attenuation) = &self.attenuation {
                factor *= attenuation.factor(position.distance(point));
            }
        }
        factor
    }
}
