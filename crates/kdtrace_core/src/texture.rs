//! Procedural textures that modify a hit record.

use crate::error::{SceneError, SceneResult};
use crate::{MaterialId, VisiblePoint};

/// Index of a texture in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// A texture applied to the closest hit on a viewable.
#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    /// Checkerboard in UV space. Cells where the sum of the cell indices is
    /// odd are shaded with `material`; the others keep the viewable's own
    /// material.
    Checkered {
        material: MaterialId,
        u_width: f64,
        v_width: f64,
    },
}

impl Texture {
    pub fn checkered(material: MaterialId, u_width: f64, v_width: f64) -> SceneResult<Self> {
        if !(u_width > 0.0 && v_width > 0.0) {
            return Err(SceneError::InvalidTexture(format!(
                "checker cell {u_width}x{v_width} must be positive"
            )));
        }
        Ok(Texture::Checkered {
            material,
            u_width,
            v_width,
        })
    }

    /// Material ids this texture refers to.
    pub fn materials(&self) -> impl Iterator<Item = MaterialId> {
        match self {
            Texture::Checkered { material, .. } => std::iter::once(*material),
        }
    }

    /// Modify `point` in place. Points without texture coordinates are left
    /// untouched.
    pub fn apply(&self, point: &mut VisiblePoint) {
        let Some(uv) = point.uv else {
            return;
        };
        match self {
            Texture::Checkered {
                material,
                u_width,
                v_width,
            } => {
                let cell_u = (uv.x / u_width).floor() as i64;
                let cell_v = (uv.y / v_width).floor() as i64;
                if (cell_u + cell_v).rem_euclid(2) == 1 {
                    point.material = *material;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdtrace_math::Vec3;

    fn hit_at(u: f64, v: f64) -> VisiblePoint {
        VisiblePoint::new(Vec3::ZERO, Vec3::Z, MaterialId(0), -Vec3::Z).with_uv(u, v)
    }

    #[test]
    fn test_checkered_alternates() {
        let texture = Texture::checkered(MaterialId(7), 0.5, 0.25).unwrap();

        let mut p = hit_at(0.1, 0.1);
        texture.apply(&mut p);
        assert_eq!(p.material, MaterialId(0));

        let mut p = hit_at(0.6, 0.1);
        texture.apply(&mut p);
        assert_eq!(p.material, MaterialId(7));

        let mut p = hit_at(0.6, 0.3);
        texture.apply(&mut p);
        assert_eq!(p.material, MaterialId(0));

        // Negative coordinates continue the pattern
        let mut p = hit_at(-0.1, 0.1);
        texture.apply(&mut p);
        assert_eq!(p.material, MaterialId(7));
    }

    #[test]
    fn test_without_uv_is_untouched() {
        let texture = Texture::checkered(MaterialId(7), 0.5, 0.5).unwrap();
        let mut p = VisiblePoint::new(Vec3::ZERO, Vec3::Z, MaterialId(0), -Vec3::Z);
        texture.apply(&mut p);
        assert_eq!(p.material, MaterialId(0));
    }

    #[test]
    fn test_rejects_empty_cells() {
        assert!(Texture::checkered(MaterialId(0), 0.0, 1.0).is_err());
        assert!(Texture::checkered(MaterialId(0), 1.0, f64::NAN).is_err());
    }
}
