//! Scene description: everything the ray tracer needs to render a frame.

use kdtrace_math::Aabb;

use crate::error::{SceneError, SceneResult};
use crate::{CameraView, Color, Light, Material, MaterialId, Texture, TextureId, Viewable, VisiblePoint};

/// A viewable together with the texture drawn on it.
#[derive(Debug)]
struct SceneObject {
    viewable: Box<dyn Viewable>,
    texture: Option<TextureId>,
}

/// A complete scene containing objects, materials, lights and the camera.
///
/// Objects are addressed by their index, in the order they were added.
/// Indices stay valid for the lifetime of the scene: objects are never
/// removed.
#[derive(Debug)]
pub struct SceneDescription {
    materials: Vec<Material>,
    textures: Vec<Texture>,
    lights: Vec<Light>,
    objects: Vec<SceneObject>,
    global_ambient: Color,
    background: Color,
    camera: CameraView,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            textures: Vec::new(),
            lights: Vec::new(),
            objects: Vec::new(),
            global_ambient: Color::splat(0.2),
            background: Color::ZERO,
            camera: CameraView::default(),
        }
    }
}

impl SceneDescription {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global_ambient(mut self, color: Color) -> Self {
        self.global_ambient = color;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Add a material and return its ID.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len());
        self.materials.push(material);
        id
    }

    /// Add a texture and return its ID.
    pub fn add_texture(&mut self, texture: Texture) -> SceneResult<TextureId> {
        for material in texture.materials() {
            self.check_material(material)?;
        }
        let id = TextureId(self.textures.len());
        self.textures.push(texture);
        Ok(id)
    }

    /// Add a light and return its index.
    pub fn add_light(&mut self, light: Light) -> usize {
        if light.ambient == Color::ZERO && light.diffuse == Color::ZERO && light.specular == Color::ZERO {
            log::warn!("Light {} has no color and will not contribute", self.lights.len());
        }
        self.lights.push(light);
        self.lights.len() - 1
    }

    /// Add an object and return its index.
    pub fn add_viewable(&mut self, viewable: impl Viewable + 'static) -> SceneResult<usize> {
        self.push_object(Box::new(viewable), None)
    }

    /// Add an object drawn with `texture` and return its index.
    pub fn add_textured_viewable(
        &mut self,
        viewable: impl Viewable + 'static,
        texture: TextureId,
    ) -> SceneResult<usize> {
        if texture.0 >= self.textures.len() {
            return Err(SceneError::UnknownTexture(texture, self.textures.len()));
        }
        self.push_object(Box::new(viewable), Some(texture))
    }

    fn push_object(&mut self, viewable: Box<dyn Viewable>, texture: Option<TextureId>) -> SceneResult<usize> {
        self.check_material(viewable.material())?;
        self.check_material(viewable.inner_material())?;
        let index = self.objects.len();
        log::debug!("Adding object {index}: {viewable:?}");
        self.objects.push(SceneObject { viewable, texture });
        Ok(index)
    }

    fn check_material(&self, id: MaterialId) -> SceneResult<()> {
        if id.0 >= self.materials.len() {
            return Err(SceneError::UnknownMaterial(id, self.materials.len()));
        }
        Ok(())
    }

    /// Replace the camera after checking it can generate rays.
    pub fn set_camera(&mut self, camera: CameraView) -> SceneResult<()> {
        camera.validate()?;
        self.camera = camera;
        Ok(())
    }

    pub fn num_viewables(&self) -> usize {
        self.objects.len()
    }

    /// Object `index`. Panics if the index is out of range.
    pub fn viewable(&self, index: usize) -> &dyn Viewable {
        self.objects[index].viewable.as_ref()
    }

    pub fn num_lights(&self) -> usize {
        self.lights.len()
    }

    pub fn light(&self, index: usize) -> &Light {
        &self.lights[index]
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn num_materials(&self) -> usize {
        self.materials.len()
    }

    /// Material `id`. Ids handed out by this scene are always valid.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn global_ambient_light(&self) -> Color {
        self.global_ambient
    }

    pub fn background_color(&self) -> Color {
        self.background
    }

    pub fn camera(&self) -> &CameraView {
        &self.camera
    }

    /// Mutable camera access. Call [`CameraView::validate`] after editing.
    pub fn camera_mut(&mut self) -> &mut CameraView {
        &mut self.camera
    }

    /// Apply the texture of object `index`, if any, to a hit on it.
    pub fn apply_texture(&self, index: usize, point: &mut VisiblePoint) {
        if let Some(texture) = self.objects[index].texture {
            self.textures[texture.0].apply(point);
        }
    }

    /// Bounding box of all objects. Empty if the scene has no objects.
    pub fn bounding_box(&self) -> Aabb {
        self.objects
            .iter()
            .map(|object| object.viewable.aabb())
            .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, &b))
    }
}
