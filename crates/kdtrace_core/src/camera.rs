//! Pinhole camera and screen model.

use kdtrace_math::{Aabb, Vec3};

use crate::error::{SceneError, SceneResult};

/// Camera looking through a rectangular screen.
///
/// The screen sits `screen_distance` in front of the camera and is
/// `screen_width` by `screen_height` world units, divided into
/// `pixel_width` by `pixel_height` pixels. Pixel (0, 0) is the top-left
/// pixel; its center is at integer coordinates (0, 0).
#[derive(Debug, Clone, PartialEq)]
pub struct CameraView {
    position: Vec3,
    direction: Vec3,
    up: Vec3,
    screen_distance: f64,
    screen_width: f64,
    screen_height: f64,
    pixel_width: u32,
    pixel_height: u32,

    // Derived by update()
    right: Vec3,
    true_up: Vec3,
    pixel_du: Vec3,
    pixel_dv: Vec3,
    top_left: Vec3,
}

impl Default for CameraView {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            direction: -Vec3::Z,
            up: Vec3::Y,
            screen_distance: 10.0,
            screen_width: 5.0,
            screen_height: 5.0,
            pixel_width: 256,
            pixel_height: 256,
            right: Vec3::X,
            true_up: Vec3::Y,
            pixel_du: Vec3::ZERO,
            pixel_dv: Vec3::ZERO,
            top_left: Vec3::ZERO,
        };
        camera.update();
        camera
    }
}

impl CameraView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the camera at `position` looking toward `look_at`.
    pub fn with_position(mut self, position: Vec3, look_at: Vec3, up: Vec3) -> Self {
        self.position = position;
        self.direction = (look_at - position).normalize_or_zero();
        self.up = up;
        self.update();
        self
    }

    /// Set the screen distance and size in world units.
    pub fn with_screen(mut self, distance: f64, width: f64, height: f64) -> Self {
        self.screen_distance = distance;
        self.screen_width = width;
        self.screen_height = height;
        self.update();
        self
    }

    /// Set the image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.pixel_width = width;
        self.pixel_height = height;
        self.update();
        self
    }

    /// Camera looking down -z at `bounds`, with vertical field of view
    /// `fovy_degrees`, sized so the whole box is in view.
    pub fn framing(bounds: &Aabb, fovy_degrees: f64, pixel_width: u32, pixel_height: u32) -> SceneResult<Self> {
        if !(fovy_degrees > 0.0 && fovy_degrees < 180.0) {
            return Err(SceneError::InvalidCamera(format!(
                "field of view {fovy_degrees} is outside (0, 180)"
            )));
        }
        let (center, radius) = if bounds.is_empty() {
            (Vec3::ZERO, 1.0)
        } else {
            let radius = 0.5 * (bounds.max() - bounds.min()).length();
            (bounds.centroid(), radius.max(1e-3))
        };

        let half_angle = 0.5 * fovy_degrees.to_radians();
        let distance = radius / half_angle.sin();
        let screen_height = 2.0 * distance * half_angle.tan();
        let aspect = f64::from(pixel_width.max(1)) / f64::from(pixel_height.max(1));

        let camera = Self::new()
            .with_position(center + Vec3::Z * distance, center, Vec3::Y)
            .with_screen(distance, screen_height * aspect, screen_height)
            .with_resolution(pixel_width, pixel_height);
        camera.validate()?;
        Ok(camera)
    }

    fn update(&mut self) {
        self.right = self.direction.cross(self.up).normalize_or_zero();
        self.true_up = self.right.cross(self.direction);

        let width = f64::from(self.pixel_width.max(1));
        let height = f64::from(self.pixel_height.max(1));
        self.pixel_du = self.right * (self.screen_width / width);
        self.pixel_dv = self.true_up * (self.screen_height / height);

        let screen_center = self.position + self.direction * self.screen_distance;
        self.top_left = screen_center - self.right * (0.5 * self.screen_width)
            + self.true_up * (0.5 * self.screen_height)
            + 0.5 * (self.pixel_du - self.pixel_dv);
    }

    /// Check that the camera can generate rays.
    pub fn validate(&self) -> SceneResult<()> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return Err(SceneError::InvalidCamera(format!(
                "resolution {}x{} has no pixels",
                self.pixel_width, self.pixel_height
            )));
        }
        if self.direction == Vec3::ZERO {
            return Err(SceneError::InvalidCamera("view direction is zero".into()));
        }
        if self.right == Vec3::ZERO {
            return Err(SceneError::InvalidCamera(
                "up vector is parallel to the view direction".into(),
            ));
        }
        if !(self.screen_distance > 0.0 && self.screen_width > 0.0 && self.screen_height > 0.0) {
            return Err(SceneError::InvalidCamera(format!(
                "screen {}x{} at distance {} must be positive",
                self.screen_width, self.screen_height, self.screen_distance
            )));
        }
        Ok(())
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    /// World-space step of one pixel to the right.
    pub fn pixel_du(&self) -> Vec3 {
        self.pixel_du
    }

    /// World-space step of one pixel up.
    pub fn pixel_dv(&self) -> Vec3 {
        self.pixel_dv
    }

    /// Point on the screen at (possibly fractional) pixel coordinates.
    pub fn pixel_position(&self, x: f64, y: f64) -> Vec3 {
        self.top_left + x * self.pixel_du - y * self.pixel_dv
    }

    /// Unit direction from the camera through the given pixel coordinates.
    pub fn pixel_direction(&self, x: f64, y: f64) -> Vec3 {
        (self.pixel_position(x, y) - self.position).normalize()
    }
}
