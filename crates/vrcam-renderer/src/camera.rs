use glam::{Mat4, Vec3};

/// Perspective camera for one eye.
///
/// Pose fields are written by the owning stereo camera; the matrices are
/// cached and only refreshed by [`EyeCamera::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeCamera {
    pub position: Vec3,
    /// Unit view direction.
    pub direction: Vec3,
    /// Unit up vector, perpendicular to `direction`.
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    view: Mat4,
    projection: Mat4,
    combined: Mat4,
}

impl EyeCamera {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::X,
            up: Vec3::Y,
            fov_y_degrees: 90.0,
            near: 0.1,
            far: 100.0,
            viewport_width: 1.0,
            viewport_height: 1.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            combined: Mat4::IDENTITY,
        }
    }

    /// Recompute view, projection and combined matrices from the current fields.
    pub fn update(&mut self) {
        self.view = Mat4::look_to_rh(self.position, self.direction, self.up);
        self.projection = Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio(),
            self.near,
            self.far,
        );
        self.combined = self.projection * self.view;
    }

    /// Width / height of this eye's viewport. Falls back to 1 for an empty viewport.
    pub fn aspect_ratio(&self) -> f32 {
        if self.viewport_width > 0.0 && self.viewport_height > 0.0 {
            self.viewport_width / self.viewport_height
        } else {
            1.0
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Projection * view.
    pub fn combined_matrix(&self) -> Mat4 {
        self.combined
    }
}

impl Default for EyeCamera {
    fn default() -> Self {
        Self::new()
    }
}
