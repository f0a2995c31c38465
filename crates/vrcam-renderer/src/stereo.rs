use crate::angles::{angle_to_vector, normalize_angle, vector_to_angles};
use crate::camera::EyeCamera;
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI};

/// Which eye a camera, render target or image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left,
    Right,
}

/// Size of the final side-by-side frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Draws the scene for one eye.
///
/// Called exactly twice per [`StereoCamera::render`], once per eye.
pub trait EyeRenderer {
    type Image;
    type Error;

    fn render_eye(&mut self, eye: Eye, camera: &EyeCamera) -> Result<Self::Image, Self::Error>;
}

/// Owns the off-screen eye targets and the side-by-side output.
pub trait StereoCompositor {
    type Image;
    type Target;

    /// Bind an off-screen target for `eye` before its render call.
    fn acquire(&mut self, eye: Eye, size: DisplaySize) -> Self::Target;

    /// Unbind a target obtained from [`StereoCompositor::acquire`].
    fn release(&mut self, target: Self::Target);

    /// Place both eye images next to each other across the full display width.
    fn compose(&mut self, left: Self::Image, right: Self::Image, display: DisplaySize);
}

/// Releases an eye target when dropped, including on early return.
struct EyeTargetGuard<'a, C: StereoCompositor> {
    compositor: &'a mut C,
    target: Option<C::Target>,
}

impl<'a, C: StereoCompositor> EyeTargetGuard<'a, C> {
    fn acquire(compositor: &'a mut C, eye: Eye, size: DisplaySize) -> Self {
        let target = compositor.acquire(eye, size);
        Self {
            compositor,
            target: Some(target),
        }
    }
}

impl<C: StereoCompositor> Drop for EyeTargetGuard<'_, C> {
    fn drop(&mut self) {
        if let Some(target) = self.target.take() {
            self.compositor.release(target);
        }
    }
}

/// Head-mounted stereo camera.
///
/// Owns the head position and yaw/pitch/roll, derives the view direction,
/// up vector and both eye positions, and feeds two [`EyeCamera`]s offset
/// symmetrically by half the interpupillary distance.
pub struct StereoCamera {
    fov_y_degrees: f32,
    near: f32,
    far: f32,
    /// Interpupillary distance in world units.
    eye_distance: f32,
    viewport_width: f32,
    viewport_height: f32,

    position: Vec3,
    direction: Vec3,
    up: Vec3,
    /// Radians, always in `[0, 2π)`.
    yaw: f32,
    pitch: f32,
    roll: f32,

    left_position: Vec3,
    right_position: Vec3,

    left_eye: EyeCamera,
    right_eye: EyeCamera,
    display: DisplaySize,
}

impl StereoCamera {
    pub fn new(
        fov_y_degrees: f32,
        near: f32,
        far: f32,
        eye_distance: f32,
        viewport_width: f32,
        viewport_height: f32,
        display: DisplaySize,
    ) -> Self {
        let mut camera = Self {
            fov_y_degrees,
            near,
            far,
            eye_distance,
            viewport_width,
            viewport_height,
            position: Vec3::ZERO,
            direction: Vec3::ZERO,
            up: Vec3::Y,
            yaw: 0.0,
            pitch: 0.0,
            roll: PI,
            left_position: Vec3::ZERO,
            right_position: Vec3::ZERO,
            left_eye: EyeCamera::new(),
            right_eye: EyeCamera::new(),
            display,
        };

        camera.set_field_of_view(fov_y_degrees);
        camera.set_near(near);
        camera.set_far(far);
        camera.set_viewport_width(viewport_width);
        camera.set_viewport_height(viewport_height);
        camera.set_eye_distance(eye_distance);
        camera.update();
        camera
    }

    /// 90° field of view, near 0.00001, far 128, eye distance 0.5, viewport
    /// matching the display.
    pub fn with_display(display: DisplaySize) -> Self {
        Self::new(
            90.0,
            0.000_01,
            128.0,
            0.5,
            display.width as f32,
            display.height as f32,
            display,
        )
    }

    /// Push the current pose into both eye cameras and refresh their matrices.
    ///
    /// Call after any mutation and before [`StereoCamera::render`].
    pub fn update(&mut self) {
        let (left, right) = (self.left_position, self.right_position);
        let (direction, up) = (self.direction, self.up);

        for (eye, position) in [(&mut self.left_eye, left), (&mut self.right_eye, right)] {
            eye.position = position;
            eye.direction = direction;
            eye.up = up;
            eye.update();
        }
    }

    /// Render both eyes into their off-screen targets, then compose them
    /// side by side.
    ///
    /// Each eye target is released even if the renderer fails; on failure
    /// nothing is composed.
    pub fn render<R, C>(&self, renderer: &mut R, compositor: &mut C) -> Result<(), R::Error>
    where
        R: EyeRenderer<Image = C::Image>,
        C: StereoCompositor,
    {
        let left = self.render_eye(Eye::Left, renderer, compositor)?;
        let right = self.render_eye(Eye::Right, renderer, compositor)?;
        compositor.compose(left, right, self.display);
        Ok(())
    }

    fn render_eye<R, C>(
        &self,
        eye: Eye,
        renderer: &mut R,
        compositor: &mut C,
    ) -> Result<R::Image, R::Error>
    where
        R: EyeRenderer<Image = C::Image>,
        C: StereoCompositor,
    {
        let _target = EyeTargetGuard::acquire(compositor, eye, self.display);
        tracing::trace!(?eye, "Rendering eye");
        renderer.render_eye(eye, self.eye(eye))
    }

    /// Set absolute orientation in radians. Any finite input is accepted and
    /// wrapped into `[0, 2π)`.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.yaw = normalize_angle(yaw);
        self.pitch = normalize_angle(pitch);
        self.roll = normalize_angle(roll);

        self.direction = angle_to_vector(self.yaw, self.pitch);
        let lateral = angle_to_vector(self.yaw + FRAC_PI_2, self.roll);

        // Direction and lateral only coincide when both sit on a pole.
        let direction = self.direction;
        self.up = direction
            .cross(lateral)
            .try_normalize()
            .unwrap_or_else(|| direction.any_orthonormal_vector());

        let offset = lateral * (self.eye_distance / 2.0);
        self.left_position = self.position + offset;
        self.right_position = self.position - offset;
    }

    pub fn set_orientation_degrees(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.set_orientation(yaw.to_radians(), pitch.to_radians(), roll.to_radians());
    }

    /// Rotate by the given deltas in radians.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32, d_roll: f32) {
        self.set_orientation(self.yaw + d_yaw, self.pitch + d_pitch, self.roll + d_roll);
    }

    pub fn rotate_degrees(&mut self, d_yaw: f32, d_pitch: f32, d_roll: f32) {
        self.rotate(d_yaw.to_radians(), d_pitch.to_radians(), d_roll.to_radians());
    }

    /// Rigidly shift the head and both eyes. Eye offsets are not recomputed.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.left_position += delta;
        self.right_position += delta;
    }

    /// Move the head to `target` while keeping the current eye offsets.
    pub fn set_to_translation(&mut self, target: Vec3) {
        self.translate(target - self.position);
    }

    /// Face `point`, keeping the current roll.
    pub fn look_at(&mut self, point: Vec3) {
        self.set_direction(point - self.position);
    }

    /// Face along `direction`, keeping the current roll. A zero vector is ignored.
    pub fn set_direction(&mut self, direction: Vec3) {
        match vector_to_angles(direction) {
            Some((yaw, pitch)) => self.set_orientation(yaw, pitch, self.roll),
            None => tracing::warn!(?direction, "Ignoring degenerate view direction"),
        }
    }

    pub fn set_field_of_view(&mut self, fov_y_degrees: f32) {
        self.fov_y_degrees = fov_y_degrees;
        self.left_eye.fov_y_degrees = fov_y_degrees;
        self.right_eye.fov_y_degrees = fov_y_degrees;
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
        self.left_eye.near = near;
        self.right_eye.near = near;
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
        self.left_eye.far = far;
        self.right_eye.far = far;
    }

    /// Change the interpupillary distance; eye positions follow immediately.
    pub fn set_eye_distance(&mut self, eye_distance: f32) {
        self.eye_distance = eye_distance;
        self.set_orientation(self.yaw, self.pitch, self.roll);
        tracing::debug!(eye_distance, "Eye distance changed");
    }

    /// Total viewport width; each eye gets half.
    pub fn set_viewport_width(&mut self, viewport_width: f32) {
        self.viewport_width = viewport_width;
        self.left_eye.viewport_width = viewport_width / 2.0;
        self.right_eye.viewport_width = viewport_width / 2.0;
    }

    pub fn set_viewport_height(&mut self, viewport_height: f32) {
        self.viewport_height = viewport_height;
        self.left_eye.viewport_height = viewport_height;
        self.right_eye.viewport_height = viewport_height;
    }

    pub fn set_display(&mut self, display: DisplaySize) {
        self.display = display;
    }

    pub fn field_of_view(&self) -> f32 {
        self.fov_y_degrees
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn eye_distance(&self) -> f32 {
        self.eye_distance
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw.to_degrees()
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch.to_degrees()
    }

    pub fn roll_degrees(&self) -> f32 {
        self.roll.to_degrees()
    }

    pub fn left_position(&self) -> Vec3 {
        self.left_position
    }

    pub fn right_position(&self) -> Vec3 {
        self.right_position
    }

    pub fn eye(&self, eye: Eye) -> &EyeCamera {
        match eye {
            Eye::Left => &self.left_eye,
            Eye::Right => &self.right_eye,
        }
    }
}
