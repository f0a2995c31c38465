use crate::smoothing::SmoothingFilter;
use crate::types::{RawImuSample, RotationDelta};
use glam::Vec3;
use vrcam_renderer::angles::{normalize_angle, shortest_arc};
use vrcam_renderer::StereoCamera;

/// Standard gravity, the accelerometer reading for 1g.
pub const GRAVITY: f32 = 9.81;

/// Default number of rates averaged per axis.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 4;

/// Anything that can be turned by an incremental yaw/pitch/roll in radians.
pub trait HeadRotation {
    fn rotate(&mut self, d_yaw: f32, d_pitch: f32, d_roll: f32);
}

impl HeadRotation for StereoCamera {
    fn rotate(&mut self, d_yaw: f32, d_pitch: f32, d_roll: f32) {
        StereoCamera::rotate(self, d_yaw, d_pitch, d_roll);
    }
}

/// Turns raw gyro + accelerometer readings into smoothed head rotation.
///
/// Yaw is pure gyro integration and drifts. Pitch and roll average the
/// gravity-derived tilt with the gyro rate, so they settle on the absolute
/// tilt while still reacting to fast motion. The adapter tracks its own
/// running yaw/pitch/roll and only ever hands deltas to the camera.
pub struct SensorFusionAdapter {
    /// Tracked orientation (radians), the sum of all applied deltas.
    yaw: f32,
    pitch: f32,
    roll: f32,
    /// Integrated gyro yaw, kept in `[0, 2π)`.
    measured_yaw: f32,

    calib_yaw: f32,
    calib_pitch: f32,
    calib_roll: f32,

    factor_yaw: f32,
    factor_pitch: f32,
    factor_roll: f32,

    yaw_filter: SmoothingFilter,
    pitch_filter: SmoothingFilter,
    roll_filter: SmoothingFilter,

    logging: bool,
}

impl SensorFusionAdapter {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            measured_yaw: 0.0,
            calib_yaw: 0.0,
            calib_pitch: 0.0,
            calib_roll: 0.0,
            factor_yaw: 1.0,
            factor_pitch: 1.0,
            factor_roll: 1.0,
            yaw_filter: SmoothingFilter::new(DEFAULT_SMOOTHING_WINDOW),
            pitch_filter: SmoothingFilter::new(DEFAULT_SMOOTHING_WINDOW),
            roll_filter: SmoothingFilter::new(DEFAULT_SMOOTHING_WINDOW),
            logging: false,
        }
    }

    /// Fuse one frame of sensor data and rotate `head` by the smoothed delta.
    ///
    /// Returns the delta before sensitivity factors are applied. Frames with a
    /// non-positive or non-finite `dt` are skipped and return zero.
    pub fn update<H: HeadRotation>(
        &mut self,
        head: &mut H,
        dt: f32,
        sample: &RawImuSample,
    ) -> RotationDelta {
        if !(dt > 0.0 && dt.is_finite()) {
            tracing::trace!(dt, "Skipping fusion frame with unusable time step");
            return RotationDelta::ZERO;
        }

        self.measured_yaw = normalize_angle(self.measured_yaw + sample.gyro.x * dt);

        let accel_magnitude = sample.accel.length();
        let yaw_error = finite_or_zero(shortest_arc(self.measured_yaw - self.yaw));
        let pitch_error = finite_or_zero(tilt(sample.accel.z, accel_magnitude) - self.pitch);
        let roll_error = finite_or_zero(tilt(sample.accel.y, accel_magnitude) - self.roll);

        let delta = RotationDelta {
            yaw: self.yaw_filter.observe(yaw_error, dt),
            pitch: self
                .pitch_filter
                .observe((pitch_error + sample.gyro.y * dt) / 2.0, dt),
            roll: self
                .roll_filter
                .observe((roll_error + sample.gyro.z * dt) / 2.0, dt),
        };

        self.yaw = normalize_angle(self.yaw + delta.yaw);
        self.pitch += delta.pitch;
        self.roll += delta.roll;

        head.rotate(
            self.factor_yaw * delta.yaw,
            self.factor_pitch * delta.pitch,
            self.factor_roll * delta.roll,
        );

        if self.logging {
            tracing::debug!(
                yaw = self.yaw.to_degrees(),
                pitch = self.pitch.to_degrees(),
                roll = self.roll.to_degrees(),
                d_yaw = delta.yaw,
                d_pitch = delta.pitch,
                d_roll = delta.roll,
                "Fused rotation"
            );
        }

        delta
    }

    /// One-shot re-centering from the current accelerometer reading.
    ///
    /// Yaw has no absolute reference, so its offset is the tracked yaw.
    pub fn calibrate<H: HeadRotation>(&mut self, head: &mut H, accel: Vec3) {
        self.calib_yaw = self.yaw;
        self.calib_pitch = finite_or_zero((accel.z / GRAVITY).clamp(-1.0, 1.0).asin());
        self.calib_roll = finite_or_zero((accel.y / GRAVITY).clamp(-1.0, 1.0).asin());

        head.rotate(self.calib_yaw, self.calib_pitch, self.calib_roll);

        tracing::info!(
            calib_yaw = self.calib_yaw,
            calib_pitch = self.calib_pitch,
            calib_roll = self.calib_roll,
            "Calibration applied"
        );
    }

    /// Store a yaw offset (radians) and turn `head` by it.
    pub fn set_calib_yaw<H: HeadRotation>(&mut self, head: &mut H, calib_yaw: f32) {
        self.calib_yaw = calib_yaw;
        head.rotate(calib_yaw, 0.0, 0.0);
    }

    pub fn set_calib_pitch<H: HeadRotation>(&mut self, head: &mut H, calib_pitch: f32) {
        self.calib_pitch = calib_pitch;
        head.rotate(0.0, calib_pitch, 0.0);
    }

    pub fn set_calib_roll<H: HeadRotation>(&mut self, head: &mut H, calib_roll: f32) {
        self.calib_roll = calib_roll;
        head.rotate(0.0, 0.0, calib_roll);
    }

    /// Set the smoothing window on all three axes. History is discarded and a
    /// zero window becomes 1.
    pub fn set_smoothing_window(&mut self, window: usize) {
        let window = window.max(1);
        self.yaw_filter.resize(window);
        self.pitch_filter.resize(window);
        self.roll_filter.resize(window);
        tracing::debug!(window, "Smoothing window changed");
    }

    pub fn smoothing_window(&self) -> usize {
        self.yaw_filter.window()
    }

    pub fn set_factor_yaw(&mut self, factor: f32) {
        self.factor_yaw = factor;
    }

    pub fn set_factor_pitch(&mut self, factor: f32) {
        self.factor_pitch = factor;
    }

    pub fn set_factor_roll(&mut self, factor: f32) {
        self.factor_roll = factor;
    }

    pub fn factor_yaw(&self) -> f32 {
        self.factor_yaw
    }

    pub fn factor_pitch(&self) -> f32 {
        self.factor_pitch
    }

    pub fn factor_roll(&self) -> f32 {
        self.factor_roll
    }

    pub fn calib_yaw(&self) -> f32 {
        self.calib_yaw
    }

    pub fn calib_pitch(&self) -> f32 {
        self.calib_pitch
    }

    pub fn calib_roll(&self) -> f32 {
        self.calib_roll
    }

    pub fn set_logging(&mut self, logging: bool) {
        self.logging = logging;
    }

    pub fn is_logging(&self) -> bool {
        self.logging
    }

    /// Tracked yaw in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }
}

impl Default for SensorFusionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Gravity-referenced tilt from one accelerometer axis. NaN for a zero reading.
fn tilt(component: f32, magnitude: f32) -> f32 {
    (component / magnitude).clamp(-1.0, 1.0).asin()
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, TAU};
    use vrcam_renderer::DisplaySize;

    #[derive(Default)]
    struct RecordingHead {
        rotations: Vec<(f32, f32, f32)>,
    }

    impl HeadRotation for RecordingHead {
        fn rotate(&mut self, d_yaw: f32, d_pitch: f32, d_roll: f32) {
            self.rotations.push((d_yaw, d_pitch, d_roll));
        }
    }

    fn sample(gyro: Vec3, accel: Vec3) -> RawImuSample {
        RawImuSample::new(gyro, accel)
    }

    #[test]
    fn roll_converges_to_gravity_tilt() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();
        let reading = sample(Vec3::ZERO, Vec3::new(0.0, GRAVITY, 0.0));

        for _ in 0..200 {
            adapter.update(&mut head, 1.0, &reading);
        }

        assert!((adapter.roll() - FRAC_PI_2).abs() < 1e-3, "roll {}", adapter.roll());
        assert!(adapter.pitch().abs() < 1e-6);
        assert!(adapter.yaw().abs() < 1e-6);
    }

    #[test]
    fn pitch_converges_to_gravity_tilt() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();
        let reading = sample(Vec3::ZERO, Vec3::new(0.0, 0.0, GRAVITY));

        for _ in 0..200 {
            adapter.update(&mut head, 1.0, &reading);
        }

        assert!((adapter.pitch() - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn zero_acceleration_never_produces_nan() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();

        for i in 0..20 {
            let gyro = Vec3::new(0.3, -0.2, 0.1) * i as f32;
            let delta = adapter.update(&mut head, 0.016, &sample(gyro, Vec3::ZERO));
            assert!(delta.is_finite());
        }

        assert!(head
            .rotations
            .iter()
            .all(|(y, p, r)| y.is_finite() && p.is_finite() && r.is_finite()));
        assert!(adapter.yaw().is_finite());
        assert!(adapter.pitch().is_finite());
        assert!(adapter.roll().is_finite());
    }

    #[test]
    fn yaw_follows_integrated_gyro() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();
        let reading = sample(Vec3::new(0.5, 0.0, 0.0), Vec3::new(GRAVITY, 0.0, 0.0));

        for _ in 0..40 {
            adapter.update(&mut head, 0.1, &reading);
        }

        assert!((adapter.yaw() - 2.0).abs() < 1e-3, "yaw {}", adapter.yaw());
        let applied: f32 = head.rotations.iter().map(|(y, _, _)| y).sum();
        assert!((applied - 2.0).abs() < 1e-3);
    }

    #[test]
    fn yaw_crossing_full_turn_has_no_jump() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();
        let reading = sample(Vec3::new(1.0, 0.0, 0.0), Vec3::new(GRAVITY, 0.0, 0.0));

        for _ in 0..100 {
            adapter.update(&mut head, 0.1, &reading);
        }

        assert!(head.rotations.iter().all(|(y, _, _)| y.abs() < 0.2));
        assert!((0.0..TAU).contains(&adapter.yaw()));
    }

    #[test]
    fn zero_factor_disables_axis() {
        let mut adapter = SensorFusionAdapter::new();
        adapter.set_factor_roll(0.0);
        adapter.set_factor_yaw(2.0);
        let mut head = RecordingHead::default();
        let reading = sample(Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.0, GRAVITY, 0.0));

        let delta = adapter.update(&mut head, 0.5, &reading);

        let (y, _, r) = head.rotations[0];
        assert_eq!(r, 0.0);
        assert!(delta.roll > 0.0);
        assert!((y - 2.0 * delta.yaw).abs() < 1e-6);
    }

    #[test]
    fn unusable_time_step_is_skipped() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();
        let reading = sample(Vec3::ONE, Vec3::new(0.0, GRAVITY, 0.0));

        for dt in [0.0, -1.0, f32::NAN] {
            assert_eq!(adapter.update(&mut head, dt, &reading), RotationDelta::ZERO);
        }
        assert!(head.rotations.is_empty());
    }

    #[test]
    fn calibrate_rotates_by_gravity_tilt() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();

        adapter.calibrate(&mut head, Vec3::new(0.0, 0.0, GRAVITY));

        assert_eq!(adapter.calib_yaw(), 0.0);
        assert!((adapter.calib_pitch() - FRAC_PI_2).abs() < 1e-6);
        assert!(adapter.calib_roll().abs() < 1e-6);
        assert_eq!(head.rotations.len(), 1);
        assert!((head.rotations[0].1 - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn calibrate_clamps_over_range_reading() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();

        adapter.calibrate(&mut head, Vec3::new(0.0, -2.0 * GRAVITY, 0.0));

        assert!((adapter.calib_roll() + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn calib_setters_rotate_single_axis() {
        let mut adapter = SensorFusionAdapter::new();
        let mut head = RecordingHead::default();

        adapter.set_calib_yaw(&mut head, 0.1);
        adapter.set_calib_pitch(&mut head, 0.2);
        adapter.set_calib_roll(&mut head, 0.3);

        assert_eq!(
            head.rotations,
            vec![(0.1, 0.0, 0.0), (0.0, 0.2, 0.0), (0.0, 0.0, 0.3)]
        );
        assert_eq!(adapter.calib_roll(), 0.3);
    }

    #[test]
    fn logging_toggle_does_not_change_output() {
        let reading = sample(Vec3::new(0.3, 0.1, -0.2), Vec3::new(1.0, 4.0, GRAVITY));
        let mut quiet = SensorFusionAdapter::new();
        let mut verbose = SensorFusionAdapter::new();
        verbose.set_logging(true);
        assert!(verbose.is_logging());
        assert!(!quiet.is_logging());

        let mut head = RecordingHead::default();
        for _ in 0..10 {
            let a = quiet.update(&mut head, 0.02, &reading);
            let b = verbose.update(&mut head, 0.02, &reading);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn smoothing_window_coerced_to_one() {
        let mut adapter = SensorFusionAdapter::new();
        assert_eq!(adapter.smoothing_window(), DEFAULT_SMOOTHING_WINDOW);
        adapter.set_smoothing_window(0);
        assert_eq!(adapter.smoothing_window(), 1);
        adapter.set_smoothing_window(8);
        assert_eq!(adapter.smoothing_window(), 8);
    }

    #[test]
    fn drives_stereo_camera() {
        let mut camera = StereoCamera::with_display(DisplaySize::new(1280, 720));
        let mut adapter = SensorFusionAdapter::new();
        let start_roll = camera.roll();

        for i in 0..120 {
            let t = i as f32 * 0.016;
            let reading = sample(
                Vec3::new(0.4 * t.cos(), 0.1, -0.05),
                Vec3::new(0.5, 2.0 * t.sin(), GRAVITY),
            );
            adapter.update(&mut camera, 0.016, &reading);
            camera.update();

            for angle in [camera.yaw(), camera.pitch(), camera.roll()] {
                assert!((0.0..TAU).contains(&angle));
            }
            assert!((camera.direction().length() - 1.0).abs() < 1e-5);
        }

        assert!(camera.roll() != start_roll);
    }
}
