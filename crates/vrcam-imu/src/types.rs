use glam::Vec3;

/// Raw sensor reading for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawImuSample {
    /// Gyroscope angular velocity (rad/s).
    pub gyro: Vec3,
    /// Accelerometer linear acceleration including gravity (m/s^2).
    pub accel: Vec3,
}

impl RawImuSample {
    pub fn new(gyro: Vec3, accel: Vec3) -> Self {
        Self { gyro, accel }
    }
}

impl Default for RawImuSample {
    fn default() -> Self {
        Self {
            gyro: Vec3::ZERO,
            accel: Vec3::ZERO,
        }
    }
}

/// Incremental head rotation in radians, produced once per fused frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationDelta {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl RotationDelta {
    pub const ZERO: Self = Self {
        yaw: 0.0,
        pitch: 0.0,
        roll: 0.0,
    };

    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}
