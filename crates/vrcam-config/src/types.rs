use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Field of view must be in (0, 180) degrees, got {0}")]
    FieldOfView(f32),
    #[error("Clip planes must satisfy 0 < near < far, got near {near} far {far}")]
    ClipPlanes { near: f32, far: f32 },
    #[error("Eye distance must be finite and non-negative, got {0}")]
    EyeDistance(f32),
    #[error("Viewport must be positive, got {width}x{height}")]
    Viewport { width: f32, height: f32 },
    #[error("Display must be positive, got {width}x{height}")]
    Display { width: u32, height: u32 },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Stereo camera setup.
    pub camera: CameraConfig,
    /// Head tracking tuning.
    pub fusion: FusionConfig,
    /// Size of the side-by-side output frame.
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Reject settings the camera cannot render with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        self.display.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view per eye in degrees.
    pub field_of_view: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Distance between the eyes in world units.
    pub eye_distance: f32,
    /// Total viewport width, split evenly between the eyes.
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Initial head position.
    #[serde(with = "vec3_serde")]
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            field_of_view: 90.0,
            near: 0.000_01,
            far: 128.0,
            eye_distance: 0.5,
            viewport_width: 1920.0,
            viewport_height: 1080.0,
            position: Vec3::ZERO,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.field_of_view > 0.0 && self.field_of_view < 180.0) {
            return Err(ConfigError::FieldOfView(self.field_of_view));
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(ConfigError::ClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        if !(self.eye_distance >= 0.0 && self.eye_distance.is_finite()) {
            return Err(ConfigError::EyeDistance(self.eye_distance));
        }
        if !(self.viewport_width > 0.0 && self.viewport_height > 0.0) {
            return Err(ConfigError::Viewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Rates averaged per axis by the smoothing filter. Values below 1 are
    /// raised to 1 by [`FusionConfig::window`].
    pub smoothing_window: i64,
    /// Per-axis sensitivity; 0 disables an axis.
    pub factor_yaw: f32,
    pub factor_pitch: f32,
    pub factor_roll: f32,
    /// Calibration offsets in radians, applied once at startup.
    pub calib_yaw: f32,
    pub calib_pitch: f32,
    pub calib_roll: f32,
    /// Log the fused rotation every frame.
    pub logging: bool,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 4,
            factor_yaw: 1.0,
            factor_pitch: 1.0,
            factor_roll: 1.0,
            calib_yaw: 0.0,
            calib_pitch: 0.0,
            calib_roll: 0.0,
            logging: false,
        }
    }
}

impl FusionConfig {
    /// Smoothing window coerced to at least 1.
    pub fn window(&self) -> usize {
        usize::try_from(self.smoothing_window.max(1)).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Display {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

// glam's serde output is a struct; plain arrays read better in TOML.
mod vec3_serde {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        [v.x, v.y, v.z].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        let [x, y, z] = <[f32; 3]>::deserialize(d)?;
        Ok(Vec3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(AppConfig::default().validate(), Ok(()));
    }

    #[test]
    fn toml_round_trip_keeps_position() {
        let mut config = AppConfig::default();
        config.camera.position = Vec3::new(1.0, 2.0, 3.0);
        config.fusion.smoothing_window = 6;

        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("position = ["));

        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(parsed.fusion.smoothing_window, 6);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [camera]
            eye_distance = 0.064

            [fusion]
            logging = true
            "#,
        )
        .unwrap();

        assert_eq!(parsed.camera.eye_distance, 0.064);
        assert_eq!(parsed.camera.field_of_view, 90.0);
        assert!(parsed.fusion.logging);
        assert_eq!(parsed.fusion.factor_yaw, 1.0);
        assert_eq!(parsed.display.width, 1920);
    }

    #[test]
    fn non_positive_window_coerced_to_one() {
        let parsed: AppConfig = toml::from_str("[fusion]\nsmoothing_window = -2\n").unwrap();
        assert_eq!(parsed.fusion.smoothing_window, -2);
        assert_eq!(parsed.fusion.window(), 1);

        let parsed: AppConfig = toml::from_str("[fusion]\nsmoothing_window = 0\n").unwrap();
        assert_eq!(parsed.fusion.window(), 1);

        let parsed: AppConfig = toml::from_str("[fusion]\nsmoothing_window = 7\n").unwrap();
        assert_eq!(parsed.fusion.window(), 7);
        assert_eq!(parsed.camera.field_of_view, 90.0);
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let mut config = AppConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ClipPlanes {
                near: 10.0,
                far: 1.0
            })
        );
    }

    #[test]
    fn rejects_bad_fov_and_eye_distance() {
        let mut config = AppConfig::default();
        config.camera.field_of_view = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::FieldOfView(0.0)));

        config.camera.field_of_view = 60.0;
        config.camera.eye_distance = -0.1;
        assert_eq!(config.validate(), Err(ConfigError::EyeDistance(-0.1)));
    }

    #[test]
    fn rejects_empty_display() {
        let mut config = AppConfig::default();
        config.display.height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Display { .. })));
    }
}
