//! Head tracking from raw motion sensors.
//!
//! [`SensorFusionAdapter`] consumes one [`RawImuSample`] per frame, fuses
//! gyro and accelerometer into a smoothed rotation delta, and applies it to
//! anything implementing [`HeadRotation`] (normally the stereo camera).

pub mod fusion;
pub mod smoothing;
pub mod types;

pub use fusion::{HeadRotation, SensorFusionAdapter, DEFAULT_SMOOTHING_WINDOW, GRAVITY};
pub use smoothing::SmoothingFilter;
pub use types::{RawImuSample, RotationDelta};
