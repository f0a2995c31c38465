//! Stereo camera model for head-mounted displays.
//!
//! [`stereo::StereoCamera`] owns the head pose and derives the two per-eye
//! cameras; the actual drawing and side-by-side composition are supplied by
//! the caller through [`stereo::EyeRenderer`] and [`stereo::StereoCompositor`].

pub mod angles;
pub mod camera;
pub mod stereo;

pub use camera::EyeCamera;
pub use stereo::{DisplaySize, Eye, EyeRenderer, StereoCamera, StereoCompositor};
