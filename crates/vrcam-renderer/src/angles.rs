//! Euler angle helpers for a Y-up coordinate system.
//!
//! Angles are radians. Yaw turns about +Y, pitch tilts the forward vector
//! toward +Y, and the roll angle is fed through the same yaw/pitch mapping to
//! build the lateral (eye separation) axis.

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Normalized pitch of a vector pointing straight down.
pub const POLE_DOWN: f32 = TAU - FRAC_PI_2;

/// Wrap any angle into `[0, 2π)`.
///
/// Non-finite input maps to `0.0` so a bad sample can never poison the
/// camera state.
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle difference into `[-π, π)`, the shortest signed arc.
pub fn shortest_arc(delta: f32) -> f32 {
    normalize_angle(delta + PI) - PI
}

/// Convert a yaw/pitch pair into a unit direction vector.
///
/// `tan` has period π, so pitches in `(π/2, 3π/2)` flip the horizontal
/// component to land in the backward hemisphere. Both poles are returned
/// exactly; close to them the tangent grows large and the result is
/// numerically sensitive.
pub fn angle_to_vector(yaw: f32, pitch: f32) -> Vec3 {
    let pitch = normalize_angle(pitch);

    if pitch == FRAC_PI_2 {
        return Vec3::Y;
    }
    if pitch == POLE_DOWN {
        return Vec3::NEG_Y;
    }

    let mut x = (-yaw).cos();
    let mut z = (-yaw).sin();
    let y = pitch.tan() * x.hypot(z);

    if pitch > FRAC_PI_2 && pitch < POLE_DOWN {
        x = -x;
        z = -z;
    }

    Vec3::new(x, y, z).normalize()
}

/// Recover `(yaw, pitch)` from a direction vector.
///
/// Inverse of [`angle_to_vector`] for pitches in `[-π/2, π/2]`. Returns
/// `None` for a zero or non-finite vector.
pub fn vector_to_angles(direction: Vec3) -> Option<(f32, f32)> {
    if !direction.is_finite() || direction == Vec3::ZERO {
        return None;
    }

    let horizontal = direction.x.hypot(direction.z);
    if horizontal == 0.0 {
        let pitch = if direction.y > 0.0 { FRAC_PI_2 } else { -FRAC_PI_2 };
        return Some((0.0, pitch));
    }

    let yaw = (-direction.z).atan2(direction.x);
    let pitch = (direction.y / horizontal).atan();
    Some((yaw, pitch))
}
