//! Listener-relative spatialization.
//!
//! Two rendering paths share this module: the pairwise [`panner`] derives
//! cheap left/right/center gains from the listener-relative direction, and
//! the HRTF convolution path uses [`direction_angles`] to turn a world-space
//! source position into the (azimuth, elevation) pair the tap table is
//! indexed by.

pub mod panner;

pub use panner::{PanGains, compute_gains};

use crate::math::{Listener, Vec3};

/// Distances below this clamp to it before inversion, bounding the
/// inverse-distance gain for sources on top of the listener.
pub const MIN_DISTANCE: f32 = 1e-3;

/// Listener-relative azimuth and elevation of a source, in degrees, plus the
/// distance between them.
///
/// Azimuth is positive toward the listener's right and zero straight ahead;
/// elevation is positive upward. A source exactly at the listener position
/// has no direction and reports straight ahead at the clamped distance.
pub fn direction_angles(source_position: Vec3, listener: &Listener) -> (f32, f32, f32) {
    let offset = source_position - listener.position;
    let distance = offset.length().max(MIN_DISTANCE);
    let Some(v) = offset.try_normalize() else {
        return (0.0, 0.0, distance);
    };

    let azimuth = f32::atan2(-v.dot(listener.left), v.dot(listener.forward)).to_degrees();
    let elevation = v.dot(listener.up()).clamp(-1.0, 1.0).asin().to_degrees();
    (azimuth, elevation, distance)
}
