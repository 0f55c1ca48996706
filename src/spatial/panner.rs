//! Pairwise stereo panner.
//!
//! The cheap alternative to HRTF convolution: split a source's energy across
//! left/right/center gains from its direction relative to the listener, and
//! attenuate by inverse distance. No filtering and no history, just
//! per-frame gain math, cheap enough to re-derive from the interpolated
//! listener pose on every output frame.

use crate::buffer::Frame;
use crate::math::{Listener, Vec3};
use crate::spatial::MIN_DISTANCE;

/// Gains for one (source, listener) pairing.
///
/// `left`, `right` and `center` are direction gains in [0, 1]; `volume` is
/// the inverse-distance attenuation, unbounded above for near sources (the
/// distance itself is clamped to [`MIN_DISTANCE`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGains {
    pub left: f32,
    pub right: f32,
    pub center: f32,
    pub volume: f32,
}

impl PanGains {
    /// Weigh a raw frame into an output frame: each ear takes its side gain
    /// plus the shared center gain, scaled by the distance attenuation.
    pub fn apply(&self, raw: Frame) -> Frame {
        Frame {
            left: raw.left * (self.left + self.center) * self.volume,
            right: raw.right * (self.right + self.center) * self.volume,
        }
    }
}

/// Derive panning gains for a source at `position` heard by `listener`.
///
/// The projection of the source direction onto the listener's left axis
/// drives the side gains (one of which is always zero), and the projection
/// onto the forward axis drives the center gain, so a source dead ahead (or
/// dead behind; front and back are not distinguished) concentrates entirely
/// in `center`. A source with no direction (coincident with the listener)
/// is treated as dead ahead.
pub fn compute_gains(position: Vec3, listener: &Listener) -> PanGains {
    let offset = position - listener.position;
    let volume = 1.0 / offset.length().max(MIN_DISTANCE);

    let Some(v) = offset.try_normalize() else {
        return PanGains {
            left: 0.0,
            right: 0.0,
            center: 1.0,
            volume,
        };
    };

    let sin = listener.left.dot(v);
    let cos = listener.forward.dot(v);

    PanGains {
        left: sin.max(0.0),
        right: sin.min(0.0).abs(),
        center: cos.abs(),
        volume,
    }
}
