//! A voice: one independently playing sound instance.
//!
//! A [`Sound`] couples a [`Sampler`] with the spatial state the mixer needs:
//! a world position, the positional flag, and (on the HRTF path) the ear taps
//! cached for the current mix quantum. Voice slots live in a fixed pool owned
//! by the engine; an unbound slot renders silence.

use crate::buffer::Frame;
use crate::hrtf::HrtfTable;
use crate::math::{Listener, Vec3};
use crate::pcm::PcmData;
use crate::sampler::{LoopMode, Sampler};
use crate::spatial::{compute_gains, direction_angles};

/// One voice slot.
#[derive(Debug, Clone, Default)]
pub struct Sound {
    sampler: Option<Sampler>,
    position: Vec3,
    positional: bool,
    /// Ear taps copied out of the table once per mix quantum (HRTF path).
    taps_left: Vec<f32>,
    taps_right: Vec<f32>,
    taps_valid: bool,
    /// Inverse-distance attenuation paired with the cached taps.
    spatial_volume: f32,
}

impl Sound {
    /// An empty, unbound voice slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a PCM source, replacing any previous binding. The playhead and
    /// regions reset to cover the whole source; `autoplay` arms the trigger.
    pub fn bind(
        &mut self,
        source: PcmData,
        loop_mode: LoopMode,
        autoplay: bool,
        positional: bool,
        position: Vec3,
    ) {
        log::debug!(
            "binding source {} ({} frames) positional={}",
            source.id(),
            source.frames(),
            positional
        );
        self.sampler = Some(Sampler::new(source, loop_mode, autoplay));
        self.position = position;
        self.positional = positional;
        self.taps_valid = false;
    }

    /// Free the slot; subsequent mixes render silence from it.
    pub fn unbind(&mut self) {
        self.sampler = None;
        self.taps_valid = false;
    }

    pub fn is_bound(&self) -> bool {
        self.sampler.is_some()
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the voice in world space. Meaningful only for positional voices.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn sampler(&self) -> Option<&Sampler> {
        self.sampler.as_ref()
    }

    pub fn sampler_mut(&mut self) -> Option<&mut Sampler> {
        self.sampler.as_mut()
    }

    pub fn is_playing(&self) -> bool {
        self.sampler.as_ref().is_some_and(Sampler::is_playing)
    }

    pub fn trigger(&mut self) {
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.trigger();
        }
    }

    pub fn stop(&mut self) {
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.stop();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.set_volume(volume);
        }
    }

    pub(crate) fn take_looped(&mut self) -> bool {
        self.sampler.as_mut().is_some_and(Sampler::take_looped)
    }

    pub(crate) fn take_finished(&mut self) -> bool {
        self.sampler.as_mut().is_some_and(Sampler::take_finished)
    }

    /// Refresh the cached ear taps and distance attenuation against the
    /// given listener pose. Called once per mix quantum on the HRTF path.
    ///
    /// On a lookup failure the voice keeps no taps and degrades to silence
    /// for the quantum; the playhead still advances.
    pub(crate) fn update_hrtf(&mut self, table: &HrtfTable, listener: &Listener) {
        if !self.positional || self.sampler.is_none() {
            return;
        }
        let (azimuth, elevation, distance) = direction_angles(self.position, listener);
        self.spatial_volume = 1.0 / distance;

        match table.nearest(azimuth, elevation) {
            Ok(taps) => {
                self.taps_left.clear();
                self.taps_left.extend_from_slice(taps.left);
                self.taps_right.clear();
                self.taps_right.extend_from_slice(taps.right);
                self.taps_valid = true;
            }
            Err(e) => {
                if self.taps_valid {
                    log::warn!("HRTF lookup failed, voice degrades to silence: {}", e);
                }
                self.taps_valid = false;
            }
        }
    }

    /// Produce this voice's contribution for one output frame.
    ///
    /// The sampler is advanced exactly once per call whatever the outcome:
    /// a stopped or degraded voice contributes silence but never skips a
    /// state transition.
    pub(crate) fn render(&mut self, listener: &Listener, use_hrtf: bool) -> Frame {
        let Some(sampler) = self.sampler.as_mut() else {
            return Frame::ZERO;
        };

        if !self.positional {
            return sampler.step_frame();
        }

        if use_hrtf {
            if self.taps_valid {
                sampler.step_filtered(&self.taps_left, &self.taps_right) * self.spatial_volume
            } else {
                sampler.step_frame();
                Frame::ZERO
            }
        } else {
            let gains = compute_gains(self.position, listener);
            gains.apply(sampler.step_frame())
        }
    }
}
