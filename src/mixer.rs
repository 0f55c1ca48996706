//! Per-buffer mixing pipeline.
//!
//! [`Mixer::mix`] drives every voice across one output buffer: it zeroes the
//! buffer, then for each output frame blends the listener pose and master
//! volume toward their end-of-buffer targets and accumulates each voice's
//! spatialized contribution. Interpolating per frame instead of per buffer is
//! what keeps a moving camera or a volume change from stepping audibly at
//! quantum boundaries.
//!
//! The mixer owns the interpolation baselines: after a non-empty mix the
//! `next` pose and target volume become the start point of the following
//! call. It performs no allocation and cannot fail; every per-voice error
//! condition degrades to silence for that voice and the buffer is always
//! written in full.

use crate::buffer::Frame;
use crate::hrtf::HrtfTable;
use crate::math::Listener;
use crate::sound::Sound;
use std::sync::Arc;

/// Stateful buffer mixer over a fixed voice pool.
pub struct Mixer {
    /// Pose the current quantum interpolates from.
    listener: Listener,
    /// Master volume the current quantum interpolates from.
    volume: f32,
    /// When present, positional voices render through HRTF convolution
    /// instead of pairwise panning.
    hrtf: Option<Arc<HrtfTable>>,
}

impl Mixer {
    /// A mixer starting from `listener`. The volume baseline starts at zero,
    /// so the first quantum fades in toward its target instead of popping.
    pub fn new(listener: Listener) -> Self {
        Self {
            listener,
            volume: 0.0,
            hrtf: None,
        }
    }

    /// Use HRTF convolution for positional voices.
    pub fn with_hrtf(mut self, table: Arc<HrtfTable>) -> Self {
        self.hrtf = Some(table);
        self
    }

    /// Start the volume baseline at `volume` instead of fading in from zero.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.max(0.0);
        self
    }

    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Mix one quantum of `voices` into `out`.
    ///
    /// Every frame of `out` is overwritten. Each voice's sampler advances
    /// exactly once per output frame regardless of its state or
    /// spatialization path, so playback position tracks real time even for
    /// silent voices. When `out` is non-empty, `next` and `target_volume`
    /// are persisted as the baselines for the following call.
    pub fn mix(
        &mut self,
        voices: &mut [Sound],
        out: &mut [Frame],
        next: &Listener,
        target_volume: f32,
    ) {
        out.fill(Frame::ZERO);
        let frame_count = out.len();

        // Tap refresh is per quantum, from the quantum-start pose; the
        // panner below re-derives its gains per frame instead.
        if let Some(table) = &self.hrtf {
            for voice in voices.iter_mut() {
                voice.update_hrtf(table, &self.listener);
            }
        }
        let use_hrtf = self.hrtf.is_some();

        for (j, slot) in out.iter_mut().enumerate() {
            let x = j as f32 / frame_count as f32;
            let listener = Listener::lerp(&self.listener, next, x);
            let volume = self.volume + (target_volume - self.volume) * x;
            for voice in voices.iter_mut() {
                *slot += voice.render(&listener, use_hrtf) * volume;
            }
        }

        if frame_count > 0 {
            self.listener = *next;
            self.volume = target_volume;
        }
    }
}
