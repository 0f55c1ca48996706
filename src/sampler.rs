//! Per-voice playback-head state machine.
//!
//! A [`Sampler`] owns the read position into one PCM source and advances it
//! one tick at a time under play/stop/loop/trigger control. It is the only
//! component that touches raw sample data; everything above it (spatialization,
//! mixing) works on the float samples and frames it produces.
//!
//! Stepping is deliberately branch-light and allocation-free: the mixer calls
//! into it once per voice per output frame from the real-time path.

use crate::buffer::Frame;
use crate::error::{AuricleError, Result};
use crate::pcm::{Channels, PcmData};

/// Playback state of a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// No audio is emitted; the playhead holds its position.
    Stopped,
    /// The playhead advances and samples are emitted.
    Playing,
}

/// Loop mode selected when binding a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Play to the end, then stop and rewind.
    #[default]
    Once,
    /// Wrap to the loop start at the end and keep playing.
    Infinite,
}

/// Playback-head state machine over one PCM source.
///
/// All public region setters take frame indices; internally the cursor and
/// bounds are kept in raw interleaved-sample units so that a stereo source
/// can be stepped one channel at a time through its interleaved data.
#[derive(Debug, Clone)]
pub struct Sampler {
    source: PcmData,
    state: PlayState,
    /// Raw index playback (re)starts from.
    start: usize,
    /// Raw index one past the playable region.
    end: usize,
    /// Raw index of the next sample to read.
    cursor: usize,
    loop_enabled: bool,
    loop_start: usize,
    loop_end: usize,
    /// One-shot restart request, consumed by the next step.
    trigger: bool,
    volume: f32,
    /// Set on loop wraparound; drained by the engine for event emission.
    looped: bool,
    /// Set when a one-shot reaches its region end; drained like `looped`.
    finished: bool,
}

fn sample_to_f32(sample: i16) -> f32 {
    sample as f32 / i16::MAX as f32
}

impl Sampler {
    /// Bind a PCM source with the full sample range as both the playback and
    /// loop region. `autoplay` arms the trigger so the first step starts
    /// playback.
    pub fn new(source: PcmData, loop_mode: LoopMode, autoplay: bool) -> Self {
        let end = source.raw_len();
        Self {
            source,
            state: PlayState::Stopped,
            start: 0,
            end,
            cursor: 0,
            loop_enabled: matches!(loop_mode, LoopMode::Infinite),
            loop_start: 0,
            loop_end: end,
            trigger: autoplay,
            volume: 1.0,
            looped: false,
            finished: false,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn source(&self) -> &PcmData {
        &self.source
    }

    /// Current playhead position in frames.
    pub fn position(&self) -> usize {
        self.cursor / self.source.channels().stride()
    }

    /// Request a (re)start: a stopped sampler transitions to playing without
    /// moving the playhead, a playing one restarts from the region start.
    /// Consumed by the next step; repeated steps without a new trigger are
    /// unaffected.
    pub fn trigger(&mut self) {
        self.trigger = true;
    }

    /// Halt playback. The playhead keeps its position so a later trigger
    /// resumes from where it stopped.
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.trigger = false;
    }

    /// Per-voice gain applied to every emitted sample. Negative values clamp
    /// to silence.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.max(0.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Bound the playable region in frames. `end` may be at most the source
    /// length; an inverted region is a configuration error.
    pub fn set_region(&mut self, start: usize, end: usize) -> Result<()> {
        let (start, end) = self.checked_region(start, end)?;
        self.start = start;
        self.end = end;
        Ok(())
    }

    /// Bound the loop region in frames, used on wraparound when looping.
    pub fn set_loop_region(&mut self, start: usize, end: usize) -> Result<()> {
        let (start, end) = self.checked_region(start, end)?;
        self.loop_start = start;
        self.loop_end = end;
        Ok(())
    }

    fn checked_region(&self, start: usize, end: usize) -> Result<(usize, usize)> {
        if start > end || end > self.source.frames() {
            return Err(AuricleError::Configuration(format!(
                "region {}..{} out of bounds for {}-frame source",
                start,
                end,
                self.source.frames()
            )));
        }
        let stride = self.source.channels().stride();
        Ok((start * stride, end * stride))
    }

    /// True once per loop wraparound; reading clears the flag.
    pub(crate) fn take_looped(&mut self) -> bool {
        std::mem::take(&mut self.looped)
    }

    /// True once per play-to-the-end stop; reading clears the flag.
    pub(crate) fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }

    /// Consume a pending trigger and handle end-of-region, in that order.
    ///
    /// The end check runs before state dispatch so a looping sampler that
    /// finished on the previous step resumes at the loop start within the
    /// same step instead of going silent for one tick.
    fn begin_step(&mut self) {
        if self.trigger {
            self.trigger = false;
            match self.state {
                PlayState::Playing => self.cursor = self.start,
                PlayState::Stopped => self.state = PlayState::Playing,
            }
        }

        if self.loop_enabled {
            if self.cursor >= self.loop_end {
                self.cursor = self.loop_start;
                self.looped = true;
            }
        } else if self.cursor >= self.end {
            if self.state == PlayState::Playing {
                self.finished = true;
            }
            self.state = PlayState::Stopped;
            self.cursor = self.start;
        }
    }

    /// Advance one tick and return the sample under the playhead.
    ///
    /// Mono callers get one frame per call. Stereo callers call twice per
    /// frame (left, then right) and the cursor walks the interleaved data
    /// one channel at a time.
    pub fn step(&mut self) -> f32 {
        self.begin_step();
        match self.state {
            PlayState::Stopped => 0.0,
            PlayState::Playing => {
                let sample = sample_to_f32(self.source.raw(self.cursor));
                self.cursor += 1;
                sample * self.volume
            }
        }
    }

    /// Advance exactly one frame, fanning mono sources out to both channels.
    pub fn step_frame(&mut self) -> Frame {
        match self.source.channels() {
            Channels::Mono => Frame::splat(self.step()),
            Channels::Stereo => {
                let left = self.step();
                let right = self.step();
                Frame::new(left, right)
            }
        }
    }

    /// Advance one frame while applying a causal FIR filter pair to the
    /// trailing sample history, producing one binaural stereo frame.
    ///
    /// Tap `i` weighs the sample `i` frames behind the playhead; taps that
    /// would reach before the first sample are skipped. The plain [`step`]
    /// path is this with a single unit tap.
    ///
    /// [`step`]: Sampler::step
    pub fn step_filtered(&mut self, taps_left: &[f32], taps_right: &[f32]) -> Frame {
        self.begin_step();
        match self.state {
            PlayState::Stopped => Frame::ZERO,
            PlayState::Playing => {
                let stride = self.source.channels().stride();
                let mut left = 0.0f32;
                let mut right = 0.0f32;
                for (i, (tap_l, tap_r)) in taps_left.iter().zip(taps_right.iter()).enumerate() {
                    let Some(index) = self.cursor.checked_sub(i * stride) else {
                        break;
                    };
                    let sample = sample_to_f32(self.source.raw(index));
                    left += tap_l * sample;
                    right += tap_r * sample;
                }
                self.cursor += stride;
                Frame::new(left * self.volume, right * self.volume)
            }
        }
    }
}
