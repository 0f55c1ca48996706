//! PCM sample storage.
//!
//! [`PcmData`] is the read-only source material a voice plays from: a run of
//! interleaved 16-bit samples plus the header metadata (channel layout, sample
//! rate) needed to play it back. Instances are cheaply cloneable and shared;
//! the same `PcmData` can back any number of voices at once, and a voice keeps
//! its source alive for as long as it is bound.

mod loader;

pub use loader::{PcmLoader, SymphoniaLoader};

use crate::error::{AuricleError, Result};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Channel layout of a PCM source.
///
/// Playback only distinguishes mono from stereo, so the layout is a closed
/// enum rather than a raw channel count. Stereo data is interleaved
/// `[L0, R0, L1, R1, ...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Number of interleaved samples that make up one frame.
    pub fn stride(self) -> usize {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }

    pub fn count(self) -> u16 {
        self.stride() as u16
    }

    pub fn from_count(count: u16) -> Result<Self> {
        match count {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            n => Err(AuricleError::AudioFormat(format!(
                "unsupported channel count: {} (expected 1 or 2)",
                n
            ))),
        }
    }
}

#[derive(Debug)]
struct PcmInner {
    id: Uuid,
    samples: Vec<i16>,
    channels: Channels,
    sample_rate: u32,
    frames: usize,
}

/// Immutable, reference-counted PCM sample data.
#[derive(Debug, Clone)]
pub struct PcmData {
    inner: Arc<PcmInner>,
}

impl PcmData {
    /// Wrap raw interleaved 16-bit samples.
    ///
    /// Rejects empty data and sample runs that do not divide into whole
    /// frames; a source that cannot be played is a setup mistake and is
    /// surfaced here rather than discovered mid-mix.
    pub fn new(samples: Vec<i16>, channels: Channels, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(AuricleError::Configuration(
                "PCM source has no samples".into(),
            ));
        }
        let stride = channels.stride();
        if samples.len() % stride != 0 {
            return Err(AuricleError::AudioFormat(format!(
                "{} samples do not divide into {}-channel frames",
                samples.len(),
                stride
            )));
        }
        let frames = samples.len() / stride;
        Ok(Self {
            inner: Arc::new(PcmInner {
                id: Uuid::new_v4(),
                samples,
                channels,
                sample_rate,
                frames,
            }),
        })
    }

    /// Decode an audio file with the default symphonia-backed loader.
    pub fn from_path(path: &str) -> Result<Self> {
        SymphoniaLoader.load(path)
    }

    /// Unique identity of this asset, for logging and event correlation.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn channels(&self) -> Channels {
        self.inner.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    /// Number of frames (one frame spans all channels).
    pub fn frames(&self) -> usize {
        self.inner.frames
    }

    /// Total number of interleaved samples (`frames * channels`).
    pub fn raw_len(&self) -> usize {
        self.inner.samples.len()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.inner.frames as f64 / self.inner.sample_rate as f64)
    }

    /// Sample at `frame` for `channel` (0 = left / mono).
    pub fn sample(&self, frame: usize, channel: usize) -> i16 {
        self.raw(frame * self.inner.channels.stride() + channel)
    }

    /// Raw interleaved sample at `index`; out-of-range reads yield silence.
    pub(crate) fn raw(&self, index: usize) -> i16 {
        self.inner.samples.get(index).copied().unwrap_or(0)
    }
}
