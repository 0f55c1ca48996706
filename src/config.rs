//! Engine configuration.

/// Configuration for an [`AuricleEngine`](crate::engine::AuricleEngine).
#[derive(Debug, Clone)]
pub struct AuricleConfig {
    /// Sample rate the mixer runs at, Hz.
    pub sample_rate: u32,
    /// Preferred device buffer size in frames (one mix quantum).
    pub block_size: usize,
    /// Number of voice slots in the fixed pool.
    pub voices: usize,
    /// Initial master volume target.
    pub master_volume: f32,
    /// Optional path to an HRTF tap dump. When set, positional voices render
    /// through binaural convolution; otherwise the pairwise panner is used.
    pub hrtf_path: Option<String>,
}

impl Default for AuricleConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 1024,
            voices: 16,
            master_volume: 1.0,
            hrtf_path: None,
        }
    }
}

impl AuricleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    pub fn voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    pub fn master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume;
        self
    }

    pub fn hrtf_path(mut self, path: impl Into<String>) -> Self {
        self.hrtf_path = Some(path.into());
        self
    }
}
