//! # Auricle
//!
//! A sample playback and spatialization engine for interactive real-time
//! applications: bind PCM sources to a fixed pool of voices, move a listener
//! through the world, and get a continuously produced stereo stream with
//! per-voice playback control and distance/direction-aware spatialization.
//!
//! ## Quick Start
//!
//! ```no_run
//! use auricle::*;
//!
//! // Configure and start the engine (opens the default output device)
//! let config = AuricleConfig::default();
//! let mut engine = AuricleEngine::new(config)?;
//! engine.start()?;
//!
//! // Load a sound and bind it to voice slot 0 as a positional source
//! let pcm = PcmData::from_path("door_creak.wav")?;
//! engine.bind_voice(0, pcm, LoopMode::Once, true, true, Vec3::new(5.0, 0.0, 0.0))?;
//!
//! // Publish the listener pose as your camera moves; the mixer blends
//! // between successive poses so motion never clicks
//! engine.set_listener(Listener::at(Vec3::ZERO))?;
//!
//! // React to playback milestones
//! for event in engine.poll_events() {
//!     if let AuricleEvent::VoiceFinished { voice } = event {
//!         println!("voice {} finished", voice);
//!     }
//! }
//! # Ok::<(), AuricleError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`Sampler`]**: per-voice playback-head state machine over one PCM
//!   source, with trigger/stop/loop semantics and an FIR-filtered step for
//!   binaural rendering
//! - **[`HrtfTable`]**: direction-indexed filter taps with nearest-neighbor
//!   lookup and left/right mirroring
//! - **[`Mixer`]**: drives the voice pool across one output buffer,
//!   interpolating listener pose and master volume sample-by-sample
//! - **[`AuricleEngine`]**: owns the output stream and the command/event
//!   channels that connect game logic to the audio callback
//!
//! ## Architecture
//!
//! The engine runs single-producer: all mixing happens synchronously inside
//! the audio callback, which drains the command queue once per mix quantum
//! and then renders. Game logic only ever talks to the callback through
//! channels, so no locks are taken on the real-time path and the mixer
//! performs no allocation.
//!
//! The [`Mixer`] and [`Sound`] types are also usable without the device
//! layer: hand the mixer your own voice pool and output buffer if you
//! already have an audio callback to render from.

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod hrtf;
pub mod math;
pub mod mixer;
pub mod pcm;
pub mod sampler;
pub mod sound;
pub mod spatial;

pub use buffer::Frame;
pub use config::AuricleConfig;
pub use engine::{AuricleEngine, VoiceCommand};
pub use error::AuricleError;
pub use events::AuricleEvent;
pub use hrtf::{HrtfTable, HrtfTaps};
pub use math::{Listener, Vec3};
pub use mixer::Mixer;
pub use pcm::{Channels, PcmData, PcmLoader, SymphoniaLoader};
pub use sampler::{LoopMode, PlayState, Sampler};
pub use sound::Sound;
pub use spatial::{PanGains, compute_gains};
