//! Real-time audio engine.
//!
//! [`AuricleEngine`] owns the output device stream and the mixing state that
//! lives inside its callback: the fixed voice pool, the [`Mixer`], and a
//! pre-allocated scratch buffer. Game logic never touches that state
//! directly: it sends [`VoiceCommand`]s over a channel, and the callback
//! drains the queue exactly once at the start of each mix quantum before
//! rendering. Playback notifications travel the other way as
//! [`AuricleEvent`]s on a bounded channel.
//!
//! Nothing in the callback allocates or blocks once the scratch buffer has
//! grown to the device's buffer size.

use crate::buffer::Frame;
use crate::config::AuricleConfig;
use crate::error::{AuricleError, Result};
use crate::events::AuricleEvent;
use crate::hrtf::HrtfTable;
use crate::math::{Listener, Vec3};
use crate::mixer::Mixer;
use crate::pcm::PcmData;
use crate::sampler::LoopMode;
use crate::sound::Sound;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Control messages applied to the voice pool at the next mix quantum.
#[derive(Debug)]
pub enum VoiceCommand {
    /// Bind a PCM source to a voice slot, replacing any previous binding.
    Bind {
        voice: usize,
        source: PcmData,
        loop_mode: LoopMode,
        autoplay: bool,
        positional: bool,
        position: Vec3,
    },
    /// Free a voice slot.
    Unbind { voice: usize },
    /// Request (re)start of a voice.
    Trigger { voice: usize },
    /// Halt a voice, keeping its playhead.
    Stop { voice: usize },
    /// Per-voice gain.
    SetVolume { voice: usize, volume: f32 },
    /// Loop region in frames.
    SetLoopRegion {
        voice: usize,
        start: usize,
        end: usize,
    },
    /// Move a positional voice in world space.
    SetPosition { voice: usize, position: Vec3 },
    /// Publish the listener pose the next quantum interpolates toward.
    SetListener(Listener),
    /// Publish the master volume the next quantum interpolates toward.
    SetMasterVolume(f32),
}

/// Mixing state owned by the audio callback.
struct MixState {
    voices: Vec<Sound>,
    mixer: Mixer,
    scratch: Vec<Frame>,
    next_listener: Listener,
    target_volume: f32,
    sample_rate: u32,
}

impl MixState {
    fn new(config: &AuricleConfig, hrtf: Option<Arc<HrtfTable>>) -> Self {
        let mut mixer = Mixer::new(Listener::default());
        if let Some(table) = hrtf {
            mixer = mixer.with_hrtf(table);
        }
        Self {
            voices: vec![Sound::new(); config.voices],
            mixer,
            scratch: Vec::with_capacity(config.block_size),
            next_listener: Listener::default(),
            target_volume: config.master_volume,
            sample_rate: config.sample_rate,
        }
    }

    fn voice_mut(&mut self, voice: usize) -> Option<&mut Sound> {
        let pool = self.voices.len();
        let slot = self.voices.get_mut(voice);
        if slot.is_none() {
            log::warn!("command for voice {} outside pool of {}", voice, pool);
        }
        slot
    }

    fn apply(&mut self, command: VoiceCommand) {
        match command {
            VoiceCommand::Bind {
                voice,
                source,
                loop_mode,
                autoplay,
                positional,
                position,
            } => {
                if source.sample_rate() != self.sample_rate {
                    log::warn!(
                        "source {} is {} Hz but the engine runs at {} Hz; playing unresampled",
                        source.id(),
                        source.sample_rate(),
                        self.sample_rate
                    );
                }
                if let Some(slot) = self.voice_mut(voice) {
                    slot.bind(source, loop_mode, autoplay, positional, position);
                }
            }
            VoiceCommand::Unbind { voice } => {
                if let Some(slot) = self.voice_mut(voice) {
                    slot.unbind();
                }
            }
            VoiceCommand::Trigger { voice } => {
                if let Some(slot) = self.voice_mut(voice) {
                    slot.trigger();
                }
            }
            VoiceCommand::Stop { voice } => {
                if let Some(slot) = self.voice_mut(voice) {
                    slot.stop();
                }
            }
            VoiceCommand::SetVolume { voice, volume } => {
                if let Some(slot) = self.voice_mut(voice) {
                    slot.set_volume(volume);
                }
            }
            VoiceCommand::SetLoopRegion { voice, start, end } => {
                if let Some(sampler) = self.voice_mut(voice).and_then(Sound::sampler_mut) {
                    if let Err(e) = sampler.set_loop_region(start, end) {
                        log::warn!("rejected loop region for voice {}: {}", voice, e);
                    }
                }
            }
            VoiceCommand::SetPosition { voice, position } => {
                if let Some(slot) = self.voice_mut(voice) {
                    slot.set_position(position);
                }
            }
            VoiceCommand::SetListener(listener) => {
                self.next_listener = listener;
            }
            VoiceCommand::SetMasterVolume(volume) => {
                self.target_volume = volume.max(0.0);
            }
        }
    }

    /// Drain pending commands, mix one quantum into the scratch buffer, and
    /// emit playback events. Returns the number of frames rendered.
    fn render(
        &mut self,
        commands: &Receiver<VoiceCommand>,
        events: &Sender<AuricleEvent>,
        frames: usize,
    ) -> usize {
        for command in commands.try_iter() {
            self.apply(command);
        }

        if self.scratch.len() != frames {
            self.scratch.resize(frames, Frame::ZERO);
        }

        let next = self.next_listener;
        self.mixer
            .mix(&mut self.voices, &mut self.scratch, &next, self.target_volume);

        for (index, voice) in self.voices.iter_mut().enumerate() {
            if voice.take_looped() {
                let _ = events.try_send(AuricleEvent::VoiceLooped { voice: index });
            }
            if voice.take_finished() {
                let _ = events.try_send(AuricleEvent::VoiceFinished { voice: index });
            }
        }

        frames
    }
}

/// Audio engine driving a cpal output stream.
pub struct AuricleEngine {
    config: AuricleConfig,
    hrtf: Option<Arc<HrtfTable>>,
    stream: Option<cpal::Stream>,
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
    command_tx: Sender<VoiceCommand>,
    command_rx: Receiver<VoiceCommand>,
    event_tx: Sender<AuricleEvent>,
    event_rx: Receiver<AuricleEvent>,
}

impl AuricleEngine {
    /// Create an engine. When the configuration names an HRTF tap dump it is
    /// loaded here, so a bad asset path fails at setup rather than at the
    /// first positional voice.
    pub fn new(config: AuricleConfig) -> Result<Self> {
        if config.voices == 0 {
            return Err(AuricleError::Configuration(
                "voice pool must have at least one slot".into(),
            ));
        }
        let hrtf = match &config.hrtf_path {
            Some(path) => Some(Arc::new(HrtfTable::from_file(path)?)),
            None => None,
        };
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::bounded(256);
        Ok(Self {
            config,
            hrtf,
            stream: None,
            is_running: Arc::new(AtomicBool::new(false)),
            frames_processed: Arc::new(AtomicUsize::new(0)),
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        })
    }

    pub fn config(&self) -> &AuricleConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Total frames rendered since the stream started.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    /// Drain pending playback events.
    pub fn poll_events(&self) -> Vec<AuricleEvent> {
        self.event_rx.try_iter().collect()
    }

    fn send(&self, command: VoiceCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| AuricleError::Engine(format!("failed to send command: {}", e)))
    }

    /// Bind a PCM source to a voice slot.
    pub fn bind_voice(
        &self,
        voice: usize,
        source: PcmData,
        loop_mode: LoopMode,
        autoplay: bool,
        positional: bool,
        position: Vec3,
    ) -> Result<()> {
        self.send(VoiceCommand::Bind {
            voice,
            source,
            loop_mode,
            autoplay,
            positional,
            position,
        })
    }

    pub fn unbind_voice(&self, voice: usize) -> Result<()> {
        self.send(VoiceCommand::Unbind { voice })
    }

    /// Request (re)start of a voice at the next quantum.
    pub fn trigger(&self, voice: usize) -> Result<()> {
        self.send(VoiceCommand::Trigger { voice })
    }

    pub fn stop_voice(&self, voice: usize) -> Result<()> {
        self.send(VoiceCommand::Stop { voice })
    }

    pub fn set_voice_volume(&self, voice: usize, volume: f32) -> Result<()> {
        self.send(VoiceCommand::SetVolume { voice, volume })
    }

    pub fn set_loop_region(&self, voice: usize, start: usize, end: usize) -> Result<()> {
        self.send(VoiceCommand::SetLoopRegion { voice, start, end })
    }

    pub fn set_position(&self, voice: usize, position: Vec3) -> Result<()> {
        self.send(VoiceCommand::SetPosition { voice, position })
    }

    /// Publish the listener pose for the next mix quantum.
    pub fn set_listener(&self, listener: Listener) -> Result<()> {
        self.send(VoiceCommand::SetListener(listener))
    }

    pub fn set_master_volume(&self, volume: f32) -> Result<()> {
        self.send(VoiceCommand::SetMasterVolume(volume))
    }

    /// Open the default output device and start rendering.
    ///
    /// The mixing state is built fresh for each stream: after a
    /// [`stop`](AuricleEngine::stop), voices must be rebound.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            AuricleError::AudioDevice("no default output device available".into())
        })?;

        let stream_config = cpal::StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.config.block_size as u32),
        };

        let default_config = device.default_output_config().map_err(|e| {
            AuricleError::AudioDevice(format!("failed to get default config: {}", e))
        })?;

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(&device, &stream_config)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(&device, &stream_config)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(&device, &stream_config)?,
            other => {
                return Err(AuricleError::AudioFormat(format!(
                    "unsupported device sample format: {:?}",
                    other
                )));
            }
        };

        stream
            .play()
            .map_err(|e| AuricleError::AudioDevice(format!("failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        self.is_running.store(true, Ordering::Relaxed);
        let _ = self.event_tx.try_send(AuricleEvent::EngineStarted);
        log::info!(
            "engine started: {} Hz, {}-frame blocks, {} voices, hrtf={}",
            self.config.sample_rate,
            self.config.block_size,
            self.config.voices,
            self.hrtf.is_some()
        );
        Ok(())
    }

    /// Stop rendering and close the stream.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.is_running.store(false, Ordering::Relaxed);
            drop(stream);
            let _ = self.event_tx.try_send(AuricleEvent::EngineStopped);
            log::info!("engine stopped");
        }
    }

    fn build_stream<T>(
        &self,
        device: &cpal::Device,
        stream_config: &cpal::StreamConfig,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let mut state = MixState::new(&self.config, self.hrtf.clone());
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();
        let is_running = self.is_running.clone();
        let frames_processed = self.frames_processed.clone();

        let stream = device
            .build_output_stream(
                stream_config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    let frames = state.render(&command_rx, &event_tx, data.len() / 2);
                    for (frame, pair) in state.scratch.iter().zip(data.chunks_exact_mut(2)) {
                        pair[0] = T::from_sample(frame.left);
                        pair[1] = T::from_sample(frame.right);
                    }
                    frames_processed.fetch_add(frames, Ordering::Relaxed);
                },
                move |err| {
                    log::error!("audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AuricleError::AudioDevice(format!("failed to build stream: {}", e)))?;

        Ok(stream)
    }
}

impl Drop for AuricleEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
