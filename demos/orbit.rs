//! Orbit a looping positional sound around a stationary listener.
//!
//! With no HRTF asset the voice renders through the pairwise panner; pass a
//! tap dump as the second argument to hear the binaural path instead.
//!
//! Usage: cargo run --example orbit -- path/to/sound.wav [path/to/taps.ahrt]

use anyhow::{Context, Result, bail};
use auricle::{AuricleConfig, AuricleEngine, Listener, LoopMode, PcmData, Vec3};
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: orbit <audio file> [hrtf tap dump]");
    };

    let pcm = PcmData::from_path(&path).with_context(|| format!("loading {}", path))?;

    let mut config = AuricleConfig::new().sample_rate(pcm.sample_rate());
    if let Some(hrtf) = args.next() {
        config = config.hrtf_path(hrtf);
    }
    let mut engine = AuricleEngine::new(config)?;
    engine.start()?;

    let radius = 3.0f32;
    engine.bind_voice(
        0,
        pcm,
        LoopMode::Infinite,
        true,
        true,
        Vec3::new(radius, 0.0, 0.0),
    )?;
    engine.set_listener(Listener::at(Vec3::ZERO))?;

    println!("orbiting; ctrl-c to quit");
    let started = Instant::now();
    loop {
        // one revolution every eight seconds
        let angle = started.elapsed().as_secs_f32() * std::f32::consts::TAU / 8.0;
        let position = Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
        engine.set_position(0, position)?;
        std::thread::sleep(Duration::from_millis(16));
    }
}
