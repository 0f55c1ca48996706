//! Play an audio file to completion on the default output device.
//!
//! Usage: cargo run --example playback -- path/to/sound.wav

use anyhow::{Context, Result, bail};
use auricle::{AuricleConfig, AuricleEngine, AuricleEvent, LoopMode, PcmData, Vec3};
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: playback <audio file>");
    };

    let pcm = PcmData::from_path(&path).with_context(|| format!("loading {}", path))?;
    println!(
        "{}: {:?}, {} Hz, {:.2}s",
        path,
        pcm.channels(),
        pcm.sample_rate(),
        pcm.duration().as_secs_f64()
    );

    let config = AuricleConfig::new().sample_rate(pcm.sample_rate());
    let mut engine = AuricleEngine::new(config)?;
    engine.start()?;

    engine.bind_voice(0, pcm, LoopMode::Once, true, false, Vec3::ZERO)?;

    'outer: loop {
        for event in engine.poll_events() {
            if event == (AuricleEvent::VoiceFinished { voice: 0 }) {
                break 'outer;
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    println!("done");
    Ok(())
}
