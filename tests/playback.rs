//! End-to-end mixing scenarios against the public API.

use auricle::hrtf::{ELEVATION_MAX, ELEVATION_MIN};
use auricle::{Channels, Frame, HrtfTable, Listener, LoopMode, Mixer, PcmData, Sound, Vec3};
use std::sync::Arc;

const AZIMUTH_COUNTS: [usize; 10] = [37, 37, 37, 31, 29, 23, 19, 13, 7, 1];

/// Canonical-layout table with the same tap pair at every direction.
fn uniform_table(left: Vec<f32>, right: Vec<f32>) -> HrtfTable {
    let mut rings = Vec::new();
    let mut elevation = ELEVATION_MIN;
    while elevation <= ELEVATION_MAX {
        let count = AZIMUTH_COUNTS[elevation.unsigned_abs() as usize / 10];
        let directions = (0..count)
            .map(|_| (left.clone(), right.clone()))
            .collect();
        rings.push((elevation, directions));
        elevation += 10;
    }
    HrtfTable::from_rings(left.len(), rings).unwrap()
}

#[test]
fn test_single_voice_plays_through_and_stops() {
    let pcm = PcmData::new(vec![100, -100, 200, -200], Channels::Mono, 48000).unwrap();
    let mut sound = Sound::new();
    sound.bind(pcm, LoopMode::Once, true, false, Vec3::ZERO);
    let mut voices = [sound];

    let listener = Listener::default();
    let mut mixer = Mixer::new(listener).with_volume(1.0);

    let mut out = vec![Frame::ZERO; 4];
    mixer.mix(&mut voices, &mut out, &listener, 1.0);

    let expected = [100.0, -100.0, 200.0, -200.0];
    for (frame, raw) in out.iter().zip(expected) {
        assert_eq!(frame.left, frame.right);
        assert!((frame.left - raw / 32767.0).abs() < 1e-6);
    }

    // the source is exhausted: the next quantum is pure silence
    mixer.mix(&mut voices, &mut out, &listener, 1.0);
    assert!(out.iter().all(|f| *f == Frame::ZERO));
    assert!(!voices[0].is_playing());
}

#[test]
fn test_buffer_is_fully_overwritten() {
    let pcm = PcmData::new(vec![1000; 2], Channels::Mono, 48000).unwrap();
    let mut sound = Sound::new();
    sound.bind(pcm, LoopMode::Once, true, false, Vec3::ZERO);
    let mut voices = [sound];

    let listener = Listener::default();
    let mut mixer = Mixer::new(listener).with_volume(1.0);

    // stale garbage everywhere, including past the source's end
    let mut out = vec![Frame::new(7.0, -7.0); 16];
    mixer.mix(&mut voices, &mut out, &listener, 1.0);

    for frame in &out[2..] {
        assert_eq!(*frame, Frame::ZERO);
    }
    assert!(out[0].left.abs() < 1.0);
}

#[test]
fn test_default_mixer_fades_in_from_silence() {
    let pcm = PcmData::new(vec![32767; 8], Channels::Mono, 48000).unwrap();
    let mut sound = Sound::new();
    sound.bind(pcm, LoopMode::Once, true, false, Vec3::ZERO);
    let mut voices = [sound];

    let listener = Listener::default();
    let mut mixer = Mixer::new(listener);
    let mut out = vec![Frame::ZERO; 4];
    mixer.mix(&mut voices, &mut out, &listener, 1.0);

    assert_eq!(out[0], Frame::ZERO);
    for pair in out.windows(2) {
        assert!(pair[1].left >= pair[0].left);
    }
}

#[test]
fn test_panned_voice_favors_the_near_ear() {
    let pcm = PcmData::new(vec![16384; 8], Channels::Mono, 48000).unwrap();
    let mut sound = Sound::new();
    // two units to the listener's left
    sound.bind(pcm, LoopMode::Once, true, true, Vec3::new(-2.0, 0.0, 0.0));
    let mut voices = [sound];

    let listener = Listener::default();
    let mut mixer = Mixer::new(listener).with_volume(1.0);
    let mut out = vec![Frame::ZERO; 4];
    mixer.mix(&mut voices, &mut out, &listener, 1.0);

    for frame in &out {
        assert!(frame.left > 0.0);
        assert_eq!(frame.right, 0.0);
    }
}

#[test]
fn test_hrtf_convolution_delays_the_far_ear() {
    // identity tap on the left ear, one-frame delay on the right
    let table = uniform_table(vec![1.0, 0.0], vec![0.0, 1.0]);

    let pcm = PcmData::new(vec![32767, 0, 0, 0], Channels::Mono, 48000).unwrap();
    let mut sound = Sound::new();
    // straight ahead at unit distance, so attenuation stays 1
    sound.bind(pcm, LoopMode::Once, true, true, Vec3::new(0.0, 0.0, -1.0));
    let mut voices = [sound];

    let listener = Listener::default();
    let mut mixer = Mixer::new(listener)
        .with_hrtf(Arc::new(table))
        .with_volume(1.0);

    let mut out = vec![Frame::ZERO; 3];
    mixer.mix(&mut voices, &mut out, &listener, 1.0);

    assert!((out[0].left - 1.0).abs() < 1e-4);
    assert!(out[0].right.abs() < 1e-6);
    assert!(out[1].left.abs() < 1e-6);
    assert!((out[1].right - 1.0).abs() < 1e-4);
    assert_eq!(out[2], Frame::ZERO);
}

#[test]
fn test_stereo_source_passes_channels_through() {
    let pcm = PcmData::new(
        vec![10000, -10000, 20000, -20000],
        Channels::Stereo,
        48000,
    )
    .unwrap();
    let mut sound = Sound::new();
    sound.bind(pcm, LoopMode::Once, true, false, Vec3::ZERO);
    let mut voices = [sound];

    let listener = Listener::default();
    let mut mixer = Mixer::new(listener).with_volume(1.0);
    let mut out = vec![Frame::ZERO; 2];
    mixer.mix(&mut voices, &mut out, &listener, 1.0);

    assert!((out[0].left - 10000.0 / 32767.0).abs() < 1e-6);
    assert!((out[0].right + 10000.0 / 32767.0).abs() < 1e-6);
    assert!((out[1].left - 20000.0 / 32767.0).abs() < 1e-6);
    assert!((out[1].right + 20000.0 / 32767.0).abs() < 1e-6);
}

#[test]
fn test_looping_voice_survives_many_quanta() {
    let pcm = PcmData::new(vec![1000, 2000, 3000], Channels::Mono, 48000).unwrap();
    let mut sound = Sound::new();
    sound.bind(pcm, LoopMode::Infinite, true, false, Vec3::ZERO);
    let mut voices = [sound];

    let listener = Listener::default();
    let mut mixer = Mixer::new(listener).with_volume(1.0);
    let mut out = vec![Frame::ZERO; 8];

    for _ in 0..4 {
        mixer.mix(&mut voices, &mut out, &listener, 1.0);
        assert!(voices[0].is_playing());
        assert!(out.iter().any(|f| f.left != 0.0));
    }
}
