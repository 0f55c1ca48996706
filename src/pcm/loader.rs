use crate::error::{AuricleError, Result};
use crate::pcm::{Channels, PcmData};
use std::fs::File;
use std::path::Path;
use symphonia::{
    core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
        io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Loader abstraction over the on-disk audio format.
///
/// The engine only consumes [`PcmData`]; how the sample data gets into memory
/// is pluggable. The default implementation decodes through symphonia.
pub trait PcmLoader {
    fn load(&self, path: &str) -> Result<PcmData>;
}

/// Default loader backed by the symphonia decoder library.
///
/// Decodes WAV (and any other container symphonia's default codec registry
/// understands) into interleaved 16-bit PCM. Sources with more than two
/// channels are rejected; playback is mono/stereo only.
pub struct SymphoniaLoader;

impl PcmLoader for SymphoniaLoader {
    fn load(&self, path: &str) -> Result<PcmData> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                AuricleError::AudioLoading(format!("failed to probe audio format: {:?}", e))
            })?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AuricleError::AudioLoading("no default audio track found".into()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AuricleError::AudioLoading("sample rate not found".into()))?;

        let channel_count = track
            .codec_params
            .channels
            .ok_or_else(|| AuricleError::AudioLoading("channel count not found".into()))?
            .count() as u16;
        let channels = Channels::from_count(channel_count)?;

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                AuricleError::AudioLoading(format!("failed to create decoder: {:?}", e))
            })?;

        let mut samples: Vec<i16> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(_)) => break, // end-of-file
                Err(e) => {
                    return Err(AuricleError::AudioLoading(format!(
                        "error reading packet: {:?}",
                        e
                    )));
                }
            };

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(Error::IoError(_)) => break, // also EOF in some formats
                Err(Error::DecodeError(_)) => continue, // recoverable corruption
                Err(e) => {
                    return Err(AuricleError::AudioLoading(format!(
                        "error decoding packet: {:?}",
                        e
                    )));
                }
            };

            let spec = *decoded.spec();
            let capacity = decoded.capacity();

            let mut tmp = SampleBuffer::<i16>::new(capacity as u64, spec);
            tmp.copy_interleaved_ref(decoded);
            samples.extend_from_slice(tmp.samples());
        }

        log::debug!(
            "loaded {}: {} frames, {:?}, {} Hz",
            path,
            samples.len() / channels.stride(),
            channels,
            sample_rate
        );

        PcmData::new(samples, channels, sample_rate)
    }
}
