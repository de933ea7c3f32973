//! Decodes uploaded audio into the 16 kHz mono f32 PCM the model expects.
//!
//! Container and codec detection go through symphonia, with the scratch
//! file's extension as the format hint. Multi-channel audio is mixed down
//! to mono and anything not already at the target rate is resampled.

use std::fs::File;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::engine::SttError;

/// Sample rate the model expects.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decode an audio file into 16 kHz mono f32 samples.
pub fn decode_to_model_input(path: &Path) -> Result<Vec<f32>, SttError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| SttError::Decode(format!("probe failed: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SttError::Decode("no audio track found".to_string()))?;
    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let source_rate = codec_params.sample_rate.unwrap_or(TARGET_SAMPLE_RATE);
    let channels = codec_params.channels.map_or(1, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| SttError::Decode(format!("codec init failed: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(SttError::Decode(format!("packet read: {e}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| SttError::Decode(format!("decode: {e}")))?;
        let spec = *decoded.spec();
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        if channels > 1 {
            for frame in buf.samples().chunks(channels) {
                samples.push(frame.iter().sum::<f32>() / channels as f32);
            }
        } else {
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() {
        return Err(SttError::Decode("no audio samples decoded".to_string()));
    }

    if source_rate != TARGET_SAMPLE_RATE {
        samples = resample(&samples, source_rate, TARGET_SAMPLE_RATE)?;
    }
    Ok(samples)
}

/// Resample mono audio between rates. The final partial chunk is
/// zero-padded, which leaves a short silent tail on the output; the model
/// does not care.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, SttError> {
    const CHUNK_SIZE: usize = 1024;

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = f64::from(to_rate) / f64::from(from_rate);

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, 1)
        .map_err(|e| SttError::Resample(format!("init: {e}")))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + CHUNK_SIZE);
    for chunk in samples.chunks(CHUNK_SIZE) {
        let mut input = chunk.to_vec();
        input.resize(CHUNK_SIZE, 0.0);

        let resampled = resampler
            .process(&[input], None)
            .map_err(|e| SttError::Resample(format!("process: {e}")))?;
        if let Some(channel) = resampled.into_iter().next() {
            output.extend(channel);
        }
    }

    Ok(output)
}
