//! WAV file reading and writing.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::{Error, Result};
use crate::SampleBuffer;

/// Scale signed integer PCM to floats in [-1, 1).
///
/// A 16-bit sample is divided by 32768, a 24-bit one by 8388608, and so on.
pub fn pcm_to_float(samples: &[i32], bits_per_sample: u16) -> SampleBuffer {
    let full_scale = (1u64 << (bits_per_sample.saturating_sub(1))) as f64;
    samples.iter().map(|&s| s as f64 / full_scale).collect()
}

/// Load a WAV file as a single channel.
///
/// Multichannel files are mixed down by averaging each frame. Returns the
/// samples together with the file's sample rate.
pub fn load_mono_samples<P: AsRef<Path>>(path: P) -> Result<(SampleBuffer, u32)> {
    let reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: SampleBuffer = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let ints = reader
                .into_samples::<i32>()
                .collect::<std::result::Result<Vec<_>, _>>()?;
            pcm_to_float(&ints, spec.bits_per_sample)
        }
    };

    let mono = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f64>() / frame.len() as f64)
            .collect()
    };

    tracing::debug!(
        path = %path.as_ref().display(),
        channels,
        sample_rate = spec.sample_rate,
        frames = mono.len(),
        "loaded wav"
    );
    Ok((mono, spec.sample_rate))
}

/// Write `buffer` as a mono 32-bit float WAV file.
pub fn write_samples<P: AsRef<Path>>(buffer: &[f64], sample_rate: f64, path: P) -> Result<()> {
    let rate = sample_rate.round();
    if !(rate >= 1.0 && rate <= u32::MAX as f64) {
        return Err(Error::UnsupportedSampleRate(sample_rate));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: rate as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for &sample in buffer {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;

    tracing::debug!(path = %path.as_ref().display(), samples = buffer.len(), "wrote wav");
    Ok(())
}
