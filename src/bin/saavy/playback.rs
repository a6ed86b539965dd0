//! Blocking playback of a rendered buffer through cpal.

use std::{thread, time::Duration};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

/// ~185 ms at 44.1 kHz
const RING_CAPACITY: usize = 8192;

/// Stream `samples` to the default output device and return once the
/// callback has consumed them.
///
/// Samples reach the audio thread through a lock-free ring so the callback
/// never blocks. There is no resampling: a device running at a different
/// rate plays the patch at the wrong pitch, which is logged.
pub fn play(samples: &[f64], sample_rate: f64) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let device_rate = config.sample_rate().0 as f64;
    let channels = config.channels() as usize;
    if (device_rate - sample_rate).abs() > 0.5 {
        tracing::warn!(device_rate, sample_rate, "device sample rate differs from the patch");
    }

    let (mut producer, mut consumer) = RingBuffer::<f32>::new(RING_CAPACITY);

    let stream = device.build_output_stream(
        &config.config(),
        move |data: &mut [f32], _| {
            // Copy to output (mono to all channels), silence on underrun
            for frame in data.chunks_mut(channels) {
                let sample = consumer.pop().unwrap_or(0.0);
                frame.fill(sample);
            }
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;
    stream.play()?;

    tracing::info!(samples = samples.len(), device_rate, channels, "playing");

    let mut pending = samples.iter().map(|&s| s as f32).peekable();
    while pending.peek().is_some() {
        let free = producer.slots();
        if free == 0 {
            thread::sleep(Duration::from_millis(5));
            continue;
        }
        for sample in pending.by_ref().take(free) {
            if producer.push(sample).is_err() {
                break;
            }
        }
    }

    // Let the callback drain what is left in the ring
    while producer.slots() < RING_CAPACITY {
        thread::sleep(Duration::from_millis(10));
    }
    thread::sleep(Duration::from_millis(100));

    Ok(())
}
