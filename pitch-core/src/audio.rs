//! # Audio Capture Module
//!
//! This module handles real-time audio capture using CPAL (Cross-Platform Audio Library).
//! It opens the default input device as a mono 16-bit stream and delivers
//! fixed-size frames to the analysis pipeline over a channel.
//!
//! ## Features
//! - Automatic audio device selection
//! - Mono 16-bit capture at 44.1 kHz
//! - Accumulation of device callbacks into exact analysis frames
//! - Error handling via anyhow on all setup paths

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;

/// Samples per analysis frame.
///
/// 4096 samples at 44.1 kHz is roughly 93 ms per frame, giving a bin
/// resolution of about 10.8 Hz. Larger frames resolve lower notes better
/// but add latency.
pub const FRAME_SIZE: usize = 4096;

/// Target capture sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44100;

/// Starts audio capture from the default input device.
///
/// This function:
/// 1. Selects the default audio input device
/// 2. Picks a mono signed-16-bit configuration near [`SAMPLE_RATE`]
/// 3. Sets up a callback that accumulates exact [`FRAME_SIZE`] frames and
///    sends them to the analysis thread
///
/// Frames are sent with `try_send`, so if the analysis side falls behind,
/// capture drops frames rather than stalling the audio callback.
///
/// # Arguments
/// * `sender` - Channel sender for streaming capture frames to the analysis thread
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Audio stream handle and negotiated sample rate
/// * `Err(e)` - Error if audio setup fails
pub fn start_audio_capture(sender: Sender<Vec<i16>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    eprintln!("[AUDIO] Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable mono i16 input format found"))?;

    let sample_rate = cpal::SampleRate(SAMPLE_RATE);
    let config = supported_config.with_sample_rate(sample_rate);

    let sample_rate_val = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    eprintln!("[AUDIO] Selected sample rate: {} Hz", sample_rate_val);

    let err_fn = |err| eprintln!("[AUDIO] An error occurred on the audio stream: {}", err);

    // This buffer accumulates device-sized callbacks into exact frames.
    let mut audio_buffer: Vec<i16> = Vec::with_capacity(FRAME_SIZE * 2);

    let stream = device.build_input_stream(
        &config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            audio_buffer.extend_from_slice(data);

            // While we have enough data for a full frame, ship it.
            while audio_buffer.len() >= FRAME_SIZE {
                let frame_to_send = audio_buffer[..FRAME_SIZE].to_vec();

                // Send the frame, ignoring errors if the channel is full.
                let _ = sender.try_send(frame_to_send);

                audio_buffer.drain(..FRAME_SIZE);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate_val))
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Filters the device's configurations down to mono signed-16-bit formats
/// and picks the one whose supported rate range sits closest to the target.
///
/// # Arguments
/// * `configs` - List of supported audio configurations from the device
/// * `target_rate` - Desired sample rate in Hz
///
/// # Returns
/// * `Some(config)` - Best matching configuration
/// * `None` - No suitable configuration found
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::I16)
        .min_by_key(|c| {
            let min_diff = (c.min_sample_rate().0 as i32 - target_rate as i32).abs();
            let max_diff = (c.max_sample_rate().0 as i32 - target_rate as i32).abs();
            min_diff.min(max_diff)
        })
}
