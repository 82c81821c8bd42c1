//! # Console Pitch Tuner
//!
//! Command-line front-end for the real-time pitch tuner. It listens to the
//! default microphone, analyzes each capture frame, and rewrites a single
//! status line with the detected note and its deviation.
//!
//! ## Architecture
//! - **Main thread**: starts the worker, waits for Enter, then shuts down
//! - **Audio thread**: dedicated thread for capture and per-frame analysis
//! - **Communication**: crossbeam channels for frames and shutdown

use anyhow::Result;
use cpal::traits::StreamTrait;
use crossbeam_channel::Sender;
use pitch_core::NoteEstimate;
use pitch_core::audio::{self, FRAME_SIZE};
use pitch_core::notes;
use pitch_core::processor::{FrameProcessor, FrameSkip};
use std::io::{self, Write};
use std::thread::{self, JoinHandle};

/// Width of the rewritten status line. Shorter messages are padded to this
/// width so they fully overwrite whatever was printed before them.
const STATUS_WIDTH: usize = 96;

/// Audio worker thread management structure.
///
/// Handles the dedicated audio processing thread and provides
/// a way to shut it down gracefully.
struct AudioWorker {
    shutdown_tx: Sender<()>,
    thread_handle: JoinHandle<()>,
}

fn main() -> Result<()> {
    eprintln!("[MAIN] Starting console tuner...");
    let worker = start_audio_worker();

    println!("Listening... Press Enter to stop");

    // Keypress handling stays on the main thread; the worker runs until we
    // tell it to stop.
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    eprintln!("[MAIN] Shutting down audio worker...");
    let _ = worker.shutdown_tx.send(());
    if worker.thread_handle.join().is_err() {
        eprintln!("[MAIN] Audio thread exited abnormally");
    }
    println!();
    eprintln!("[MAIN] Done");
    Ok(())
}

/// Starts the dedicated audio processing thread.
///
/// The thread owns the capture stream and the frame processor: cpal streams
/// are not `Send`, so both capture setup and analysis live on the same
/// thread. Each received frame runs through the full gate/FFT/note pipeline
/// and the outcome is printed as a status line.
fn start_audio_worker() -> AudioWorker {
    let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);

    let thread_handle = thread::spawn(move || {
        eprintln!("[AUDIO-THREAD] Starting audio thread...");
        let (raw_audio_tx, raw_audio_rx) = crossbeam_channel::unbounded::<Vec<i16>>();

        let (stream, sample_rate) = match audio::start_audio_capture(raw_audio_tx) {
            Ok(tuple) => tuple,
            Err(e) => {
                eprintln!("[AUDIO-THREAD] Fatal error starting audio: {}", e);
                return;
            }
        };

        let mut processor = match FrameProcessor::new(FRAME_SIZE, sample_rate) {
            Ok(processor) => processor,
            Err(e) => {
                eprintln!("[AUDIO-THREAD] Invalid analysis configuration: {}", e);
                return;
            }
        };

        eprintln!("[AUDIO-THREAD] Entering audio processing loop...");
        loop {
            crossbeam_channel::select! {
                recv(raw_audio_rx) -> msg => match msg {
                    Ok(frame) => print_status(processor.process(&frame)),
                    Err(_) => {
                        eprintln!("[AUDIO-THREAD] Audio channel closed");
                        break;
                    }
                },
                recv(shutdown_rx) -> _ => {
                    eprintln!("[AUDIO-THREAD] Received shutdown signal");
                    break;
                }
            }
        }

        if let Err(e) = stream.pause() {
            eprintln!("[AUDIO-THREAD] Error pausing stream: {}", e);
        }
        drop(stream);
        eprintln!("[AUDIO-THREAD] Audio thread finished");
    });

    AudioWorker {
        shutdown_tx,
        thread_handle,
    }
}

/// Rewrites the status line with this frame's outcome.
fn print_status(outcome: Result<NoteEstimate, FrameSkip>) {
    let status = match outcome {
        Ok(estimate) => {
            let cents = notes::cents_deviation(estimate.frequency, estimate.note_frequency);
            format!(
                "Frequency: {:.2} Hz, Closest Note: {}, Note Frequency: {:.2} Hz, Difference: {:+.2} Hz ({:+.1} cents)",
                estimate.frequency,
                estimate.note_name,
                estimate.note_frequency,
                estimate.difference,
                cents,
            )
        }
        Err(FrameSkip::BelowThreshold) => "Volume below threshold".to_string(),
        Err(FrameSkip::NoDominantPeak) => "No dominant pitch".to_string(),
    };

    print!("\r{:<width$}", status, width = STATUS_WIDTH);
    let _ = io::stdout().flush();
}
