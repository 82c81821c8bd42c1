//! # Frame Processing Module
//!
//! This module orchestrates the per-frame analysis pipeline: volume gating,
//! sample normalization, spectral estimation, and note mapping. One
//! [`FrameProcessor`] is the explicit processing context for a capture
//! session; it owns the scratch buffers and is driven synchronously, one
//! call per delivered capture buffer.
//!
//! ## Pipeline
//! 1. RMS volume gate over the raw 16-bit samples
//! 2. Normalization to [-1, 1]
//! 3. Hann window + forward FFT + peak-bin search ([`SpectralEstimator`])
//! 4. Bin index to Hz conversion
//! 5. Nearest-note lookup ([`crate::notes`])

use crate::NoteEstimate;
use crate::notes;
use crate::spectrum::{self, SpectralEstimator};
use anyhow::{Result, anyhow};

/// Default RMS gate threshold, measured over raw i16 sample amplitudes.
///
/// Frames quieter than this are treated as silence and skipped, which keeps
/// the noise floor from producing spurious note readings.
pub const VOLUME_THRESHOLD: f32 = 200.0;

/// The designed "no estimate this frame" outcomes of the pipeline.
///
/// Neither variant is a failure; both simply mean the frame produced no
/// usable note and the presentation layer should report status instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSkip {
    /// The frame's RMS volume was below the gate threshold.
    BelowThreshold,
    /// The strongest bin was the DC bin, so there is no meaningful pitch.
    /// Mapping bin 0 would hand a zero frequency to the log-based note
    /// lookup, so it is suppressed here instead.
    NoDominantPeak,
}

/// Per-session analysis context: gate threshold, spectral estimator, and
/// reusable scratch storage.
///
/// The processor never blocks or spawns work; `process` is a bounded,
/// synchronous computation intended to be called from the capture delivery
/// thread once per buffer. Exclusive access is expressed through `&mut self`,
/// so concurrent frames cannot race on the scratch buffers.
pub struct FrameProcessor {
    estimator: SpectralEstimator,
    samples: Vec<f32>,
    sample_rate: u32,
    frame_size: usize,
    threshold: f32,
}

impl FrameProcessor {
    /// Creates a processor for a fixed frame size and sample rate.
    ///
    /// Configuration is validated here, once, so the per-frame path never
    /// has to deal with an untransformable frame size.
    ///
    /// # Arguments
    /// * `frame_size` - Samples per capture buffer; non-zero power of two
    /// * `sample_rate` - Capture sample rate in Hz
    ///
    /// # Returns
    /// * `Ok(processor)` - Ready to process frames
    /// * `Err(e)` - The configuration cannot be analyzed
    pub fn new(frame_size: usize, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(anyhow!("sample rate must be non-zero"));
        }
        let estimator = SpectralEstimator::new(frame_size)?;

        Ok(Self {
            estimator,
            samples: Vec::with_capacity(frame_size),
            sample_rate,
            frame_size,
            threshold: VOLUME_THRESHOLD,
        })
    }

    /// Overrides the RMS gate threshold (raw i16 amplitude units).
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Analyzes one frame of mono 16-bit samples.
    ///
    /// # Arguments
    /// * `frame` - Exactly `frame_size` signed 16-bit samples
    ///
    /// # Returns
    /// * `Ok(estimate)` - The nearest note for the frame's dominant frequency
    /// * `Err(skip)` - The frame was gated out or had no dominant pitch
    ///
    /// # Panics
    /// * If `frame.len()` differs from the configured frame size
    pub fn process(&mut self, frame: &[i16]) -> std::result::Result<NoteEstimate, FrameSkip> {
        assert_eq!(
            frame.len(),
            self.frame_size,
            "capture buffer length must match the configured frame size"
        );

        // Volume gate: RMS over the raw sample amplitudes. An all-zero
        // frame has RMS 0 and is skipped here, so nothing downstream ever
        // divides by it.
        let sum_squares: f64 = frame.iter().map(|&s| s as f64 * s as f64).sum();
        let rms = (sum_squares / frame.len() as f64).sqrt() as f32;
        if rms < self.threshold {
            return Err(FrameSkip::BelowThreshold);
        }

        // Normalize into the reusable f32 scratch buffer.
        self.samples.clear();
        self.samples
            .extend(frame.iter().map(|&s| s as f32 / 32768.0));

        let peak = self.estimator.transform(&self.samples);
        if peak.index == 0 {
            return Err(FrameSkip::NoDominantPeak);
        }

        let frequency = spectrum::bin_to_frequency(peak.index, self.sample_rate, self.frame_size);
        Ok(notes::map_frequency(frequency))
    }

    /// Analyzes one frame delivered as raw little-endian 16-bit PCM bytes.
    ///
    /// # Arguments
    /// * `bytes` - `2 * frame_size` bytes, little-endian signed 16-bit mono
    pub fn process_bytes(&mut self, bytes: &[u8]) -> std::result::Result<NoteEstimate, FrameSkip> {
        let frame: Vec<i16> = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        self.process(&frame)
    }

    /// The configured samples-per-frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// The configured sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
