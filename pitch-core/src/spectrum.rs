//! # Spectral Estimation Module
//!
//! This module provides the FFT processing for real-time pitch detection.
//! It handles Hann windowing, the forward transform, and peak-bin search
//! over the non-redundant half of the spectrum.
//!
//! ## Features
//! - High-performance FFT using RustFFT
//! - Hann windowing for reduced spectral leakage
//! - Peak search limited to bins below the Nyquist frequency
//! - Reusable scratch spectrum, fully rewritten every frame

use anyhow::{Result, anyhow};
use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// The dominant bin of a magnitude spectrum.
///
/// `index` is always below the Nyquist bin (half the frame size) and
/// `magnitude` is the maximum `sqrt(re^2 + im^2)` observed over that half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakBin {
    pub index: usize,
    pub magnitude: f32,
}

/// Windows a frame of samples, transforms it, and finds the dominant bin.
///
/// The estimator owns its FFT plan, the precomputed Hann coefficients, and
/// the complex scratch spectrum, so repeated frames reuse the same storage.
/// Every scratch slot is rewritten from the input before the transform runs,
/// so no spectrum data leaks between frames. The caller owns the estimator
/// and is responsible for not sharing it across threads mid-frame.
pub struct SpectralEstimator {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    frame_size: usize,
}

impl SpectralEstimator {
    /// Creates an estimator for a fixed frame size.
    ///
    /// # Arguments
    /// * `frame_size` - Samples per frame; must be a non-zero power of two
    ///
    /// # Returns
    /// * `Ok(estimator)` - Ready for per-frame processing
    /// * `Err(e)` - The frame size cannot be transformed
    pub fn new(frame_size: usize) -> Result<Self> {
        if frame_size == 0 || !frame_size.is_power_of_two() {
            return Err(anyhow!(
                "frame size must be a non-zero power of two, got {}",
                frame_size
            ));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_size);

        Ok(Self {
            fft,
            window: hann_window(frame_size),
            spectrum: vec![Complex::default(); frame_size],
            frame_size,
        })
    }

    /// The fixed number of samples expected per frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Transforms one frame of real-valued samples and returns its peak bin.
    ///
    /// Applies the Hann window while loading the samples into the complex
    /// scratch buffer (imaginary parts zero), runs the forward FFT with no
    /// scaling, and scans the lower half-spectrum for the strongest bin.
    /// The result depends only on the input samples.
    ///
    /// # Arguments
    /// * `samples` - Exactly `frame_size` real samples, nominally in [-1, 1]
    ///
    /// # Panics
    /// * If `samples.len()` differs from the configured frame size
    pub fn transform(&mut self, samples: &[f32]) -> PeakBin {
        assert_eq!(
            samples.len(),
            self.frame_size,
            "input frame size must match the configured frame size"
        );

        for (i, slot) in self.spectrum.iter_mut().enumerate() {
            *slot = Complex {
                re: samples[i] * self.window[i],
                im: 0.0,
            };
        }

        self.fft.process(&mut self.spectrum);
        find_peak(&self.spectrum)
    }
}

/// Precomputes Hann window coefficients for a frame of `n` samples.
///
/// `w[i] = 0.5 * (1 - cos(2*pi*i / (n - 1)))`. The `n - 1` denominator makes
/// the window reach exactly zero at both ends, which is what suppresses the
/// spectral leakage of the rectangular frame boundary.
pub fn hann_window(n: usize) -> Vec<f32> {
    if n == 1 {
        return vec![0.0];
    }
    let n_minus_1 = (n - 1) as f32;
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos()))
        .collect()
}

/// Finds the strongest bin in the lower half of a complex spectrum.
///
/// Only indices `[0, len / 2)` are scanned; for a real input signal the
/// upper half mirrors the lower and carries no extra information. The
/// comparison is strict, so ties keep the earliest (lowest-frequency) bin.
pub fn find_peak(spectrum: &[Complex<f32>]) -> PeakBin {
    let mut max = 0.0_f32;
    let mut max_index = 0;

    for (i, bin) in spectrum.iter().take(spectrum.len() / 2).enumerate() {
        let power = bin.norm(); // .norm() is sqrt(re^2 + im^2)
        if power > max {
            max = power;
            max_index = i;
        }
    }

    PeakBin {
        index: max_index,
        magnitude: max,
    }
}

/// Converts a bin index to its center frequency in Hz.
///
/// Bins are spaced `sample_rate / frame_size` Hz apart, so this is simply
/// `index * sample_rate / frame_size`. Monotonic in the index for a fixed
/// rate and frame size.
pub fn bin_to_frequency(index: usize, sample_rate: u32, frame_size: usize) -> f32 {
    index as f32 * sample_rate as f32 / frame_size as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44100;
    const FRAME_SIZE: usize = 4096;

    fn sine_frame(frequency: f32, amplitude: f32) -> Vec<f32> {
        (0..FRAME_SIZE)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn rejects_bad_frame_sizes() {
        assert!(SpectralEstimator::new(0).is_err());
        assert!(SpectralEstimator::new(1000).is_err());
        assert!(SpectralEstimator::new(4096).is_ok());
    }

    #[test]
    fn hann_window_tapers_to_zero() {
        let w = hann_window(FRAME_SIZE);
        assert_eq!(w.len(), FRAME_SIZE);
        assert!(w[0].abs() < 1e-6);
        assert!(w[FRAME_SIZE - 1].abs() < 1e-3);
        // Symmetric window peaks at 1.0 around the middle.
        assert!(w[FRAME_SIZE / 2] > 0.999);
    }

    #[test]
    fn bin_aligned_sine_peaks_at_its_bin() {
        let mut estimator = SpectralEstimator::new(FRAME_SIZE).unwrap();
        for k in [10usize, 64, 100] {
            let frequency = bin_to_frequency(k, SAMPLE_RATE, FRAME_SIZE);
            let peak = estimator.transform(&sine_frame(frequency, 0.5));
            assert_eq!(peak.index, k, "expected peak at bin {}", k);
            assert!(peak.magnitude > 0.0);
        }
    }

    #[test]
    fn misaligned_sine_peaks_within_one_bin() {
        let mut estimator = SpectralEstimator::new(FRAME_SIZE).unwrap();
        // 440 Hz falls between bins 40 and 41 at 44100 Hz / 4096.
        let peak = estimator.transform(&sine_frame(440.0, 0.5));
        let expected = 440.0 * FRAME_SIZE as f32 / SAMPLE_RATE as f32;
        assert!((peak.index as f32 - expected).abs() <= 1.0);
    }

    #[test]
    fn transform_is_pure_in_its_input() {
        let mut estimator = SpectralEstimator::new(FRAME_SIZE).unwrap();
        let frame = sine_frame(440.0, 0.5);
        let first = estimator.transform(&frame);
        // A different intervening frame must not affect the next result.
        estimator.transform(&sine_frame(1000.0, 0.5));
        let second = estimator.transform(&frame);
        assert_eq!(first.index, second.index);
        assert!((first.magnitude - second.magnitude).abs() < 1e-3);
    }

    #[test]
    fn peak_tie_keeps_the_lower_bin() {
        let mut spectrum = vec![Complex { re: 0.0, im: 0.0 }; 8];
        spectrum[1] = Complex { re: 3.0, im: 4.0 }; // magnitude 5
        spectrum[3] = Complex { re: 5.0, im: 0.0 }; // magnitude 5
        let peak = find_peak(&spectrum);
        assert_eq!(peak.index, 1);
        assert!((peak.magnitude - 5.0).abs() < 1e-6);
    }

    #[test]
    fn peak_search_ignores_bins_above_nyquist() {
        let mut spectrum = vec![Complex { re: 0.0, im: 0.0 }; 8];
        spectrum[2] = Complex { re: 1.0, im: 0.0 };
        spectrum[6] = Complex { re: 10.0, im: 0.0 }; // mirror half, must be skipped
        let peak = find_peak(&spectrum);
        assert_eq!(peak.index, 2);
    }

    #[test]
    fn bin_to_frequency_is_monotonic() {
        let mut last = -1.0_f32;
        for index in 0..FRAME_SIZE / 2 {
            let freq = bin_to_frequency(index, SAMPLE_RATE, FRAME_SIZE);
            assert!(freq > last);
            last = freq;
        }
        assert!((bin_to_frequency(4096, SAMPLE_RATE, 4096) - 44100.0).abs() < 1e-3);
    }
}
