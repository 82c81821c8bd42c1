// pitch-core/src/lib.rs

//! The core logic for the console pitch tuner.
//! This crate is responsible for audio capture, spectral analysis,
//! and frequency-to-note mapping. It is completely headless
//! and contains no presentation code.

pub mod audio;
pub mod notes;
pub mod processor;
pub mod spectrum;

/// Represents the nearest equal-tempered note for a detected frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEstimate {
    /// The detected frequency in Hz.
    pub frequency: f32,
    /// The name of the nearest note, e.g. "A4".
    pub note_name: String,
    /// The canonical frequency of that note in Hz.
    pub note_frequency: f32,
    /// Detected frequency minus the note's canonical frequency, in Hz.
    pub difference: f32,
}
