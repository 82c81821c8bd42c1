//! # Note Mapping Module
//!
//! This module maps detected frequencies onto the 12-tone equal temperament
//! scale with A4 = 440 Hz as the reference pitch. Note numbering follows the
//! standard piano keyboard, where key 1 is A0 and key 49 is A4.
//!
//! ## Features
//! - Frequency to nearest-note conversion with octave naming
//! - Canonical note frequency and Hz difference calculation
//! - Cent deviation calculation for tuning accuracy
//! - Well-defined naming below A0 (euclidean index arithmetic)

use crate::NoteEstimate;

/// Pitch class names cycling from A, matching the piano key layout.
///
/// Indexed with `(note_num - 1).rem_euclid(12)` where `note_num` is the
/// 1-based piano key number, so key 1 (A0) and key 49 (A4) both land on "A".
const NOTE_NAMES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// Maps a frequency to its nearest equal-tempered note.
///
/// The note number is `round(12 * log2(freq / 440)) + 49`, i.e. the number of
/// semitones from A4 shifted onto the piano key scale. The octave increments
/// at C, which is 8 keys above the nearest A-multiple, hence the `+ 8` in the
/// octave calculation. Euclidean mod and division keep the table index and
/// octave consistent for note numbers below 1 (frequencies under A0).
///
/// # Arguments
/// * `freq` - Input frequency in Hz; must be positive and finite
///
/// # Returns
/// * `NoteEstimate` with the note name, its canonical frequency, and the
///   signed difference `freq - note_frequency` in Hz
pub fn map_frequency(freq: f32) -> NoteEstimate {
    debug_assert!(freq > 0.0 && freq.is_finite());

    let note_num = (12.0 * (freq / 440.0).log2()).round() as i64 + 49;
    let name = NOTE_NAMES[(note_num - 1).rem_euclid(12) as usize];
    let octave = (note_num + 8).div_euclid(12);
    let note_frequency = 440.0 * 2.0_f32.powf((note_num - 49) as f32 / 12.0);

    NoteEstimate {
        frequency: freq,
        note_name: format!("{}{}", name, octave),
        note_frequency,
        difference: freq - note_frequency,
    }
}

/// Returns just the name of the nearest note, e.g. "E2".
///
/// Convenience wrapper around [`map_frequency`] for callers that do not
/// need the frequency fields.
pub fn note_name(freq: f32) -> String {
    map_frequency(freq).note_name
}

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
///
/// # Arguments
/// * `freq` - Measured frequency in Hz
/// * `target_freq` - Target frequency in Hz
///
/// # Returns
/// * Cent deviation (positive = sharp, negative = flat)
pub fn cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_frequency(note_num: i64) -> f32 {
        440.0 * 2.0_f32.powf((note_num - 49) as f32 / 12.0)
    }

    #[test]
    fn a4_maps_exactly() {
        let est = map_frequency(440.0);
        assert_eq!(est.note_name, "A4");
        assert!((est.note_frequency - 440.0).abs() < 1e-3);
        assert!(est.difference.abs() < 1e-3);
    }

    #[test]
    fn octave_doubling_shifts_octave_only() {
        assert_eq!(map_frequency(880.0).note_name, "A5");
        assert_eq!(map_frequency(220.0).note_name, "A3");
    }

    #[test]
    fn known_piano_keys_name_correctly() {
        // (piano key number, expected name)
        let cases = [
            (1, "A0"),
            (4, "C1"),
            (40, "C4"),
            (44, "E4"),
            (49, "A4"),
            (52, "C5"),
            (88, "C8"),
        ];
        for (note_num, expected) in cases {
            let est = map_frequency(key_frequency(note_num));
            assert_eq!(est.note_name, expected, "key {}", note_num);
        }
    }

    #[test]
    fn canonical_frequencies_round_trip() {
        for note_num in 1..=88 {
            let freq = key_frequency(note_num);
            let est = map_frequency(freq);
            assert!(
                est.difference.abs() < 1e-3,
                "key {} drifted by {} Hz",
                note_num,
                est.difference
            );
        }
    }

    #[test]
    fn off_pitch_difference_is_signed() {
        let sharp = map_frequency(444.0);
        assert_eq!(sharp.note_name, "A4");
        assert!((sharp.difference - 4.0).abs() < 1e-3);

        let flat = map_frequency(436.0);
        assert_eq!(flat.note_name, "A4");
        assert!((flat.difference + 4.0).abs() < 1e-3);
    }

    #[test]
    fn sub_piano_frequencies_stay_in_bounds() {
        // 20 Hz sits below A0; note numbering continues downwards.
        let est = map_frequency(20.0);
        assert_eq!(est.note_name, "D#0");
        assert!(est.note_frequency > 0.0);
    }

    #[test]
    fn cents_deviation_matches_semitone() {
        assert!(cents_deviation(440.0, 440.0).abs() < 1e-3);
        let semitone_up = 440.0 * 2.0_f32.powf(1.0 / 12.0);
        assert!((cents_deviation(semitone_up, 440.0) - 100.0).abs() < 0.01);
        assert!((cents_deviation(220.0, 440.0) + 1200.0).abs() < 0.01);
    }
}
