use serde::Serialize;

use super::scale::Scale;
use crate::error::{GroveError, Result};

/// Rounded MIDI numbers are clamped into the standard 0..=127 range
pub const MIDI_MIN: i32 = 0;
pub const MIDI_MAX: i32 = 127;

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// A quantized, playable note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    /// MIDI note number
    pub midi: i32,
    /// Equal-tempered frequency in Hz
    pub frequency: f32,
    /// Scientific pitch name, e.g. "G3"
    pub name: String,
}

impl Note {
    pub fn from_midi(midi: i32) -> Self {
        Self {
            midi,
            frequency: midi_to_frequency(midi),
            name: note_name(midi),
        }
    }
}

/// Snap a MIDI note onto the nearest pitch class of `scale`
///
/// The octave is kept and only the degree within it moves. Ties go to the
/// offset that comes first in the scale's stored order. Results saturate at
/// the ends of the `i32` range.
pub fn quantize(note: i32, scale: &Scale) -> i32 {
    let degree = note.rem_euclid(12);
    let octave_base = note.saturating_sub(degree);

    let mut closest: Option<(i32, i32)> = None;
    for &offset in &scale.offsets {
        let offset = offset as i32;
        let distance = (degree - offset).abs();
        // Strict comparison keeps the first minimum
        if closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((offset, distance));
        }
    }

    match closest {
        Some((offset, _)) => octave_base.saturating_add(offset),
        None => note,
    }
}

/// Real-valued MIDI number of a frequency: `69 + 12 * log2(f / 440)`
pub fn frequency_to_midi(frequency: f32) -> f32 {
    69.0 + 12.0 * (frequency / 440.0).log2()
}

pub fn midi_to_frequency(midi: i32) -> f32 {
    440.0 * 2.0f32.powf((midi - 69) as f32 / 12.0)
}

pub fn note_name(midi: i32) -> String {
    let name = NOTE_NAMES[midi.rem_euclid(12) as usize];
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", name, octave)
}

/// Map a branch length to a note in `scale`
///
/// Frequency is inversely proportional to length, so shorter branches sing
/// higher. The MIDI number is rounded and clamped to `MIDI_MIN..=MIDI_MAX`
/// before quantizing.
pub fn length_to_pitch(length: f32, base_frequency: f32, scale: &Scale) -> Result<Note> {
    if !length.is_finite() || length <= 0.0 {
        return Err(GroveError::InvalidLength { length });
    }
    if !base_frequency.is_finite() || base_frequency <= 0.0 {
        return Err(GroveError::InvalidFrequency { frequency: base_frequency });
    }

    let frequency = base_frequency / length;
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(GroveError::InvalidFrequency { frequency });
    }

    let midi = frequency_to_midi(frequency).round().clamp(MIDI_MIN as f32, MIDI_MAX as f32) as i32;
    Ok(Note::from_midi(quantize(midi, scale)))
}
