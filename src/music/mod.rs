//! Musical side of the engine: scale registry and pitch quantization
//!
//! Branch lengths are mapped to frequencies (shorter branch, higher pitch),
//! converted to MIDI numbers and snapped onto the active scale.

pub mod scale;
pub mod pitch;

pub use scale::{Oscillator, Scale, ScaleTable};
pub use pitch::{Note, frequency_to_midi, length_to_pitch, midi_to_frequency, note_name, quantize};
