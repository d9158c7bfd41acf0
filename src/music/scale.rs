use serde::{Deserialize, Serialize};

use crate::error::{GroveError, Result};

/// A named set of pitch-class offsets (semitones above the octave base)
///
/// Offsets keep their stored order; quantization breaks ties by that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub id: String,
    pub name: String,
    pub offsets: Vec<u8>,
}

impl Scale {
    /// Build a scale, dropping out-of-range and repeated offsets
    pub fn new(id: &str, name: &str, offsets: &[u8]) -> Self {
        let mut kept: Vec<u8> = Vec::with_capacity(offsets.len());
        for &offset in offsets {
            if offset < 12 && !kept.contains(&offset) {
                kept.push(offset);
            }
        }
        Self {
            id: id.to_string(),
            name: name.to_string(),
            offsets: kept,
        }
    }

    pub fn contains(&self, pitch_class: u8) -> bool {
        self.offsets.contains(&pitch_class)
    }
}

/// Oscillator timbres the audio layer knows how to voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Oscillator {
    #[default]
    Pulse,
    Sine,
    Sawtooth,
    Triangle,
    Square,
}

impl Oscillator {
    pub const ALL: [Oscillator; 5] = [
        Oscillator::Pulse,
        Oscillator::Sine,
        Oscillator::Sawtooth,
        Oscillator::Triangle,
        Oscillator::Square,
    ];

    /// Key understood by the synth layer
    pub fn key(&self) -> &'static str {
        match self {
            Oscillator::Pulse => "pulse",
            Oscillator::Sine => "sine",
            Oscillator::Sawtooth => "sawtooth",
            Oscillator::Triangle => "triangle",
            Oscillator::Square => "square",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Oscillator::Pulse => "Pulse",
            Oscillator::Sine => "Sine",
            Oscillator::Sawtooth => "Saw",
            Oscillator::Triangle => "Triangle",
            Oscillator::Square => "Square",
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|osc| osc.key() == key)
            .ok_or_else(|| GroveError::UnknownOscillator(key.to_string()))
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| GroveError::UnknownOscillator(index.to_string()))
    }
}

/// Registry of the scales offered to the player
#[derive(Debug, Clone)]
pub struct ScaleTable {
    scales: Vec<Scale>,
}

impl Default for ScaleTable {
    fn default() -> Self {
        Self {
            scales: vec![
                Scale::new("diatonic", "Diatonic", &[0, 2, 4, 5, 7, 9, 11]),
                Scale::new("pentatonic", "Pentatonic", &[0, 2, 4, 7, 9]),
                Scale::new("hirajoshi", "Hirajōshi", &[0, 4, 6, 7, 11]),
                Scale::new("insen", "Insen", &[0, 1, 5, 7, 10]),
                Scale::new("acoustic", "Acoustic", &[0, 2, 4, 6, 7, 9, 10]),
                Scale::new("dominant", "Dominant", &[0, 2, 4, 7, 10]),
                Scale::new("whole_tone", "Whole Tone", &[0, 2, 4, 6, 8, 10]),
            ],
        }
    }
}

impl ScaleTable {
    /// Custom registry; an empty list falls back to the built-in scales
    pub fn new(scales: Vec<Scale>) -> Self {
        if scales.is_empty() {
            return Self::default();
        }
        Self { scales }
    }

    pub fn get(&self, id: &str) -> Result<&Scale> {
        self.scales
            .iter()
            .find(|scale| scale.id == id)
            .ok_or_else(|| GroveError::UnknownScale(id.to_string()))
    }

    pub fn get_index(&self, index: usize) -> Result<&Scale> {
        self.scales
            .get(index)
            .ok_or_else(|| GroveError::UnknownScale(index.to_string()))
    }

    /// Fallback used when a requested scale does not exist
    pub fn default_scale(&self) -> &Scale {
        &self.scales[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scale> {
        self.scales.iter()
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_contents() {
        let table = ScaleTable::default();
        assert_eq!(table.len(), 7);
        assert_eq!(table.default_scale().id, "diatonic");
        assert_eq!(table.get("insen").unwrap().offsets, vec![0, 1, 5, 7, 10]);
        assert_eq!(table.get_index(6).unwrap().name, "Whole Tone");
    }

    #[test]
    fn test_custom_table() {
        let table = ScaleTable::new(vec![Scale::new("fifths", "Fifths", &[0, 7])]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.default_scale().id, "fifths");

        let fallback = ScaleTable::new(Vec::new());
        assert_eq!(fallback.len(), 7);
        assert!(!fallback.is_empty());
    }

    #[test]
    fn test_unknown_scale() {
        let table = ScaleTable::default();
        assert_eq!(
            table.get("lydian"),
            Err(GroveError::UnknownScale("lydian".to_string()))
        );
        assert!(table.get_index(42).is_err());
    }

    #[test]
    fn test_scale_offsets_unique_and_in_range() {
        let scale = Scale::new("odd", "Odd", &[7, 0, 7, 14, 3]);
        assert_eq!(scale.offsets, vec![7, 0, 3]);
        assert!(scale.contains(3));
        assert!(!scale.contains(2));
    }

    #[test]
    fn test_builtin_scales_are_sorted() {
        for scale in ScaleTable::default().iter() {
            assert!(scale.offsets.windows(2).all(|w| w[0] < w[1]), "{}", scale.id);
        }
    }

    #[test]
    fn test_oscillator_lookup() {
        assert_eq!(Oscillator::from_key("sawtooth").unwrap(), Oscillator::Sawtooth);
        assert_eq!(Oscillator::from_index(1).unwrap(), Oscillator::Sine);
        assert_eq!(Oscillator::Sawtooth.display_name(), "Saw");
        assert!(matches!(
            Oscillator::from_key("fatsawtooth"),
            Err(GroveError::UnknownOscillator(_))
        ));
        assert_eq!(Oscillator::default(), Oscillator::Pulse);
    }
}
