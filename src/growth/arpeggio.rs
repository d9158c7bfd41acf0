//! Arpeggio walks over a grown tree
//!
//! Each walk starts at the root and climbs one randomly chosen child per
//! step, singing one note per node, until it reaches a node with no
//! children. The scale and oscillator are fixed when the walk starts, so
//! changing them only affects walks that start afterwards.

use rand::Rng;

use crate::math::Vec3;
use crate::music::{Note, Oscillator, Scale, ScaleTable};
use super::node::NodeId;

/// Timer payloads owned by a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpeggioTask {
    /// Recurring trigger that begins a new walk at the root
    Start,
    /// Delayed continuation of a walk, carrying the settings it started with
    Step {
        node: NodeId,
        scale: usize,
        oscillator: Oscillator,
    },
}

/// Musical settings in effect for walks that start this frame
#[derive(Debug, Clone, Copy)]
pub struct NoteContext<'a> {
    pub scales: &'a ScaleTable,
    /// Index of the active scale in `scales`
    pub scale: usize,
    pub oscillator: Oscillator,
    pub base_frequency: f32,
}

impl NoteContext<'_> {
    /// Scale at `index`, or the table default if it is out of range
    pub fn scale_at(&self, index: usize) -> &Scale {
        self.scales
            .get_index(index)
            .unwrap_or_else(|_| self.scales.default_scale())
    }
}

/// A note sung by one node of a tree
#[derive(Debug, Clone, PartialEq)]
pub struct SungNote {
    pub node: NodeId,
    pub note: Note,
    pub oscillator: Oscillator,
    /// World-space position of the singing node
    pub position: Vec3,
}

/// Pick the node an upward walk moves to next
pub fn next_step<R: Rng>(children: &[NodeId], rng: &mut R) -> Option<NodeId> {
    if children.is_empty() {
        return None;
    }
    Some(children[rng.gen_range(0..children.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_out_of_range_scale_uses_default() {
        let table = ScaleTable::default();
        let ctx = NoteContext { scales: &table, scale: 0, oscillator: Oscillator::Pulse, base_frequency: 400.0 };
        assert_eq!(ctx.scale_at(1).id, table.get_index(1).unwrap().id);
        assert_eq!(ctx.scale_at(99).id, table.default_scale().id);
    }

    #[test]
    fn test_walk_stops_without_children() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(next_step(&[], &mut rng), None);
    }

    #[test]
    fn test_walk_visits_every_child_eventually() {
        let mut rng = SmallRng::seed_from_u64(1);
        let children = [NodeId(3), NodeId(4)];
        let mut seen = [false; 2];
        for _ in 0..100 {
            let next = next_step(&children, &mut rng).unwrap();
            seen[next.index() - 3] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
