//! The set of planted trees and the musical settings they share

use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;

use crate::config::GroveConfig;
use crate::error::Result;
use crate::growth::{NodeId, NoteContext, TreeAggregate};
use crate::math::Vec3;
use crate::mesh::RenderableGeometry;
use crate::music::{Note, Oscillator, Scale, ScaleTable};

/// Handle to a planted tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub u32);

/// A note sung by some tree, as seen by the audio layer
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub tree: TreeId,
    pub node: NodeId,
    pub note: Note,
    pub oscillator: Oscillator,
    pub position: Vec3,
}

type NoteListener = Box<dyn FnMut(&NoteEvent)>;

/// Owns every tree and routes their notes to listeners
pub struct Garden {
    config: GroveConfig,
    scales: ScaleTable,
    active_scale: usize,
    active_oscillator: Oscillator,
    trees: Vec<(TreeId, TreeAggregate)>,
    next_id: u32,
    seeder: SmallRng,
    listeners: Vec<NoteListener>,
}

impl Garden {
    pub fn new(config: GroveConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, ScaleTable::default(), seed))
    }

    pub fn with_scales(config: GroveConfig, scales: ScaleTable, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, scales, seed))
    }

    fn build(config: GroveConfig, scales: ScaleTable, seed: u64) -> Self {
        let mut garden = Self {
            active_oscillator: config.music.default_oscillator,
            config,
            scales,
            active_scale: 0,
            trees: Vec::new(),
            next_id: 0,
            seeder: SmallRng::seed_from_u64(seed),
            listeners: Vec::new(),
        };
        let default_scale = garden.config.music.default_scale.clone();
        garden.set_active_scale(&default_scale);
        garden
    }

    pub fn config(&self) -> &GroveConfig {
        &self.config
    }

    pub fn scales(&self) -> &ScaleTable {
        &self.scales
    }

    /// Whether a tree may be planted at `point` by a viewer at `viewer`
    pub fn can_plant(&self, point: Vec3, viewer: Vec3) -> bool {
        self.config.placement.allows(point, viewer, self.trees.len())
    }

    /// Plant a tree without checking placement rules
    pub fn plant_tree(&mut self, point: Vec3) -> TreeId {
        let id = TreeId(self.next_id);
        self.next_id += 1;

        let seed = self.seeder.gen::<u64>();
        let tree = TreeAggregate::new(point, self.config.growth, self.config.music.clone(), seed);
        self.trees.push((id, tree));
        debug!("tree {} planted ({} alive)", id.0, self.trees.len());
        id
    }

    /// Plant only if the placement rules allow it
    pub fn try_plant(&mut self, point: Vec3, viewer: Vec3) -> Option<TreeId> {
        if self.can_plant(point, viewer) {
            Some(self.plant_tree(point))
        } else {
            None
        }
    }

    /// Advance every tree by one frame and deliver the notes they sang
    pub fn update(&mut self, dt: f64) {
        let ctx = NoteContext {
            scales: &self.scales,
            scale: self.active_scale,
            oscillator: self.active_oscillator,
            base_frequency: self.config.music.base_frequency,
        };

        let mut events = Vec::new();
        for (id, tree) in self.trees.iter_mut() {
            for sung in tree.update(dt, &ctx) {
                events.push(NoteEvent {
                    tree: *id,
                    node: sung.node,
                    note: sung.note,
                    oscillator: sung.oscillator,
                    position: sung.position,
                });
            }
        }

        for event in &events {
            for listener in self.listeners.iter_mut() {
                listener(event);
            }
        }
    }

    /// Dispose of one tree. Returns false if the id is unknown.
    pub fn dispose(&mut self, id: TreeId) -> bool {
        match self.trees.iter().position(|(tree_id, _)| *tree_id == id) {
            Some(index) => {
                let (_, mut tree) = self.trees.remove(index);
                tree.dispose();
                true
            }
            None => {
                warn!("dispose requested for unknown tree {}", id.0);
                false
            }
        }
    }

    /// Dispose of every tree
    pub fn clear(&mut self) {
        for (_, mut tree) in self.trees.drain(..) {
            tree.dispose();
        }
    }

    pub fn tree(&self, id: TreeId) -> Option<&TreeAggregate> {
        self.trees.iter().find(|(tree_id, _)| *tree_id == id).map(|(_, tree)| tree)
    }

    pub fn geometry(&self, id: TreeId) -> Option<&RenderableGeometry> {
        self.tree(id).map(|tree| tree.geometry())
    }

    pub fn tree_ids(&self) -> Vec<TreeId> {
        self.trees.iter().map(|(id, _)| *id).collect()
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn on_note_played<F>(&mut self, listener: F)
    where
        F: FnMut(&NoteEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Select the scale for arpeggio walks that start from now on
    ///
    /// Walks already in progress keep their scale. Unknown ids fall back
    /// to the default scale.
    pub fn set_active_scale(&mut self, id: &str) {
        self.active_scale = match self.scales.iter().position(|s| s.id == id) {
            Some(index) => index,
            None => {
                warn!("unknown scale '{}', using {}", id, self.scales.default_scale().name);
                0
            }
        };
    }

    pub fn set_active_scale_index(&mut self, index: usize) {
        self.active_scale = match self.scales.get_index(index) {
            Ok(_) => index,
            Err(e) => {
                warn!("{}, using {}", e, self.scales.default_scale().name);
                0
            }
        };
    }

    pub fn active_scale(&self) -> &Scale {
        self.scales
            .get_index(self.active_scale)
            .unwrap_or_else(|_| self.scales.default_scale())
    }

    /// Select the oscillator for arpeggio walks that start from now on
    ///
    /// Unknown keys fall back to the configured default oscillator.
    pub fn set_active_oscillator(&mut self, key: &str) {
        self.active_oscillator = Oscillator::from_key(key).unwrap_or_else(|e| {
            warn!("{}, using {}", e, self.config.music.default_oscillator.key());
            self.config.music.default_oscillator
        });
    }

    pub fn set_active_oscillator_index(&mut self, index: usize) {
        self.active_oscillator = Oscillator::from_index(index).unwrap_or_else(|e| {
            warn!("{}, using {}", e, self.config.music.default_oscillator.key());
            self.config.music.default_oscillator
        });
    }

    pub fn active_oscillator(&self) -> Oscillator {
        self.active_oscillator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::growth::GrowthParams;

    const DT: f64 = 1.0 / 60.0;

    fn small_garden(seed: u64) -> Garden {
        let mut config = GroveConfig::default();
        config.growth = GrowthParams {
            max_height: 2,
            max_branches: 2,
            ..Default::default()
        };
        Garden::new(config, seed).unwrap()
    }

    fn record(garden: &mut Garden) -> Rc<RefCell<Vec<NoteEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        garden.on_note_played(move |event| sink.borrow_mut().push(event.clone()));
        log
    }

    #[test]
    fn test_planting_rules() {
        let mut config = GroveConfig::default();
        config.placement.max_trees = 2;
        let mut garden = Garden::new(config, 1).unwrap();
        let viewer = Vec3::new(0.0, 3.0, 0.0);

        assert!(garden.try_plant(Vec3::new(1.0, 0.0, 0.0), viewer).is_none());
        assert!(garden.try_plant(Vec3::new(10.0, 0.0, 0.0), viewer).is_some());
        assert!(garden.try_plant(Vec3::new(-10.0, 0.0, 0.0), viewer).is_some());
        assert!(garden.try_plant(Vec3::new(0.0, 0.0, 10.0), viewer).is_none());
        assert_eq!(garden.tree_count(), 2);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut garden = small_garden(2);
        let a = garden.plant_tree(Vec3::ZERO);
        let b = garden.plant_tree(Vec3::ZERO);
        garden.dispose(a);
        let c = garden.plant_tree(Vec3::ZERO);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_notes_reach_listeners() {
        let mut garden = small_garden(3);
        let events = record(&mut garden);
        let id = garden.plant_tree(Vec3::new(8.0, 0.0, 0.0));

        for _ in 0..5000 {
            garden.update(DT);
            if !events.borrow().is_empty() {
                break;
            }
        }

        let events = events.borrow();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.tree == id));
        assert!(events.iter().all(|e| e.oscillator == Oscillator::Pulse));
    }

    #[test]
    fn test_scale_change_applies_to_later_notes() {
        let mut garden = small_garden(4);
        let events = record(&mut garden);
        garden.plant_tree(Vec3::new(8.0, 0.0, 0.0));
        garden.set_active_scale("whole_tone");
        garden.set_active_oscillator("triangle");

        for _ in 0..5000 {
            garden.update(DT);
        }

        let whole_tone = garden.scales().get("whole_tone").unwrap().clone();
        let events = events.borrow();
        assert!(!events.is_empty());
        for event in events.iter() {
            assert!(whole_tone.contains(event.note.midi.rem_euclid(12) as u8));
            assert_eq!(event.oscillator, Oscillator::Triangle);
        }
    }

    #[test]
    fn test_scale_change_mid_walk_is_not_retroactive() {
        let mut garden = small_garden(6);
        let events = record(&mut garden);
        garden.plant_tree(Vec3::new(8.0, 0.0, 0.0));

        for _ in 0..5000 {
            garden.update(DT);
            if !events.borrow().is_empty() {
                break;
            }
        }
        assert_eq!(events.borrow().len(), 1);

        garden.set_active_scale("whole_tone");
        garden.set_active_oscillator("square");
        // Long enough to finish this walk, short of the next trigger
        for _ in 0..300 {
            garden.update(DT);
        }

        let diatonic = garden.scales().get("diatonic").unwrap().clone();
        let events = events.borrow();
        assert!(events.len() > 1);
        for event in events.iter() {
            assert!(diatonic.contains(event.note.midi.rem_euclid(12) as u8));
            assert_eq!(event.oscillator, Oscillator::Pulse);
        }
    }

    #[test]
    fn test_unknown_settings_fall_back() {
        let mut garden = small_garden(5);
        garden.set_active_scale_index(3);
        assert_eq!(garden.active_scale().id, "insen");

        garden.set_active_scale("lydian");
        assert_eq!(garden.active_scale().id, "diatonic");

        garden.set_active_scale_index(99);
        assert_eq!(garden.active_scale().id, "diatonic");

        garden.set_active_oscillator("square");
        assert_eq!(garden.active_oscillator(), Oscillator::Square);
        garden.set_active_oscillator("fmsquare");
        assert_eq!(garden.active_oscillator(), Oscillator::Pulse);
        garden.set_active_oscillator_index(2);
        assert_eq!(garden.active_oscillator(), Oscillator::Sawtooth);
    }

    #[test]
    fn test_configured_defaults_used() {
        let mut config = GroveConfig::default();
        config.music.default_scale = "hirajoshi".to_string();
        config.music.default_oscillator = Oscillator::Sine;
        let garden = Garden::new(config, 6).unwrap();
        assert_eq!(garden.active_scale().id, "hirajoshi");
        assert_eq!(garden.active_oscillator(), Oscillator::Sine);
    }

    #[test]
    fn test_dispose_stops_events_and_geometry() {
        let mut garden = small_garden(7);
        let events = record(&mut garden);
        let id = garden.plant_tree(Vec3::new(8.0, 0.0, 0.0));

        // Grow, then run until the first walk is mid-flight
        for _ in 0..5000 {
            garden.update(DT);
            if !events.borrow().is_empty() {
                break;
            }
        }
        assert!(garden.geometry(id).is_some());

        assert!(garden.dispose(id));
        assert!(!garden.dispose(id));
        let heard = events.borrow().len();

        for _ in 0..2000 {
            garden.update(DT);
        }
        assert_eq!(events.borrow().len(), heard);
        assert!(garden.geometry(id).is_none());
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut garden = small_garden(8);
        garden.plant_tree(Vec3::ZERO);
        garden.plant_tree(Vec3::new(5.0, 0.0, 0.0));
        garden.update(DT);
        garden.clear();
        assert_eq!(garden.tree_count(), 0);
        assert!(garden.tree_ids().is_empty());
    }

    #[test]
    fn test_same_seed_same_garden() {
        let mut a = small_garden(9);
        let mut b = small_garden(9);
        let ta = a.plant_tree(Vec3::ZERO);
        let tb = b.plant_tree(Vec3::ZERO);
        for _ in 0..300 {
            a.update(DT);
            b.update(DT);
        }
        assert_eq!(a.geometry(ta), b.geometry(tb));
    }

    #[test]
    fn test_custom_scale_table() {
        let scales = ScaleTable::new(vec![Scale::new("fifths", "Fifths", &[0, 7])]);
        let mut config = GroveConfig::default();
        config.growth.max_height = 2;
        config.growth.max_branches = 1;
        let mut garden = Garden::with_scales(config, scales, 10).unwrap();
        // Configured default "diatonic" is not in this table
        assert_eq!(garden.active_scale().id, "fifths");

        let events = record(&mut garden);
        garden.plant_tree(Vec3::new(8.0, 0.0, 0.0));
        for _ in 0..3000 {
            garden.update(DT);
        }
        let events = events.borrow();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| matches!(e.note.midi.rem_euclid(12), 0 | 7)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GroveConfig::default();
        config.music.arpeggio_period = 0.0;
        assert!(Garden::new(config, 0).is_err());
    }
}
