use crate::math::{Mat4, Vec3};
use crate::music::Oscillator;
use super::params::GrowthParams;

/// Index of a node inside its tree's node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Role of a node in the tree, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Trunk,
    Branch,
    /// Terminal: never spawns children
    Leaf,
}

/// Where a node is in its growth lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStage {
    /// Still short of its target length
    Growing,
    /// Full length, waiting to spawn children
    Branching,
    /// Has children, or is a leaf at full length
    Grown,
}

/// Audio voice owned by a node
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    /// Envelope attack in seconds
    pub attack: f32,
    /// Oscillator used for the most recent note
    pub oscillator: Option<Oscillator>,
    pub notes_played: u32,
    released: bool,
}

impl Voice {
    pub fn new(attack: f32) -> Self {
        Self {
            attack,
            oscillator: None,
            notes_played: 0,
            released: false,
        }
    }

    /// Record a note on this voice. Released voices stay silent.
    pub fn trigger(&mut self, oscillator: Oscillator) -> bool {
        if self.released {
            return false;
        }
        self.oscillator = Some(oscillator);
        self.notes_played += 1;
        true
    }

    /// Returns true if the voice was still held
    pub fn release(&mut self) -> bool {
        let was_held = !self.released;
        self.released = true;
        was_held
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// One element of a growing tree
///
/// Position is local to the parent node: the node sits at
/// `direction * current_length` from its parent's tip.
#[derive(Debug, Clone)]
pub struct GrowthNode {
    kind: NodeKind,
    height_index: u32,
    branch_index: u32,
    direction: Vec3,
    branching_angle: f32,
    current_length: f32,
    target_length: f32,
    growth_rate: f32,
    node_size: f32,
    wind_offset: f32,
    sway: (f32, f32),
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub resonance: f32,
    pub voice: Voice,
}

impl GrowthNode {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: NodeKind,
        height_index: u32,
        branch_index: u32,
        direction: Vec3,
        branching_angle: f32,
        target_length: f32,
        params: &GrowthParams,
        attack: f32,
    ) -> Self {
        let direction = direction.normalize();
        let growth_rate = if kind == NodeKind::Trunk {
            params.trunk_growth_rate
        } else {
            params.branch_growth_rate
        };

        // Desync sway using where the node will come to rest
        let rest = direction.scale(target_length);
        let wind_offset = (rest.x + rest.y + rest.z) * 10.0;

        Self {
            kind,
            height_index,
            branch_index,
            direction,
            branching_angle,
            current_length: 0.0,
            target_length,
            growth_rate,
            node_size: params.base_node_size / (1 + height_index + branch_index) as f32,
            wind_offset,
            sway: (0.0, 0.0),
            parent: None,
            children: Vec::new(),
            resonance: 0.0,
            voice: Voice::new(attack),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn height_index(&self) -> u32 {
        self.height_index
    }

    pub fn branch_index(&self) -> u32 {
        self.branch_index
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn branching_angle(&self) -> f32 {
        self.branching_angle
    }

    pub fn current_length(&self) -> f32 {
        self.current_length
    }

    pub fn target_length(&self) -> f32 {
        self.target_length
    }

    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn stage(&self) -> GrowthStage {
        if self.current_length < self.target_length {
            GrowthStage::Growing
        } else if self.kind != NodeKind::Leaf && self.children.is_empty() {
            GrowthStage::Branching
        } else {
            GrowthStage::Grown
        }
    }

    /// Extend toward the target length by one tick, never overshooting
    pub fn grow(&mut self) {
        self.current_length = (self.current_length + self.growth_rate).min(self.target_length);
    }

    /// Offset from the parent's tip
    pub fn local_position(&self) -> Vec3 {
        self.direction.scale(self.current_length)
    }

    /// Only trunk and root nodes sway
    pub fn sways(&self) -> bool {
        matches!(self.kind, NodeKind::Trunk | NodeKind::Root)
    }

    /// Set this node's own sway tilt for `time_ms` of elapsed time
    ///
    /// The tilt is computed per node and does not push rotation down to
    /// children; they inherit it only through the parent transform.
    pub fn apply_wind(&mut self, time_ms: f64, params: &GrowthParams) {
        let t = time_ms as f32 + self.wind_offset;
        self.sway = (
            (t * params.wind_speed).sin() * params.wind_amount,
            ((t + 100.0) * params.wind_speed * 1.2).sin() * params.wind_amount,
        );
    }

    pub fn sway(&self) -> (f32, f32) {
        self.sway
    }

    /// Transform from this node's space into its parent's space
    pub fn local_transform(&self) -> Mat4 {
        let p = self.local_position();
        Mat4::translation(p.x, p.y, p.z).mul(&Mat4::rotation_xz(self.sway.0, self.sway.1))
    }

    /// Sphere size including the resonance pulse
    pub fn display_size(&self) -> f32 {
        self.node_size * (1.0 + 2.0 * self.resonance)
    }

    pub fn pulse(&mut self) {
        self.resonance = 1.0;
    }

    pub fn decay_resonance(&mut self, rate: f32) {
        self.resonance = (self.resonance - rate).max(0.0);
    }
}
