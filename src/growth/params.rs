use std::f32::consts::PI;
use serde::Deserialize;

/// Parameters controlling how a planted tree grows and sways
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GrowthParams {
    /// Number of trunk segments before the crown splits
    pub max_height: u32,
    /// Depth of a lateral branch chain before children become leaves
    pub max_branches: u32,
    /// Length added per tick to trunk segments
    pub trunk_growth_rate: f32,
    /// Length added per tick to every other node
    pub branch_growth_rate: f32,
    /// Twist added to each trunk extension's branching angle (radians)
    pub twist_factor: f32,
    /// Random spread around the twist (radians)
    pub twist_variation: f32,
    pub wind_speed: f32,
    pub wind_amount: f32,
    /// Resonance lost per tick after a node sings
    pub resonance_decay: f32,
    /// Node sphere size at the base of the tree
    pub base_node_size: f32,
    /// Floor for derived child lengths
    pub min_length: f32,
    /// Maximum number of instanced node transforms emitted per tree
    pub instance_capacity: usize,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            max_height: 6,
            max_branches: 4,
            trunk_growth_rate: 0.04,
            branch_growth_rate: 0.02,
            twist_factor: PI * 1.33,
            twist_variation: PI / 4.0,
            wind_speed: 0.0005,
            wind_amount: 0.01,
            resonance_decay: 0.02,
            base_node_size: 0.2,
            min_length: 0.05,
            instance_capacity: 300,
        }
    }
}
