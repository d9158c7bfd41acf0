//! Incremental tree growth
//!
//! A tree starts as a single root node. Every tick each tip either extends
//! toward its target length or, once there, spawns children chosen by the
//! branching policy. Growth ends when no tips remain, after which the tree
//! periodically plays arpeggios over its branches.

pub mod params;
pub mod node;
pub mod branching;
pub mod arpeggio;
pub mod tree;

pub use params::GrowthParams;
pub use node::{GrowthNode, GrowthStage, NodeId, NodeKind, Voice};
pub use arpeggio::{ArpeggioTask, NoteContext, SungNote};
pub use tree::TreeAggregate;
