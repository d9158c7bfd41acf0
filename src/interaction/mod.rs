pub mod placement;

pub use placement::{PlacementRules, ground_intersection};
