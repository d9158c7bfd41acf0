use serde::Deserialize;

use crate::math::Vec3;

/// Spatial constraints checked before a tree is planted
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementRules {
    /// Maximum number of trees alive at once
    pub max_trees: usize,
    /// Trees cannot be planted closer than this to the viewer
    pub min_viewer_distance: f32,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            max_trees: 20,
            min_viewer_distance: 4.0,
        }
    }
}

impl PlacementRules {
    pub fn allows(&self, point: Vec3, viewer: Vec3, tree_count: usize) -> bool {
        if tree_count >= self.max_trees {
            return false;
        }
        viewer.distance(&point) >= self.min_viewer_distance
    }
}

/// Intersect a ray with the horizontal plane `y = ground_height`
///
/// Returns the hit point, or `None` when the ray is parallel to the plane or
/// points away from it.
pub fn ground_intersection(origin: Vec3, direction: Vec3, ground_height: f32) -> Option<Vec3> {
    let dir = direction.normalize();
    if dir.y.abs() < 1e-6 {
        return None;
    }

    let t = (ground_height - origin.y) / dir.y;
    if t > 0.0 {
        Some(origin + dir.scale(t))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_close_to_viewer() {
        let rules = PlacementRules::default();
        let viewer = Vec3::new(0.0, 3.0, 0.0);
        assert!(!rules.allows(Vec3::new(1.0, 0.0, 0.0), viewer, 0));
        assert!(rules.allows(Vec3::new(6.0, 0.0, 0.0), viewer, 0));
    }

    #[test]
    fn test_tree_limit() {
        let rules = PlacementRules { max_trees: 2, ..Default::default() };
        let viewer = Vec3::ZERO;
        let far = Vec3::new(10.0, 0.0, 0.0);
        assert!(rules.allows(far, viewer, 1));
        assert!(!rules.allows(far, viewer, 2));
    }

    #[test]
    fn test_ground_hit() {
        let hit = ground_intersection(
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            0.0,
        )
        .unwrap();
        assert!((hit.x - 3.0).abs() < 0.0001);
        assert!(hit.y.abs() < 0.0001);
    }

    #[test]
    fn test_ground_miss() {
        // Looking at the sky
        assert!(ground_intersection(Vec3::new(0.0, 3.0, 0.0), Vec3::UP, 0.0).is_none());
        // Looking at the horizon
        assert!(ground_intersection(Vec3::new(0.0, 3.0, 0.0), Vec3::RIGHT, 0.0).is_none());
    }
}
