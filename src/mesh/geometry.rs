use crate::math::{Mat4, Vec3};

/// Per-frame snapshot of a tree handed to the renderer
///
/// All positions are in tree-local space; the renderer places the tree at
/// its planting point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderableGeometry {
    /// Six floats per branch: node position then parent position
    pub line_segments: Vec<f32>,
    /// Sixteen floats (column-major) per instanced node sphere
    pub node_transforms: Vec<f32>,
    /// Three floats (RGB) per instanced node sphere
    pub node_colors: Vec<f32>,
    pub line_color: [f32; 3],
}

impl RenderableGeometry {
    pub fn clear(&mut self) {
        self.line_segments.clear();
        self.node_transforms.clear();
        self.node_colors.clear();
    }

    pub fn push_segment(&mut self, from: Vec3, to: Vec3) {
        self.line_segments.extend_from_slice(&from.to_array());
        self.line_segments.extend_from_slice(&to.to_array());
    }

    pub fn push_instance(&mut self, transform: &Mat4, color: Vec3) {
        self.node_transforms.extend_from_slice(transform.as_slice());
        self.node_colors.extend_from_slice(&color.to_array());
    }

    pub fn segment_count(&self) -> usize {
        self.line_segments.len() / 6
    }

    pub fn instance_count(&self) -> usize {
        self.node_transforms.len() / 16
    }

    pub fn is_empty(&self) -> bool {
        self.line_segments.is_empty() && self.node_transforms.is_empty()
    }
}
