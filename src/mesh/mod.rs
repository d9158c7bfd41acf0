pub mod geometry;
pub mod palette;

pub use geometry::RenderableGeometry;
pub use palette::{TreePalette, hsl_to_rgb};
