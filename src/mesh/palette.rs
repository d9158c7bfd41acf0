use rand::Rng;

use crate::math::Vec3;

/// Colors shared by every node and branch of one tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreePalette {
    /// Hue in degrees
    pub hue: f32,
    pub node: Vec3,
    pub line: Vec3,
    pub light: Vec3,
}

impl TreePalette {
    pub fn from_hue(hue: f32) -> Self {
        Self {
            hue,
            node: hsl_to_rgb(hue, 0.9, 0.66),
            line: hsl_to_rgb(hue, 0.9, 0.9),
            light: hsl_to_rgb(hue, 0.9, 0.5),
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::from_hue(rng.gen_range(0.0..360.0))
    }

    /// Node color brightened toward the light color while resonating
    pub fn node_color(&self, resonance: f32) -> Vec3 {
        self.node.lerp(&self.light, resonance.clamp(0.0, 1.0))
    }
}

/// HSL to RGB, hue in degrees, saturation and lightness in [0, 1]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Vec3::new(r + m, g + m, b + m)
}
