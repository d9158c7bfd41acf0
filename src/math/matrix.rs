use super::Vec3;

/// 4x4 matrix for transformations (column-major for WebGL)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub fn identity() -> Self {
        Self {
            data: [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::identity();
        m.data[12] = x;
        m.data[13] = y;
        m.data[14] = z;
        m
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::identity();
        m.data[0] = x;
        m.data[5] = y;
        m.data[10] = z;
        m
    }

    pub fn rotation_x(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            data: [
                1.0, 0.0, 0.0, 0.0,
                0.0, c, s, 0.0,
                0.0, -s, c, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub fn rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            data: [
                c, s, 0.0, 0.0,
                -s, c, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Euler rotation in XYZ order with no Y component (sway tilt)
    pub fn rotation_xz(x: f32, z: f32) -> Self {
        Self::rotation_x(x).mul(&Self::rotation_z(z))
    }

    /// Translation followed by a uniform scale: `T(position) * S(scale)`
    pub fn from_translation_scale(position: Vec3, scale: f32) -> Self {
        let mut m = Self::scale(scale, scale, scale);
        m.data[12] = position.x;
        m.data[13] = position.y;
        m.data[14] = position.z;
        m
    }

    /// Matrix multiplication
    pub fn mul(&self, other: &Mat4) -> Self {
        let mut result = [0.0f32; 16];

        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.data[row + k * 4] * other.data[k + col * 4];
                }
                result[row + col * 4] = sum;
            }
        }

        Self { data: result }
    }

    /// Translation column, i.e. where the local origin ends up
    pub fn origin(&self) -> Vec3 {
        Vec3::new(self.data[12], self.data[13], self.data[14])
    }

    pub fn as_slice(&self) -> &[f32; 16] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Where `m` sends point `p`
    fn apply(m: &Mat4, p: Vec3) -> Vec3 {
        m.mul(&Mat4::translation(p.x, p.y, p.z)).origin()
    }

    #[test]
    fn test_translation() {
        let m = Mat4::translation(1.0, 2.0, 3.0);
        assert_eq!(m.origin(), Vec3::new(1.0, 2.0, 3.0));
        let result = apply(&m, Vec3::new(1.0, 1.0, 1.0));
        assert!((result.x - 2.0).abs() < 0.0001);
        assert!((result.z - 4.0).abs() < 0.0001);
    }

    #[test]
    fn test_rotation_z() {
        let m = Mat4::rotation_z(std::f32::consts::FRAC_PI_2);
        let result = apply(&m, Vec3::new(1.0, 0.0, 0.0));
        assert!((result.x).abs() < 0.0001);
        assert!((result.y - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_rotation_xz_zero_is_identity() {
        assert_eq!(Mat4::rotation_xz(0.0, 0.0), Mat4::identity());
    }

    #[test]
    fn test_translation_scale() {
        let m = Mat4::from_translation_scale(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let p = apply(&m, Vec3::new(1.0, 1.0, 0.0));
        assert!((p.x - 3.0).abs() < 0.0001);
        assert!((p.y - 2.0).abs() < 0.0001);
    }

    #[test]
    fn test_matrix_mul() {
        let t = Mat4::translation(1.0, 0.0, 0.0);
        let s = Mat4::scale(2.0, 2.0, 2.0);
        let combined = t.mul(&s);
        let result = apply(&combined, Vec3::new(1.0, 0.0, 0.0));
        assert!((result.x - 3.0).abs() < 0.0001);
    }
}
