use qfixed::{Q12_4, Q4_12, Uq1_15};

use crate::color::Rgba8;

/// One triangle corner as latched from the vertex registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vertex {
    pub x: Q12_4,
    pub y: Q12_4,
    pub z: u16,
    /// 1/W.
    pub q: Uq1_15,
    /// Diffuse.
    pub color0: Rgba8,
    /// Specular.
    pub color1: Rgba8,
    /// U/W, V/W for texture unit 0.
    pub uv0: [Q4_12; 2],
    /// U/W, V/W for texture unit 1.
    pub uv1: [Q4_12; 2],
}

impl Vertex {
    /// A vertex at a whole-pixel position with a single color and no
    /// texture coordinates.
    #[must_use]
    pub fn at(x: i16, y: i16, z: u16, color: Rgba8) -> Self {
        Self {
            x: Q12_4::from_int(x),
            y: Q12_4::from_int(y),
            z,
            q: Uq1_15::ONE,
            color0: color,
            color1: Rgba8::TRANSPARENT,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_uv0(mut self, u: f32, v: f32) -> Self {
        self.uv0 = [Q4_12::from_f32(u), Q4_12::from_f32(v)];
        self
    }

    #[must_use]
    pub fn with_uv1(mut self, u: f32, v: f32) -> Self {
        self.uv1 = [Q4_12::from_f32(u), Q4_12::from_f32(v)];
        self
    }
}

/// Interpolated perspective-divided texture coordinate, Q4.12 scale but
/// widened so that guard-band interpolation cannot wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexCoord {
    /// U/W
    pub uq: i32,
    /// V/W
    pub vq: i32,
}

/// A candidate pixel emitted by the rasterizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fragment {
    pub x: u16,
    pub y: u16,
    pub z: u16,
    pub shade0: Rgba8,
    pub shade1: Rgba8,
    pub uv0: TexCoord,
    pub uv1: TexCoord,
    /// Interpolated 1/W, UQ1.15 scale.
    pub q: u32,
}
