use qfixed::Q4_12;

/// Storage-format color: four UNORM8 channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a COLOR/CONST_COLOR half: R in [7:0], A in [31:24].
    #[must_use]
    pub const fn from_packed(v: u32) -> Self {
        Self::new(v as u8, (v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8)
    }

    #[must_use]
    pub const fn to_packed(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16) | ((self.a as u32) << 24)
    }

    /// Expand RGB565 by bit replication. Alpha reads as opaque.
    #[must_use]
    pub const fn from_rgb565(v: u16) -> Self {
        let r5 = ((v >> 11) & 0x1F) as u8;
        let g6 = ((v >> 5) & 0x3F) as u8;
        let b5 = (v & 0x1F) as u8;
        Self::new(
            (r5 << 3) | (r5 >> 2),
            (g6 << 2) | (g6 >> 4),
            (b5 << 3) | (b5 >> 2),
            255,
        )
    }

    /// Pack to RGB565 by truncation, dropping alpha.
    #[must_use]
    pub const fn to_rgb565(self) -> u16 {
        ((self.r as u16 >> 3) << 11) | ((self.g as u16 >> 2) << 5) | (self.b as u16 >> 3)
    }

    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Pipeline-format color: four signed Q4.12 channels, 1.0 = `0x1000`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: Q4_12,
    pub g: Q4_12,
    pub b: Q4_12,
    pub a: Q4_12,
}

impl Color {
    pub const ZERO: Self = Self::splat(Q4_12::ZERO);
    pub const ONE: Self = Self::splat(Q4_12::ONE);

    #[must_use]
    pub const fn new(r: Q4_12, g: Q4_12, b: Q4_12, a: Q4_12) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn splat(v: Q4_12) -> Self {
        Self::new(v, v, v, v)
    }

    /// Promote on pipeline entry.
    #[must_use]
    pub const fn from_rgba8(c: Rgba8) -> Self {
        Self::new(
            Q4_12::from_unorm8(c.r),
            Q4_12::from_unorm8(c.g),
            Q4_12::from_unorm8(c.b),
            Q4_12::from_unorm8(c.a),
        )
    }

    /// Truncate back to storage format, clamping each channel to [0, 1].
    #[must_use]
    pub const fn to_rgba8(self) -> Rgba8 {
        Rgba8::new(
            self.r.to_unorm8(),
            self.g.to_unorm8(),
            self.b.to_unorm8(),
            self.a.to_unorm8(),
        )
    }

    /// Alpha copied into all four channels.
    #[must_use]
    pub const fn alpha_broadcast(self) -> Self {
        Self::splat(self.a)
    }

    /// Per-channel combination of two colors.
    #[must_use]
    pub fn zip_with(self, other: Self, f: impl Fn(Q4_12, Q4_12) -> Q4_12) -> Self {
        Self::new(
            f(self.r, other.r),
            f(self.g, other.g),
            f(self.b, other.b),
            f(self.a, other.a),
        )
    }
}

impl From<Rgba8> for Color {
    fn from(c: Rgba8) -> Self {
        Self::from_rgba8(c)
    }
}
