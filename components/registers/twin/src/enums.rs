//! Enumerated field encodings.

use crate::encode::UnknownVariant;

macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $bits:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $bits, )*
        }

        impl $name {
            /// Decode a bit pattern into an encoded variant.
            ///
            /// # Errors
            /// Returns an error if the bit pattern names no variant.
            pub const fn from_bits(bits: u8) -> Result<Self, UnknownVariant<u8>> {
                match bits {
                    $( $bits => Ok(Self::$variant), )*
                    bits => Err(UnknownVariant::new(bits)),
                }
            }

            /// The bit pattern of the variant.
            #[must_use]
            pub const fn bits(&self) -> u8 {
                *self as u8
            }
        }
    };
}

field_enum! {
    /// RENDER_MODE.CULL_MODE
    pub enum CullMode {
        /// Draw both windings.
        None = 0,
        /// Cull clockwise-wound triangles.
        Cw = 1,
        /// Cull counter-clockwise-wound triangles.
        Ccw = 2,
    }
}

field_enum! {
    /// RENDER_MODE.ALPHA_BLEND
    pub enum AlphaBlend {
        /// Overwrite destination.
        Disabled = 0,
        /// src + dst, saturating.
        Add = 1,
        /// src - dst, saturating.
        Subtract = 2,
        /// src*a + dst*(1-a).
        Blend = 3,
    }
}

field_enum! {
    /// RENDER_MODE.ALPHA_TEST_FUNC
    pub enum AlphaTest {
        Always = 0,
        /// Pass if alpha < ALPHA_REF.
        Less = 1,
        /// Pass if alpha >= ALPHA_REF.
        Gequal = 2,
        /// Pass if alpha != ALPHA_REF.
        Notequal = 3,
    }
}

field_enum! {
    /// RENDER_MODE.DITHER_PATTERN
    pub enum DitherPattern {
        BlueNoise16x16 = 0,
    }
}

field_enum! {
    /// RENDER_MODE.Z_COMPARE
    pub enum ZCompare {
        Less = 0,
        Lequal = 1,
        Equal = 2,
        Gequal = 3,
        Greater = 4,
        Notequal = 5,
        Always = 6,
        Never = 7,
    }
}

field_enum! {
    /// TEXn_CFG.FILTER
    pub enum TexFilter {
        Nearest = 0,
        /// 2x2 taps.
        Bilinear = 1,
        /// Requires MIP_LEVELS > 1.
        Trilinear = 2,
    }
}

field_enum! {
    /// TEXn_CFG.FORMAT
    pub enum TexFormat {
        /// 4 bpp, 64 bits per block, opaque or 1-bit alpha.
        Bc1 = 0,
        /// 8 bpp, explicit 4-bit alpha.
        Bc2 = 1,
        /// 8 bpp, interpolated alpha.
        Bc3 = 2,
        /// 4 bpp, single channel.
        Bc4 = 3,
        Rgb565 = 4,
        Rgba8888 = 5,
        /// 8 bpp, single channel.
        R8 = 6,
    }
}

impl TexFormat {
    /// Bytes occupied by one 4x4 block.
    #[must_use]
    pub const fn block_bytes(self) -> u32 {
        match self {
            Self::Bc1 | Self::Bc4 => 8,
            Self::Bc2 | Self::Bc3 | Self::R8 => 16,
            Self::Rgb565 => 32,
            Self::Rgba8888 => 64,
        }
    }

    /// Burst length in 16-bit words needed to fetch one block.
    #[must_use]
    pub const fn burst_words(self) -> u8 {
        (self.block_bytes() / 2) as u8
    }
}

field_enum! {
    /// TEXn_CFG.{U,V}_WRAP, with the high bit taken from {U,V}_WRAP_HI.
    pub enum WrapMode {
        Repeat = 0,
        /// Clamp to [0, size-1].
        ClampToEdge = 1,
        /// Reflect at the boundaries.
        Mirror = 2,
        /// Coupled diagonal mirror: crossing one axis edge flips the other.
        Octahedral = 3,
        /// Out-of-range coordinates sample transparent black.
        ClampToZero = 4,
    }
}

field_enum! {
    /// TEXn_CFG.SWIZZLE
    pub enum Swizzle {
        Rgba = 0,
        Bgra = 1,
        /// Red broadcast to RGB, alpha forced to one.
        Rrr1 = 2,
        Rrrr = 3,
        /// Alpha forced to one.
        Rgb1 = 4,
        Aaaa = 5,
    }
}

field_enum! {
    /// CC_MODE A/B/D slots and the alpha C slot.
    pub enum CcSource {
        /// Previous stage output.
        Combined = 0,
        Tex0 = 1,
        Tex1 = 2,
        /// Interpolated COLOR0 (diffuse).
        Shade0 = 3,
        Const0 = 4,
        /// Also the fog color.
        Const1 = 5,
        One = 6,
        Zero = 7,
        /// Interpolated COLOR1 (specular).
        Shade1 = 8,
        Rsvd9 = 9,
        Rsvd10 = 10,
        Rsvd11 = 11,
        Rsvd12 = 12,
        Rsvd13 = 13,
        Rsvd14 = 14,
        Rsvd15 = 15,
    }
}

field_enum! {
    /// CC_MODE RGB C slot: adds alpha-to-RGB broadcasts for blend factors.
    pub enum CcRgbCSource {
        Combined = 0,
        Tex0 = 1,
        Tex1 = 2,
        Shade0 = 3,
        Const0 = 4,
        Const1 = 5,
        One = 6,
        Zero = 7,
        Tex0Alpha = 8,
        Tex1Alpha = 9,
        Shade0Alpha = 10,
        Const0Alpha = 11,
        CombinedAlpha = 12,
        Shade1 = 13,
        Shade1Alpha = 14,
        Rsvd15 = 15,
    }
}
