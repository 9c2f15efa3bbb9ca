//! Bit-accurate fixed-point types in Q notation.
//!
//! Each type wraps the exact register/wire representation used by the
//! RTL, so arithmetic on these types reproduces the hardware's truncation
//! and saturation behavior bit for bit.
//!
//! - [`Q4_12`]: signed, 4 integer + 12 fractional bits. Pipeline color and
//!   texture coordinate format (1.0 = `0x1000`, headroom to ~8.0).
//! - [`Q12_4`]: signed, 12 integer + 4 fractional bits. Vertex X/Y.
//! - [`Uq0_16`]: unsigned pure fraction. Triangle inverse-area.
//! - [`Uq1_15`]: unsigned, 1 integer + 15 fractional bits. Vertex 1/W.

#![no_std]

macro_rules! q_common {
    ($name:ident, $repr:ty, $frac:expr) => {
        impl $name {
            /// Number of fractional bits.
            pub const FRAC_BITS: u32 = $frac;
            /// Smallest representable value.
            pub const MIN: Self = Self(<$repr>::MIN);
            /// Largest representable value.
            pub const MAX: Self = Self(<$repr>::MAX);
            /// Zero.
            pub const ZERO: Self = Self(0);

            /// Wrap a raw bit pattern.
            #[inline]
            #[must_use]
            pub const fn from_bits(bits: $repr) -> Self {
                Self(bits)
            }

            /// The raw bit pattern.
            #[inline]
            #[must_use]
            pub const fn to_bits(self) -> $repr {
                self.0
            }

            /// Convert from `f32`, rounding to nearest and saturating.
            #[must_use]
            pub fn from_f32(val: f32) -> Self {
                let scaled = val * (1u32 << $frac) as f32;
                let rounded = if scaled >= 0.0 { scaled + 0.5 } else { scaled - 0.5 };
                // `as` from float saturates at the integer bounds.
                Self(rounded as $repr)
            }

            /// Convert to `f32` (exact for every representable value).
            #[must_use]
            pub fn to_f32(self) -> f32 {
                self.0 as f32 / (1u32 << $frac) as f32
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({:#x} = {})", stringify!($name), self.0, self.to_f32())
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.0.serialize(serializer)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                <$repr>::deserialize(deserializer).map(Self)
            }
        }
    };
}

/// Signed Q4.12: the pixel pipeline's internal color and attribute format.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Q4_12(i16);

q_common!(Q4_12, i16, 12);

impl Q4_12 {
    /// 1.0
    pub const ONE: Self = Self(1 << 12);

    /// Promote a UNORM8 channel so that 255 maps to exactly 1.0.
    #[inline]
    #[must_use]
    pub const fn from_unorm8(v: u8) -> Self {
        Self(((v as u32 * 4096 + 127) / 255) as i16)
    }

    /// Truncate back to UNORM8, clamping to [0.0, 1.0].
    ///
    /// Inverse of [`Q4_12::from_unorm8`] for every 8-bit value.
    #[inline]
    #[must_use]
    pub const fn to_unorm8(self) -> u8 {
        let clamped = if self.0 < 0 {
            0
        } else if self.0 > 4096 {
            4096
        } else {
            self.0 as u32
        };
        ((clamped * 255 + 2048) >> 12) as u8
    }

    /// Clamp to the displayable range [0.0, 1.0].
    #[inline]
    #[must_use]
    pub const fn clamp_unit(self) -> Self {
        if self.0 < 0 {
            Self(0)
        } else if self.0 > 4096 {
            Self::ONE
        } else {
            self
        }
    }

    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Fixed-point multiply: the 32-bit product is shifted right by 12
    /// (floor) and saturated to 16 bits.
    #[inline]
    #[must_use]
    pub const fn saturating_mul(self, rhs: Self) -> Self {
        Self(saturate_i16((self.0 as i32 * rhs.0 as i32) >> 12))
    }

    /// Build from a wide intermediate, saturating to the 16-bit range.
    #[inline]
    #[must_use]
    pub const fn from_wide(v: i32) -> Self {
        Self(saturate_i16(v))
    }
}

const fn saturate_i16(v: i32) -> i16 {
    if v > i16::MAX as i32 {
        i16::MAX
    } else if v < i16::MIN as i32 {
        i16::MIN
    } else {
        v as i16
    }
}

/// Signed Q12.4: vertex screen position. Integer values address pixel
/// centers.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Q12_4(i16);

q_common!(Q12_4, i16, 4);

impl Q12_4 {
    /// Whole-pixel coordinate.
    #[inline]
    #[must_use]
    pub const fn from_int(px: i16) -> Self {
        Self(px.wrapping_mul(16))
    }

    /// Raw value widened for edge-function arithmetic.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0 as i64
    }

    /// Smallest pixel center at or above this coordinate.
    #[inline]
    #[must_use]
    pub const fn ceil_px(self) -> i32 {
        (self.0 as i32 + 15) >> 4
    }

    /// Largest pixel center at or below this coordinate.
    #[inline]
    #[must_use]
    pub const fn floor_px(self) -> i32 {
        (self.0 as i32) >> 4
    }
}

/// Unsigned Q0.16: a pure fraction in [0, 1).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Uq0_16(u16);

q_common!(Uq0_16, u16, 16);

impl Uq0_16 {
    /// `round(65536 / n)`, saturated to the largest fraction.
    ///
    /// `n == 0` and `n == 1` both saturate.
    #[must_use]
    pub const fn reciprocal_of(n: u64) -> Self {
        if n <= 1 {
            return Self::MAX;
        }
        let r = (65536 + n / 2) / n;
        if r > u16::MAX as u64 {
            Self::MAX
        } else {
            Self(r as u16)
        }
    }
}

/// Unsigned Q1.15: vertex 1/W.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Uq1_15(u16);

q_common!(Uq1_15, u16, 15);

impl Uq1_15 {
    /// 1.0
    pub const ONE: Self = Self(1 << 15);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unorm8_round_trip_is_exact() {
        for v in 0..=255u8 {
            assert_eq!(Q4_12::from_unorm8(v).to_unorm8(), v, "value {v}");
        }
        assert_eq!(Q4_12::from_unorm8(255), Q4_12::ONE);
        assert_eq!(Q4_12::from_unorm8(0), Q4_12::ZERO);
    }

    #[test]
    fn multiply_by_one_is_identity() {
        for v in [-32768i16, -4096, -1, 0, 1, 2047, 4096, 32767] {
            let q = Q4_12::from_bits(v);
            assert_eq!(q.saturating_mul(Q4_12::ONE), q);
        }
    }

    #[test]
    fn multiply_saturates() {
        let big = Q4_12::from_bits(0x7000);
        assert_eq!(big.saturating_mul(big), Q4_12::MAX);
        let neg = Q4_12::from_bits(-0x7000);
        assert_eq!(neg.saturating_mul(big), Q4_12::MIN);
    }

    #[test]
    fn to_unorm8_clamps() {
        assert_eq!(Q4_12::from_bits(-100).to_unorm8(), 0);
        assert_eq!(Q4_12::from_bits(0x3000).to_unorm8(), 255);
    }

    #[test]
    fn q12_4_pixel_rounding() {
        assert_eq!(Q12_4::from_int(10).ceil_px(), 10);
        assert_eq!(Q12_4::from_bits(161).ceil_px(), 11);
        assert_eq!(Q12_4::from_bits(161).floor_px(), 10);
        assert_eq!(Q12_4::from_bits(-1).floor_px(), -1);
        assert_eq!(Q12_4::from_bits(-1).ceil_px(), 0);
    }

    #[test]
    fn f32_conversions() {
        assert_eq!(Q12_4::from_f32(10.25).to_bits(), 164);
        assert_eq!(Q12_4::from_f32(-100.0).to_bits(), -1600);
        assert_eq!(Q12_4::from_f32(5000.0), Q12_4::MAX);
        assert_eq!(Uq1_15::from_f32(1.0), Uq1_15::ONE);
        assert_eq!(Q4_12::from_f32(0.5).to_bits(), 0x800);
    }

    #[test]
    fn reciprocal_rounds_and_saturates() {
        assert_eq!(Uq0_16::reciprocal_of(0), Uq0_16::MAX);
        assert_eq!(Uq0_16::reciprocal_of(1), Uq0_16::MAX);
        assert_eq!(Uq0_16::reciprocal_of(2).to_bits(), 32768);
        assert_eq!(Uq0_16::reciprocal_of(3).to_bits(), 21845);
        assert_eq!(Uq0_16::reciprocal_of(256).to_bits(), 256);
    }
}
