//! 2x2 bilinear blend.
//!
//! Weights are 8-bit fractions (`frac / 256` toward the second tap). The
//! blend is done horizontally then vertically in 16.16 and rounded once at
//! the end, so equal taps come out unchanged.

use gs_twin_core::Rgba8;

/// The four taps of one bilinear footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Taps {
    pub t00: Rgba8,
    pub t10: Rgba8,
    pub t01: Rgba8,
    pub t11: Rgba8,
}

impl Taps {
    #[must_use]
    pub fn splat(c: Rgba8) -> Self {
        Self {
            t00: c,
            t10: c,
            t01: c,
            t11: c,
        }
    }
}

fn lerp2(c00: u8, c10: u8, c01: u8, c11: u8, fx: u32, fy: u32) -> u8 {
    let top = u32::from(c00) * (256 - fx) + u32::from(c10) * fx;
    let bottom = u32::from(c01) * (256 - fx) + u32::from(c11) * fx;
    ((top * (256 - fy) + bottom * fy + (1 << 15)) >> 16) as u8
}

/// Blend `taps` with horizontal weight `fx` and vertical weight `fy`.
#[must_use]
pub fn bilinear(taps: &Taps, fx: u8, fy: u8) -> Rgba8 {
    let (fx, fy) = (u32::from(fx), u32::from(fy));
    let ch = |f: fn(Rgba8) -> u8| {
        lerp2(f(taps.t00), f(taps.t10), f(taps.t01), f(taps.t11), fx, fy)
    };
    Rgba8::new(ch(|c| c.r), ch(|c| c.g), ch(|c| c.b), ch(|c| c.a))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    const WHITE: Rgba8 = Rgba8::WHITE;

    #[test]
    fn zero_weights_pick_first_tap() {
        let taps = Taps {
            t00: Rgba8::new(10, 20, 30, 40),
            t10: WHITE,
            t01: WHITE,
            t11: WHITE,
        };
        assert_eq!(bilinear(&taps, 0, 0), taps.t00);
    }

    #[test]
    fn equal_taps_are_unchanged() {
        let c = Rgba8::new(1, 128, 254, 255);
        for f in [0u8, 1, 64, 128, 200, 255] {
            assert_eq!(bilinear(&Taps::splat(c), f, 255 - f), c);
        }
    }

    #[test]
    fn midpoint_averages() {
        let taps = Taps {
            t00: BLACK,
            t10: WHITE,
            t01: BLACK,
            t11: WHITE,
        };
        assert_eq!(bilinear(&taps, 128, 0).r, 128);
        assert_eq!(bilinear(&taps, 128, 77).r, 128);
        let out = bilinear(&taps, 128, 128);
        assert_eq!((out.g, out.a), (128, 255));
    }

    #[test]
    fn vertical_weight() {
        let taps = Taps {
            t00: BLACK,
            t10: BLACK,
            t01: WHITE,
            t11: WHITE,
        };
        assert_eq!(bilinear(&taps, 0, 64).b, 64);
        assert_eq!(bilinear(&taps, 200, 192).b, 191);
    }
}
