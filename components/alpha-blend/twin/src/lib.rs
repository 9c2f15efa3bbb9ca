//! Alpha test and framebuffer blend.
//!
//! Both work on the combiner output in Q4.12. The color buffer is RGB565
//! and stores no alpha, so the destination alpha is always 1.0.

use gpu_registers::{AlphaBlend, AlphaTest};
use gs_twin_core::{Color, Rgba8};
use qfixed::Q4_12;

/// True if the fragment survives. The combined alpha is clamped to UNORM8
/// before it is compared with `reference`.
#[must_use]
pub fn alpha_test(func: AlphaTest, alpha: Q4_12, reference: u8) -> bool {
    let a = alpha.to_unorm8();
    match func {
        AlphaTest::Always => true,
        AlphaTest::Less => a < reference,
        AlphaTest::Gequal => a >= reference,
        AlphaTest::Notequal => a != reference,
    }
}

/// True when `mode` needs the current framebuffer value.
#[must_use]
pub fn reads_destination(mode: AlphaBlend) -> bool {
    mode != AlphaBlend::Disabled
}

/// Blend `src` over the stored pixel `dst`.
#[must_use]
pub fn blend(mode: AlphaBlend, src: Color, dst: Rgba8) -> Color {
    let dst = Color::from(Rgba8 { a: 255, ..dst });
    match mode {
        AlphaBlend::Disabled => src,
        AlphaBlend::Add => src.zip_with(dst, Q4_12::saturating_add),
        AlphaBlend::Subtract => src.zip_with(dst, Q4_12::saturating_sub),
        AlphaBlend::Blend => {
            let a = src.a.clamp_unit();
            let inv = Q4_12::ONE.saturating_sub(a);
            src.zip_with(dst, |s, d| s.saturating_mul(a).saturating_add(d.saturating_mul(inv)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(v: u8) -> Q4_12 {
        Q4_12::from_unorm8(v)
    }

    #[test]
    fn alpha_test_functions() {
        assert!(alpha_test(AlphaTest::Always, q(0), 255));
        assert!(alpha_test(AlphaTest::Less, q(99), 100));
        assert!(!alpha_test(AlphaTest::Less, q(100), 100));
        assert!(alpha_test(AlphaTest::Gequal, q(100), 100));
        assert!(!alpha_test(AlphaTest::Gequal, q(99), 100));
        assert!(alpha_test(AlphaTest::Notequal, q(1), 0));
        assert!(!alpha_test(AlphaTest::Notequal, q(0), 0));
    }

    #[test]
    fn alpha_test_clamps_headroom() {
        // 2.0 compares as 255.
        assert!(alpha_test(AlphaTest::Gequal, Q4_12::from_bits(0x2000), 255));
        assert!(alpha_test(AlphaTest::Less, Q4_12::from_bits(-0x100), 1));
    }

    #[test]
    fn disabled_overwrites() {
        let src = Color::from(Rgba8::new(1, 2, 3, 4));
        assert_eq!(blend(AlphaBlend::Disabled, src, Rgba8::WHITE), src);
        assert!(!reads_destination(AlphaBlend::Disabled));
        assert!(reads_destination(AlphaBlend::Blend));
    }

    #[test]
    fn add_and_subtract_saturate_on_store() {
        let src = Color::from(Rgba8::new(200, 100, 0, 255));
        let dst = Rgba8::new(100, 50, 10, 0);
        let add = blend(AlphaBlend::Add, src, dst).to_rgba8();
        assert_eq!((add.r, add.g, add.b), (255, 150, 10));
        let sub = blend(AlphaBlend::Subtract, src, dst).to_rgba8();
        assert_eq!((sub.r, sub.g, sub.b), (100, 50, 0));
    }

    #[test]
    fn source_over() {
        let dst = Rgba8::new(0, 0, 255, 0);
        let opaque = Color::from(Rgba8::new(255, 0, 0, 255));
        assert_eq!(blend(AlphaBlend::Blend, opaque, dst).to_rgba8(), Rgba8::new(255, 0, 0, 255));

        let clear = Color::from(Rgba8::new(255, 0, 0, 0));
        let out = blend(AlphaBlend::Blend, clear, dst).to_rgba8();
        assert_eq!((out.r, out.b, out.a), (0, 255, 255));

        let half = Color::from(Rgba8::new(255, 0, 0, 128));
        let out = blend(AlphaBlend::Blend, half, dst).to_rgba8();
        assert_eq!((out.r, out.g), (128, 0));
        assert_eq!(out.b, 127);
    }
}
