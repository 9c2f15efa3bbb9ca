//! Sampler behavior against textures placed in the memory model.

use gpu_registers::{Swizzle, TexFilter, TexFormat, WrapMode};
use gs_memory::{MemoryArbiter, Port};
use gs_texture::Sampler;
use gs_twin_core::state::TexConfig;
use gs_twin_core::surface::tiled_address;
use gs_twin_core::Rgba8;

const BASE: u32 = 0x1_0000;

/// Texel (x, y) of the test texture: red carries x, green carries y.
fn texel565(x: u32, y: u32) -> u16 {
    ((x as u16) << 11) | ((y as u16) << 5)
}

fn expected(x: u32, y: u32) -> Rgba8 {
    Rgba8::from_rgb565(texel565(x, y))
}

fn config() -> TexConfig {
    TexConfig {
        enabled: true,
        filter: TexFilter::Nearest,
        format: TexFormat::Rgb565,
        width_log2: 4,
        height_log2: 4,
        u_wrap: WrapMode::Repeat,
        v_wrap: WrapMode::Repeat,
        mip_levels: 0,
        swizzle: Swizzle::Rgba,
        base: BASE,
    }
}

fn setup(cfg: TexConfig) -> (MemoryArbiter, Sampler) {
    let mut mem = MemoryArbiter::with_words(1 << 16);
    for y in 0..16 {
        for x in 0..16 {
            mem.write_word(tiled_address(BASE, x, y, 4, 2) / 2, texel565(x, y));
        }
    }
    let mut sampler = Sampler::default();
    sampler.set_config(cfg);
    (mem, sampler)
}

/// Q4.12 coordinate of texel `t`'s center on a 16-texel axis.
fn center(t: i32) -> i32 {
    256 * t + 128
}

// ============================================================================
// Addressing and cache
// ============================================================================

#[test]
fn nearest_reads_every_texel() {
    let (mut mem, mut s) = setup(config());
    for y in 0..16 {
        for x in 0..16 {
            let got = s.sample(&mut mem, center(x), center(y)).unwrap();
            assert_eq!(got, expected(x as u32, y as u32), "texel ({x}, {y})");
        }
    }
    let stats = s.cache_stats();
    assert_eq!(stats.misses, 16);
    assert_eq!(stats.hits, 240);
    assert!(stats.hit_rate() > 0.9);
    assert_eq!(mem.stats(Port::Texture).words, 16 * 16);
}

#[test]
fn compressed_block_uses_short_burst() {
    let mut mem = MemoryArbiter::with_words(1 << 16);
    // One BC1 block: red endpoint, every index 0.
    mem.load_bytes(BASE, &[0x00, 0xF8, 0x1F, 0x00, 0, 0, 0, 0]);
    let mut s = Sampler::default();
    s.set_config(TexConfig {
        format: TexFormat::Bc1,
        width_log2: 2,
        height_log2: 2,
        ..config()
    });
    let got = s.sample(&mut mem, 0x800, 0x800).unwrap();
    assert_eq!(got, Rgba8::new(255, 0, 0, 255));
    let port = mem.stats(Port::Texture);
    assert_eq!((port.transactions, port.words), (1, 4));
}

#[test]
fn stale_until_rebound() {
    let (mut mem, mut s) = setup(config());
    let before = s.sample(&mut mem, center(3), center(3)).unwrap();
    mem.write_word(tiled_address(BASE, 3, 3, 4, 2) / 2, 0xFFFF);
    assert_eq!(s.sample(&mut mem, center(3), center(3)).unwrap(), before);

    s.set_config(config());
    assert_eq!(s.sample(&mut mem, center(3), center(3)).unwrap(), Rgba8::WHITE);
}

// ============================================================================
// Wrap modes
// ============================================================================

#[test]
fn repeat_is_periodic_in_u_and_v() {
    let (mut mem, mut s) = setup(config());
    for t in [0, 5, 15] {
        let base = s.sample(&mut mem, center(t), center(t)).unwrap();
        for n in [-2, -1, 1, 3] {
            let shifted = s
                .sample(&mut mem, center(t) + n * 0x1000, center(t) - n * 0x1000)
                .unwrap();
            assert_eq!(shifted, base, "t={t} n={n}");
        }
    }
}

#[test]
fn clamp_to_zero_is_transparent_outside() {
    let (mut mem, mut s) = setup(TexConfig {
        u_wrap: WrapMode::ClampToZero,
        ..config()
    });
    assert_eq!(s.sample(&mut mem, -1, center(2)).unwrap(), Rgba8::TRANSPARENT);
    assert_eq!(s.sample(&mut mem, 0x1000, center(2)).unwrap(), Rgba8::TRANSPARENT);
    assert_eq!(s.sample(&mut mem, center(4), center(2)).unwrap(), expected(4, 2));
}

#[test]
fn clamp_to_edge_holds_border() {
    let (mut mem, mut s) = setup(TexConfig {
        u_wrap: WrapMode::ClampToEdge,
        v_wrap: WrapMode::ClampToEdge,
        ..config()
    });
    assert_eq!(s.sample(&mut mem, -0x3000, 0x5000).unwrap(), expected(0, 15));
}

#[test]
fn mirror_reflects_first_texel() {
    let (mut mem, mut s) = setup(TexConfig {
        u_wrap: WrapMode::Mirror,
        ..config()
    });
    // One texel left of the edge reads texel 0 again.
    assert_eq!(s.sample(&mut mem, center(-1), center(0)).unwrap(), expected(0, 0));
    assert_eq!(s.sample(&mut mem, center(16), center(0)).unwrap(), expected(15, 0));
}

// ============================================================================
// Filtering and swizzle
// ============================================================================

#[test]
fn bilinear_blends_neighbors() {
    let (mut mem, mut s) = setup(TexConfig {
        filter: TexFilter::Bilinear,
        ..config()
    });
    // On a texel center the filter is exact.
    assert_eq!(s.sample(&mut mem, center(6), center(9)).unwrap(), expected(6, 9));
    // Halfway between texels 0 and 1 of row 0: red 0 and 8.
    let mid = s.sample(&mut mem, 256, center(0)).unwrap();
    assert_eq!((mid.r, mid.g, mid.a), (4, 0, 255));
}

#[test]
fn trilinear_samples_as_bilinear() {
    let (mut mem, mut a) = setup(TexConfig {
        filter: TexFilter::Bilinear,
        ..config()
    });
    let mut b = Sampler::default();
    b.set_config(TexConfig {
        filter: TexFilter::Trilinear,
        mip_levels: 4,
        ..config()
    });
    for (u, v) in [(100, 900), (256, 128), (4000, 17)] {
        assert_eq!(a.sample(&mut mem, u, v).unwrap(), b.sample(&mut mem, u, v).unwrap());
    }
}

#[test]
fn swizzle_applies_after_filter() {
    let (mut mem, mut s) = setup(TexConfig {
        swizzle: Swizzle::Bgra,
        ..config()
    });
    let c = expected(9, 0);
    let got = s.sample(&mut mem, center(9), center(0)).unwrap();
    assert_eq!(got, Rgba8::new(c.b, c.g, c.r, c.a));
}
