//! Ordered dither ahead of RGB565 truncation.
//!
//! The threshold for a pixel comes from a 16x16 blue-noise rank matrix
//! (every value 0..=255 exactly once) indexed by the low four bits of X
//! and Y. Truncating an 8-bit channel to 5 bits drops 3 bits, so the
//! threshold is scaled to 0..=7 before it is added; green loses 2 bits and
//! gets 0..=3. A pattern's offsets average to half a step, which turns the
//! truncation bias into a rounding.

use gpu_registers::DitherPattern;
use gs_twin_core::Rgba8;

/// Blue-noise ranks, row-major, row = `y & 15`.
#[rustfmt::skip]
pub const BLUE_NOISE_16X16: [u8; 256] = [
    203, 231, 121, 145, 174,  62, 136, 187, 157,  21, 130,  75,  12,  99,  17,  83,
    160,  22,   1, 217,  87, 229,  11,  79,  50, 219, 240, 167, 204, 142,  53, 178,
     93, 242,  68, 189,  44, 117, 165, 236, 101, 195,  30, 118,  45, 188, 253, 115,
     42, 129, 169, 106, 247, 150,  19, 207, 125, 147,  63,  89, 214,   4,  70, 220,
    151, 208,  80,  32, 197,  57,  73, 180,  40,   8, 176, 246, 154, 105, 138,  26,
     61, 237,  13, 141, 221,  96, 133, 250, 109,  82, 225, 131,  35, 199, 233, 171,
    112, 193,  51, 122, 162,   6, 230,  25, 213, 166, 192,  20,  55,  76,  92,  18,
    222,  85, 175, 254,  39, 185,  90, 153,  48,  67,  98, 119, 161, 249, 183, 127,
    158,   2, 102,  69, 205, 114,  58, 202, 139,   0, 241, 206, 144,  10, 211,  46,
    245, 143, 232,  27, 148,  78, 239, 172, 124, 228,  86,  41, 177,  31, 104,  65,
    186,  36, 198, 128, 215,   9,  23, 100,  33, 182, 156,  59, 113, 224, 134,  81,
     15, 116,  60,  91, 164, 248, 135, 194,  74, 218,  14, 252,  72, 196, 235, 163,
    209, 170, 226,  43, 107, 181,  54, 234,  47, 120, 103, 140, 173,   5,  49,  94,
    251, 137,   7, 191,  71,  16, 152,  84, 168, 200,  28, 210,  88, 123, 149,  24,
    108,  77, 155, 243, 212, 126, 111, 223,   3, 146, 244,  56,  38, 190, 216,  64,
     34, 184,  52,  97,  29, 201,  37, 255,  95,  66, 179, 110, 227, 159, 238, 132,
];

/// Threshold for (x, y), 0..=255.
#[must_use]
pub fn threshold(pattern: DitherPattern, x: u32, y: u32) -> u8 {
    match pattern {
        DitherPattern::BlueNoise16x16 => BLUE_NOISE_16X16[(((y & 15) << 4) | (x & 15)) as usize],
    }
}

/// Add the RGB565 dither offset at (x, y). Alpha is untouched; the result
/// is meant to be truncated by [`Rgba8::to_rgb565`].
#[must_use]
pub fn dither_rgb565(pattern: DitherPattern, c: Rgba8, x: u32, y: u32) -> Rgba8 {
    let t = threshold(pattern, x, y);
    let (rb, g) = (t >> 5, t >> 6);
    Rgba8::new(
        c.r.saturating_add(rb),
        c.g.saturating_add(g),
        c.b.saturating_add(rb),
        c.a,
    )
}
