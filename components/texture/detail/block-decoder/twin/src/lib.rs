//! Decode one 4×4 texture block into RGBA8 texels.
//!
//! Texels come out in block raster order: index `y * 4 + x`. Block bytes
//! are little-endian, exactly as they sit in SDRAM.

use gpu_registers::TexFormat;
use gs_twin_core::Rgba8;

/// A decoded block.
pub type Block = [Rgba8; 16];

/// Largest block in bytes (RGBA8888).
pub const MAX_BLOCK_BYTES: usize = 64;

/// Decode `data` as one block of `format`. Short input is zero-padded.
#[must_use]
pub fn decode_block(format: TexFormat, data: &[u8]) -> Block {
    let mut buf = [0u8; MAX_BLOCK_BYTES];
    let n = data.len().min(format.block_bytes() as usize);
    buf[..n].copy_from_slice(&data[..n]);

    match format {
        TexFormat::Bc1 => decode_bc1(&buf[..8]),
        TexFormat::Bc2 => decode_bc2(&buf[..16]),
        TexFormat::Bc3 => decode_bc3(&buf[..16]),
        TexFormat::Bc4 => single_channel(bc_alpha(&buf[..8])),
        TexFormat::Rgb565 => core::array::from_fn(|i| {
            Rgba8::from_rgb565(u16::from_le_bytes([buf[2 * i], buf[2 * i + 1]]))
        }),
        TexFormat::Rgba8888 => core::array::from_fn(|i| {
            let t = &buf[4 * i..4 * i + 4];
            Rgba8::new(t[0], t[1], t[2], t[3])
        }),
        TexFormat::R8 => {
            let mut r = [0u8; 16];
            r.copy_from_slice(&buf[..16]);
            single_channel(r)
        }
    }
}

fn single_channel(r: [u8; 16]) -> Block {
    r.map(|v| Rgba8::new(v, 0, 0, 255))
}

fn u16_le(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn u32_le(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// `(2a + b) / 3` per channel.
fn third(a: Rgba8, b: Rgba8) -> Rgba8 {
    let mix = |x: u8, y: u8| ((2 * u16::from(x) + u16::from(y)) / 3) as u8;
    Rgba8::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), 255)
}

fn half(a: Rgba8, b: Rgba8) -> Rgba8 {
    let mix = |x: u8, y: u8| ((u16::from(x) + u16::from(y)) / 2) as u8;
    Rgba8::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), 255)
}

/// Color half of BC1/2/3. `four_color` forces the four-color palette
/// regardless of endpoint order, as BC2 and BC3 do.
fn bc_color(b: &[u8], four_color: bool) -> Block {
    let (e0, e1) = (u16_le(b, 0), u16_le(b, 2));
    let (c0, c1) = (Rgba8::from_rgb565(e0), Rgba8::from_rgb565(e1));
    let palette = if four_color || e0 > e1 {
        [c0, c1, third(c0, c1), third(c1, c0)]
    } else {
        [c0, c1, half(c0, c1), Rgba8::TRANSPARENT]
    };
    let indices = u32_le(b, 4);
    core::array::from_fn(|i| palette[((indices >> (2 * i)) & 3) as usize])
}

fn decode_bc1(b: &[u8]) -> Block {
    bc_color(b, false)
}

fn decode_bc2(b: &[u8]) -> Block {
    let alpha = u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]);
    let mut texels = bc_color(&b[8..], true);
    for (i, t) in texels.iter_mut().enumerate() {
        t.a = ((alpha >> (4 * i)) & 0xF) as u8 * 17;
    }
    texels
}

fn decode_bc3(b: &[u8]) -> Block {
    let alpha = bc_alpha(&b[..8]);
    let mut texels = bc_color(&b[8..], true);
    for (t, a) in texels.iter_mut().zip(alpha) {
        t.a = a;
    }
    texels
}

/// Interpolated single-channel block (BC3 alpha, BC4 red).
fn bc_alpha(b: &[u8]) -> [u8; 16] {
    let (a0, a1) = (u16::from(b[0]), u16::from(b[1]));
    let mut palette = [0u8; 8];
    palette[0] = a0 as u8;
    palette[1] = a1 as u8;
    if a0 > a1 {
        for k in 1..7u16 {
            palette[k as usize + 1] = (((7 - k) * a0 + k * a1) / 7) as u8;
        }
    } else {
        for k in 1..5u16 {
            palette[k as usize + 1] = (((5 - k) * a0 + k * a1) / 5) as u8;
        }
        palette[6] = 0;
        palette[7] = 255;
    }
    let bits = u64::from_le_bytes([b[2], b[3], b[4], b[5], b[6], b[7], 0, 0]);
    core::array::from_fn(|i| palette[((bits >> (3 * i)) & 7) as usize])
}
