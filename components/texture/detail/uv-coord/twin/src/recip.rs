//! Reciprocal of interpolated 1/W.
//!
//! The fragment carries Q = 1/W on the UQ1.15 scale (`0x8000` = 1.0). W is
//! recovered without a divider: normalize Q to a mantissa `m` in
//! `[0x4000, 0x8000)`, take a 64-entry table estimate of `1/m` indexed by
//! `m[13:8]`, then refine with one Newton-Raphson step
//! `r' = r * (2 - m * r)`.

use qfixed::Q4_12;

const LUT_BITS: u32 = 6;

/// `round(2^29 / m_mid)` for the midpoint of each of the 64 mantissa
/// intervals: `1/M` with 15 fractional bits, where `M = m / 2^14`.
pub const RECIP_LUT: [u32; 1 << LUT_BITS] = build_lut();

const fn build_lut() -> [u32; 1 << LUT_BITS] {
    let mut lut = [0u32; 1 << LUT_BITS];
    let mut i = 0;
    while i < lut.len() {
        let mid = 0x4000 + ((i as u64) << 8) + 0x80;
        lut[i] = (((1u64 << 29) + mid / 2) / mid) as u32;
        i += 1;
    }
    lut
}

/// W = 1/Q with 16 fractional bits, or `None` for Q = 0.
#[must_use]
pub fn reciprocal_w(q: u32) -> Option<u64> {
    if q == 0 {
        return None;
    }
    // Position of the leading one.
    let p = 31 - q.leading_zeros();
    let m = if p >= 14 { q >> (p - 14) } else { q << (14 - p) };
    let m = u64::from(m);

    let r0 = u64::from(RECIP_LUT[((m >> 8) & 0x3F) as usize]);
    // m * r0 ~ 2^29; two in the same units is 2^30.
    let t = (1u64 << 30).saturating_sub(m * r0);
    // r1 = r0 * t / 2^29, kept with 16 fractional bits.
    let r1 = (r0 * t) >> 28;

    // 1/q_real = 2^15 / q = r1 * 2^(15 - p)
    Some(if p <= 15 {
        r1 << (15 - p)
    } else {
        r1 >> (p - 15)
    })
}

/// Reconstruct (U, V) in Q4.12 texture space from U/W, V/W and Q. With
/// Q = 0 the divided coordinates are used as-is.
#[must_use]
pub fn perspective_divide(uq: i32, vq: i32, q: u32) -> (i32, i32) {
    match reciprocal_w(q) {
        Some(w) => {
            let scale = |c: i32| {
                let v = (i128::from(c) * i128::from(w)) >> 16;
                v.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
            };
            (scale(uq), scale(vq))
        }
        None => (uq, vq),
    }
}

/// One Q4.12 unit, for callers building coordinates.
pub const UNIT: i32 = Q4_12::ONE.to_bits() as i32;
