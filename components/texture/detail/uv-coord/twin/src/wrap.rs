//! Wrap modes and texel addressing.
//!
//! Texture coordinates are Q4.12 with 1.0 spanning the full texture, so
//! integer texel positions are `(u << size_log2) >> 12`. Wrapping works on
//! those signed texel positions.

use gpu_registers::WrapMode;

/// An in-range texel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Texel {
    pub x: u32,
    pub y: u32,
}

/// One axis of a bilinear footprint: the lower tap and the weight of the
/// upper tap in 1/256ths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisTap {
    pub i0: i32,
    pub frac: u8,
}

/// Nearest texel on one axis.
#[must_use]
pub fn nearest(coord: i32, size_log2: u8) -> i32 {
    (coord << size_log2) >> 12
}

/// Bilinear footprint on one axis. Texel centers sit at half-texel offsets,
/// so the footprint is shifted back by half a texel before splitting.
#[must_use]
pub fn texel_pair(coord: i32, size_log2: u8) -> AxisTap {
    let pos = ((coord << size_log2) >> 4) - 128;
    AxisTap {
        i0: pos >> 8,
        frac: (pos & 0xFF) as u8,
    }
}

/// Wrap a single axis. Octahedral wraps as a mirror here; its coupling to
/// the other axis is applied by [`wrap_texel`].
#[must_use]
pub fn wrap_axis(mode: WrapMode, t: i32, size_log2: u8) -> Option<u32> {
    let size = 1i32 << size_log2;
    let wrapped = match mode {
        WrapMode::Repeat => t & (size - 1),
        WrapMode::ClampToEdge => t.clamp(0, size - 1),
        WrapMode::Mirror | WrapMode::Octahedral => {
            let m = t.rem_euclid(2 * size);
            if m >= size {
                2 * size - 1 - m
            } else {
                m
            }
        }
        WrapMode::ClampToZero => {
            if !(0..size).contains(&t) {
                return None;
            }
            t
        }
    };
    Some(wrapped as u32)
}

/// Wrap a texel position on both axes. `None` means the sample is
/// transparent black (CLAMP_TO_ZERO outside the texture).
///
/// An octahedral axis that leaves the texture mirrors itself and flips the
/// other axis, so the seams of an octahedral map line up.
#[must_use]
pub fn wrap_texel(
    u_mode: WrapMode,
    v_mode: WrapMode,
    x: i32,
    y: i32,
    width_log2: u8,
    height_log2: u8,
) -> Option<Texel> {
    let (w, h) = (1i32 << width_log2, 1i32 << height_log2);
    let (mut fx, mut fy) = (x, y);
    if u_mode == WrapMode::Octahedral && !(0..w).contains(&x) {
        fy = h - 1 - fy;
    }
    if v_mode == WrapMode::Octahedral && !(0..h).contains(&y) {
        fx = w - 1 - fx;
    }
    Some(Texel {
        x: wrap_axis(u_mode, fx, width_log2)?,
        y: wrap_axis(v_mode, fy, height_log2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_is_periodic() {
        for log2 in [0u8, 3, 4, 10] {
            let size = 1i32 << log2;
            for t in -40..40 {
                for n in -3..=3 {
                    assert_eq!(
                        wrap_axis(WrapMode::Repeat, t, log2),
                        wrap_axis(WrapMode::Repeat, t + n * size, log2),
                        "t={t} n={n} log2={log2}"
                    );
                }
            }
        }
    }

    #[test]
    fn repeat_in_coordinate_space() {
        // u and u + N*1.0 address the same texel for any N.
        for u in (-0x1800..0x1800).step_by(37) {
            for n in -2..=2 {
                let a = wrap_axis(WrapMode::Repeat, nearest(u, 4), 4);
                let b = wrap_axis(WrapMode::Repeat, nearest(u + n * 0x1000, 4), 4);
                assert_eq!(a, b, "u={u:#x} n={n}");
            }
        }
    }

    #[test]
    fn clamp_to_edge() {
        assert_eq!(wrap_axis(WrapMode::ClampToEdge, -5, 3), Some(0));
        assert_eq!(wrap_axis(WrapMode::ClampToEdge, 5, 3), Some(5));
        assert_eq!(wrap_axis(WrapMode::ClampToEdge, 100, 3), Some(7));
    }

    #[test]
    fn clamp_to_zero_rejects_outside() {
        assert_eq!(wrap_axis(WrapMode::ClampToZero, -1, 3), None);
        assert_eq!(wrap_axis(WrapMode::ClampToZero, 8, 3), None);
        assert_eq!(wrap_axis(WrapMode::ClampToZero, 7, 3), Some(7));
    }

    #[test]
    fn mirror_reflects() {
        let got: Vec<_> = (-4..12)
            .map(|t| wrap_axis(WrapMode::Mirror, t, 2).unwrap())
            .collect();
        assert_eq!(got, [3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn octahedral_flips_other_axis() {
        let oct = WrapMode::Octahedral;
        // Inside: untouched.
        assert_eq!(wrap_texel(oct, oct, 2, 5, 3, 3), Some(Texel { x: 2, y: 5 }));
        // Off the right edge: x mirrors, y flips.
        assert_eq!(wrap_texel(oct, oct, 8, 1, 3, 3), Some(Texel { x: 7, y: 6 }));
        // Off the top edge: y mirrors, x flips.
        assert_eq!(wrap_texel(oct, oct, 1, -1, 3, 3), Some(Texel { x: 6, y: 0 }));
    }

    #[test]
    fn octahedral_only_couples_its_own_axis() {
        // U octahedral, V repeat: leaving in V does not flip X.
        let t = wrap_texel(WrapMode::Octahedral, WrapMode::Repeat, 1, 9, 3, 3);
        assert_eq!(t, Some(Texel { x: 1, y: 1 }));
    }

    #[test]
    fn bilinear_footprint() {
        // Exactly on the center of texel 2 of a 16-texel axis.
        let tap = texel_pair(640, 4);
        assert_eq!(tap, AxisTap { i0: 2, frac: 0 });
        // Halfway between texel 0 and 1.
        let tap = texel_pair(0x1000 / 16, 4);
        assert_eq!(tap, AxisTap { i0: 0, frac: 128 });
        // Left of the first center straddles texel -1.
        assert_eq!(texel_pair(0, 4).i0, -1);
    }
}
