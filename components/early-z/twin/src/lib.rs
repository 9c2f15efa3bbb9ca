//! Depth-range clip and the early depth test.
//!
//! Both run before any texture fetch, so an occluded fragment never costs
//! texture bandwidth. The depth write itself is deferred to pixel write,
//! after the alpha test has had its say.

use gpu_registers::ZCompare;
use gs_memory::{MemoryArbiter, MemoryError};
use gs_twin_core::state::{RenderMode, ZRange};
use gs_twin_core::Surface;
use gs_zbuf::ZTileCache;

/// `incoming <op> stored`
#[must_use]
pub fn z_compare(func: ZCompare, incoming: u16, stored: u16) -> bool {
    match func {
        ZCompare::Less => incoming < stored,
        ZCompare::Lequal => incoming <= stored,
        ZCompare::Equal => incoming == stored,
        ZCompare::Gequal => incoming >= stored,
        ZCompare::Greater => incoming > stored,
        ZCompare::Notequal => incoming != stored,
        ZCompare::Always => true,
        ZCompare::Never => false,
    }
}

/// Inclusive depth-range clip.
#[must_use]
pub fn depth_range_test(range: &ZRange, z: u16) -> bool {
    range.contains(z)
}

/// Run the depth test for a fragment. With Z_TEST_EN clear the fragment
/// passes without touching the Z buffer.
///
/// # Errors
/// Memory errors from the Z tile cache.
pub fn early_z_test(
    mode: &RenderMode,
    cache: &mut ZTileCache,
    mem: &mut MemoryArbiter,
    surface: &Surface,
    x: u32,
    y: u32,
    z: u16,
) -> Result<bool, MemoryError> {
    if !mode.z_test {
        return Ok(true);
    }
    match mode.z_compare {
        ZCompare::Always => Ok(true),
        ZCompare::Never => Ok(false),
        func => {
            let stored = cache.read(mem, surface, x, y)?;
            Ok(z_compare(func, z, stored))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ZCompare; 8] = [
        ZCompare::Less,
        ZCompare::Lequal,
        ZCompare::Equal,
        ZCompare::Gequal,
        ZCompare::Greater,
        ZCompare::Notequal,
        ZCompare::Always,
        ZCompare::Never,
    ];

    #[test]
    fn always_and_never() {
        for (a, b) in [(0, 0), (1, 0), (0, 1), (0xFFFF, 0)] {
            assert!(z_compare(ZCompare::Always, a, b));
            assert!(!z_compare(ZCompare::Never, a, b));
        }
    }

    #[test]
    fn compare_table() {
        let expect = |f: ZCompare| match f {
            ZCompare::Less => [false, true, false],
            ZCompare::Lequal => [true, true, false],
            ZCompare::Equal => [true, false, false],
            ZCompare::Gequal => [true, false, true],
            ZCompare::Greater => [false, false, true],
            ZCompare::Notequal => [false, true, true],
            ZCompare::Always => [true; 3],
            ZCompare::Never => [false; 3],
        };
        for f in ALL {
            let got = [z_compare(f, 5, 5), z_compare(f, 4, 5), z_compare(f, 6, 5)];
            assert_eq!(got, expect(f), "{f:?}");
        }
    }

    #[test]
    fn depth_range_is_inclusive() {
        let r = ZRange {
            min: 0x100,
            max: 0x200,
        };
        assert!(depth_range_test(&r, 0x100));
        assert!(depth_range_test(&r, 0x200));
        assert!(!depth_range_test(&r, 0xFF));
        assert!(!depth_range_test(&r, 0x201));
    }

    #[test]
    fn less_rejects_farther_fragment_after_write() {
        let mut mem = MemoryArbiter::with_words(1 << 16);
        let surface = Surface::new(0, 4, 4).unwrap();
        let mut cache = ZTileCache::new();
        let mode = RenderMode {
            z_test: true,
            z_write: true,
            z_compare: ZCompare::Less,
            ..RenderMode::default()
        };
        cache.write(&mut mem, &surface, 3, 3, 0xFFFF).unwrap();
        assert!(early_z_test(&mode, &mut cache, &mut mem, &surface, 3, 3, 0x1000).unwrap());
        cache.write(&mut mem, &surface, 3, 3, 0x1000).unwrap();
        assert!(!early_z_test(&mode, &mut cache, &mut mem, &surface, 3, 3, 0x2000).unwrap());
    }

    #[test]
    fn disabled_test_never_reads() {
        let mut mem = MemoryArbiter::with_words(1 << 16);
        let surface = Surface::new(0, 4, 4).unwrap();
        let mut cache = ZTileCache::new();
        let mode = RenderMode {
            z_test: false,
            z_compare: ZCompare::Never,
            ..RenderMode::default()
        };
        assert!(early_z_test(&mode, &mut cache, &mut mem, &surface, 0, 0, 1).unwrap());
        assert_eq!(cache.stats().misses, 0);
    }
}
