//! 8x8 stipple mask test.

use gs_twin_core::state::StipplePattern;

/// True if the fragment at (x, y) survives. Always true when disabled.
#[must_use]
pub fn stipple_test(enabled: bool, pattern: StipplePattern, x: u32, y: u32) -> bool {
    !enabled || pattern.bit(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_passes_everything() {
        assert!(stipple_test(false, StipplePattern(0), 3, 4));
    }

    #[test]
    fn checkerboard_halves_coverage() {
        let checker = StipplePattern(0xAA55_AA55_AA55_AA55);
        let passed = (0..16)
            .flat_map(|y| (0..16).map(move |x| (x, y)))
            .filter(|&(x, y)| stipple_test(true, checker, x, y))
            .count();
        assert_eq!(passed, 128);
        assert!(stipple_test(true, checker, 0, 0));
        assert!(!stipple_test(true, checker, 1, 0));
        assert!(stipple_test(true, checker, 1, 1));
        assert!(stipple_test(true, checker, 8, 8));
    }
}
