use gs_display::DisplayTiming;
use gs_tex_l1_cache::DEFAULT_SETS;

/// Model parameters that are not part of the register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwinConfig {
    /// SDRAM size in 16-bit words.
    pub sdram_words: usize,
    /// Sets per texture cache (4 ways each).
    pub tex_cache_sets: usize,
    /// Attach the display scanout with this timing.
    pub display: Option<DisplayTiming>,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            sdram_words: sdram_model::TOTAL_WORDS,
            tex_cache_sets: DEFAULT_SETS,
            display: None,
        }
    }
}
