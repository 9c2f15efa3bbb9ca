//! Per-sampler texture cache.
//!
//! 4-way set-associative over decoded 4x4 blocks. Textures are read-only,
//! so eviction never writes back. The set index interleaves the low bits of
//! the block X and Y so that a tile-ordered walk spreads neighboring blocks
//! across sets. Lines are tagged with the block's byte address.

use gs_tex_block_decoder::Block;

pub const WAYS: usize = 4;
pub const DEFAULT_SETS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    valid: bool,
    tag: u32,
    used: u64,
    texels: Block,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            valid: false,
            tag: 0,
            used: 0,
            texels: [gs_twin_core::Rgba8::TRANSPARENT; 16],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

impl TexCacheStats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct TexCache {
    sets: Vec<[Line; WAYS]>,
    x_bits: u32,
    y_bits: u32,
    clock: u64,
    stats: TexCacheStats,
}

impl Default for TexCache {
    fn default() -> Self {
        Self::new(DEFAULT_SETS)
    }
}

impl TexCache {
    /// `sets` is rounded up to a power of two.
    #[must_use]
    pub fn new(sets: usize) -> Self {
        let sets = sets.max(1).next_power_of_two();
        let bits = sets.trailing_zeros();
        Self {
            sets: vec![[Line::default(); WAYS]; sets],
            x_bits: bits.div_ceil(2),
            y_bits: bits / 2,
            clock: 0,
            stats: TexCacheStats::default(),
        }
    }

    #[must_use]
    pub fn sets(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn stats(&self) -> TexCacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = TexCacheStats::default();
    }

    /// Set holding block (bx, by).
    #[must_use]
    pub fn set_index(&self, bx: u32, by: u32) -> usize {
        let x = bx & ((1 << self.x_bits) - 1);
        let y = by & ((1 << self.y_bits) - 1);
        (x | (y << self.x_bits)) as usize
    }

    /// Look up the block at byte address `tag`. Counts a hit or a miss.
    pub fn lookup(&mut self, tag: u32, bx: u32, by: u32) -> Option<&Block> {
        self.clock += 1;
        let clock = self.clock;
        let set = self.set_index(bx, by);
        match self.sets[set].iter_mut().find(|l| l.valid && l.tag == tag) {
            Some(line) => {
                self.stats.hits += 1;
                line.used = clock;
                Some(&line.texels)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Install a freshly decoded block, replacing the least recently used
    /// way of its set.
    pub fn fill(&mut self, tag: u32, bx: u32, by: u32, texels: Block) -> &Block {
        let set = self.set_index(bx, by);
        let way = self.sets[set]
            .iter()
            .enumerate()
            .min_by_key(|(_, l)| (l.valid, l.used))
            .map_or(0, |(way, _)| way);
        log::trace!("tex cache: fill block {tag:#x} into set {set} way {way}");
        let line = &mut self.sets[set][way];
        *line = Line {
            valid: true,
            tag,
            used: self.clock,
            texels,
        };
        &line.texels
    }

    /// Drop every line.
    pub fn invalidate(&mut self) {
        for line in self.sets.iter_mut().flatten() {
            line.valid = false;
        }
        self.stats.invalidations += 1;
    }

    /// True if the block at `tag` is resident.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.sets.iter().flatten().any(|l| l.valid && l.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_twin_core::Rgba8;

    fn block(v: u8) -> Block {
        [Rgba8::new(v, v, v, 255); 16]
    }

    #[test]
    fn miss_then_hit() {
        let mut cache = TexCache::default();
        assert!(cache.lookup(0x100, 0, 0).is_none());
        cache.fill(0x100, 0, 0, block(7));
        assert_eq!(cache.lookup(0x100, 0, 0), Some(&block(7)));
        let s = cache.stats();
        assert_eq!((s.hits, s.misses), (1, 1));
        assert!((s.hit_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn set_index_interleaves() {
        let cache = TexCache::new(16);
        let sets: std::collections::HashSet<_> = (0..4)
            .flat_map(|by| (0..4).map(move |bx| (bx, by)))
            .map(|(bx, by)| cache.set_index(bx, by))
            .collect();
        assert_eq!(sets.len(), 16);
        assert_eq!(cache.set_index(4, 4), cache.set_index(0, 0));
    }

    #[test]
    fn non_power_of_two_rounds_up() {
        assert_eq!(TexCache::new(12).sets(), 16);
        assert_eq!(TexCache::new(0).sets(), 1);
        // A single set still has four ways.
        let mut cache = TexCache::new(1);
        for tag in 0..4 {
            cache.fill(tag * 8, tag, 0, block(tag as u8));
        }
        assert!((0..4).all(|tag| cache.contains(tag * 8)));
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = TexCache::new(1);
        for tag in 0..4u32 {
            assert!(cache.lookup(tag, 0, 0).is_none());
            cache.fill(tag, 0, 0, block(tag as u8));
        }
        // Touch 0 so 1 becomes the oldest.
        assert!(cache.lookup(0, 0, 0).is_some());
        assert!(cache.lookup(4, 0, 0).is_none());
        cache.fill(4, 0, 0, block(4));
        assert!(cache.contains(0));
        assert!(!cache.contains(1));
        assert!(cache.contains(4));
    }

    #[test]
    fn invalidate_drops_all() {
        let mut cache = TexCache::default();
        cache.fill(0x40, 1, 0, block(1));
        cache.invalidate();
        assert!(!cache.contains(0x40));
        assert!(cache.lookup(0x40, 1, 0).is_none());
        assert_eq!(cache.stats().invalidations, 1);
    }
}
