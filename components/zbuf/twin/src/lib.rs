//! Z-buffer tile cache.
//!
//! 4-way set-associative, 16 sets, write-back. Each line holds one 4x4
//! depth tile, which in the tiled layout is 16 consecutive words, so fills
//! and write-backs are single 16-word bursts on the Z-buffer port. The set
//! index comes from the low two bits of the tile X and Y, so the 4x4
//! neighborhood of tiles around a fragment never conflicts.
//!
//! Lines are tagged with the tile's byte address, which makes rebinding
//! the Z surface safe without an invalidate.

use gs_memory::{MemoryArbiter, MemoryError, Port, Request};
use gs_twin_core::Surface;

pub const WAYS: usize = 4;
pub const SETS: usize = 16;
const LINE_WORDS: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Line {
    valid: bool,
    dirty: bool,
    /// Tile byte address.
    tag: u32,
    /// LRU stamp; larger is more recent.
    used: u64,
    data: [u16; LINE_WORDS],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub write_backs: u64,
}

impl ZCacheStats {
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

pub struct ZTileCache {
    sets: [[Line; WAYS]; SETS],
    clock: u64,
    stats: ZCacheStats,
}

impl Default for ZTileCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Set index of the tile holding (x, y).
#[must_use]
pub const fn set_index(x: u32, y: u32) -> usize {
    (((x >> 2) & 3) | (((y >> 2) & 3) << 2)) as usize
}

const fn word_index(x: u32, y: u32) -> usize {
    ((y & 3) * 4 + (x & 3)) as usize
}

impl ZTileCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sets: [[Line::default(); WAYS]; SETS],
            clock: 0,
            stats: ZCacheStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> ZCacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ZCacheStats::default();
    }

    /// Stored depth at (x, y).
    ///
    /// # Errors
    /// Memory errors from a fill or write-back.
    pub fn read(
        &mut self,
        mem: &mut MemoryArbiter,
        surface: &Surface,
        x: u32,
        y: u32,
    ) -> Result<u16, MemoryError> {
        let (set, way) = self.lookup(mem, surface, x, y)?;
        Ok(self.sets[set][way].data[word_index(x, y)])
    }

    /// Store depth at (x, y), marking the line dirty.
    ///
    /// # Errors
    /// Memory errors from a fill or write-back.
    pub fn write(
        &mut self,
        mem: &mut MemoryArbiter,
        surface: &Surface,
        x: u32,
        y: u32,
        z: u16,
    ) -> Result<(), MemoryError> {
        let (set, way) = self.lookup(mem, surface, x, y)?;
        let line = &mut self.sets[set][way];
        line.data[word_index(x, y)] = z;
        line.dirty = true;
        Ok(())
    }

    /// Write back every dirty line. Lines stay valid.
    ///
    /// # Errors
    /// Memory errors from a write-back.
    pub fn flush(&mut self, mem: &mut MemoryArbiter) -> Result<(), MemoryError> {
        let mut flushed = 0;
        for set in 0..SETS {
            for way in 0..WAYS {
                if self.sets[set][way].valid && self.sets[set][way].dirty {
                    self.write_back(mem, set, way)?;
                    flushed += 1;
                }
            }
        }
        if flushed > 0 {
            log::debug!("z cache: flushed {flushed} dirty lines");
        }
        Ok(())
    }

    /// Write back dirty lines, then drop everything.
    ///
    /// # Errors
    /// Memory errors from a write-back.
    pub fn flush_and_invalidate(&mut self, mem: &mut MemoryArbiter) -> Result<(), MemoryError> {
        self.flush(mem)?;
        self.sets = [[Line::default(); WAYS]; SETS];
        Ok(())
    }

    /// True if the tile at `tile_addr` is resident and dirty.
    #[must_use]
    pub fn is_dirty(&self, tile_addr: u32) -> bool {
        self.sets
            .iter()
            .flatten()
            .any(|l| l.valid && l.dirty && l.tag == tile_addr)
    }

    fn write_back(
        &mut self,
        mem: &mut MemoryArbiter,
        set: usize,
        way: usize,
    ) -> Result<(), MemoryError> {
        let line = &mut self.sets[set][way];
        mem.execute(Port::ZBuffer, Request::write(line.tag / 2, line.data.to_vec()))?;
        line.dirty = false;
        self.stats.write_backs += 1;
        Ok(())
    }

    fn lookup(
        &mut self,
        mem: &mut MemoryArbiter,
        surface: &Surface,
        x: u32,
        y: u32,
    ) -> Result<(usize, usize), MemoryError> {
        self.clock += 1;
        let set = set_index(x, y);
        let tag = surface.tile_address(x, y);

        if let Some(way) = self.sets[set].iter().position(|l| l.valid && l.tag == tag) {
            self.stats.hits += 1;
            self.sets[set][way].used = self.clock;
            return Ok((set, way));
        }

        self.stats.misses += 1;
        let way = self.sets[set]
            .iter()
            .enumerate()
            .min_by_key(|(_, l)| (l.valid, l.used))
            .map_or(0, |(way, _)| way);
        if self.sets[set][way].valid && self.sets[set][way].dirty {
            self.write_back(mem, set, way)?;
        }

        let done = mem.execute(Port::ZBuffer, Request::read(tag / 2, LINE_WORDS))?;
        let line = &mut self.sets[set][way];
        line.data.copy_from_slice(&done.data);
        line.valid = true;
        line.dirty = false;
        line.tag = tag;
        line.used = self.clock;
        log::trace!("z cache: fill tile {tag:#x} into set {set} way {way}");
        Ok((set, way))
    }
}
