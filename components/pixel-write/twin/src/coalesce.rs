//! Write-coalescing buffer.
//!
//! Color writes collect into a run of consecutive word addresses inside one
//! 32-byte tile. The run drains as a single burst on the color-write port
//! when the next write would break it (a gap, a different tile, or a full
//! tile) or on an explicit flush. Reads of a queued address are served from
//! the buffer.

use gs_memory::{MemoryArbiter, MemoryError, Port, Request};

/// One 4x4 tile of RGB565.
pub const MAX_RUN_WORDS: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoalesceStats {
    /// Pixel writes accepted.
    pub writes: u64,
    /// Bursts issued.
    pub bursts: u64,
    /// Words written by those bursts.
    pub words: u64,
    /// Reads answered from the buffer.
    pub forwarded: u64,
    /// Reads that went to memory.
    pub reads: u64,
}

impl CoalesceStats {
    /// Mean burst length.
    #[must_use]
    pub fn words_per_burst(&self) -> f64 {
        if self.bursts == 0 {
            0.0
        } else {
            self.words as f64 / self.bursts as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct WriteCoalescer {
    start: u32,
    run: Vec<u16>,
    stats: CoalesceStats,
}

impl WriteCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> CoalesceStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CoalesceStats::default();
    }

    /// Words waiting to be written.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.run.len()
    }

    fn queued(&self, word_addr: u32) -> Option<usize> {
        let offset = word_addr.checked_sub(self.start)? as usize;
        (offset < self.run.len()).then_some(offset)
    }

    /// Queue `value` for `word_addr`.
    ///
    /// # Errors
    /// Memory errors from draining the previous run.
    pub fn push(
        &mut self,
        mem: &mut MemoryArbiter,
        word_addr: u32,
        value: u16,
    ) -> Result<(), MemoryError> {
        self.stats.writes += 1;
        if let Some(offset) = self.queued(word_addr) {
            self.run[offset] = value;
            return Ok(());
        }
        let extends = !self.run.is_empty()
            && word_addr == self.start + self.run.len() as u32
            && word_addr >> 4 == self.start >> 4;
        if !extends {
            self.flush(mem)?;
            self.start = word_addr;
        }
        self.run.push(value);
        if self.run.len() == MAX_RUN_WORDS {
            self.flush(mem)?;
        }
        Ok(())
    }

    /// Current value at `word_addr`, queued writes included.
    ///
    /// # Errors
    /// Memory errors from the read.
    pub fn read(&mut self, mem: &mut MemoryArbiter, word_addr: u32) -> Result<u16, MemoryError> {
        if let Some(offset) = self.queued(word_addr) {
            self.stats.forwarded += 1;
            return Ok(self.run[offset]);
        }
        self.stats.reads += 1;
        let done = mem.execute(Port::ColorWrite, Request::read(word_addr, 1))?;
        Ok(done.data.first().copied().unwrap_or(0))
    }

    /// Drain the pending run, if any.
    ///
    /// # Errors
    /// Memory errors from the burst.
    pub fn flush(&mut self, mem: &mut MemoryArbiter) -> Result<(), MemoryError> {
        if self.run.is_empty() {
            return Ok(());
        }
        let data = std::mem::take(&mut self.run);
        let words = data.len();
        log::trace!("coalescer: {words}-word burst at {:#x}", self.start);
        mem.execute(Port::ColorWrite, Request::write(self.start, data))?;
        self.stats.bursts += 1;
        self.stats.words += words as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_tile_is_one_burst() {
        let mut mem = MemoryArbiter::with_words(256);
        let mut wcb = WriteCoalescer::new();
        for i in 0..16u32 {
            wcb.push(&mut mem, 32 + i, i as u16).unwrap();
        }
        // Drained automatically when the tile filled.
        assert_eq!(wcb.pending(), 0);
        let stats = wcb.stats();
        assert_eq!((stats.bursts, stats.words), (1, 16));
        assert_eq!(mem.read_words(32, 16), (0..16).collect::<Vec<u16>>());
    }

    #[test]
    fn gap_breaks_run() {
        let mut mem = MemoryArbiter::with_words(256);
        let mut wcb = WriteCoalescer::new();
        for addr in [0, 1, 2, 5, 6] {
            wcb.push(&mut mem, addr, 7).unwrap();
        }
        assert_eq!(wcb.stats().bursts, 1);
        assert_eq!(wcb.pending(), 2);
        wcb.flush(&mut mem).unwrap();
        assert_eq!(wcb.stats().bursts, 2);
        assert_eq!(mem.stats(Port::ColorWrite).words, 5);
    }

    #[test]
    fn tile_boundary_breaks_run() {
        let mut mem = MemoryArbiter::with_words(256);
        let mut wcb = WriteCoalescer::new();
        for addr in 14..18 {
            wcb.push(&mut mem, addr, 1).unwrap();
        }
        wcb.flush(&mut mem).unwrap();
        assert_eq!(wcb.stats().bursts, 2);
    }

    #[test]
    fn rewrite_updates_in_place() {
        let mut mem = MemoryArbiter::with_words(256);
        let mut wcb = WriteCoalescer::new();
        wcb.push(&mut mem, 4, 1).unwrap();
        wcb.push(&mut mem, 5, 2).unwrap();
        wcb.push(&mut mem, 4, 3).unwrap();
        assert_eq!(wcb.pending(), 2);
        wcb.flush(&mut mem).unwrap();
        assert_eq!(mem.read_words(4, 2), [3, 2]);
    }

    #[test]
    fn reads_forward_queued_words() {
        let mut mem = MemoryArbiter::with_words(256);
        mem.write_word(9, 0xAAAA);
        let mut wcb = WriteCoalescer::new();
        wcb.push(&mut mem, 9, 0x5555).unwrap();
        assert_eq!(wcb.read(&mut mem, 9).unwrap(), 0x5555);
        assert_eq!(wcb.read(&mut mem, 10).unwrap(), 0);
        let stats = wcb.stats();
        assert_eq!((stats.forwarded, stats.reads), (1, 1));
    }

    #[test]
    fn flush_when_empty_is_free() {
        let mut mem = MemoryArbiter::with_words(16);
        let mut wcb = WriteCoalescer::new();
        wcb.flush(&mut mem).unwrap();
        assert_eq!(mem.stats(Port::ColorWrite).transactions, 0);
    }
}
