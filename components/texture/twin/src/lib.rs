//! Texture sampler: one per texture unit.
//!
//! A sample wraps the texel coordinates, forms the block address in the
//! 4x4-tiled texture, and looks the block up in the unit's cache. A miss
//! reads the whole block in one burst on the texture port and decodes it
//! before it is installed. The filtered result is swizzled last.

use gpu_registers::{Swizzle, TexFilter};
use gs_memory::{MemoryArbiter, MemoryError, Port, Request};
use gs_tex_bilinear_filter::{bilinear, Taps};
use gs_tex_block_decoder::decode_block;
use gs_tex_l1_cache::{TexCache, TexCacheStats, DEFAULT_SETS};
use gs_tex_uv_coord::{nearest, texel_pair, wrap_texel, Texel};
use gs_twin_core::state::TexConfig;
use gs_twin_core::surface::block_index;
use gs_twin_core::Rgba8;

pub use gs_tex_uv_coord::perspective_divide;

/// Reorder or broadcast channels.
#[must_use]
pub fn swizzle(mode: Swizzle, c: Rgba8) -> Rgba8 {
    match mode {
        Swizzle::Rgba => c,
        Swizzle::Bgra => Rgba8::new(c.b, c.g, c.r, c.a),
        Swizzle::Rrr1 => Rgba8::new(c.r, c.r, c.r, 255),
        Swizzle::Rrrr => Rgba8::new(c.r, c.r, c.r, c.r),
        Swizzle::Rgb1 => Rgba8::new(c.r, c.g, c.b, 255),
        Swizzle::Aaaa => Rgba8::new(c.a, c.a, c.a, c.a),
    }
}

pub struct Sampler {
    config: TexConfig,
    cache: TexCache,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(DEFAULT_SETS)
    }
}

impl Sampler {
    #[must_use]
    pub fn new(cache_sets: usize) -> Self {
        Self {
            config: TexConfig::default(),
            cache: TexCache::new(cache_sets),
        }
    }

    #[must_use]
    pub fn config(&self) -> &TexConfig {
        &self.config
    }

    /// Rebind the unit. Any config write drops the cache, so a texture
    /// rendered since the last bind is fetched fresh.
    pub fn set_config(&mut self, config: TexConfig) {
        self.config = config;
        self.cache.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    #[must_use]
    pub fn cache_stats(&self) -> TexCacheStats {
        self.cache.stats()
    }

    pub fn reset_stats(&mut self) {
        self.cache.reset_stats();
    }

    /// Sample at (u, v), Q4.12 with 1.0 spanning the texture. A disabled
    /// unit samples opaque white.
    ///
    /// # Errors
    /// Memory errors from a block fill.
    pub fn sample(
        &mut self,
        mem: &mut MemoryArbiter,
        u: i32,
        v: i32,
    ) -> Result<Rgba8, MemoryError> {
        if !self.config.enabled {
            return Ok(Rgba8::WHITE);
        }
        let (wl, hl) = (self.config.width_log2, self.config.height_log2);
        let texel = match self.config.filter {
            TexFilter::Nearest => self.fetch(mem, nearest(u, wl), nearest(v, hl))?,
            // Only level 0 exists, so trilinear is bilinear.
            TexFilter::Bilinear | TexFilter::Trilinear => {
                let (tu, tv) = (texel_pair(u, wl), texel_pair(v, hl));
                let taps = Taps {
                    t00: self.fetch(mem, tu.i0, tv.i0)?,
                    t10: self.fetch(mem, tu.i0 + 1, tv.i0)?,
                    t01: self.fetch(mem, tu.i0, tv.i0 + 1)?,
                    t11: self.fetch(mem, tu.i0 + 1, tv.i0 + 1)?,
                };
                bilinear(&taps, tu.frac, tv.frac)
            }
        };
        Ok(swizzle(self.config.swizzle, texel))
    }

    fn fetch(&mut self, mem: &mut MemoryArbiter, x: i32, y: i32) -> Result<Rgba8, MemoryError> {
        let cfg = &self.config;
        let Some(Texel { x, y }) =
            wrap_texel(cfg.u_wrap, cfg.v_wrap, x, y, cfg.width_log2, cfg.height_log2)
        else {
            return Ok(Rgba8::TRANSPARENT);
        };
        let (bx, by) = (x >> 2, y >> 2);
        let tag = cfg.base + block_index(x, y, cfg.width_log2) * cfg.format.block_bytes();
        let within = ((y & 3) * 4 + (x & 3)) as usize;

        if let Some(block) = self.cache.lookup(tag, bx, by) {
            return Ok(block[within]);
        }

        let words = usize::from(cfg.format.burst_words());
        let done = mem.execute(Port::Texture, Request::read(tag / 2, words))?;
        let bytes: Vec<u8> = done.data.iter().flat_map(|w| w.to_le_bytes()).collect();
        log::trace!("texture: fetched {:?} block {tag:#x}", cfg.format);
        let block = self.cache.fill(tag, bx, by, decode_block(cfg.format, &bytes));
        Ok(block[within])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swizzle_modes() {
        let c = Rgba8::new(1, 2, 3, 4);
        assert_eq!(swizzle(Swizzle::Rgba, c), c);
        assert_eq!(swizzle(Swizzle::Bgra, c), Rgba8::new(3, 2, 1, 4));
        assert_eq!(swizzle(Swizzle::Rrr1, c), Rgba8::new(1, 1, 1, 255));
        assert_eq!(swizzle(Swizzle::Rrrr, c), Rgba8::new(1, 1, 1, 1));
        assert_eq!(swizzle(Swizzle::Rgb1, c), Rgba8::new(1, 2, 3, 255));
        assert_eq!(swizzle(Swizzle::Aaaa, c), Rgba8::new(4, 4, 4, 4));
    }

    #[test]
    fn disabled_unit_is_white() {
        let mut mem = MemoryArbiter::with_words(1 << 12);
        let mut s = Sampler::default();
        assert_eq!(s.sample(&mut mem, 0, 0).unwrap(), Rgba8::WHITE);
        assert_eq!(s.cache_stats().misses, 0);
    }
}
