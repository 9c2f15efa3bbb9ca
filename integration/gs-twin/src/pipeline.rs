//! Per-triangle and per-fragment orchestration of the component crates.
//!
//! Stage order per fragment: stipple, depth range, early Z, perspective
//! divide, TEX0/TEX1 sample, combiner, alpha test, blend, dither, write.
//! A failing test ends the fragment before it touches any later stage's
//! memory port.

use std::fmt;

use gs_alpha_blend::{alpha_test, blend, reads_destination};
use gs_color_combiner::{combine, CombinerInputs};
use gs_dither::dither_rgb565;
use gs_early_z::{depth_range_test, early_z_test};
use gs_memory::{MemoryArbiter, MemoryError};
use gs_pixel_write::{write_pixel, CoalesceStats, PixelOut, WriteCoalescer};
use gs_rasterizer::{setup_triangle, RasterState, Rasterizer, Rejected, SetupParams};
use gs_stipple::stipple_test;
use gs_tex_l1_cache::TexCacheStats;
use gs_texture::{perspective_divide, Sampler};
use gs_twin_core::state::{FbConfig, TexConfig};
use gs_twin_core::{Color, Fragment, RenderState, Rgba8, Vertex};
use gs_zbuf::{ZCacheStats, ZTileCache};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub triangles: u64,
    /// Back-facing or zero-area.
    pub culled: u64,
    /// Empty after scissor and surface clamp.
    pub clipped: u64,
    /// Rasterizer clocks, including rejected tiles.
    pub raster_cycles: u64,
    pub fragments: u64,
    pub stipple_discards: u64,
    pub range_discards: u64,
    pub z_discards: u64,
    pub alpha_discards: u64,
    /// Fragments that reached the write stage.
    pub pixels: u64,
    /// Color words queued.
    pub color_writes: u64,
}

impl PipelineStats {
    #[must_use]
    pub fn discards(&self) -> u64 {
        self.stipple_discards + self.range_discards + self.z_discards + self.alpha_discards
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "triangles: {} submitted, {} culled, {} clipped",
            self.triangles, self.culled, self.clipped
        )?;
        writeln!(
            f,
            "fragments: {} emitted in {} raster cycles, {} written ({} color)",
            self.fragments, self.raster_cycles, self.pixels, self.color_writes
        )?;
        write!(
            f,
            "discards:  stipple {}, depth range {}, z {}, alpha {}",
            self.stipple_discards, self.range_discards, self.z_discards, self.alpha_discards
        )
    }
}

/// Everything downstream of the register file: both samplers, the Z tile
/// cache and the write-coalescing buffer.
pub struct Pipeline {
    samplers: [Sampler; 2],
    zbuf: ZTileCache,
    wcb: WriteCoalescer,
    stats: PipelineStats,
}

impl Pipeline {
    #[must_use]
    pub fn new(tex_cache_sets: usize) -> Self {
        Self {
            samplers: [Sampler::new(tex_cache_sets), Sampler::new(tex_cache_sets)],
            zbuf: ZTileCache::new(),
            wcb: WriteCoalescer::new(),
            stats: PipelineStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    #[must_use]
    pub fn tex_stats(&self) -> [TexCacheStats; 2] {
        [self.samplers[0].cache_stats(), self.samplers[1].cache_stats()]
    }

    #[must_use]
    pub fn z_stats(&self) -> ZCacheStats {
        self.zbuf.stats()
    }

    #[must_use]
    pub fn coalesce_stats(&self) -> CoalesceStats {
        self.wcb.stats()
    }

    pub fn reset_stats(&mut self) {
        self.stats = PipelineStats::default();
        for s in &mut self.samplers {
            s.reset_stats();
        }
        self.zbuf.reset_stats();
        self.wcb.reset_stats();
    }

    /// Rebind texture unit `unit`. Pending color and dirty Z are written
    /// out first so a surface rendered so far samples correctly.
    ///
    /// # Errors
    /// Memory errors from the drain.
    pub fn bind_texture(
        &mut self,
        mem: &mut MemoryArbiter,
        unit: usize,
        config: TexConfig,
        fb: Option<&FbConfig>,
    ) -> Result<(), MemoryError> {
        self.flush(mem)?;
        if config.enabled && fb.is_some_and(|fb| config.aliases(&fb.color)) {
            log::warn!(
                "TEX{unit} at {:#x} overlaps the bound color target; texels written after this bind read stale",
                config.base
            );
        }
        self.samplers[unit].set_config(config);
        Ok(())
    }

    /// Drain the write-coalescing buffer and write back dirty Z lines.
    ///
    /// # Errors
    /// Memory errors from either drain.
    pub fn flush(&mut self, mem: &mut MemoryArbiter) -> Result<(), MemoryError> {
        self.wcb.flush(mem)?;
        self.zbuf.flush(mem)
    }

    /// Flush, then drop every cached line so later reads go to memory.
    ///
    /// # Errors
    /// Memory errors from the drains.
    pub fn invalidate(&mut self, mem: &mut MemoryArbiter) -> Result<(), MemoryError> {
        self.wcb.flush(mem)?;
        self.zbuf.flush_and_invalidate(mem)?;
        for s in &mut self.samplers {
            s.invalidate();
        }
        Ok(())
    }

    /// Set up and rasterize one triangle, shading each fragment as it is
    /// emitted. The arbiter clock advances once per rasterizer step and
    /// again for every memory transaction a fragment waits on.
    ///
    /// # Errors
    /// Memory errors from any cache fill, write-back or drain.
    pub fn draw_triangle(
        &mut self,
        mem: &mut MemoryArbiter,
        state: &RenderState,
        v: [Vertex; 3],
    ) -> Result<(), MemoryError> {
        let Some(fb) = state.fb else {
            log::warn!("triangle dropped: FB_CONFIG not written");
            return Ok(());
        };
        self.stats.triangles += 1;

        let params = SetupParams {
            cull: state.mode.cull,
            gouraud: state.mode.gouraud,
            scissor: state.scissor,
            surface_width: fb.color.width(),
            surface_height: fb.color.height(),
        };
        let setup = match setup_triangle(v, &params) {
            Ok(setup) => setup,
            Err(why) => {
                match why {
                    Rejected::Clipped => self.stats.clipped += 1,
                    Rejected::Degenerate | Rejected::Backface => self.stats.culled += 1,
                }
                log::debug!("triangle rejected: {why:?}");
                return Ok(());
            }
        };

        let mut raster = Rasterizer::new(&setup);
        while raster.state() != RasterState::Idle {
            mem.tick();
            if let Some(frag) = raster.step() {
                self.shade(mem, state, &fb, &frag)?;
            }
        }
        let rs = raster.stats();
        self.stats.raster_cycles += rs.cycles;
        self.stats.fragments += rs.fragments;
        log::debug!(
            "triangle done: {} fragments, {} of {} tiles rejected",
            rs.fragments,
            rs.tiles_rejected,
            rs.tiles
        );
        Ok(())
    }

    fn shade(
        &mut self,
        mem: &mut MemoryArbiter,
        state: &RenderState,
        fb: &FbConfig,
        frag: &Fragment,
    ) -> Result<(), MemoryError> {
        let mode = &state.mode;
        let (x, y) = (u32::from(frag.x), u32::from(frag.y));

        if !stipple_test(mode.stipple, state.stipple, x, y) {
            self.stats.stipple_discards += 1;
            return Ok(());
        }
        if !depth_range_test(&state.z_range, frag.z) {
            self.stats.range_discards += 1;
            return Ok(());
        }
        if !early_z_test(mode, &mut self.zbuf, mem, &fb.z, x, y, frag.z)? {
            self.stats.z_discards += 1;
            return Ok(());
        }

        let mut tex = [Color::ONE; 2];
        for (unit, uv) in [frag.uv0, frag.uv1].into_iter().enumerate() {
            let (u, v) = perspective_divide(uv.uq, uv.vq, frag.q);
            tex[unit] = self.samplers[unit].sample(mem, u, v)?.into();
        }

        let inputs = CombinerInputs::new(
            tex,
            [frag.shade0.into(), frag.shade1.into()],
            &state.consts,
        );
        let combined = combine(&state.combiner, &inputs);
        if !alpha_test(mode.alpha_test, combined.a, mode.alpha_ref) {
            self.stats.alpha_discards += 1;
            return Ok(());
        }

        let dst = if reads_destination(mode.blend) {
            Rgba8::from_rgb565(self.wcb.read(mem, fb.color.word_address(x, y))?)
        } else {
            Rgba8::BLACK
        };
        let mut color = blend(mode.blend, combined, dst).to_rgba8();
        if mode.dither {
            color = dither_rgb565(mode.dither_pattern, color, x, y);
        }

        self.stats.pixels += 1;
        let px = PixelOut {
            x,
            y,
            z: frag.z,
            color,
        };
        if write_pixel(mem, &mut self.zbuf, &mut self.wcb, fb, mode, px)? {
            self.stats.color_writes += 1;
        }
        Ok(())
    }
}
