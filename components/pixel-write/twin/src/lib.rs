//! Pixel write: the last stage of the pixel pipeline.
//!
//! Depth goes to the Z tile cache, color goes to the write-coalescing
//! buffer as RGB565.

mod coalesce;

pub use coalesce::{CoalesceStats, WriteCoalescer, MAX_RUN_WORDS};

use gs_memory::{MemoryArbiter, MemoryError};
use gs_twin_core::state::{FbConfig, RenderMode};
use gs_twin_core::Rgba8;
use gs_zbuf::ZTileCache;

/// A fragment that survived every test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelOut {
    pub x: u32,
    pub y: u32,
    pub z: u16,
    pub color: Rgba8,
}

/// Commit `px`. Depth is written when Z_WRITE_EN is set, color when
/// COLOR_WRITE_EN is set. Returns whether a color word was queued.
///
/// # Errors
/// Memory errors from a Z cache fill or a coalescer drain.
pub fn write_pixel(
    mem: &mut MemoryArbiter,
    zbuf: &mut ZTileCache,
    wcb: &mut WriteCoalescer,
    fb: &FbConfig,
    mode: &RenderMode,
    px: PixelOut,
) -> Result<bool, MemoryError> {
    if mode.z_write {
        zbuf.write(mem, &fb.z, px.x, px.y, px.z)?;
    }
    if !mode.color_write {
        return Ok(false);
    }
    wcb.push(mem, fb.color.word_address(px.x, px.y), px.color.to_rgb565())?;
    Ok(true)
}
