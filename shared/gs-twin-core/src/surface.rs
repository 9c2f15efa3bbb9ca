use crate::error::ConfigError;

/// Side length of one tile/block.
pub const BLOCK_DIM: u32 = 4;

/// Largest supported surface or texture dimension, log2.
pub const MAX_DIM_LOG2: u8 = 10;

/// Row-major index of the 4x4 block holding texel (x, y) in a surface
/// `1 << width_log2` texels wide.
#[must_use]
pub const fn block_index(x: u32, y: u32, width_log2: u8) -> u32 {
    ((y >> 2) << width_log2.saturating_sub(2)) | (x >> 2)
}

/// Byte address of texel (x, y) in a block-tiled surface.
///
/// `addr = base + block_idx * block_bytes + ((y & 3) * 4 + (x & 3)) * bytes_per_texel`
#[must_use]
pub const fn tiled_address(base: u32, x: u32, y: u32, width_log2: u8, bytes_per_texel: u32) -> u32 {
    let block_bytes = 16 * bytes_per_texel;
    base + block_index(x, y, width_log2) * block_bytes + ((y & 3) * 4 + (x & 3)) * bytes_per_texel
}

/// A 16-bit-per-pixel color or Z buffer in the shared memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    /// Byte address.
    pub base: u32,
    pub width_log2: u8,
    pub height_log2: u8,
}

impl Surface {
    pub const BYTES_PER_PIXEL: u32 = 2;

    /// Bytes in one 4x4 tile.
    pub const TILE_BYTES: u32 = 16 * Self::BYTES_PER_PIXEL;

    /// # Errors
    /// Rejects dimensions outside 4..=1024 on either axis.
    pub fn new(base: u32, width_log2: u8, height_log2: u8) -> Result<Self, ConfigError> {
        let valid = |l: u8| (2..=MAX_DIM_LOG2).contains(&l);
        if !valid(width_log2) || !valid(height_log2) {
            return Err(ConfigError::SurfaceSize {
                width_log2,
                height_log2,
            });
        }
        Ok(Self {
            base,
            width_log2,
            height_log2,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        1 << self.width_log2
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        1 << self.height_log2
    }

    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }

    /// Byte address of pixel (x, y).
    #[must_use]
    pub const fn pixel_address(&self, x: u32, y: u32) -> u32 {
        tiled_address(self.base, x, y, self.width_log2, Self::BYTES_PER_PIXEL)
    }

    /// 16-bit word address of pixel (x, y).
    #[must_use]
    pub const fn word_address(&self, x: u32, y: u32) -> u32 {
        self.pixel_address(x, y) / 2
    }

    /// Byte address of the tile holding pixel (x, y).
    #[must_use]
    pub const fn tile_address(&self, x: u32, y: u32) -> u32 {
        self.base + block_index(x, y, self.width_log2) * Self::TILE_BYTES
    }

    #[must_use]
    pub const fn size_bytes(&self) -> u32 {
        self.width() * self.height() * Self::BYTES_PER_PIXEL
    }

    /// True if the byte ranges of two surfaces intersect.
    #[must_use]
    pub const fn overlaps(&self, base: u32, len: u32) -> bool {
        self.base < base + len && base < self.base + self.size_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiled_address_formula() {
        // 512 wide: 128 blocks per block row, 32 bytes per block.
        let s = Surface::new(0x10_0000, 9, 9).unwrap();
        assert_eq!(s.pixel_address(0, 0), 0x10_0000);
        assert_eq!(s.pixel_address(1, 0), 0x10_0002);
        assert_eq!(s.pixel_address(0, 1), 0x10_0008);
        assert_eq!(s.pixel_address(4, 0), 0x10_0020);
        assert_eq!(s.pixel_address(5, 6), 0x10_0000 + 129 * 32 + (2 * 4 + 1) * 2);
    }

    #[test]
    fn tile_is_sixteen_consecutive_words() {
        let s = Surface::new(0, 4, 4).unwrap();
        let mut words: Vec<u32> = (0..16).map(|i| s.word_address(4 + i % 4, 8 + i / 4)).collect();
        words.sort_unstable();
        let first = s.tile_address(4, 8) / 2;
        assert_eq!(words, (first..first + 16).collect::<Vec<_>>());
    }

    #[test]
    fn four_line_strip_is_contiguous() {
        let s = Surface::new(0, 6, 6).unwrap();
        let strip_start = s.tile_address(0, 8);
        let strip_end = s.tile_address(60, 8) + Surface::TILE_BYTES;
        assert_eq!(strip_end - strip_start, s.width() * 4 * 2);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(Surface::new(0, 1, 4).is_err());
        assert!(Surface::new(0, 4, 11).is_err());
        assert!(Surface::new(0, 10, 2).is_ok());
    }

    #[test]
    fn narrow_textures_use_one_block_per_row() {
        assert_eq!(block_index(3, 4, 1), 1);
        assert_eq!(block_index(3, 8, 2), 2);
    }
}
