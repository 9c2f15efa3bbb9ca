use std::path::Path;

use gs_twin_core::{Rgba8, Surface};
use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::arbiter::MemoryArbiter;

impl MemoryArbiter {
    /// Read an RGB565 surface back as RGBA8, de-tiling as it goes.
    #[must_use]
    pub fn surface_image(&self, surface: &Surface) -> RgbaImage {
        RgbaImage::from_fn(surface.width(), surface.height(), |x, y| {
            let c = Rgba8::from_rgb565(self.read_word(surface.word_address(x, y)));
            Rgba(c.to_array())
        })
    }

    /// Read a 16-bit Z surface back as 8-bit grayscale (high byte).
    #[must_use]
    pub fn depth_image(&self, surface: &Surface) -> GrayImage {
        GrayImage::from_fn(surface.width(), surface.height(), |x, y| {
            Luma([(self.read_word(surface.word_address(x, y)) >> 8) as u8])
        })
    }

    /// Write a color surface to a PNG file.
    ///
    /// # Errors
    /// Any encoder or I/O failure.
    pub fn dump_surface_png(
        &self,
        surface: &Surface,
        path: impl AsRef<Path>,
    ) -> Result<(), image::ImageError> {
        let path = path.as_ref();
        self.surface_image(surface).save(path)?;
        log::info!(
            "dumped {}x{} surface at {:#x} to {}",
            surface.width(),
            surface.height(),
            surface.base,
            path.display()
        );
        Ok(())
    }
}
