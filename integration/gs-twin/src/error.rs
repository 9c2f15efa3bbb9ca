use gs_memory::MemoryError;
use gs_twin_core::ConfigError;

/// Errors surfaced by [`crate::GsTwin`].
#[derive(Debug, thiserror::Error)]
pub enum TwinError {
    #[error("no register at index {0:#04x}")]
    UnknownRegister(u8),

    #[error("register {0:#04x} is read-only")]
    ReadOnlyRegister(u8),

    #[error("no render target bound (FB_CONFIG not written)")]
    NoRenderTarget,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("image output failed: {0}")]
    Image(#[from] image::ImageError),
}
