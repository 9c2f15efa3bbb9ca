/// Errors raised while decoding render state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Surface dimensions must be powers of two between 4 and 1024.
    #[error("invalid surface dimensions: width_log2={width_log2}, height_log2={height_log2}")]
    SurfaceSize { width_log2: u8, height_log2: u8 },

    /// Texture dimensions must be powers of two no larger than 1024.
    #[error("invalid texture dimensions: width_log2={width_log2}, height_log2={height_log2}")]
    TextureSize { width_log2: u8, height_log2: u8 },
}
