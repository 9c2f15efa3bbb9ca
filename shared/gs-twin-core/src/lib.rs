//! Shared types for the pico-gs digital twin component crates.

/// RGBA8 and Q4.12 color values, RGB565 packing.
pub mod color;

/// Configuration errors.
pub mod error;

/// Per-pixel fragment and per-corner vertex data.
pub mod fragment;

/// Render state decoded from the register map.
pub mod state;

/// Surface descriptors and the 4x4 block-tiled address formula.
pub mod surface;

pub use color::{Color, Rgba8};
pub use error::ConfigError;
pub use fragment::{Fragment, TexCoord, Vertex};
pub use state::RenderState;
pub use surface::Surface;
