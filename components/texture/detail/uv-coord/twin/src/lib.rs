//! Texture coordinate processing: perspective reconstruction, wrap modes,
//! and texel addressing.

pub mod recip;
pub mod wrap;

pub use recip::{perspective_divide, reciprocal_w, RECIP_LUT, UNIT};
pub use wrap::{nearest, texel_pair, wrap_axis, wrap_texel, AxisTap, Texel};
