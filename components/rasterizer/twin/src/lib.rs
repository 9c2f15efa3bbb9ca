//! Triangle setup and the tiled edge-walking rasterizer.
//!
//! [`setup::setup_triangle`] turns three vertices into edge equations,
//! attribute planes and a clipped bounding box (or a [`Rejected`] reason).
//! [`Rasterizer`] then walks that box in 4x4 tiles and emits one
//! [`gs_twin_core::Fragment`] per covered pixel.

pub mod raster;
pub mod setup;

pub use raster::{next_state, RasterState, RasterStats, Rasterizer, Walk};
pub use setup::{setup_triangle, BBox, Edge, Plane, Rejected, SetupParams, TriangleSetup};
