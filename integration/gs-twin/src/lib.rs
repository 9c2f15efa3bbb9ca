//! Transaction-level digital twin of the pico-gs graphics synthesizer.
//!
//! [`GsTwin`] accepts the same 64-bit register writes the hardware does and
//! runs them through the component crates: vertex assembly, triangle setup,
//! the tiled rasterizer, the per-fragment pixel pipeline and the memory
//! arbiter in front of the SDRAM model. Everything the pipeline reads or
//! writes goes through the arbiter, so cycle counts and port statistics
//! reflect real contention with display scanout.
//!
//! ```no_run
//! use gs_twin::{Command, GsTwin, Kick, Rgba8, TwinConfig, Vertex};
//!
//! let mut twin = GsTwin::new(TwinConfig::default());
//! twin.execute(Command::fb_config(0, 0x10_0000, 10, 9))?;
//! let red = Rgba8::new(255, 0, 0, 255);
//! let corners = [(320, 40, Kick::None), (560, 400, Kick::None), (80, 400, Kick::Tri012)];
//! for (x, y, kick) in corners {
//!     twin.run(Command::full_vertex(kick, &Vertex::at(x, y, 0, red)))?;
//! }
//! twin.end_frame()?;
//! twin.save_png("triangle.png")?;
//! # Ok::<(), gs_twin::TwinError>(())
//! ```

/// Register-write commands and their typed constructors.
pub mod command;

/// Model parameters outside the register file.
pub mod config;

pub mod error;

/// Stage-by-stage fragment processing.
pub mod pipeline;

/// Statistics snapshot across every unit.
pub mod stats;

mod twin;

/// Vertex latching and kick handling.
pub mod vertex;

pub use command::{Command, Kick};
pub use config::TwinConfig;
pub use error::TwinError;
pub use pipeline::{Pipeline, PipelineStats};
pub use stats::TwinStats;
pub use twin::GsTwin;

pub use gpu_registers as registers;
pub use gs_display::DisplayTiming;
pub use gs_memory::Port;
pub use gs_twin_core::{state, Color, Rgba8, Surface, Vertex};
