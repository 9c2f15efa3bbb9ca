//! Shared-memory model: the SDRAM controller behind a four-port
//! fixed-priority arbiter.
//!
//! Every unit that touches external memory goes through one of the
//! [`Port`]s. The arbiter owns the global clock; each [`MemoryArbiter::tick`]
//! evaluates one SDRAM clock edge. Grants go to the highest-priority port
//! with a request pending, and only when the controller is idle and not
//! refreshing. A granted burst runs to completion (or to its requester's
//! cancel) before anything else is granted.
//!
//! Pipeline units use the blocking [`MemoryArbiter::execute`], which ticks
//! the clock until their transaction completes. The display scanout instead
//! attaches as a [`PortClient`] and is polled every cycle, so it keeps
//! competing for the bus while the pipeline is stalled on a miss.

mod arbiter;
mod client;
mod dump;
mod error;
mod port;

pub use arbiter::MemoryArbiter;
pub use client::{ClientPort, PortClient};
pub use error::MemoryError;
pub use port::{Completion, Port, PortStats, Request, MAX_BURST_WORDS};
