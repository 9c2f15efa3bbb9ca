//! GPU register map: register indices, bit-exact field layouts and field
//! encodings.
//!
//! Every register is a transparent `u64` wrapper with one [`Field`]
//! descriptor per field plus getter/setter pairs. Enumerated fields decode
//! through `from_bits`, which rejects unassigned codes with
//! [`UnknownVariant`]; deciding on a fallback is left to the consumer.
#![no_std]

pub mod addr;
pub mod encode;
pub mod enums;
#[macro_use]
pub mod field;
pub mod regs;

pub use encode::UnknownVariant;
pub use enums::*;
pub use field::Field;
pub use regs::*;
