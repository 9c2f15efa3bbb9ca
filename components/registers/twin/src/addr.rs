//! Register indices. Each register is 64 bits wide; the byte offset in the
//! register block is `index * 8`.

pub const COLOR: u8 = 0x00;
pub const UV0_UV1: u8 = 0x01;
pub const AREA_SETUP: u8 = 0x05;
pub const VERTEX_NOKICK: u8 = 0x06;
pub const VERTEX_KICK_012: u8 = 0x07;
pub const VERTEX_KICK_021: u8 = 0x08;
pub const VERTEX_KICK_RECT: u8 = 0x09;
pub const TEX0_CFG: u8 = 0x10;
pub const TEX1_CFG: u8 = 0x11;
pub const CC_MODE: u8 = 0x18;
pub const CONST_COLOR: u8 = 0x19;
pub const RENDER_MODE: u8 = 0x30;
pub const Z_RANGE: u8 = 0x31;
pub const STIPPLE_PATTERN: u8 = 0x32;
pub const FB_CONFIG: u8 = 0x40;
pub const FB_DISPLAY: u8 = 0x41;
pub const FB_CONTROL: u8 = 0x43;
pub const MEM_FILL: u8 = 0x44;
pub const ID: u8 = 0x7F;

/// Byte offset of a register index within the register block.
#[must_use]
pub const fn byte_offset(index: u8) -> usize {
    index as usize * 8
}
