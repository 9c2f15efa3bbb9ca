//! Register-write commands.
//!
//! The host talks to the GPU exclusively through 64-bit register writes.
//! [`Command`] is one such write; the constructors build the common ones
//! from typed values so scenes read like the command streams they are.

use gpu_registers::{
    addr, ColorReg, FbConfigReg, FbControlReg, FbDisplayReg, MemFillReg, RenderModeReg,
    Uv0Uv1Reg, VertexReg,
};
use gs_twin_core::state::BASE_ADDR_UNIT;
use gs_twin_core::{Rgba8, Vertex};

/// How a vertex write affects the vertex window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kick {
    /// Latch only.
    None,
    /// Submit (oldest, middle, newest).
    Tri012,
    /// Submit (oldest, newest, middle).
    Tri021,
    /// Previous and newest vertex are opposite rectangle corners.
    Rect,
}

impl Kick {
    #[must_use]
    pub const fn register(self) -> u8 {
        match self {
            Kick::None => addr::VERTEX_NOKICK,
            Kick::Tri012 => addr::VERTEX_KICK_012,
            Kick::Tri021 => addr::VERTEX_KICK_021,
            Kick::Rect => addr::VERTEX_KICK_RECT,
        }
    }

    #[must_use]
    pub const fn from_register(reg: u8) -> Option<Self> {
        match reg {
            addr::VERTEX_NOKICK => Some(Kick::None),
            addr::VERTEX_KICK_012 => Some(Kick::Tri012),
            addr::VERTEX_KICK_021 => Some(Kick::Tri021),
            addr::VERTEX_KICK_RECT => Some(Kick::Rect),
            _ => None,
        }
    }
}

/// One register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub reg: u8,
    pub data: u64,
}

impl Command {
    #[must_use]
    pub const fn new(reg: u8, data: u64) -> Self {
        Self { reg, data }
    }

    #[must_use]
    pub fn color(color0: Rgba8, color1: Rgba8) -> Self {
        let mut reg = ColorReg::default();
        reg.set_color0(color0.to_packed());
        reg.set_color1(color1.to_packed());
        Self::new(addr::COLOR, reg.to_raw())
    }

    /// UV0 and UV1 as raw Q4.12 U/W, V/W pairs.
    #[must_use]
    pub fn uv(uv0: [i16; 2], uv1: [i16; 2]) -> Self {
        let mut reg = Uv0Uv1Reg::default();
        reg.set_uv0_uq(uv0[0] as u16);
        reg.set_uv0_vq(uv0[1] as u16);
        reg.set_uv1_uq(uv1[0] as u16);
        reg.set_uv1_vq(uv1[1] as u16);
        Self::new(addr::UV0_UV1, reg.to_raw())
    }

    /// Position, depth and 1/W of `v`. Colors and UVs need their own
    /// writes first.
    #[must_use]
    pub fn vertex(kick: Kick, v: &Vertex) -> Self {
        let mut reg = VertexReg::default();
        reg.set_x(v.x.to_bits() as u16);
        reg.set_y(v.y.to_bits() as u16);
        reg.set_z(v.z);
        reg.set_q(v.q.to_bits());
        Self::new(kick.register(), reg.to_raw())
    }

    /// The three writes that latch every attribute of `v`.
    #[must_use]
    pub fn full_vertex(kick: Kick, v: &Vertex) -> [Self; 3] {
        let bits = |c: [qfixed::Q4_12; 2]| [c[0].to_bits(), c[1].to_bits()];
        [
            Self::color(v.color0, v.color1),
            Self::uv(bits(v.uv0), bits(v.uv1)),
            Self::vertex(kick, v),
        ]
    }

    #[must_use]
    pub fn render_mode(reg: RenderModeReg) -> Self {
        Self::new(addr::RENDER_MODE, reg.to_raw())
    }

    /// Color and Z surfaces sharing one size. Bases are byte addresses and
    /// must be multiples of 512.
    #[must_use]
    pub fn fb_config(color_base: u32, z_base: u32, width_log2: u8, height_log2: u8) -> Self {
        let mut reg = FbConfigReg::default();
        reg.set_color_base((color_base / BASE_ADDR_UNIT) as u16);
        reg.set_z_base((z_base / BASE_ADDR_UNIT) as u16);
        reg.set_width_log2(width_log2);
        reg.set_height_log2(height_log2);
        Self::new(addr::FB_CONFIG, reg.to_raw())
    }

    #[must_use]
    pub fn fb_display(base: u32, width_log2: u8, line_double: bool) -> Self {
        let mut reg = FbDisplayReg::default();
        reg.set_fb_addr((base / BASE_ADDR_UNIT) as u16);
        reg.set_fb_width_log2(width_log2);
        reg.set_line_double(line_double);
        Self::new(addr::FB_DISPLAY, reg.to_raw())
    }

    /// Scissor rectangle; `width` and `height` are 1..=1024.
    #[must_use]
    pub fn scissor(x: u16, y: u16, width: u16, height: u16) -> Self {
        let mut reg = FbControlReg::default();
        reg.set_scissor_x(x);
        reg.set_scissor_y(y);
        reg.set_scissor_width(width & 0x3FF);
        reg.set_scissor_height(height & 0x3FF);
        Self::new(addr::FB_CONTROL, reg.to_raw())
    }

    /// Fill `count` words from byte address `base` (multiple of 512).
    #[must_use]
    pub fn mem_fill(base: u32, value: u16, count: u32) -> Self {
        let mut reg = MemFillReg::default();
        reg.set_fill_base((base / BASE_ADDR_UNIT) as u16);
        reg.set_fill_value(value);
        reg.set_fill_count(count);
        Self::new(addr::MEM_FILL, reg.to_raw())
    }
}
