use std::path::Path;

use gpu_registers::{
    addr, AreaSetupReg, CcModeReg, ColorReg, ConstColorReg, FbConfigReg, FbControlReg,
    FbDisplayReg, IdReg, MemFillReg, RenderModeReg, StipplePatternReg, TexCfgReg, Uv0Uv1Reg,
    VertexReg, ZRangeReg,
};
use gs_display::Display;
use gs_memory::{MemoryArbiter, Port, Request, MAX_BURST_WORDS};
use gs_twin_core::state::{
    CombinerMode, ConstColors, DisplayConfig, FbConfig, MemFill, RenderMode, Scissor,
    StipplePattern, TexConfig, ZRange,
};
use gs_twin_core::{RenderState, Vertex};
use image::{GrayImage, RgbaImage};

use crate::command::{Command, Kick};
use crate::config::TwinConfig;
use crate::error::TwinError;
use crate::pipeline::Pipeline;
use crate::stats::TwinStats;
use crate::vertex::VertexWindow;

/// Power-on value of every implemented register; `None` for holes in the
/// map.
fn reset_value(reg: u8) -> Option<u64> {
    Some(match reg {
        addr::COLOR => ColorReg::RESET,
        addr::UV0_UV1 => Uv0Uv1Reg::RESET,
        addr::AREA_SETUP => AreaSetupReg::RESET,
        addr::VERTEX_NOKICK..=addr::VERTEX_KICK_RECT => VertexReg::RESET,
        addr::TEX0_CFG | addr::TEX1_CFG => TexCfgReg::RESET,
        addr::CC_MODE => CcModeReg::RESET,
        addr::CONST_COLOR => ConstColorReg::RESET,
        addr::RENDER_MODE => RenderModeReg::RESET,
        addr::Z_RANGE => ZRangeReg::RESET,
        addr::STIPPLE_PATTERN => StipplePatternReg::RESET,
        addr::FB_CONFIG => FbConfigReg::RESET,
        addr::FB_DISPLAY => FbDisplayReg::RESET,
        addr::FB_CONTROL => FbControlReg::RESET,
        addr::MEM_FILL => MemFillReg::RESET,
        addr::ID => IdReg::RESET,
        _ => return None,
    })
}

/// The whole GPU behind its register file.
///
/// Drive it with [`GsTwin::write_register`] (or [`Command`]s), then call
/// [`GsTwin::end_frame`] before reading the color surface back.
pub struct GsTwin {
    mem: MemoryArbiter,
    regs: [u64; 128],
    state: RenderState,
    display: DisplayConfig,
    window: VertexWindow,
    pipeline: Pipeline,
    frames: u64,
}

impl Default for GsTwin {
    fn default() -> Self {
        Self::new(TwinConfig::default())
    }
}

impl GsTwin {
    #[must_use]
    pub fn new(config: TwinConfig) -> Self {
        let mut mem = MemoryArbiter::with_words(config.sdram_words);
        if let Some(timing) = config.display {
            let mut display = Display::new(DisplayConfig::default(), timing);
            display.enable_capture();
            mem.attach_client(Box::new(display));
        }
        let mut regs = [0; 128];
        for (i, slot) in regs.iter_mut().enumerate() {
            *slot = reset_value(i as u8).unwrap_or(0);
        }
        Self {
            mem,
            regs,
            state: RenderState::default(),
            display: DisplayConfig::default(),
            window: VertexWindow::new(),
            pipeline: Pipeline::new(config.tex_cache_sets),
            frames: 0,
        }
    }

    /// Apply one register write. Vertex kicks rasterize to completion
    /// before this returns.
    ///
    /// # Errors
    /// Unknown or read-only index, an invalid surface or texture size, or
    /// a memory access outside the SDRAM.
    pub fn write_register(&mut self, reg: u8, data: u64) -> Result<(), TwinError> {
        log::trace!("reg write {reg:#04x} <- {data:#018x}");
        match reg {
            addr::COLOR => self.window.set_color(ColorReg::from_raw(data)),
            addr::UV0_UV1 => self.window.set_uv(Uv0Uv1Reg::from_raw(data)),
            addr::AREA_SETUP => {
                log::debug!("AREA_SETUP write ignored; triangle setup computes its own");
            }
            addr::VERTEX_NOKICK..=addr::VERTEX_KICK_RECT => {
                let kick = Kick::from_register(reg).unwrap_or(Kick::None);
                for tri in self.window.push(VertexReg::from_raw(data), kick) {
                    self.pipeline.draw_triangle(&mut self.mem, &self.state, tri)?;
                }
            }
            addr::TEX0_CFG | addr::TEX1_CFG => {
                let unit = usize::from(reg - addr::TEX0_CFG);
                let config = TexConfig::from_reg(TexCfgReg::from_raw(data))?;
                self.pipeline
                    .bind_texture(&mut self.mem, unit, config, self.state.fb.as_ref())?;
                self.state.tex[unit] = config;
            }
            addr::CC_MODE => {
                self.state.combiner = CombinerMode::from_reg(CcModeReg::from_raw(data));
            }
            addr::CONST_COLOR => {
                self.state.consts = ConstColors::from_reg(ConstColorReg::from_raw(data));
            }
            addr::RENDER_MODE => {
                self.state.mode = RenderMode::from_reg(RenderModeReg::from_raw(data));
            }
            addr::Z_RANGE => self.state.z_range = ZRange::from_reg(ZRangeReg::from_raw(data)),
            addr::STIPPLE_PATTERN => {
                self.state.stipple = StipplePattern(StipplePatternReg::from_raw(data).pattern());
            }
            addr::FB_CONFIG => {
                let fb = FbConfig::from_reg(FbConfigReg::from_raw(data))?;
                log::debug!(
                    "render target: color {:#x} z {:#x} {}x{}",
                    fb.color.base,
                    fb.z.base,
                    fb.color.width(),
                    fb.color.height()
                );
                self.state.fb = Some(fb);
            }
            addr::FB_DISPLAY => {
                self.display = DisplayConfig::from_reg(FbDisplayReg::from_raw(data));
                if let Some(display) = self.mem.client_mut::<Display>() {
                    display.set_config(self.display);
                }
            }
            addr::FB_CONTROL => {
                self.state.scissor = Scissor::from_reg(FbControlReg::from_raw(data));
            }
            addr::MEM_FILL => self.mem_fill(MemFill::from_reg(MemFillReg::from_raw(data)))?,
            addr::ID => return Err(TwinError::ReadOnlyRegister(reg)),
            _ => {
                log::warn!("write to unknown register {reg:#04x} ignored");
                return Err(TwinError::UnknownRegister(reg));
            }
        }
        self.regs[usize::from(reg)] = data;
        Ok(())
    }

    /// # Errors
    /// See [`GsTwin::write_register`].
    pub fn execute(&mut self, cmd: Command) -> Result<(), TwinError> {
        self.write_register(cmd.reg, cmd.data)
    }

    /// Execute commands in order, stopping at the first error.
    ///
    /// # Errors
    /// See [`GsTwin::write_register`].
    pub fn run(&mut self, cmds: impl IntoIterator<Item = Command>) -> Result<(), TwinError> {
        cmds.into_iter().try_for_each(|cmd| self.execute(cmd))
    }

    /// Last value written to `reg`, or its reset value.
    ///
    /// # Errors
    /// `reg` is not in the register map.
    pub fn read_register(&self, reg: u8) -> Result<u64, TwinError> {
        match reset_value(reg) {
            Some(_) => Ok(self.regs[usize::from(reg)]),
            None => Err(TwinError::UnknownRegister(reg)),
        }
    }

    /// Draw a triangle directly, bypassing the vertex window.
    ///
    /// # Errors
    /// Memory errors from the pipeline.
    pub fn submit_triangle(&mut self, v: [Vertex; 3]) -> Result<(), TwinError> {
        self.pipeline.draw_triangle(&mut self.mem, &self.state, v)?;
        Ok(())
    }

    /// Drain pending color writes and dirty Z lines so memory holds the
    /// finished frame.
    ///
    /// # Errors
    /// Memory errors from the drains.
    pub fn end_frame(&mut self) -> Result<(), TwinError> {
        self.pipeline.flush(&mut self.mem)?;
        self.frames += 1;
        let stats = self.pipeline.stats();
        log::info!(
            "frame {} done at cycle {}: {} triangles, {} fragments, {} pixels written",
            self.frames,
            self.mem.cycle(),
            stats.triangles,
            stats.fragments,
            stats.pixels
        );
        Ok(())
    }

    /// Let the clock run with no rendering, e.g. so scanout can finish a
    /// frame.
    pub fn advance(&mut self, cycles: u64) {
        self.mem.advance(cycles);
    }

    fn mem_fill(&mut self, fill: MemFill) -> Result<(), TwinError> {
        self.pipeline.invalidate(&mut self.mem)?;
        let mut word_addr = fill.base / 2;
        let mut left = fill.count as usize;
        while left > 0 {
            let len = left.min(MAX_BURST_WORDS);
            self.mem
                .execute(Port::ColorWrite, Request::write(word_addr, vec![fill.value; len]))?;
            word_addr += len as u32;
            left -= len;
        }
        log::debug!(
            "mem fill: {} words of {:#06x} at {:#x}",
            fill.count,
            fill.value,
            fill.base
        );
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    #[must_use]
    pub fn display_config(&self) -> DisplayConfig {
        self.display
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryArbiter {
        &self.mem
    }

    /// Direct memory access for loading textures and inspecting results.
    /// Writes here bypass the caches; rebind textures afterwards.
    pub fn memory_mut(&mut self) -> &mut MemoryArbiter {
        &mut self.mem
    }

    #[must_use]
    pub fn display(&self) -> Option<&Display> {
        self.mem.client::<Display>()
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The bound color target as RGBA8. Only complete after
    /// [`GsTwin::end_frame`].
    #[must_use]
    pub fn color_image(&self) -> Option<RgbaImage> {
        self.state.fb.map(|fb| self.mem.surface_image(&fb.color))
    }

    /// The bound Z target, high byte per pixel.
    #[must_use]
    pub fn depth_image(&self) -> Option<GrayImage> {
        self.state.fb.map(|fb| self.mem.depth_image(&fb.z))
    }

    /// # Errors
    /// No render target is bound, or the PNG could not be written.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), TwinError> {
        let fb = self.state.fb.ok_or(TwinError::NoRenderTarget)?;
        self.mem.dump_surface_png(&fb.color, path)?;
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> TwinStats {
        TwinStats {
            pipeline: self.pipeline.stats(),
            tex: self.pipeline.tex_stats(),
            zbuf: self.pipeline.z_stats(),
            coalesce: self.pipeline.coalesce_stats(),
            ports: Port::ALL.map(|p| self.mem.stats(p)),
            cycles: self.mem.cycle(),
            display: self.display().map(Display::stats),
        }
    }

    pub fn reset_stats(&mut self) {
        self.pipeline.reset_stats();
        self.mem.reset_stats();
    }
}
