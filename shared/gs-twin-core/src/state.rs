//! Strongly-typed render state.
//!
//! Each struct decodes one register. Unassigned enum codes fall back to the
//! nearest defined behavior (logged at `warn`), never to an error; only
//! impossible surface geometry is rejected.

use gpu_registers::{
    AlphaBlend, AlphaTest, CcModeReg, CcRgbCSource, CcSource, ConstColorReg, CullMode,
    DitherPattern, FbConfigReg, FbControlReg, FbDisplayReg, MemFillReg, RenderModeReg,
    StipplePatternReg, Swizzle, TexCfgReg, TexFilter, TexFormat, UnknownVariant, WrapMode,
    ZCompare, ZRangeReg,
};

use crate::color::Rgba8;
use crate::error::ConfigError;
use crate::surface::{Surface, MAX_DIM_LOG2};

/// Registers hold base addresses in 512-byte units.
pub const BASE_ADDR_UNIT: u32 = 512;

fn or_fallback<T: core::fmt::Debug>(
    decoded: Result<T, UnknownVariant<u8>>,
    field: &str,
    fallback: T,
) -> T {
    decoded.unwrap_or_else(|e| {
        log::warn!("{field}: unassigned code {}, using {fallback:?}", e.bits());
        fallback
    })
}

/// RENDER_MODE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderMode {
    pub gouraud: bool,
    pub z_test: bool,
    pub z_write: bool,
    pub color_write: bool,
    pub cull: CullMode,
    pub blend: AlphaBlend,
    pub dither: bool,
    pub dither_pattern: DitherPattern,
    pub z_compare: ZCompare,
    pub stipple: bool,
    pub alpha_test: AlphaTest,
    pub alpha_ref: u8,
}

impl Default for RenderMode {
    fn default() -> Self {
        Self::from_reg(RenderModeReg::default())
    }
}

impl RenderMode {
    #[must_use]
    pub fn from_reg(reg: RenderModeReg) -> Self {
        Self {
            gouraud: reg.gouraud(),
            z_test: reg.z_test_en(),
            z_write: reg.z_write_en(),
            color_write: reg.color_write_en(),
            cull: or_fallback(reg.cull_mode(), "CULL_MODE", CullMode::None),
            blend: or_fallback(reg.alpha_blend(), "ALPHA_BLEND", AlphaBlend::Disabled),
            dither: reg.dither_en(),
            dither_pattern: or_fallback(
                reg.dither_pattern(),
                "DITHER_PATTERN",
                DitherPattern::BlueNoise16x16,
            ),
            z_compare: or_fallback(reg.z_compare(), "Z_COMPARE", ZCompare::Always),
            stipple: reg.stipple_en(),
            alpha_test: or_fallback(reg.alpha_test_func(), "ALPHA_TEST_FUNC", AlphaTest::Always),
            alpha_ref: reg.alpha_ref(),
        }
    }

    #[must_use]
    pub fn to_reg(&self) -> RenderModeReg {
        let mut reg = RenderModeReg::default();
        reg.set_gouraud(self.gouraud);
        reg.set_z_test_en(self.z_test);
        reg.set_z_write_en(self.z_write);
        reg.set_color_write_en(self.color_write);
        reg.set_cull_mode(self.cull);
        reg.set_alpha_blend(self.blend);
        reg.set_dither_en(self.dither);
        reg.set_dither_pattern(self.dither_pattern);
        reg.set_z_compare(self.z_compare);
        reg.set_stipple_en(self.stipple);
        reg.set_alpha_test_func(self.alpha_test);
        reg.set_alpha_ref(self.alpha_ref);
        reg
    }
}

/// TEXn_CFG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexConfig {
    pub enabled: bool,
    pub filter: TexFilter,
    pub format: TexFormat,
    pub width_log2: u8,
    pub height_log2: u8,
    pub u_wrap: WrapMode,
    pub v_wrap: WrapMode,
    /// Decoded but only level 0 is ever sampled.
    pub mip_levels: u8,
    pub swizzle: Swizzle,
    /// Byte address.
    pub base: u32,
}

impl Default for TexConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: TexFilter::Nearest,
            format: TexFormat::Rgb565,
            width_log2: 0,
            height_log2: 0,
            u_wrap: WrapMode::Repeat,
            v_wrap: WrapMode::Repeat,
            mip_levels: 0,
            swizzle: Swizzle::Rgba,
            base: 0,
        }
    }
}

impl TexConfig {
    /// # Errors
    /// Rejects dimensions above 1024 texels.
    pub fn from_reg(reg: TexCfgReg) -> Result<Self, ConfigError> {
        let (width_log2, height_log2) = (reg.width_log2(), reg.height_log2());
        if width_log2 > MAX_DIM_LOG2 || height_log2 > MAX_DIM_LOG2 {
            return Err(ConfigError::TextureSize {
                width_log2,
                height_log2,
            });
        }
        let format = match reg.format() {
            Ok(format) => Some(format),
            Err(e) => {
                log::warn!("FORMAT: unassigned code {}, unit disabled", e.bits());
                None
            }
        };
        Ok(Self {
            enabled: reg.enable() && format.is_some(),
            filter: or_fallback(reg.filter(), "FILTER", TexFilter::Nearest),
            format: format.unwrap_or(TexFormat::Rgb565),
            width_log2,
            height_log2,
            u_wrap: or_fallback(reg.u_wrap_mode(), "U_WRAP", WrapMode::Repeat),
            v_wrap: or_fallback(reg.v_wrap_mode(), "V_WRAP", WrapMode::Repeat),
            mip_levels: reg.mip_levels(),
            swizzle: or_fallback(reg.swizzle(), "SWIZZLE", Swizzle::Rgba),
            base: u32::from(reg.base_addr()) * BASE_ADDR_UNIT,
        })
    }

    /// Inverse of [`TexConfig::from_reg`] for register-aligned bases.
    #[must_use]
    pub fn to_reg(&self) -> TexCfgReg {
        let mut reg = TexCfgReg::default();
        reg.set_enable(self.enabled);
        reg.set_filter(self.filter);
        reg.set_format(self.format);
        reg.set_width_log2(self.width_log2);
        reg.set_height_log2(self.height_log2);
        reg.set_u_wrap_mode(self.u_wrap);
        reg.set_v_wrap_mode(self.v_wrap);
        reg.set_mip_levels(self.mip_levels);
        reg.set_swizzle(self.swizzle);
        reg.set_base_addr((self.base / BASE_ADDR_UNIT) as u16);
        reg
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        1 << self.width_log2
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        1 << self.height_log2
    }

    /// True if this texture's texels live inside `surface`.
    #[must_use]
    pub fn aliases(&self, surface: &Surface) -> bool {
        let len = self.width() * self.height() / 16 * self.format.block_bytes();
        surface.overlaps(self.base, len.max(self.format.block_bytes()))
    }
}

/// One operand of the combiner equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSource {
    Combined,
    Tex0,
    Tex1,
    Shade0,
    Shade1,
    Const0,
    Const1,
    One,
    Zero,
    Tex0Alpha,
    Tex1Alpha,
    Shade0Alpha,
    Shade1Alpha,
    Const0Alpha,
    CombinedAlpha,
}

impl ColorSource {
    /// Reserved codes read as zero.
    #[must_use]
    pub fn from_cc(src: Result<CcSource, UnknownVariant<u8>>) -> Self {
        match src {
            Ok(CcSource::Combined) => Self::Combined,
            Ok(CcSource::Tex0) => Self::Tex0,
            Ok(CcSource::Tex1) => Self::Tex1,
            Ok(CcSource::Shade0) => Self::Shade0,
            Ok(CcSource::Const0) => Self::Const0,
            Ok(CcSource::Const1) => Self::Const1,
            Ok(CcSource::One) => Self::One,
            Ok(CcSource::Shade1) => Self::Shade1,
            _ => Self::Zero,
        }
    }

    /// Reserved codes read as zero.
    #[must_use]
    pub fn from_rgb_c(src: Result<CcRgbCSource, UnknownVariant<u8>>) -> Self {
        match src {
            Ok(CcRgbCSource::Combined) => Self::Combined,
            Ok(CcRgbCSource::Tex0) => Self::Tex0,
            Ok(CcRgbCSource::Tex1) => Self::Tex1,
            Ok(CcRgbCSource::Shade0) => Self::Shade0,
            Ok(CcRgbCSource::Const0) => Self::Const0,
            Ok(CcRgbCSource::Const1) => Self::Const1,
            Ok(CcRgbCSource::One) => Self::One,
            Ok(CcRgbCSource::Tex0Alpha) => Self::Tex0Alpha,
            Ok(CcRgbCSource::Tex1Alpha) => Self::Tex1Alpha,
            Ok(CcRgbCSource::Shade0Alpha) => Self::Shade0Alpha,
            Ok(CcRgbCSource::Const0Alpha) => Self::Const0Alpha,
            Ok(CcRgbCSource::CombinedAlpha) => Self::CombinedAlpha,
            Ok(CcRgbCSource::Shade1) => Self::Shade1,
            Ok(CcRgbCSource::Shade1Alpha) => Self::Shade1Alpha,
            _ => Self::Zero,
        }
    }
}

/// `(a - b) * c + d`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equation {
    pub a: ColorSource,
    pub b: ColorSource,
    pub c: ColorSource,
    pub d: ColorSource,
}

impl Equation {
    #[must_use]
    pub const fn new(a: ColorSource, b: ColorSource, c: ColorSource, d: ColorSource) -> Self {
        Self { a, b, c, d }
    }

    /// `(COMBINED - ZERO) * ONE + ZERO`
    pub const PASS_THROUGH: Self = Self::new(
        ColorSource::Combined,
        ColorSource::Zero,
        ColorSource::One,
        ColorSource::Zero,
    );

    /// `(TEX0 - ZERO) * SHADE0 + ZERO`
    pub const MODULATE: Self = Self::new(
        ColorSource::Tex0,
        ColorSource::Zero,
        ColorSource::Shade0,
        ColorSource::Zero,
    );
}

/// One combiner stage: independent RGB and alpha equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinerStage {
    pub rgb: Equation,
    pub alpha: Equation,
}

/// CC_MODE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinerMode {
    pub stages: [CombinerStage; 2],
}

impl Default for CombinerMode {
    fn default() -> Self {
        Self::from_reg(CcModeReg::default())
    }
}

impl CombinerMode {
    #[must_use]
    pub fn from_reg(reg: CcModeReg) -> Self {
        let s = ColorSource::from_cc;
        let stage0 = CombinerStage {
            rgb: Equation::new(
                s(reg.c0_rgb_a()),
                s(reg.c0_rgb_b()),
                ColorSource::from_rgb_c(reg.c0_rgb_c()),
                s(reg.c0_rgb_d()),
            ),
            alpha: Equation::new(
                s(reg.c0_alpha_a()),
                s(reg.c0_alpha_b()),
                s(reg.c0_alpha_c()),
                s(reg.c0_alpha_d()),
            ),
        };
        let stage1 = CombinerStage {
            rgb: Equation::new(
                s(reg.c1_rgb_a()),
                s(reg.c1_rgb_b()),
                ColorSource::from_rgb_c(reg.c1_rgb_c()),
                s(reg.c1_rgb_d()),
            ),
            alpha: Equation::new(
                s(reg.c1_alpha_a()),
                s(reg.c1_alpha_b()),
                s(reg.c1_alpha_c()),
                s(reg.c1_alpha_d()),
            ),
        };
        Self {
            stages: [stage0, stage1],
        }
    }

    /// Single-stage mode: `eq` in stage 0 for both RGB and alpha, stage 1
    /// passes through.
    #[must_use]
    pub const fn single(eq: Equation) -> Self {
        let pass = CombinerStage {
            rgb: Equation::PASS_THROUGH,
            alpha: Equation::PASS_THROUGH,
        };
        Self {
            stages: [CombinerStage { rgb: eq, alpha: eq }, pass],
        }
    }
}

/// CONST_COLOR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstColors {
    pub const0: Rgba8,
    pub const1: Rgba8,
}

impl ConstColors {
    #[must_use]
    pub fn from_reg(reg: ConstColorReg) -> Self {
        Self {
            const0: Rgba8::from_packed(reg.const0()),
            const1: Rgba8::from_packed(reg.const1()),
        }
    }
}

/// Z_RANGE, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZRange {
    pub min: u16,
    pub max: u16,
}

impl Default for ZRange {
    fn default() -> Self {
        Self::from_reg(ZRangeReg::default())
    }
}

impl ZRange {
    #[must_use]
    pub fn from_reg(reg: ZRangeReg) -> Self {
        Self {
            min: reg.z_range_min(),
            max: reg.z_range_max(),
        }
    }

    #[must_use]
    pub const fn contains(&self, z: u16) -> bool {
        z >= self.min && z <= self.max
    }
}

/// STIPPLE_PATTERN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StipplePattern(pub u64);

impl Default for StipplePattern {
    fn default() -> Self {
        Self(StipplePatternReg::default().pattern())
    }
}

impl StipplePattern {
    #[must_use]
    pub const fn bit(&self, x: u32, y: u32) -> bool {
        (self.0 >> ((y & 7) * 8 + (x & 7))) & 1 != 0
    }
}

/// FB_CONFIG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbConfig {
    pub color: Surface,
    pub z: Surface,
}

impl FbConfig {
    /// # Errors
    /// Rejects dimensions outside 4..=1024.
    pub fn from_reg(reg: FbConfigReg) -> Result<Self, ConfigError> {
        let (w, h) = (reg.width_log2(), reg.height_log2());
        Ok(Self {
            color: Surface::new(u32::from(reg.color_base()) * BASE_ADDR_UNIT, w, h)?,
            z: Surface::new(u32::from(reg.z_base()) * BASE_ADDR_UNIT, w, h)?,
        })
    }
}

/// FB_CONTROL scissor rectangle, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scissor {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for Scissor {
    fn default() -> Self {
        Self::from_reg(FbControlReg::default())
    }
}

impl Scissor {
    /// Widest extent a 10-bit field can express.
    pub const MAX_EXTENT: u32 = 1024;

    /// Width and height fields hold 1..=1024, with 1024 stored as 0.
    #[must_use]
    pub fn from_reg(reg: FbControlReg) -> Self {
        let extent = |raw: u16| match u32::from(raw) {
            0 => Self::MAX_EXTENT,
            n => n,
        };
        Self {
            x: u32::from(reg.scissor_x()),
            y: u32::from(reg.scissor_y()),
            width: extent(reg.scissor_width()),
            height: extent(reg.scissor_height()),
        }
    }

    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// FB_DISPLAY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayConfig {
    /// Byte address.
    pub base: u32,
    pub width_log2: u8,
    pub line_double: bool,
}

impl DisplayConfig {
    #[must_use]
    pub fn from_reg(reg: FbDisplayReg) -> Self {
        Self {
            base: u32::from(reg.fb_addr()) * BASE_ADDR_UNIT,
            width_log2: reg.fb_width_log2(),
            line_double: reg.line_double(),
        }
    }
}

/// MEM_FILL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemFill {
    /// Byte address.
    pub base: u32,
    pub value: u16,
    /// 16-bit words.
    pub count: u32,
}

impl MemFill {
    #[must_use]
    pub fn from_reg(reg: MemFillReg) -> Self {
        Self {
            base: u32::from(reg.fill_base()) * BASE_ADDR_UNIT,
            value: reg.fill_value(),
            count: reg.fill_count(),
        }
    }
}

/// All render state the pipeline reads. `fb` is `None` until FB_CONFIG is
/// written.
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub mode: RenderMode,
    pub tex: [TexConfig; 2],
    pub combiner: CombinerMode,
    pub consts: ConstColors,
    pub z_range: ZRange,
    pub stipple: StipplePattern,
    pub fb: Option<FbConfig>,
    pub scissor: Scissor,
}
