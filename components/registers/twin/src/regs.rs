//! Register layouts.

use crate::encode::UnknownVariant;
use crate::enums::{
    AlphaBlend, AlphaTest, CcRgbCSource, CcSource, CullMode, DitherPattern, Swizzle, TexFilter,
    TexFormat, WrapMode, ZCompare,
};

register! {
    /// COLOR: two per-vertex RGBA8 colors, R in the low byte.
    pub struct ColorReg = 0x0 {
        /// Diffuse.
        COLOR0 [0, 32] => color0, set_color0: value u32;
        /// Specular.
        COLOR1 [32, 32] => color1, set_color1: value u32;
    }
}

register! {
    /// UV0_UV1: perspective-divided texture coordinates, signed Q4.12.
    pub struct Uv0Uv1Reg = 0x0 {
        UV0_UQ [0, 16] => uv0_uq, set_uv0_uq: value u16;
        UV0_VQ [16, 16] => uv0_vq, set_uv0_vq: value u16;
        UV1_UQ [32, 16] => uv1_uq, set_uv1_uq: value u16;
        UV1_VQ [48, 16] => uv1_vq, set_uv1_vq: value u16;
    }
}

register! {
    /// AREA_SETUP: INV_AREA is the UQ0.16 reciprocal of
    /// `(2*area) >> AREA_SHIFT`.
    pub struct AreaSetupReg = 0x0 {
        INV_AREA [0, 16] => inv_area, set_inv_area: value u16;
        AREA_SHIFT [16, 4] => area_shift, set_area_shift: value u8;
    }
}

register! {
    /// VERTEX_*: position and 1/W. Origin is the center of the top-left
    /// pixel, X right, Y down, S12.4; integer coordinates are pixel
    /// centers. KICK_RECT uses this vertex and the previous one as
    /// opposite rectangle corners.
    pub struct VertexReg = 0x0 {
        X [0, 16] => x, set_x: value u16;
        Y [16, 16] => y, set_y: value u16;
        Z [32, 16] => z, set_z: value u16;
        /// 1/W, UQ1.15.
        Q [48, 16] => q, set_q: value u16;
    }
}

register! {
    /// TEXn_CFG: sampler configuration. BASE_ADDR is in 512-byte units.
    /// Any write invalidates that unit's texture cache.
    pub struct TexCfgReg = 0x0 {
        ENABLE [0, 1] => enable, set_enable: value bool;
        FILTER [2, 2] => filter, set_filter: variant TexFilter;
        FORMAT [4, 3] => format, set_format: variant TexFormat;
        WIDTH_LOG2 [8, 4] => width_log2, set_width_log2: value u8;
        HEIGHT_LOG2 [12, 4] => height_log2, set_height_log2: value u8;
        U_WRAP [16, 2] => u_wrap, set_u_wrap: value u8;
        V_WRAP [18, 2] => v_wrap, set_v_wrap: value u8;
        MIP_LEVELS [20, 4] => mip_levels, set_mip_levels: value u8;
        SWIZZLE [24, 4] => swizzle, set_swizzle: variant Swizzle;
        U_WRAP_HI [28, 1] => u_wrap_hi, set_u_wrap_hi: value bool;
        V_WRAP_HI [29, 1] => v_wrap_hi, set_v_wrap_hi: value bool;
        BASE_ADDR [32, 16] => base_addr, set_base_addr: value u16;
    }
}

impl TexCfgReg {
    /// Three-bit U wrap code `U_WRAP_HI:U_WRAP`.
    ///
    /// # Errors
    /// Returns the code if it names no wrap mode.
    pub fn u_wrap_mode(&self) -> Result<WrapMode, UnknownVariant<u8>> {
        WrapMode::from_bits(self.u_wrap() | (u8::from(self.u_wrap_hi()) << 2))
    }

    /// Three-bit V wrap code `V_WRAP_HI:V_WRAP`.
    ///
    /// # Errors
    /// Returns the code if it names no wrap mode.
    pub fn v_wrap_mode(&self) -> Result<WrapMode, UnknownVariant<u8>> {
        WrapMode::from_bits(self.v_wrap() | (u8::from(self.v_wrap_hi()) << 2))
    }

    pub fn set_u_wrap_mode(&mut self, mode: WrapMode) {
        self.set_u_wrap(mode.bits() & 0x3);
        self.set_u_wrap_hi(mode.bits() & 0x4 != 0);
    }

    pub fn set_v_wrap_mode(&mut self, mode: WrapMode) {
        self.set_v_wrap(mode.bits() & 0x3);
        self.set_v_wrap_hi(mode.bits() & 0x4 != 0);
    }
}

register! {
    /// CC_MODE: `(A-B)*C+D` per stage, RGB and alpha independent. Stage 0
    /// in the low word, stage 1 in the high word. Resets to
    /// `TEX0*SHADE0` with a pass-through second stage.
    pub struct CcModeReg = 0x7670_7670_7371_7371 {
        C0_RGB_A [0, 4] => c0_rgb_a, set_c0_rgb_a: variant CcSource;
        C0_RGB_B [4, 4] => c0_rgb_b, set_c0_rgb_b: variant CcSource;
        C0_RGB_C [8, 4] => c0_rgb_c, set_c0_rgb_c: variant CcRgbCSource;
        C0_RGB_D [12, 4] => c0_rgb_d, set_c0_rgb_d: variant CcSource;
        C0_ALPHA_A [16, 4] => c0_alpha_a, set_c0_alpha_a: variant CcSource;
        C0_ALPHA_B [20, 4] => c0_alpha_b, set_c0_alpha_b: variant CcSource;
        C0_ALPHA_C [24, 4] => c0_alpha_c, set_c0_alpha_c: variant CcSource;
        C0_ALPHA_D [28, 4] => c0_alpha_d, set_c0_alpha_d: variant CcSource;
        C1_RGB_A [32, 4] => c1_rgb_a, set_c1_rgb_a: variant CcSource;
        C1_RGB_B [36, 4] => c1_rgb_b, set_c1_rgb_b: variant CcSource;
        C1_RGB_C [40, 4] => c1_rgb_c, set_c1_rgb_c: variant CcRgbCSource;
        C1_RGB_D [44, 4] => c1_rgb_d, set_c1_rgb_d: variant CcSource;
        C1_ALPHA_A [48, 4] => c1_alpha_a, set_c1_alpha_a: variant CcSource;
        C1_ALPHA_B [52, 4] => c1_alpha_b, set_c1_alpha_b: variant CcSource;
        C1_ALPHA_C [56, 4] => c1_alpha_c, set_c1_alpha_c: variant CcSource;
        C1_ALPHA_D [60, 4] => c1_alpha_d, set_c1_alpha_d: variant CcSource;
    }
}

register! {
    /// CONST_COLOR: two per-draw RGBA8 constants.
    pub struct ConstColorReg = 0x0 {
        CONST0 [0, 32] => const0, set_const0: value u32;
        CONST1 [32, 32] => const1, set_const1: value u32;
    }
}

register! {
    /// RENDER_MODE: unified per-draw rendering state.
    pub struct RenderModeReg = 0x0 {
        GOURAUD [0, 1] => gouraud, set_gouraud: value bool;
        Z_TEST_EN [2, 1] => z_test_en, set_z_test_en: value bool;
        Z_WRITE_EN [3, 1] => z_write_en, set_z_write_en: value bool;
        COLOR_WRITE_EN [4, 1] => color_write_en, set_color_write_en: value bool;
        CULL_MODE [5, 2] => cull_mode, set_cull_mode: variant CullMode;
        ALPHA_BLEND [7, 3] => alpha_blend, set_alpha_blend: variant AlphaBlend;
        DITHER_EN [10, 1] => dither_en, set_dither_en: value bool;
        DITHER_PATTERN [11, 2] => dither_pattern, set_dither_pattern: variant DitherPattern;
        Z_COMPARE [13, 3] => z_compare, set_z_compare: variant ZCompare;
        STIPPLE_EN [16, 1] => stipple_en, set_stipple_en: value bool;
        ALPHA_TEST_FUNC [17, 2] => alpha_test_func, set_alpha_test_func: variant AlphaTest;
        ALPHA_REF [19, 8] => alpha_ref, set_alpha_ref: value u8;
    }
}

register! {
    /// Z_RANGE: depth-range clip window, inclusive.
    pub struct ZRangeReg = 0xFFFF_0000 {
        Z_RANGE_MIN [0, 16] => z_range_min, set_z_range_min: value u16;
        Z_RANGE_MAX [16, 16] => z_range_max, set_z_range_max: value u16;
    }
}

register! {
    /// STIPPLE_PATTERN: 8x8 mask, bit `(y & 7) * 8 + (x & 7)`, 1 = pass.
    pub struct StipplePatternReg = 0xFFFF_FFFF_FFFF_FFFF {
        PATTERN [0, 64] => pattern, set_pattern: value u64;
    }
}

register! {
    /// FB_CONFIG: render target. Bases are in 512-byte units.
    pub struct FbConfigReg = 0x0 {
        COLOR_BASE [0, 16] => color_base, set_color_base: value u16;
        Z_BASE [16, 16] => z_base, set_z_base: value u16;
        WIDTH_LOG2 [32, 4] => width_log2, set_width_log2: value u8;
        HEIGHT_LOG2 [36, 4] => height_log2, set_height_log2: value u8;
    }
}

register! {
    /// FB_DISPLAY: scanout source.
    pub struct FbDisplayReg = 0x0 {
        COLOR_GRADE_ENABLE [0, 1] => color_grade_enable, set_color_grade_enable: value bool;
        LINE_DOUBLE [1, 1] => line_double, set_line_double: value bool;
        LUT_ADDR [16, 16] => lut_addr, set_lut_addr: value u16;
        FB_ADDR [32, 16] => fb_addr, set_fb_addr: value u16;
        FB_WIDTH_LOG2 [48, 4] => fb_width_log2, set_fb_width_log2: value u8;
    }
}

register! {
    /// FB_CONTROL: scissor rectangle. Width and height run 1..=1024 with
    /// 1024 encoded as 0, so the reset value covers the whole surface.
    pub struct FbControlReg = 0x0 {
        SCISSOR_X [0, 10] => scissor_x, set_scissor_x: value u16;
        SCISSOR_Y [10, 10] => scissor_y, set_scissor_y: value u16;
        SCISSOR_WIDTH [20, 10] => scissor_width, set_scissor_width: value u16;
        SCISSOR_HEIGHT [30, 10] => scissor_height, set_scissor_height: value u16;
    }
}

register! {
    /// MEM_FILL: write FILL_VALUE to FILL_COUNT consecutive 16-bit words
    /// starting at FILL_BASE * 512.
    pub struct MemFillReg = 0x0 {
        FILL_BASE [0, 16] => fill_base, set_fill_base: value u16;
        FILL_VALUE [16, 16] => fill_value, set_fill_value: value u16;
        FILL_COUNT [32, 20] => fill_count, set_fill_count: value u32;
    }
}

register! {
    /// ID: read-only device identification.
    pub struct IdReg = 0x0A00_6702 {
        DEVICE_ID [0, 16] => device_id, set_device_id: value u16;
        VERSION [16, 16] => version, set_version: value u16;
    }
}
