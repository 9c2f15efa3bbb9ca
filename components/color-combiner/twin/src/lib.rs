//! Two-stage color combiner.
//!
//! Each stage evaluates `(A - B) * C + D` once over the RGB channels and
//! once over alpha. The product is taken at full width, shifted back to
//! Q4.12 and the sum saturates, so results above 1.0 survive into stage 1
//! and are only clamped when the color is stored.
//!
//! In stage 0 the COMBINED operand reads as zero.

use gs_twin_core::state::{ColorSource, CombinerMode, CombinerStage, ConstColors, Equation};
use gs_twin_core::Color;
use qfixed::Q4_12;

/// Per-fragment operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinerInputs {
    pub tex0: Color,
    pub tex1: Color,
    pub shade0: Color,
    pub shade1: Color,
    pub const0: Color,
    pub const1: Color,
}

impl CombinerInputs {
    #[must_use]
    pub fn new(tex: [Color; 2], shade: [Color; 2], consts: &ConstColors) -> Self {
        Self {
            tex0: tex[0],
            tex1: tex[1],
            shade0: shade[0],
            shade1: shade[1],
            const0: consts.const0.into(),
            const1: consts.const1.into(),
        }
    }

    fn operand(&self, src: ColorSource, combined: Color) -> Color {
        match src {
            ColorSource::Combined => combined,
            ColorSource::Tex0 => self.tex0,
            ColorSource::Tex1 => self.tex1,
            ColorSource::Shade0 => self.shade0,
            ColorSource::Shade1 => self.shade1,
            ColorSource::Const0 => self.const0,
            ColorSource::Const1 => self.const1,
            ColorSource::One => Color::ONE,
            ColorSource::Zero => Color::ZERO,
            ColorSource::Tex0Alpha => self.tex0.alpha_broadcast(),
            ColorSource::Tex1Alpha => self.tex1.alpha_broadcast(),
            ColorSource::Shade0Alpha => self.shade0.alpha_broadcast(),
            ColorSource::Shade1Alpha => self.shade1.alpha_broadcast(),
            ColorSource::Const0Alpha => self.const0.alpha_broadcast(),
            ColorSource::CombinedAlpha => combined.alpha_broadcast(),
        }
    }
}

/// `((a - b) * c >> 12) + d`, saturating.
#[must_use]
pub fn equation(a: Q4_12, b: Q4_12, c: Q4_12, d: Q4_12) -> Q4_12 {
    let diff = i32::from(a.to_bits()) - i32::from(b.to_bits());
    let scaled = (diff * i32::from(c.to_bits())) >> 12;
    Q4_12::from_wide(scaled + i32::from(d.to_bits()))
}

fn eval(eq: &Equation, inputs: &CombinerInputs, combined: Color) -> Color {
    let op = |src| inputs.operand(src, combined);
    let (a, b, c, d) = (op(eq.a), op(eq.b), op(eq.c), op(eq.d));
    Color::new(
        equation(a.r, b.r, c.r, d.r),
        equation(a.g, b.g, c.g, d.g),
        equation(a.b, b.b, c.b, d.b),
        equation(a.a, b.a, c.a, d.a),
    )
}

/// One stage. `combined` is the previous stage's output.
#[must_use]
pub fn eval_stage(stage: &CombinerStage, inputs: &CombinerInputs, combined: Color) -> Color {
    let rgb = eval(&stage.rgb, inputs, combined);
    let alpha = eval(&stage.alpha, inputs, combined);
    Color { a: alpha.a, ..rgb }
}

/// Both stages.
#[must_use]
pub fn combine(mode: &CombinerMode, inputs: &CombinerInputs) -> Color {
    let stage0 = eval_stage(&mode.stages[0], inputs, Color::ZERO);
    eval_stage(&mode.stages[1], inputs, stage0)
}
