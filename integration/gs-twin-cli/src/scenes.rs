//! Reference scenes, expressed purely as register writes.

use clap::ValueEnum;
use gs_twin::registers::{addr, CcModeReg, CullMode, RenderModeReg, Swizzle, ZCompare};
use gs_twin::state::TexConfig;
use gs_twin::{Command, GsTwin, Kick, Rgba8, Surface, TwinError, Vertex};

pub const COLOR_BASE: u32 = 0;
pub const Z_BASE: u32 = 0x10_0000;
const TEX_BASE: u32 = 0x30_0000;

/// 640x480 content in a 1024x512 surface.
const WIDTH_LOG2: u8 = 10;
const HEIGHT_LOG2: u8 = 9;

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
const GREEN: Rgba8 = Rgba8::new(0, 255, 0, 255);
const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scene {
    /// Single flat-shaded red triangle
    Flat,
    /// Red/blue/green Gouraud triangle
    Gouraud,
    /// Two overlapping triangles with Z test, far one first
    Depth,
    /// Same as `depth` with the near triangle submitted first
    DepthReversed,
    /// Checkerboard texture modulated by white
    Textured,
    /// Checkerboard sampled through the RRR1 swizzle
    TexturedGray,
}

/// Bind the standard target, clear it, then submit every triangle of
/// `scene`. The frame is not ended.
///
/// # Errors
/// Anything the twin rejects.
pub fn render(twin: &mut GsTwin, scene: Scene) -> Result<(), TwinError> {
    let words = 1u32 << (WIDTH_LOG2 + HEIGHT_LOG2);
    twin.run([
        Command::fb_config(COLOR_BASE, Z_BASE, WIDTH_LOG2, HEIGHT_LOG2),
        Command::scissor(0, 0, 640, 480),
        Command::mem_fill(COLOR_BASE, 0, words),
        Command::mem_fill(Z_BASE, 0xFFFF, words),
    ])?;

    match scene {
        Scene::Flat => {
            twin.execute(mode(|_| {}))?;
            triangle(twin, corners([RED; 3]))
        }
        Scene::Gouraud => {
            twin.execute(mode(|m| m.set_gouraud(true)))?;
            triangle(twin, corners([RED, BLUE, GREEN]))
        }
        Scene::Depth | Scene::DepthReversed => {
            twin.execute(mode(|m| {
                m.set_z_test_en(true);
                m.set_z_write_en(true);
                m.set_z_compare(ZCompare::Lequal);
            }))?;
            let far = [
                Vertex::at(100, 50, 0x8000, RED),
                Vertex::at(500, 50, 0x8000, RED),
                Vertex::at(100, 450, 0x8000, RED),
            ];
            let near = [
                Vertex::at(200, 100, 0x4000, BLUE),
                Vertex::at(600, 300, 0x4000, BLUE),
                Vertex::at(150, 400, 0x4000, BLUE),
            ];
            let order = if scene == Scene::Depth {
                [far, near]
            } else {
                [near, far]
            };
            order.into_iter().try_for_each(|v| triangle(twin, v))
        }
        Scene::Textured | Scene::TexturedGray => {
            let swizzle = if scene == Scene::TexturedGray {
                Swizzle::Rrr1
            } else {
                Swizzle::Rgba
            };
            checker_texture(twin, swizzle)?;
            twin.run([
                mode(|_| {}),
                Command::new(addr::CC_MODE, CcModeReg::default().to_raw()),
            ])?;
            // 8x8-pixel texels: the checker repeats 4x3 times across 512x384.
            let (x0, y0, x1, y1) = (64, 48, 576, 432);
            twin.run([
                Command::color(Rgba8::WHITE, Rgba8::TRANSPARENT),
                Command::uv([0, 0], [0, 0]),
                Command::vertex(Kick::None, &Vertex::at(x0, y0, 0, Rgba8::WHITE)),
                Command::uv([4 << 12, 3 << 12], [0, 0]),
                Command::vertex(Kick::Rect, &Vertex::at(x1, y1, 0, Rgba8::WHITE)),
            ])
        }
    }
}

fn corners(colors: [Rgba8; 3]) -> [Vertex; 3] {
    [
        Vertex::at(320, 40, 0, colors[0]),
        Vertex::at(560, 400, 0, colors[1]),
        Vertex::at(80, 400, 0, colors[2]),
    ]
}

fn mode(f: impl FnOnce(&mut RenderModeReg)) -> Command {
    let mut reg = RenderModeReg::default();
    reg.set_color_write_en(true);
    reg.set_cull_mode(CullMode::None);
    f(&mut reg);
    Command::render_mode(reg)
}

fn triangle(twin: &mut GsTwin, v: [Vertex; 3]) -> Result<(), TwinError> {
    twin.run(Command::full_vertex(Kick::None, &v[0]))?;
    twin.run(Command::full_vertex(Kick::None, &v[1]))?;
    twin.run(Command::full_vertex(Kick::Tri012, &v[2]))
}

/// Upload a 16x16 red/white RGB565 checker and bind it to TEX0.
fn checker_texture(twin: &mut GsTwin, swizzle: Swizzle) -> Result<(), TwinError> {
    let tex = Surface::new(TEX_BASE, 4, 4)?;
    for y in 0..16 {
        for x in 0..16 {
            let texel = if (x ^ y) & 1 == 0 { 0xF800 } else { 0xFFFF };
            twin.memory_mut().write_word(tex.word_address(x, y), texel);
        }
    }
    let cfg = TexConfig {
        enabled: true,
        width_log2: 4,
        height_log2: 4,
        mip_levels: 1,
        swizzle,
        base: TEX_BASE,
        ..TexConfig::default()
    };
    twin.write_register(addr::TEX0_CFG, cfg.to_reg().to_raw())
}
