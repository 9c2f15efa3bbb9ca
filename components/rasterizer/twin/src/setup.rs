//! Triangle setup.
//!
//! Coordinates are Q12.4 with integer values at pixel centers, Y down. For
//! the edge from `a` to `b`
//!
//! ```text
//! E(x, y) = (ya - yb) * x + (xb - xa) * y + (xa * yb - xb * ya)
//! ```
//!
//! evaluated in 1/256-pixel² units. After winding normalization all three
//! edges are non-negative inside the triangle, and the doubled signed area
//! is `E01(v2)`.
//!
//! Attributes are interpolated from planes with 16 fractional bits. The
//! plane gradients come from the barycentric solution scaled by a 16-bit
//! reciprocal of the shifted area, as the hardware computes them:
//!
//! ```text
//! n        = area2 >> shift
//! inv_area = round(65536 / n)
//! df/dx    = ((f1 - f0) * 16 * A20 + (f2 - f0) * 16 * A01) * inv_area >> shift
//! ```

use gpu_registers::{AreaSetupReg, CullMode};
use gs_twin_core::state::Scissor;
use gs_twin_core::{Fragment, Rgba8, TexCoord, Vertex};
use qfixed::Uq0_16;

/// Largest AREA_SHIFT the register can hold.
pub const MAX_AREA_SHIFT: u32 = 15;

/// Significant bits kept in `area2 >> shift`.
const AREA_PRECISION_BITS: u32 = 9;

/// Interpolated attribute planes.
pub const ATTR_COUNT: usize = 14;
const SHADE0: usize = 0;
const SHADE1: usize = 4;
const UV0: usize = 8;
const UV1: usize = 10;
const Q: usize = 12;
const Z: usize = 13;

/// Why a triangle produced no fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejected {
    /// Zero area.
    Degenerate,
    /// Wound against the cull mode.
    Backface,
    /// Bounding box empty after scissor and surface clamp.
    Clipped,
}

/// Per-triangle state that does not come from the vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupParams {
    pub cull: CullMode,
    pub gouraud: bool,
    pub scissor: Scissor,
    pub surface_width: u32,
    pub surface_height: u32,
}

/// One edge function with its fill-rule bias folded into `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: i64,
    pub b: i64,
    pub c: i64,
    /// True for top and left edges, which own the pixels exactly on them.
    pub top_left: bool,
}

impl Edge {
    #[must_use]
    pub fn between(va: &Vertex, vb: &Vertex) -> Self {
        let (xa, ya) = (va.x.raw(), va.y.raw());
        let (xb, yb) = (vb.x.raw(), vb.y.raw());
        let a = ya - yb;
        let b = xb - xa;
        let top_left = a > 0 || (a == 0 && b > 0);
        Self {
            a,
            b,
            c: xa * yb - xb * ya - i64::from(!top_left),
            top_left,
        }
    }

    /// Unbiased edge value at a Q12.4 point.
    #[must_use]
    pub fn eval_raw(&self, x: i64, y: i64) -> i64 {
        self.a * x + self.b * y + self.c + i64::from(!self.top_left)
    }

    /// Biased value at the center of pixel (px, py). Non-negative means the
    /// pixel is on the inner side under the fill rule.
    #[must_use]
    pub fn at_pixel(&self, px: i32, py: i32) -> i64 {
        self.a * 16 * i64::from(px) + self.b * 16 * i64::from(py) + self.c
    }

    /// Change per pixel step in X.
    #[must_use]
    pub fn step_x(&self) -> i64 {
        self.a * 16
    }

    /// Change per pixel step in Y.
    #[must_use]
    pub fn step_y(&self) -> i64 {
        self.b * 16
    }
}

/// Inclusive pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BBox {
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

/// An attribute as an affine function of pixel position, 16 fractional
/// bits, anchored at the bounding box origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plane {
    pub start: i64,
    pub dx: i64,
    pub dy: i64,
}

impl Plane {
    const fn constant(v: i64) -> Self {
        Self {
            start: v << 16,
            dx: 0,
            dy: 0,
        }
    }

    /// Value `ox`, `oy` pixels from the anchor, rounded to an integer.
    #[must_use]
    pub fn at(&self, ox: i64, oy: i64) -> i64 {
        (self.start + self.dx * ox + self.dy * oy + 0x8000) >> 16
    }
}

/// Everything the rasterizer needs for one triangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleSetup {
    /// Vertices after winding normalization.
    pub vertices: [Vertex; 3],
    /// E01, E12, E20.
    pub edges: [Edge; 3],
    pub bbox: BBox,
    /// Doubled signed area after normalization, always positive.
    pub area2: i64,
    pub area_shift: u32,
    pub inv_area: Uq0_16,
    /// Whether v1 and v2 were swapped to make the winding positive.
    pub flipped: bool,
    pub planes: [Plane; ATTR_COUNT],
}

fn attr_values(v: &Vertex) -> [i64; ATTR_COUNT] {
    let c0 = v.color0.to_array();
    let c1 = v.color1.to_array();
    let mut out = [0; ATTR_COUNT];
    for i in 0..4 {
        out[SHADE0 + i] = i64::from(c0[i]);
        out[SHADE1 + i] = i64::from(c1[i]);
    }
    out[UV0] = i64::from(v.uv0[0].to_bits());
    out[UV0 + 1] = i64::from(v.uv0[1].to_bits());
    out[UV1] = i64::from(v.uv1[0].to_bits());
    out[UV1 + 1] = i64::from(v.uv1[1].to_bits());
    out[Q] = i64::from(v.q.to_bits());
    out[Z] = i64::from(v.z);
    out
}

fn floor_log2(v: u64) -> u32 {
    63 - v.max(1).leading_zeros()
}

/// Shift applied to `area2` before taking its reciprocal.
///
/// The largest edge step still keeps at least one unit after the shift, and
/// the shifted area keeps [`AREA_PRECISION_BITS`] significant bits.
#[must_use]
pub fn area_shift(area2: i64, edges: &[Edge; 3]) -> u32 {
    let max_step = edges
        .iter()
        .flat_map(|e| [e.step_x().unsigned_abs(), e.step_y().unsigned_abs()])
        .max()
        .unwrap_or(0);
    let area = area2.unsigned_abs();
    let by_area = (floor_log2(area) + 1).saturating_sub(AREA_PRECISION_BITS);
    floor_log2(max_step).min(by_area).min(MAX_AREA_SHIFT)
}

/// Run setup on three vertices in submission order. `v[0]` is the
/// provoking vertex for flat shading.
///
/// # Errors
/// Returns why the triangle emits no fragments.
pub fn setup_triangle(v: [Vertex; 3], params: &SetupParams) -> Result<TriangleSetup, Rejected> {
    let signed = Edge::between(&v[0], &v[1]).eval_raw(v[2].x.raw(), v[2].y.raw());
    if signed == 0 {
        return Err(Rejected::Degenerate);
    }
    let flip = match params.cull {
        CullMode::None => signed < 0,
        CullMode::Cw if signed < 0 => return Err(Rejected::Backface),
        CullMode::Cw => false,
        CullMode::Ccw if signed > 0 => return Err(Rejected::Backface),
        CullMode::Ccw => true,
    };
    let vertices = if flip { [v[0], v[2], v[1]] } else { v };
    let edges = [
        Edge::between(&vertices[0], &vertices[1]),
        Edge::between(&vertices[1], &vertices[2]),
        Edge::between(&vertices[2], &vertices[0]),
    ];
    let area2 = signed.abs();

    let bbox = clip_bbox(&vertices, params).ok_or(Rejected::Clipped)?;

    let area_shift = area_shift(area2, &edges);
    let inv_area = Uq0_16::reciprocal_of((area2 >> area_shift) as u64);
    let inv = i128::from(inv_area.to_bits());

    let f: [[i64; ATTR_COUNT]; 3] = [
        attr_values(&vertices[0]),
        attr_values(&vertices[1]),
        attr_values(&vertices[2]),
    ];
    let (e01, e20) = (&edges[0], &edges[2]);
    let ox = i128::from(16 * i64::from(bbox.x0) - vertices[0].x.raw());
    let oy = i128::from(16 * i64::from(bbox.y0) - vertices[0].y.raw());

    let mut planes = [Plane::default(); ATTR_COUNT];
    for (i, plane) in planes.iter_mut().enumerate() {
        let is_color = i < UV0;
        if is_color && !params.gouraud {
            *plane = Plane::constant(f[0][i]);
            continue;
        }
        let d1 = i128::from(f[1][i] - f[0][i]);
        let d2 = i128::from(f[2][i] - f[0][i]);
        let num_x = d1 * 16 * i128::from(e20.a) + d2 * 16 * i128::from(e01.a);
        let num_y = d1 * 16 * i128::from(e20.b) + d2 * 16 * i128::from(e01.b);
        let dx = (num_x * inv) >> area_shift;
        let dy = (num_y * inv) >> area_shift;
        let start = (i128::from(f[0][i]) << 16) + ((dx * ox + dy * oy) >> 4);
        *plane = Plane {
            start: start as i64,
            dx: dx as i64,
            dy: dy as i64,
        };
    }

    log::debug!(
        "setup: area2={area2} shift={area_shift} inv_area={:#06x} bbox=({},{})..=({},{}){}",
        inv_area.to_bits(),
        bbox.x0,
        bbox.y0,
        bbox.x1,
        bbox.y1,
        if flip { " flipped" } else { "" }
    );

    Ok(TriangleSetup {
        vertices,
        edges,
        bbox,
        area2,
        area_shift,
        inv_area,
        flipped: flip,
        planes,
    })
}

fn clip_bbox(v: &[Vertex; 3], params: &SetupParams) -> Option<BBox> {
    let min_x = v.iter().map(|v| v.x).min()?;
    let max_x = v.iter().map(|v| v.x).max()?;
    let min_y = v.iter().map(|v| v.y).min()?;
    let max_y = v.iter().map(|v| v.y).max()?;

    let s = &params.scissor;
    let sx1 = (s.x + s.width).min(params.surface_width) as i32 - 1;
    let sy1 = (s.y + s.height).min(params.surface_height) as i32 - 1;

    let bbox = BBox {
        x0: min_x.ceil_px().max(s.x as i32),
        y0: min_y.ceil_px().max(s.y as i32),
        x1: max_x.floor_px().min(sx1),
        y1: max_y.floor_px().min(sy1),
    };
    (bbox.x0 <= bbox.x1 && bbox.y0 <= bbox.y1).then_some(bbox)
}

impl TriangleSetup {
    /// The area reciprocal in AREA_SETUP register form.
    #[must_use]
    pub fn area_setup_reg(&self) -> AreaSetupReg {
        let mut reg = AreaSetupReg::default();
        reg.set_inv_area(self.inv_area.to_bits());
        reg.set_area_shift(self.area_shift as u8);
        reg
    }

    /// True if pixel (px, py) is covered under the fill rule.
    #[must_use]
    pub fn covers(&self, px: i32, py: i32) -> bool {
        self.edges.iter().all(|e| e.at_pixel(px, py) >= 0)
    }

    /// Interpolate every attribute at pixel (x, y).
    #[must_use]
    pub fn fragment_at(&self, x: i32, y: i32) -> Fragment {
        let ox = i64::from(x - self.bbox.x0);
        let oy = i64::from(y - self.bbox.y0);
        let v = |i: usize| self.planes[i].at(ox, oy);
        let unorm = |i: usize| v(i).clamp(0, 255) as u8;
        let rgba = |base: usize| {
            Rgba8::new(
                unorm(base),
                unorm(base + 1),
                unorm(base + 2),
                unorm(base + 3),
            )
        };
        let wide = |i: usize| v(i).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        Fragment {
            x: x as u16,
            y: y as u16,
            z: v(Z).clamp(0, 0xFFFF) as u16,
            shade0: rgba(SHADE0),
            shade1: rgba(SHADE1),
            uv0: TexCoord {
                uq: wide(UV0),
                vq: wide(UV0 + 1),
            },
            uv1: TexCoord {
                uq: wide(UV1),
                vq: wide(UV1 + 1),
            },
            q: v(Q).clamp(0, i64::from(u32::MAX)) as u32,
        }
    }
}
