//! Vertex latching and triangle assembly.

use gpu_registers::{ColorReg, Uv0Uv1Reg, VertexReg};
use gs_twin_core::{Rgba8, Vertex};
use qfixed::{Q12_4, Q4_12, Uq1_15};

use crate::command::Kick;

/// The three most recent vertices plus the attributes the next vertex
/// write will capture.
#[derive(Debug, Clone, Default)]
pub struct VertexWindow {
    current: Vertex,
    /// Oldest first.
    window: Vec<Vertex>,
}

impl VertexWindow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_color(&mut self, reg: ColorReg) {
        self.current.color0 = Rgba8::from_packed(reg.color0());
        self.current.color1 = Rgba8::from_packed(reg.color1());
    }

    pub fn set_uv(&mut self, reg: Uv0Uv1Reg) {
        let q = |raw: u16| Q4_12::from_bits(raw as i16);
        self.current.uv0 = [q(reg.uv0_uq()), q(reg.uv0_vq())];
        self.current.uv1 = [q(reg.uv1_uq()), q(reg.uv1_vq())];
    }

    /// Latch a vertex and return the triangles its kick submits.
    pub fn push(&mut self, reg: VertexReg, kick: Kick) -> Vec<[Vertex; 3]> {
        let v = Vertex {
            x: Q12_4::from_bits(reg.x() as i16),
            y: Q12_4::from_bits(reg.y() as i16),
            z: reg.z(),
            q: Uq1_15::from_bits(reg.q()),
            ..self.current
        };
        if self.window.len() == 3 {
            self.window.remove(0);
        }
        self.window.push(v);

        let n = self.window.len();
        match kick {
            Kick::None => Vec::new(),
            Kick::Tri012 | Kick::Tri021 if n < 3 => {
                log::warn!("triangle kick with only {n} vertices latched");
                Vec::new()
            }
            Kick::Tri012 => vec![[self.window[0], self.window[1], self.window[2]]],
            Kick::Tri021 => vec![[self.window[0], self.window[2], self.window[1]]],
            Kick::Rect if n < 2 => {
                log::warn!("rectangle kick without a previous corner");
                Vec::new()
            }
            Kick::Rect => rect(self.window[n - 2], self.window[n - 1]).to_vec(),
        }
    }
}

/// Two triangles covering the axis-aligned rectangle with opposite
/// corners `a` and `b`. The other two corners take X and U from one
/// corner, Y and V from the other, and the rest from `b`.
///
/// Both triangles wind the same way as a top-left to bottom-right pair,
/// whichever diagonal `a` and `b` lie on.
fn rect(a: Vertex, b: Vertex) -> [[Vertex; 3]; 2] {
    let corner = |xu: &Vertex, yv: &Vertex| Vertex {
        x: xu.x,
        y: yv.y,
        uv0: [xu.uv0[0], yv.uv0[1]],
        uv1: [xu.uv1[0], yv.uv1[1]],
        ..b
    };
    let (ba, ab) = (corner(&b, &a), corner(&a, &b));
    let dx = i32::from(b.x.to_bits()) - i32::from(a.x.to_bits());
    let dy = i32::from(b.y.to_bits()) - i32::from(a.y.to_bits());
    if (dx < 0) == (dy < 0) {
        [[a, ba, b], [a, b, ab]]
    } else {
        [[a, b, ba], [a, ab, b]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(x: i16, y: i16) -> VertexReg {
        let mut r = VertexReg::default();
        r.set_x((x * 16) as u16);
        r.set_y((y * 16) as u16);
        r.set_q(0x8000);
        r
    }

    #[test]
    fn window_keeps_three() {
        let mut w = VertexWindow::new();
        for i in 0..5 {
            assert!(w.push(reg(i, 0), Kick::None).is_empty());
        }
        let tris = w.push(reg(9, 9), Kick::Tri012);
        let xs: Vec<_> = tris[0].iter().map(|v| v.x.to_bits() / 16).collect();
        assert_eq!(xs, [3, 4, 9]);
    }

    #[test]
    fn kick_021_swaps_last_two() {
        let mut w = VertexWindow::new();
        w.push(reg(0, 0), Kick::None);
        w.push(reg(1, 0), Kick::None);
        let tris = w.push(reg(2, 0), Kick::Tri021);
        let xs: Vec<_> = tris[0].iter().map(|v| v.x.to_bits() / 16).collect();
        assert_eq!(xs, [0, 2, 1]);
    }

    #[test]
    fn early_kick_submits_nothing() {
        let mut w = VertexWindow::new();
        w.push(reg(0, 0), Kick::None);
        assert!(w.push(reg(1, 1), Kick::Tri012).is_empty());
        let mut w = VertexWindow::new();
        assert!(w.push(reg(1, 1), Kick::Rect).is_empty());
    }

    #[test]
    fn attributes_latch_per_vertex() {
        let mut w = VertexWindow::new();
        let mut c = ColorReg::default();
        c.set_color0(Rgba8::new(255, 0, 0, 255).to_packed());
        w.set_color(c);
        w.push(reg(0, 0), Kick::None);
        c.set_color0(Rgba8::new(0, 255, 0, 255).to_packed());
        w.set_color(c);
        w.push(reg(4, 0), Kick::None);
        let tris = w.push(reg(0, 4), Kick::Tri012);
        assert_eq!(tris[0][0].color0, Rgba8::new(255, 0, 0, 255));
        assert_eq!(tris[0][1].color0, Rgba8::new(0, 255, 0, 255));
        assert_eq!(tris[0][2].color0, Rgba8::new(0, 255, 0, 255));
    }

    #[test]
    fn rect_corners_mix_coordinates() {
        let mut w = VertexWindow::new();
        let mut uv = Uv0Uv1Reg::default();
        uv.set_uv0_uq(0);
        uv.set_uv0_vq(0);
        w.set_uv(uv);
        w.push(reg(10, 20), Kick::None);
        uv.set_uv0_uq(0x1000);
        uv.set_uv0_vq(0x1000);
        w.set_uv(uv);
        let tris = w.push(reg(50, 60), Kick::Rect);
        assert_eq!(tris.len(), 2);
        // Upper-right corner: X and U from the second corner.
        let ur = tris[0][1];
        assert_eq!((ur.x.to_bits() / 16, ur.y.to_bits() / 16), (50, 20));
        assert_eq!((ur.uv0[0].to_bits(), ur.uv0[1].to_bits()), (0x1000, 0));
        // Lower-left corner.
        let ll = tris[1][2];
        assert_eq!((ll.x.to_bits() / 16, ll.y.to_bits() / 16), (10, 60));
        assert_eq!((ll.uv0[0].to_bits(), ll.uv0[1].to_bits()), (0, 0x1000));
    }

    /// Twice the signed area, in Q12.4 units squared.
    fn area2(t: &[Vertex; 3]) -> i64 {
        let p = |v: &Vertex| (i64::from(v.x.to_bits()), i64::from(v.y.to_bits()));
        let ((x0, y0), (x1, y1), (x2, y2)) = (p(&t[0]), p(&t[1]), p(&t[2]));
        (x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0)
    }

    #[test]
    fn rect_winding_independent_of_diagonal() {
        let pairs = [
            ((10, 20), (50, 60)),
            ((50, 60), (10, 20)),
            ((50, 20), (10, 60)),
            ((10, 60), (50, 20)),
        ];
        for (first, second) in pairs {
            let mut w = VertexWindow::new();
            w.push(reg(first.0, first.1), Kick::None);
            let tris = w.push(reg(second.0, second.1), Kick::Rect);
            for t in &tris {
                assert!(area2(t) > 0, "{first:?} -> {second:?} gave area {}", area2(t));
            }
            let total: i64 = tris.iter().map(area2).sum();
            assert_eq!(total, 2 * (40 * 16) * (40 * 16));
        }
    }
}
