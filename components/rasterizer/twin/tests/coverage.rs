//! Coverage properties of setup + rasterization.

use std::collections::{HashMap, HashSet};

use gpu_registers::CullMode;
use gs_rasterizer::{next_state, setup_triangle, RasterState, Rasterizer, Rejected, SetupParams};
use gs_twin_core::state::Scissor;
use gs_twin_core::{Rgba8, Vertex};
use qfixed::Q12_4;

fn params() -> SetupParams {
    SetupParams {
        cull: CullMode::None,
        gouraud: true,
        scissor: Scissor::default(),
        surface_width: 128,
        surface_height: 128,
    }
}

/// Vertex at a sub-pixel position given in sixteenths.
fn sub(x: i16, y: i16) -> Vertex {
    Vertex {
        x: Q12_4::from_bits(x),
        y: Q12_4::from_bits(y),
        ..Vertex::at(0, 0, 0, Rgba8::WHITE)
    }
}

fn covered(v: [Vertex; 3], params: &SetupParams) -> Vec<(u16, u16)> {
    match setup_triangle(v, params) {
        Ok(setup) => Rasterizer::new(&setup).map(|f| (f.x, f.y)).collect(),
        Err(_) => Vec::new(),
    }
}

/// Unbiased edge values at the center of (px, py), in setup's normalized
/// winding.
fn raw_edges(v: &[Vertex; 3], px: i64, py: i64) -> [i64; 3] {
    let e = |a: &Vertex, b: &Vertex| {
        let (xa, ya, xb, yb) = (a.x.raw(), a.y.raw(), b.x.raw(), b.y.raw());
        (ya - yb) * px * 16 + (xb - xa) * py * 16 + (xa * yb - xb * ya)
    };
    [e(&v[0], &v[1]), e(&v[1], &v[2]), e(&v[2], &v[0])]
}

fn triangles() -> Vec<[Vertex; 3]> {
    vec![
        [sub(37, 21), sub(950, 140), sub(300, 1500)],
        [sub(800, 40), sub(90, 700), sub(1700, 1900)],
        [sub(16, 16), sub(1024, 16), sub(16, 1024)],
        [sub(500, 500), sub(510, 1800), sub(1900, 520)],
        [sub(100, 900), sub(1300, 800), sub(700, 1100)],
    ]
}

// ====================================================================
// Culling
// ====================================================================

mod culling {
    use super::*;

    #[test]
    fn non_positive_area_emits_nothing() {
        for v in triangles() {
            let cw = [v[0], v[2], v[1]];
            let setup = setup_triangle(v, &params()).unwrap();
            // Whichever order is negative gets culled under the matching mode.
            let (pos, neg) = if setup.flipped { (cw, v) } else { (v, cw) };
            let cull_negative = SetupParams {
                cull: CullMode::Cw,
                ..params()
            };
            assert!(covered(neg, &cull_negative).is_empty());
            assert!(!covered(pos, &cull_negative).is_empty());
        }
        let degenerate = [sub(0, 0), sub(320, 320), sub(640, 640)];
        assert!(covered(degenerate, &params()).is_empty());
    }

    #[test]
    fn both_windings_cover_the_same_pixels_without_culling() {
        for v in triangles() {
            let mut a = covered(v, &params());
            let mut b = covered([v[0], v[2], v[1]], &params());
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }
}

// ====================================================================
// Edge functions
// ====================================================================

mod edges {
    use super::*;

    #[test]
    fn strictly_inside_covered_strictly_outside_not() {
        for v in triangles() {
            let setup = setup_triangle(v, &params()).unwrap();
            let norm = setup.vertices;
            let frags: HashSet<_> = covered(v, &params()).into_iter().collect();
            for py in 0..128i64 {
                for px in 0..128i64 {
                    let e = raw_edges(&norm, px, py);
                    let hit = frags.contains(&(px as u16, py as u16));
                    if e.iter().all(|&e| e > 0) {
                        assert!(hit, "({px},{py}) strictly inside but not covered");
                    }
                    if e.iter().any(|&e| e < 0) {
                        assert!(!hit, "({px},{py}) strictly outside but covered");
                    }
                }
            }
        }
    }

    #[test]
    fn shared_edge_covered_exactly_once() {
        // The square's diagonal runs through pixel centers.
        let quads = [
            (sub(40, 40), sub(1600, 72), sub(1400, 1600), sub(72, 1200)),
            (sub(0, 0), sub(1024, 0), sub(1024, 1024), sub(0, 1024)),
        ];
        for (a, b, c, d) in quads {
            let mut count: HashMap<(u16, u16), u32> = HashMap::new();
            for t in [[a, b, c], [a, c, d]] {
                for p in covered(t, &params()) {
                    *count.entry(p).or_default() += 1;
                }
            }
            assert!(count.values().all(|&n| n == 1), "double coverage");

            // Every pixel strictly inside the quad is covered.
            let quad = [a, b, c, d];
            for py in 0..128i64 {
                for px in 0..128i64 {
                    let inside = (0..4).all(|i| {
                        let (p, q) = (&quad[i], &quad[(i + 1) % 4]);
                        let (xa, ya, xb, yb) = (p.x.raw(), p.y.raw(), q.x.raw(), q.y.raw());
                        (ya - yb) * px * 16 + (xb - xa) * py * 16 + (xa * yb - xb * ya) > 0
                    });
                    if inside {
                        let n = count.get(&(px as u16, py as u16));
                        assert_eq!(n, Some(&1), "gap at ({px},{py})");
                    }
                }
            }
        }
    }
}

// ====================================================================
// Walk order and clipping
// ====================================================================

mod walk {
    use super::*;

    #[test]
    fn fragments_of_a_tile_are_contiguous() {
        for v in triangles() {
            let frags = covered(v, &params());
            let mut seen = Vec::new();
            for (x, y) in frags {
                let tile = (x >> 2, y >> 2);
                if seen.last() != Some(&tile) {
                    assert!(!seen.contains(&tile), "tile {tile:?} revisited");
                    seen.push(tile);
                }
            }
        }
    }

    #[test]
    fn scissor_clips() {
        let scissor = Scissor {
            x: 20,
            y: 10,
            width: 30,
            height: 25,
        };
        let p = SetupParams { scissor, ..params() };
        for v in triangles() {
            for (x, y) in covered(v, &p) {
                assert!(scissor.contains(u32::from(x), u32::from(y)));
            }
        }
        let outside = Scissor {
            x: 120,
            y: 120,
            width: 4,
            height: 4,
        };
        let p = SetupParams {
            scissor: outside,
            ..params()
        };
        assert_eq!(
            setup_triangle(triangles()[0], &p),
            Err(Rejected::Clipped)
        );
    }

    #[test]
    fn surface_bounds_clip() {
        let v = [sub(-800, -800), sub(4000, 0), sub(0, 4000)];
        let p = SetupParams {
            surface_width: 32,
            surface_height: 16,
            ..params()
        };
        let frags = covered(v, &p);
        assert!(!frags.is_empty());
        assert!(frags.iter().all(|&(x, y)| x < 32 && y < 16));
    }

    #[test]
    fn state_machine_returns_to_idle() {
        let setup = setup_triangle(triangles()[2], &params()).unwrap();
        let mut state = RasterState::Setup;
        let mut emitted = 0;
        let mut cycles = 0;
        while state != RasterState::Idle {
            let (next, emit) = next_state(state, &setup);
            emitted += usize::from(emit.is_some());
            if next == RasterState::Done {
                assert!(matches!(state, RasterState::Pixel(_) | RasterState::TileScan(_)));
            }
            state = next;
            cycles += 1;
            assert!(cycles < 100_000);
        }
        assert_eq!(emitted, covered(triangles()[2], &params()).len());
        assert_eq!(next_state(RasterState::Idle, &setup).0, RasterState::Idle);
    }

    #[test]
    fn empty_tiles_are_skipped() {
        // Thin diagonal sliver: most tiles in its box are empty.
        let v = [sub(0, 0), sub(1900, 1800), sub(1800, 1900)];
        let setup = setup_triangle(v, &params()).unwrap();
        let mut r = Rasterizer::new(&setup);
        let n = r.by_ref().count();
        let stats = r.stats();
        assert_eq!(stats.fragments as usize, n);
        assert!(stats.tiles_rejected > stats.tiles / 2);
    }
}
