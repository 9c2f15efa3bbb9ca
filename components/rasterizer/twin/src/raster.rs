//! Tiled edge-walking rasterizer.
//!
//! ```text
//! Idle -> Setup -> TileScan -> Pixel x16 -> TileScan ... -> Done -> Idle
//! ```
//!
//! The walk covers the bounding box in 4x4 tiles aligned to the surface
//! tiling, row-major over tiles and row-major inside a tile, so every
//! fragment of one tile is emitted back to back. Edge values are carried
//! incrementally: `+A` per pixel step in X, `+B` per step in Y.
//!
//! [`next_state`] is pure. [`Rasterizer`] applies it one clock at a time and
//! turns emitted pixel positions into interpolated fragments.

use gs_twin_core::Fragment;

use crate::setup::TriangleSetup;

/// Edge-walk registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Walk {
    /// Tile coordinates, in tiles.
    pub tile_x: i32,
    pub tile_y: i32,
    /// Edge values at the origin of the first tile in this tile row.
    pub row_start: [i64; 3],
    /// Edge values at the current tile origin.
    pub tile: [i64; 3],
    /// Edge values at the start of the current pixel row in the tile.
    pub line: [i64; 3],
    /// Edge values at the current pixel.
    pub pixel: [i64; 3],
    /// Pixel index inside the tile, row-major.
    pub index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterState {
    Idle,
    Setup,
    TileScan(Walk),
    Pixel(Walk),
    Done,
}

fn add(a: [i64; 3], b: [i64; 3]) -> [i64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn steps(setup: &TriangleSetup, scale: i64) -> ([i64; 3], [i64; 3]) {
    let e = &setup.edges;
    (
        [
            e[0].step_x() * scale,
            e[1].step_x() * scale,
            e[2].step_x() * scale,
        ],
        [
            e[0].step_y() * scale,
            e[1].step_y() * scale,
            e[2].step_y() * scale,
        ],
    )
}

fn first_tile(setup: &TriangleSetup) -> Walk {
    let tile_x = setup.bbox.x0 >> 2;
    let tile_y = setup.bbox.y0 >> 2;
    let origin = setup
        .edges
        .map(|e| e.at_pixel(tile_x * 4, tile_y * 4));
    Walk {
        tile_x,
        tile_y,
        row_start: origin,
        tile: origin,
        line: origin,
        pixel: origin,
        index: 0,
    }
}

/// The next tile in scan order, or `None` past the last one.
fn next_tile(mut w: Walk, setup: &TriangleSetup) -> Option<Walk> {
    let (dx4, dy4) = steps(setup, 4);
    if w.tile_x < setup.bbox.x1 >> 2 {
        w.tile_x += 1;
        w.tile = add(w.tile, dx4);
    } else if w.tile_y < setup.bbox.y1 >> 2 {
        w.tile_x = setup.bbox.x0 >> 2;
        w.tile_y += 1;
        w.row_start = add(w.row_start, dy4);
        w.tile = w.row_start;
    } else {
        return None;
    }
    w.line = w.tile;
    w.pixel = w.tile;
    w.index = 0;
    Some(w)
}

/// True if one edge is negative at all four corners of the tile, so no
/// pixel in it can be covered.
fn tile_rejected(w: &Walk, setup: &TriangleSetup) -> bool {
    let (dx3, dy3) = steps(setup, 3);
    (0..3).any(|i| {
        let e = w.tile[i];
        [e, e + dx3[i], e + dy3[i], e + dx3[i] + dy3[i]]
            .iter()
            .all(|&v| v < 0)
    })
}

fn advance(w: Walk, setup: &TriangleSetup) -> RasterState {
    next_tile(w, setup).map_or(RasterState::Done, RasterState::TileScan)
}

/// One clock of the rasterizer. Returns the next state and, in the Pixel
/// state, the covered pixel to emit.
#[must_use]
pub fn next_state(state: RasterState, setup: &TriangleSetup) -> (RasterState, Option<(i32, i32)>) {
    match state {
        RasterState::Idle => (RasterState::Idle, None),
        RasterState::Setup => (RasterState::TileScan(first_tile(setup)), None),
        RasterState::TileScan(w) => {
            if tile_rejected(&w, setup) {
                (advance(w, setup), None)
            } else {
                (RasterState::Pixel(w), None)
            }
        }
        RasterState::Pixel(mut w) => {
            let x = w.tile_x * 4 + i32::from(w.index & 3);
            let y = w.tile_y * 4 + i32::from(w.index >> 2);
            let emit = (w.pixel.iter().all(|&e| e >= 0) && setup.bbox.contains(x, y))
                .then_some((x, y));

            let next = if w.index == 15 {
                advance(w, setup)
            } else {
                let (dx, dy) = steps(setup, 1);
                w.index += 1;
                if w.index & 3 == 0 {
                    w.line = add(w.line, dy);
                    w.pixel = w.line;
                } else {
                    w.pixel = add(w.pixel, dx);
                }
                RasterState::Pixel(w)
            };
            (next, emit)
        }
        RasterState::Done => (RasterState::Idle, None),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub cycles: u64,
    pub tiles: u64,
    pub tiles_rejected: u64,
    pub pixels_tested: u64,
    pub fragments: u64,
}

/// Drives [`next_state`] for one triangle. Iterating yields the covered
/// fragments in emission order.
pub struct Rasterizer<'a> {
    setup: &'a TriangleSetup,
    state: RasterState,
    stats: RasterStats,
}

impl<'a> Rasterizer<'a> {
    #[must_use]
    pub fn new(setup: &'a TriangleSetup) -> Self {
        Self {
            setup,
            state: RasterState::Setup,
            stats: RasterStats::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> RasterState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> RasterStats {
        self.stats
    }

    /// Advance one clock.
    pub fn step(&mut self) -> Option<Fragment> {
        let (next, emit) = next_state(self.state, self.setup);
        self.stats.cycles += 1;
        match (self.state, next) {
            (RasterState::TileScan(_), RasterState::Pixel(_)) => self.stats.tiles += 1,
            (RasterState::TileScan(_), _) => {
                self.stats.tiles += 1;
                self.stats.tiles_rejected += 1;
            }
            (RasterState::Pixel(_), _) => self.stats.pixels_tested += 1,
            _ => {}
        }
        self.state = next;
        let (x, y) = emit?;
        self.stats.fragments += 1;
        Some(self.setup.fragment_at(x, y))
    }
}

impl Iterator for Rasterizer<'_> {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        loop {
            if self.state == RasterState::Idle {
                return None;
            }
            if let Some(frag) = self.step() {
                return Some(frag);
            }
        }
    }
}
