//! Display scanout as a memory-port client.
//!
//! The scanout reads the color surface in 4-line tile strips. In the tiled
//! layout one strip is a single contiguous run of `width * 4` words, so it
//! is fetched front to back in fixed-size bursts on the display port. The
//! fetcher stays one strip ahead of the beam: while strip `n` is on screen
//! strip `n + 1` is loading, and strip 0 of the next frame loads during
//! vertical blank.
//!
//! If a strip is not fully loaded when its first line starts, the line is
//! shown black and an underrun is counted.

use std::any::Any;
use std::collections::BTreeMap;

use gs_memory::{ClientPort, Completion, PortClient, Request};
use gs_twin_core::state::DisplayConfig;
use gs_twin_core::Rgba8;
use image::{Rgba, RgbaImage};

/// Words per scanout burst.
pub const BURST_WORDS: u32 = 32;

/// Beam timing in arbiter clock cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTiming {
    pub cycles_per_line: u64,
    pub visible_lines: u32,
    pub blank_lines: u32,
    /// Active pixels per line at the output. Informational; the scanout
    /// always reads whole surface rows.
    pub pixels_per_line: u32,
}

impl Default for DisplayTiming {
    fn default() -> Self {
        Self {
            cycles_per_line: 3200,
            visible_lines: 480,
            blank_lines: 45,
            pixels_per_line: 640,
        }
    }
}

impl DisplayTiming {
    #[must_use]
    pub fn total_lines(&self) -> u32 {
        self.visible_lines + self.blank_lines
    }

    #[must_use]
    pub fn frame_cycles(&self) -> u64 {
        self.cycles_per_line * u64::from(self.total_lines())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayStats {
    pub frames: u64,
    pub lines: u64,
    pub strips: u64,
    pub bursts: u64,
    pub underruns: u64,
    pub retargets: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fetch {
    strip: u32,
    offset: u32,
}

/// Scanout engine. Attach with [`gs_memory::MemoryArbiter::attach_client`].
pub struct Display {
    config: DisplayConfig,
    timing: DisplayTiming,
    origin: Option<u64>,
    line: Option<u32>,
    strips: BTreeMap<u32, Vec<u16>>,
    in_flight: Option<Fetch>,
    discard_next: bool,
    retarget: bool,
    halted: bool,
    capture: Option<Vec<Rgba8>>,
    last_frame: Option<RgbaImage>,
    stats: DisplayStats,
}

impl Display {
    #[must_use]
    pub fn new(config: DisplayConfig, timing: DisplayTiming) -> Self {
        Self {
            config,
            timing,
            origin: None,
            line: None,
            strips: BTreeMap::new(),
            in_flight: None,
            discard_next: false,
            retarget: false,
            halted: false,
            capture: None,
            last_frame: None,
            stats: DisplayStats::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> DisplayConfig {
        self.config
    }

    /// Point the scanout at a new surface. Any burst in flight is
    /// cancelled and loaded strips are dropped.
    pub fn set_config(&mut self, config: DisplayConfig) {
        if config != self.config {
            log::debug!(
                "display retarget {:#x} -> {:#x}",
                self.config.base,
                config.base
            );
            self.config = config;
            self.retarget = true;
            self.halted = false;
            self.stats.retargets += 1;
        }
    }

    /// True while a strip burst is outstanding.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn timing(&self) -> DisplayTiming {
        self.timing
    }

    #[must_use]
    pub fn stats(&self) -> DisplayStats {
        self.stats
    }

    /// Start assembling displayed lines into frames.
    pub fn enable_capture(&mut self) {
        self.capture.get_or_insert_with(Vec::new);
    }

    /// The most recent completely scanned-out frame, if capturing.
    #[must_use]
    pub fn last_frame(&self) -> Option<&RgbaImage> {
        self.last_frame.as_ref()
    }

    pub fn take_frame(&mut self) -> Option<RgbaImage> {
        self.last_frame.take()
    }

    fn width(&self) -> u32 {
        1 << self.config.width_log2.max(2)
    }

    fn strip_words(&self) -> u32 {
        self.width() * 4
    }

    /// Surface row shown on visible line `line`.
    fn source_row(&self, line: u32) -> u32 {
        if self.config.line_double {
            line / 2
        } else {
            line
        }
    }

    fn strips_per_frame(&self) -> u32 {
        self.source_row(self.timing.visible_lines - 1) / 4 + 1
    }

    /// Strips that should be resident while the beam is on `line`, in
    /// fetch order.
    fn wanted(&self, line: u32) -> [Option<u32>; 2] {
        if line < self.timing.visible_lines {
            let cur = self.source_row(line) / 4;
            let next = (cur + 1 < self.strips_per_frame()).then_some(cur + 1);
            [Some(cur), next]
        } else {
            [Some(0), None]
        }
    }

    fn strip_complete(&self, strip: u32) -> bool {
        self.strips
            .get(&strip)
            .is_some_and(|s| s.len() as u32 == self.strip_words())
    }

    fn on_completion(&mut self, done: Completion) {
        let fetch = self.in_flight.take();
        if std::mem::take(&mut self.discard_next) || done.cancelled {
            return;
        }
        let Some(fetch) = fetch else {
            return;
        };
        let Some(buf) = self.strips.get_mut(&fetch.strip) else {
            return;
        };
        if buf.len() as u32 == fetch.offset {
            buf.extend_from_slice(&done.data);
            self.stats.bursts += 1;
            if buf.len() as u32 == self.strip_words() {
                self.stats.strips += 1;
                log::trace!("display strip {} loaded", fetch.strip);
            }
        }
    }

    fn start_line(&mut self, line: u32) {
        let visible = self.timing.visible_lines;
        if line == visible && self.stats.lines > 0 {
            self.finish_frame();
        }
        let wanted = self.wanted(line);
        self.strips.retain(|s, _| wanted.contains(&Some(*s)));
        if line >= visible {
            return;
        }
        self.stats.lines += 1;
        let row = self.source_row(line);
        let strip = row / 4;
        let ready = self.strip_complete(strip);
        let first_of_strip = line == 0 || self.source_row(line - 1) / 4 != strip;
        if first_of_strip && !ready {
            self.stats.underruns += 1;
            log::warn!("display underrun at line {line} (strip {strip})");
        }
        let width = self.width();
        if let Some(capture) = self.capture.as_mut() {
            let data = self.strips.get(&strip).filter(|_| ready);
            capture.extend((0..width).map(|x| match data {
                Some(d) => {
                    let word = 16 * (x / 4) + (row % 4) * 4 + x % 4;
                    Rgba8::from_rgb565(d[word as usize])
                }
                None => Rgba8::BLACK,
            }));
        }
    }

    fn finish_frame(&mut self) {
        self.stats.frames += 1;
        let width = self.width();
        let height = self.timing.visible_lines;
        let Some(capture) = self.capture.as_mut() else {
            return;
        };
        let pixels = std::mem::take(capture);
        if pixels.len() == (width * height) as usize {
            self.last_frame = Some(RgbaImage::from_fn(width, height, |x, y| {
                Rgba(pixels[(y * width + x) as usize].to_array())
            }));
        }
    }

    fn next_fetch(&mut self, line: u32) -> Option<Fetch> {
        for strip in self.wanted(line).into_iter().flatten() {
            let buf = self.strips.entry(strip).or_default();
            let offset = buf.len() as u32;
            if offset < self.width() * 4 {
                return Some(Fetch { strip, offset });
            }
        }
        None
    }
}

impl PortClient for Display {
    fn tick(&mut self, port: &mut ClientPort<'_>) {
        let cycle = port.cycle();
        let origin = *self.origin.get_or_insert(cycle);

        if self.retarget {
            self.retarget = false;
            self.strips.clear();
            if self.in_flight.take().is_some() {
                port.cancel();
                self.discard_next = true;
            }
        }

        if let Some(done) = port.take_completion() {
            self.on_completion(done);
        }

        // The beam starts at the top of vertical blank.
        let phase = (cycle - origin) / self.timing.cycles_per_line
            + u64::from(self.timing.visible_lines);
        let line = (phase % u64::from(self.timing.total_lines())) as u32;
        if self.line != Some(line) {
            self.line = Some(line);
            self.start_line(line);
        }

        if self.halted || port.is_busy() || self.in_flight.is_some() {
            return;
        }
        let Some(fetch) = self.next_fetch(line) else {
            return;
        };
        let word_addr =
            self.config.base / 2 + fetch.strip * self.strip_words() + fetch.offset;
        let len = BURST_WORDS.min(self.strip_words() - fetch.offset);
        match port.submit(Request::read(word_addr, len as usize)) {
            Ok(()) => self.in_flight = Some(fetch),
            Err(e) => {
                log::warn!("display fetch rejected, scanout halted: {e}");
                self.halted = true;
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
