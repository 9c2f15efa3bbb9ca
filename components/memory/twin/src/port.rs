use std::fmt;

use crate::error::MemoryError;

/// Longest burst the controller accepts, in 16-bit words.
pub const MAX_BURST_WORDS: usize = 255;

/// Arbiter request ports, declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    /// Scanout. Must never starve.
    Display = 0,
    /// Write-coalescing buffer drains and MEM_FILL.
    ColorWrite = 1,
    /// Z tile cache fills and write-backs.
    ZBuffer = 2,
    /// Texture cache fills.
    Texture = 3,
}

impl Port {
    pub const COUNT: usize = 4;

    /// Highest priority first.
    pub const ALL: [Port; Port::COUNT] = [
        Port::Display,
        Port::ColorWrite,
        Port::ZBuffer,
        Port::Texture,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Port::Display => "display",
            Port::ColorWrite => "color-write",
            Port::ZBuffer => "z-buffer",
            Port::Texture => "texture",
        })
    }
}

/// One burst transaction. Addresses are in 16-bit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Read { word_addr: u32, len: usize },
    Write { word_addr: u32, data: Vec<u16> },
}

impl Request {
    #[must_use]
    pub fn read(word_addr: u32, len: usize) -> Self {
        Self::Read { word_addr, len }
    }

    #[must_use]
    pub fn write(word_addr: u32, data: Vec<u16>) -> Self {
        Self::Write { word_addr, data }
    }

    #[must_use]
    pub fn word_addr(&self) -> u32 {
        match self {
            Self::Read { word_addr, .. } | Self::Write { word_addr, .. } => *word_addr,
        }
    }

    /// Burst length in words.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Read { len, .. } => *len,
            Self::Write { data, .. } => data.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    pub(crate) fn validate(&self, capacity: usize) -> Result<(), MemoryError> {
        let words = self.len();
        if !(1..=MAX_BURST_WORDS).contains(&words) {
            return Err(MemoryError::BurstLength(words));
        }
        if self.word_addr() as usize + words > capacity {
            return Err(MemoryError::AddressOutOfRange {
                word_addr: self.word_addr(),
                words,
                capacity,
            });
        }
        Ok(())
    }
}

/// A finished (or cancelled) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub port: Port,
    pub word_addr: u32,
    /// Words read back. Empty for writes.
    pub data: Vec<u16>,
    /// Words actually transferred.
    pub words: usize,
    pub cancelled: bool,
    /// Cycle the request was submitted.
    pub issued: u64,
    /// Cycle the request was granted. Equal to `finished` for a request
    /// cancelled before its grant.
    pub granted: u64,
    /// Cycle the controller acknowledged.
    pub finished: u64,
}

impl Completion {
    /// Cycles spent waiting for the grant.
    #[must_use]
    pub fn wait(&self) -> u64 {
        self.granted - self.issued
    }

    /// Cycles from submission to acknowledge.
    #[must_use]
    pub fn latency(&self) -> u64 {
        self.finished - self.issued
    }
}

/// Per-port counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortStats {
    pub transactions: u64,
    pub words: u64,
    /// Sum of grant wait cycles.
    pub wait_cycles: u64,
    pub max_wait: u64,
    /// Cycles the port held the bus, grant to acknowledge.
    pub busy_cycles: u64,
    pub cancels: u64,
}

impl PortStats {
    #[must_use]
    pub fn mean_wait(&self) -> f64 {
        if self.transactions == 0 {
            0.0
        } else {
            self.wait_cycles as f64 / self.transactions as f64
        }
    }

    pub(crate) fn record_wait(&mut self, wait: u64) {
        self.wait_cycles += wait;
        self.max_wait = self.max_wait.max(wait);
    }
}

struct Pending {
    request: Request,
    issued: u64,
}

/// Request/response mailbox of one port.
#[derive(Default)]
pub(crate) struct Slot {
    pending: Option<Pending>,
    pub(crate) in_flight: bool,
    pub(crate) cancel: bool,
    pub(crate) done: Option<Completion>,
    pub(crate) stats: PortStats,
}

impl Slot {
    pub(crate) fn is_busy(&self) -> bool {
        self.pending.is_some() || self.in_flight || self.done.is_some()
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn submit(
        &mut self,
        port: Port,
        request: Request,
        cycle: u64,
        capacity: usize,
    ) -> Result<(), MemoryError> {
        if self.is_busy() {
            return Err(MemoryError::PortBusy(port));
        }
        request.validate(capacity)?;
        log::trace!(
            "{port}: {} {} words at {:#x}, cycle {cycle}",
            if request.is_write() { "write" } else { "read" },
            request.len(),
            request.word_addr()
        );
        self.pending = Some(Pending {
            request,
            issued: cycle,
        });
        Ok(())
    }

    /// Take the pending request for a grant at `cycle`, returning it with
    /// its submission cycle.
    pub(crate) fn grant(&mut self, cycle: u64) -> Option<(Request, u64)> {
        let pending = self.pending.take()?;
        self.in_flight = true;
        self.stats.record_wait(cycle - pending.issued);
        Some((pending.request, pending.issued))
    }

    /// Abort the outstanding request. A pending request is dropped
    /// immediately; an in-flight burst is flagged for the arbiter.
    pub(crate) fn cancel(&mut self, port: Port, cycle: u64) {
        if let Some(pending) = self.pending.take() {
            self.stats.cancels += 1;
            self.done = Some(Completion {
                port,
                word_addr: pending.request.word_addr(),
                data: Vec::new(),
                words: 0,
                cancelled: true,
                issued: pending.issued,
                granted: cycle,
                finished: cycle,
            });
        } else if self.in_flight {
            self.cancel = true;
        }
    }
}
