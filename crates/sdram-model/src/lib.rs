//! Cycle-accurate behavioral model of the W9825G6KH SDRAM as seen through
//! its controller handshake (`req`/`ack`/`ready` plus the burst strobes).
//!
//! The controller is a Moore-style FSM. [`next_state`] is the pure
//! transition function: it never touches memory, it only returns the next
//! [`SdramState`] and the [`Effects`] the cycle must perform. [`Sdram::eval`]
//! applies those effects against the backing store and updates the output
//! signals.
//!
//! Timing (100 MHz):
//! - row activation tRCD = 2 cycles
//! - CAS latency CL = 3 cycles
//! - one 16-bit word per cycle once a burst is streaming
//! - burst cancel: the word in flight completes, then a 2-cycle precharge,
//!   then `ack`
//! - auto-refresh: `ready` drops for 6 cycles every 781 cycles; a refresh
//!   that falls due mid-transfer is deferred until the controller is idle

/// Row activation latency in clock cycles (tRCD).
pub const TRCD: u8 = 2;

/// CAS latency in clock cycles.
pub const CAS_LATENCY: u8 = 3;

/// Precharge delay after a burst cancel (tRP).
pub const TPRECHARGE: u8 = 2;

/// Auto-refresh interval: 8192 refreshes per 64 ms at 100 MHz.
pub const REFRESH_INTERVAL: u32 = 781;

/// Cycles `ready` stays low for one auto-refresh.
pub const REFRESH_DURATION: u8 = 6;

/// 16-bit words in the 32 MiB part.
pub const TOTAL_WORDS: usize = 32 * 1024 * 1024 / 2;

/// Controller input signals, sampled on every [`Sdram::eval`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SdramInputs {
    pub req: bool,
    pub we: bool,
    /// Byte address.
    pub addr: u32,
    /// Burst length in 16-bit words. Zero is treated as one.
    pub burst_len: u8,
    /// Write data, consumed on the cycle after `burst_wdata_req`.
    pub wdata: u16,
    pub burst_cancel: bool,
}

/// Controller output signals. Everything except `ready` and `rdata` is a
/// single-cycle pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdramOutputs {
    pub rdata: u16,
    pub ack: bool,
    pub ready: bool,
    pub burst_data_valid: bool,
    pub burst_wdata_req: bool,
    pub burst_done: bool,
}

impl Default for SdramOutputs {
    fn default() -> Self {
        Self {
            rdata: 0,
            ack: false,
            ready: true,
            burst_data_valid: false,
            burst_wdata_req: false,
            burst_done: false,
        }
    }
}

/// An accepted burst in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burst {
    pub write: bool,
    /// Next word address to transfer.
    pub word_addr: u32,
    /// Words left to transfer.
    pub remaining: u8,
    pub cancel_pending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdramState {
    Idle,
    Activate { delay: u8, burst: Burst },
    ReadCas { delay: u8, burst: Burst },
    ReadBurst(Burst),
    WriteBurst(Burst),
    Precharge { delay: u8 },
    Refresh { delay: u8 },
}

/// Work requested by one transition, applied by [`Sdram::eval`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    /// Word to read onto `rdata` (raises `burst_data_valid`).
    pub read: Option<u32>,
    /// Word to store `wdata` into.
    pub write: Option<u32>,
    pub ack: bool,
    pub burst_done: bool,
    pub wdata_req: bool,
    /// New level for `ready`, when it changes.
    pub ready: Option<bool>,
    /// A refresh started this cycle; restart the interval counter.
    pub refresh_started: bool,
}

/// Pure next-state function of the controller FSM.
#[must_use]
pub fn next_state(
    state: SdramState,
    inputs: &SdramInputs,
    refresh_due: bool,
    ready: bool,
) -> (SdramState, Effects) {
    let mut fx = Effects::default();
    let next = match state {
        SdramState::Idle => {
            if refresh_due {
                fx.ready = Some(false);
                fx.refresh_started = true;
                SdramState::Refresh {
                    delay: REFRESH_DURATION,
                }
            } else if inputs.req && ready {
                SdramState::Activate {
                    delay: TRCD,
                    burst: Burst {
                        write: inputs.we,
                        word_addr: inputs.addr / 2,
                        remaining: inputs.burst_len.max(1),
                        cancel_pending: false,
                    },
                }
            } else {
                SdramState::Idle
            }
        }
        SdramState::Activate { delay, burst } => {
            let delay = delay.saturating_sub(1);
            if delay > 0 {
                SdramState::Activate { delay, burst }
            } else if burst.write {
                fx.wdata_req = true;
                SdramState::WriteBurst(burst)
            } else {
                SdramState::ReadCas {
                    delay: CAS_LATENCY,
                    burst,
                }
            }
        }
        SdramState::ReadCas { delay, mut burst } => {
            let delay = delay.saturating_sub(1);
            if delay > 0 {
                SdramState::ReadCas { delay, burst }
            } else {
                fx.read = Some(burst.word_addr);
                burst.word_addr += 1;
                burst.remaining -= 1;
                if burst.remaining == 0 {
                    fx.burst_done = true;
                    fx.ack = true;
                    SdramState::Idle
                } else {
                    burst.cancel_pending = inputs.burst_cancel;
                    SdramState::ReadBurst(burst)
                }
            }
        }
        SdramState::ReadBurst(mut burst) => {
            if inputs.burst_cancel || burst.cancel_pending {
                SdramState::Precharge { delay: TPRECHARGE }
            } else {
                fx.read = Some(burst.word_addr);
                burst.word_addr += 1;
                burst.remaining -= 1;
                if burst.remaining == 0 {
                    fx.burst_done = true;
                    fx.ack = true;
                    SdramState::Idle
                } else {
                    SdramState::ReadBurst(burst)
                }
            }
        }
        SdramState::WriteBurst(mut burst) => {
            if inputs.burst_cancel || burst.cancel_pending {
                // The requested word is already on the bus.
                fx.write = Some(burst.word_addr);
                SdramState::Precharge { delay: TPRECHARGE }
            } else {
                fx.write = Some(burst.word_addr);
                burst.word_addr += 1;
                burst.remaining -= 1;
                if burst.remaining == 0 {
                    fx.burst_done = true;
                    fx.ack = true;
                    SdramState::Idle
                } else {
                    fx.wdata_req = true;
                    SdramState::WriteBurst(burst)
                }
            }
        }
        SdramState::Precharge { delay } => {
            let delay = delay.saturating_sub(1);
            if delay > 0 {
                SdramState::Precharge { delay }
            } else {
                fx.ack = true;
                SdramState::Idle
            }
        }
        SdramState::Refresh { delay } => {
            let delay = delay.saturating_sub(1);
            if delay > 0 {
                SdramState::Refresh { delay }
            } else {
                fx.ready = Some(true);
                SdramState::Idle
            }
        }
    };
    (next, fx)
}

/// The SDRAM part plus its controller.
pub struct Sdram {
    mem: Vec<u16>,
    state: SdramState,
    refresh_counter: u32,
    outputs: SdramOutputs,
    cycles: u64,
    refreshes: u64,
    /// Input signals for the next [`Sdram::eval`].
    pub inputs: SdramInputs,
}

impl Default for Sdram {
    fn default() -> Self {
        Self::new()
    }
}

impl Sdram {
    /// Full 32 MiB part.
    #[must_use]
    pub fn new() -> Self {
        Self::with_words(TOTAL_WORDS)
    }

    /// A part with `words` 16-bit words. Accesses beyond the end read as
    /// zero and drop writes.
    #[must_use]
    pub fn with_words(words: usize) -> Self {
        Self {
            mem: vec![0; words],
            state: SdramState::Idle,
            refresh_counter: 0,
            outputs: SdramOutputs::default(),
            cycles: 0,
            refreshes: 0,
            inputs: SdramInputs::default(),
        }
    }

    /// Return the controller to idle without touching memory contents.
    pub fn reset(&mut self) {
        self.state = SdramState::Idle;
        self.refresh_counter = 0;
        self.outputs = SdramOutputs::default();
        self.inputs = SdramInputs::default();
    }

    /// Evaluate one rising clock edge.
    pub fn eval(&mut self) -> SdramOutputs {
        self.refresh_counter += 1;
        let refresh_due = self.refresh_counter >= REFRESH_INTERVAL;
        let (next, fx) = next_state(self.state, &self.inputs, refresh_due, self.outputs.ready);
        self.apply(fx);
        self.state = next;
        self.cycles += 1;
        self.outputs
    }

    fn apply(&mut self, fx: Effects) {
        self.outputs.ack = fx.ack;
        self.outputs.burst_done = fx.burst_done;
        self.outputs.burst_wdata_req = fx.wdata_req;
        self.outputs.burst_data_valid = false;
        if let Some(addr) = fx.read {
            self.outputs.rdata = self.read_word(addr);
            self.outputs.burst_data_valid = true;
        }
        if let Some(addr) = fx.write {
            self.write_word(addr, self.inputs.wdata);
        }
        if let Some(ready) = fx.ready {
            self.outputs.ready = ready;
        }
        if fx.refresh_started {
            self.refresh_counter = 0;
            self.refreshes += 1;
        }
    }

    #[must_use]
    pub fn outputs(&self) -> SdramOutputs {
        self.outputs
    }

    #[must_use]
    pub fn state(&self) -> SdramState {
        self.state
    }

    /// True when a new request would be accepted on the next edge
    /// (barring a refresh falling due on that same edge).
    #[must_use]
    pub fn can_accept(&self) -> bool {
        self.state == SdramState::Idle && self.outputs.ready
    }

    /// Total clock edges evaluated.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Auto-refresh cycles performed.
    #[must_use]
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Capacity in 16-bit words.
    #[must_use]
    pub fn len_words(&self) -> usize {
        self.mem.len()
    }

    /// Backdoor read, bypassing timing.
    #[must_use]
    pub fn read_word(&self, word_addr: u32) -> u16 {
        self.mem.get(word_addr as usize).copied().unwrap_or(0)
    }

    /// Backdoor write, bypassing timing.
    pub fn write_word(&mut self, word_addr: u32, data: u16) {
        if let Some(slot) = self.mem.get_mut(word_addr as usize) {
            *slot = data;
        }
    }

    /// Two consecutive words at `byte_addr`, low word first.
    #[must_use]
    pub fn read_word32(&self, byte_addr: u32) -> u32 {
        let word = byte_addr / 2;
        u32::from(self.read_word(word)) | (u32::from(self.read_word(word + 1)) << 16)
    }
}
