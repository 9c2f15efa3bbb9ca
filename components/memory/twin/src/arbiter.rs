use sdram_model::{Sdram, SdramInputs, SdramOutputs, SdramState};

use crate::client::{ClientPort, PortClient};
use crate::error::MemoryError;
use crate::port::{Completion, Port, PortStats, Request, Slot};

/// The burst currently owning the controller.
struct Active {
    port: Port,
    request: Request,
    issued: u64,
    granted: u64,
    accepted: bool,
    data: Vec<u16>,
    next_wdata: usize,
    words: usize,
}

/// Fixed-priority arbiter in front of the SDRAM model.
pub struct MemoryArbiter {
    sdram: Sdram,
    slots: [Slot; Port::COUNT],
    active: Option<Active>,
    client: Option<Box<dyn PortClient>>,
    cycle: u64,
}

impl Default for MemoryArbiter {
    fn default() -> Self {
        Self::new(Sdram::new())
    }
}

impl MemoryArbiter {
    #[must_use]
    pub fn new(sdram: Sdram) -> Self {
        Self {
            sdram,
            slots: Default::default(),
            active: None,
            client: None,
            cycle: 0,
        }
    }

    /// An arbiter over a part with `words` 16-bit words.
    #[must_use]
    pub fn with_words(words: usize) -> Self {
        Self::new(Sdram::with_words(words))
    }

    // ── Clock ───────────────────────────────────────────────────────────

    /// Cycles elapsed since construction.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advance one clock: poll the client, arbitrate, evaluate the SDRAM
    /// edge, then route its outputs.
    pub fn tick(&mut self) {
        self.poll_client();
        self.arbitrate();

        let before = self.sdram.state();
        if let Some(active) = &self.active {
            if self.slots[active.port.index()].cancel {
                self.sdram.inputs.burst_cancel = true;
            }
        }
        let out = self.sdram.eval();
        self.cycle += 1;

        // Every WriteBurst edge stores a word, cancelled or not.
        if let SdramState::WriteBurst(_) = before {
            if let Some(active) = self.active.as_mut() {
                active.words += 1;
            }
        }
        self.route(out);
    }

    /// Run the clock for `cycles` with no new pipeline traffic.
    pub fn advance(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.tick();
        }
    }

    // ── Requests ────────────────────────────────────────────────────────

    /// Queue a request on `port`. It waits there, asserted, until granted.
    ///
    /// # Errors
    /// See [`ClientPort::submit`].
    pub fn submit(&mut self, port: Port, request: Request) -> Result<(), MemoryError> {
        let capacity = self.sdram.len_words();
        self.slots[port.index()].submit(port, request, self.cycle, capacity)
    }

    pub fn take_completion(&mut self, port: Port) -> Option<Completion> {
        self.slots[port.index()].done.take()
    }

    pub fn cancel(&mut self, port: Port) {
        self.slots[port.index()].cancel(port, self.cycle);
    }

    /// Submit and tick until the transaction completes.
    ///
    /// # Errors
    /// See [`MemoryArbiter::submit`].
    pub fn execute(&mut self, port: Port, request: Request) -> Result<Completion, MemoryError> {
        self.submit(port, request)?;
        loop {
            self.tick();
            if let Some(done) = self.take_completion(port) {
                return Ok(done);
            }
        }
    }

    fn arbitrate(&mut self) {
        if self.active.is_some() || !self.sdram.can_accept() {
            return;
        }
        let cycle = self.cycle;
        let Some(port) = Port::ALL
            .into_iter()
            .find(|p| self.slots[p.index()].has_pending())
        else {
            return;
        };
        let Some((request, issued)) = self.slots[port.index()].grant(cycle) else {
            return;
        };
        log::trace!(
            "grant {port} at cycle {cycle} after {} cycles",
            cycle - issued
        );
        self.sdram.inputs = SdramInputs {
            req: true,
            we: request.is_write(),
            addr: request.word_addr() * 2,
            burst_len: request.len() as u8,
            wdata: 0,
            burst_cancel: false,
        };
        self.active = Some(Active {
            port,
            data: Vec::with_capacity(if request.is_write() { 0 } else { request.len() }),
            request,
            issued,
            granted: cycle,
            accepted: false,
            next_wdata: 0,
            words: 0,
        });
    }

    fn route(&mut self, out: SdramOutputs) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !active.accepted && matches!(self.sdram.state(), SdramState::Activate { .. }) {
            active.accepted = true;
            self.sdram.inputs.req = false;
        }
        if out.burst_data_valid {
            active.data.push(out.rdata);
            active.words += 1;
        }
        if out.burst_wdata_req {
            if let Request::Write { data, .. } = &active.request {
                self.sdram.inputs.wdata = data.get(active.next_wdata).copied().unwrap_or(0);
                active.next_wdata += 1;
            }
        }
        if out.ack {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.sdram.inputs = SdramInputs::default();
        let cancelled = active.words < active.request.len();
        let slot = &mut self.slots[active.port.index()];
        slot.in_flight = false;
        slot.cancel = false;
        slot.stats.transactions += 1;
        slot.stats.words += active.words as u64;
        slot.stats.busy_cycles += self.cycle - active.granted;
        if cancelled {
            slot.stats.cancels += 1;
            log::trace!(
                "{}: burst cancelled after {} of {} words",
                active.port,
                active.words,
                active.request.len()
            );
        }
        slot.done = Some(Completion {
            port: active.port,
            word_addr: active.request.word_addr(),
            data: active.data,
            words: active.words,
            cancelled,
            issued: active.issued,
            granted: active.granted,
            finished: self.cycle,
        });
    }

    // ── Background client ───────────────────────────────────────────────

    /// Attach the display-port client, replacing any previous one.
    pub fn attach_client(&mut self, client: Box<dyn PortClient>) -> Option<Box<dyn PortClient>> {
        self.client.replace(client)
    }

    pub fn detach_client(&mut self) -> Option<Box<dyn PortClient>> {
        self.client.take()
    }

    #[must_use]
    pub fn client<T: PortClient>(&self) -> Option<&T> {
        self.client.as_deref()?.as_any().downcast_ref()
    }

    pub fn client_mut<T: PortClient>(&mut self) -> Option<&mut T> {
        self.client.as_deref_mut()?.as_any_mut().downcast_mut()
    }

    fn poll_client(&mut self) {
        let Some(mut client) = self.client.take() else {
            return;
        };
        let capacity = self.sdram.len_words();
        let slot = &mut self.slots[Port::Display.index()];
        client.tick(&mut ClientPort::new(Port::Display, slot, self.cycle, capacity));
        self.client = Some(client);
    }

    // ── Statistics ──────────────────────────────────────────────────────

    #[must_use]
    pub fn stats(&self, port: Port) -> PortStats {
        self.slots[port.index()].stats
    }

    pub fn reset_stats(&mut self) {
        for slot in &mut self.slots {
            slot.stats = PortStats::default();
        }
    }

    #[must_use]
    pub fn sdram(&self) -> &Sdram {
        &self.sdram
    }

    // ── Backdoor ────────────────────────────────────────────────────────

    #[must_use]
    pub fn capacity_words(&self) -> usize {
        self.sdram.len_words()
    }

    /// Zero-time read, bypassing arbitration.
    #[must_use]
    pub fn read_word(&self, word_addr: u32) -> u16 {
        self.sdram.read_word(word_addr)
    }

    /// Zero-time write, bypassing arbitration.
    pub fn write_word(&mut self, word_addr: u32, data: u16) {
        self.sdram.write_word(word_addr, data);
    }

    #[must_use]
    pub fn read_words(&self, word_addr: u32, len: usize) -> Vec<u16> {
        (0..len as u32).map(|i| self.read_word(word_addr + i)).collect()
    }

    pub fn write_words(&mut self, word_addr: u32, data: &[u16]) {
        for (addr, &word) in (word_addr..).zip(data) {
            self.write_word(addr, word);
        }
    }

    /// Copy bytes in little-endian word order starting at an even byte
    /// address. An odd trailing byte fills the low half of its word.
    pub fn load_bytes(&mut self, byte_addr: u32, bytes: &[u8]) {
        for (addr, pair) in (byte_addr / 2..).zip(bytes.chunks(2)) {
            let lo = u16::from(pair[0]);
            let hi = pair.get(1).map_or(0, |&b| u16::from(b));
            self.write_word(addr, lo | (hi << 8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_bytes_is_little_endian() {
        let mut mem = MemoryArbiter::with_words(16);
        mem.load_bytes(4, &[0x34, 0x12, 0x78]);
        assert_eq!(mem.read_word(2), 0x1234);
        assert_eq!(mem.read_word(3), 0x0078);
    }

    #[test]
    fn execute_read_round_trip() {
        let mut mem = MemoryArbiter::with_words(1024);
        mem.write_words(100, &[1, 2, 3, 4]);
        let done = mem.execute(Port::Texture, Request::read(100, 4)).unwrap();
        assert_eq!(done.data, vec![1, 2, 3, 4]);
        assert!(!done.cancelled);
        assert_eq!(done.wait(), 0);
        // tRCD + CL to the first word, then one word per cycle.
        assert_eq!(done.latency(), 2 + 3 + 4);
    }

    #[test]
    fn execute_write_lands_in_memory() {
        let mut mem = MemoryArbiter::with_words(1024);
        let done = mem
            .execute(Port::ColorWrite, Request::write(8, vec![9, 8, 7]))
            .unwrap();
        assert_eq!(done.words, 3);
        assert_eq!(mem.read_words(8, 3), vec![9, 8, 7]);
        assert_eq!(mem.stats(Port::ColorWrite).words, 3);
    }
}
