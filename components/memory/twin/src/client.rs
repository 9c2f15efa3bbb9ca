use std::any::Any;

use crate::error::MemoryError;
use crate::port::{Completion, Port, Request, Slot};

/// A requester that lives on the arbiter's clock instead of blocking on
/// [`crate::MemoryArbiter::execute`]. Attached clients own the display
/// port and are polled once per cycle, before arbitration.
pub trait PortClient: Any {
    fn tick(&mut self, port: &mut ClientPort<'_>);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A client's view of its port for one cycle.
pub struct ClientPort<'a> {
    port: Port,
    slot: &'a mut Slot,
    cycle: u64,
    capacity: usize,
}

impl<'a> ClientPort<'a> {
    pub(crate) fn new(port: Port, slot: &'a mut Slot, cycle: u64, capacity: usize) -> Self {
        Self {
            port,
            slot,
            cycle,
            capacity,
        }
    }

    /// Current arbiter cycle.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    #[must_use]
    pub fn port(&self) -> Port {
        self.port
    }

    /// True while a request is pending, in flight, or completed but not
    /// yet taken.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }

    /// # Errors
    /// [`MemoryError::PortBusy`] if the previous request is outstanding,
    /// or a validation error for the burst itself.
    pub fn submit(&mut self, request: Request) -> Result<(), MemoryError> {
        self.slot
            .submit(self.port, request, self.cycle, self.capacity)
    }

    pub fn take_completion(&mut self) -> Option<Completion> {
        self.slot.done.take()
    }

    /// Abort the outstanding request, if any.
    pub fn cancel(&mut self) {
        self.slot.cancel(self.port, self.cycle);
    }
}
