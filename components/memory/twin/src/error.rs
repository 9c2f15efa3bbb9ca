use crate::port::Port;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("burst of {words} words at word {word_addr:#x} exceeds memory of {capacity} words")]
    AddressOutOfRange {
        word_addr: u32,
        words: usize,
        capacity: usize,
    },

    #[error("burst length {0} outside 1..=255")]
    BurstLength(usize),

    #[error("{0} port already has a request outstanding")]
    PortBusy(Port),
}
