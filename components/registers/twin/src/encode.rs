//! Field encoding errors.

use core::fmt;

/// A bit pattern that does not name any variant of a field enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownVariant<T>(T);

impl<T: Copy> UnknownVariant<T> {
    #[must_use]
    pub const fn new(bits: T) -> Self {
        Self(bits)
    }

    /// The rejected bit pattern.
    #[must_use]
    pub const fn bits(&self) -> T {
        self.0
    }
}

impl<T: fmt::Display> fmt::Display for UnknownVariant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field encoding {}", self.0)
    }
}
