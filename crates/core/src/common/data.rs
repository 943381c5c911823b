//! Memory Access Types.
//!
//! Classifies the accesses routed through the hierarchy. The kind decides which
//! of a level's LOAD and STORE counters is charged, and whether a hit or fill
//! may leave the line dirty.

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Data read. Also used for line fills forwarded to a lower level.
    Load,

    /// Data write. Also used for dirty write-backs forwarded to a lower level.
    Store,
}

impl AccessKind {
    /// Returns `true` for [`AccessKind::Store`].
    #[inline]
    pub fn is_store(self) -> bool {
        matches!(self, Self::Store)
    }
}
