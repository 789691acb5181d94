// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Transaction identifier types.

/// Thin wrapper around an undo transaction identifier.
///
/// The undo log issues monotonically increasing identifiers via
/// [`crate::UndoLog::begin`]. External persistence layers may rebuild `TxId`
/// values with [`TxId::from_raw`].
///
/// # Invariants
/// - The underlying `u64` may wrap at `u64::MAX`; issuing resumes at `1`.
/// - Zero (`TxId(0)`) is reserved and never issued by the log.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct TxId(u64);

impl TxId {
    /// Constructs a `TxId` from a raw `u64` value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TxId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
