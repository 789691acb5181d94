// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for attribute stores, the registry, and the undo bridge.
//!
//! Coercion fallbacks are not errors: primitive stores map unparseable input
//! to their default value. Only structural failures surface here.
use thiserror::Error;

use crate::ident::{AttrId, ElementKind};

/// Errors raised by a single store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttrError {
    /// The slot index lies outside `[0, capacity)`.
    #[error("slot index {id} out of range for capacity {capacity}")]
    IndexOutOfRange {
        /// Requested slot index.
        id: usize,
        /// Capacity of the store at the time of the call.
        capacity: usize,
    },
    /// An object-backed store could not map the input to its native type.
    #[error("invalid value for attribute type `{type_name}`: {reason}")]
    InvalidArgument {
        /// Attribute type that rejected the value.
        type_name: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// The undo channel did not carry what the store expected.
    #[error(transparent)]
    Undo(#[from] UndoError),
    /// A persistence blob could not be restored.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Errors raised while reading from an undo channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UndoError {
    /// The reader ran out of recorded cells.
    #[error("undo channel exhausted")]
    Exhausted,
    /// The next cell has a different width than the store's undo width.
    #[error("undo width mismatch: expected {expected}, found {found}")]
    WidthMismatch {
        /// Width the store reads.
        expected: &'static str,
        /// Width found in the channel.
        found: &'static str,
    },
    /// An object cell held a value of another object type.
    #[error("undo object is not a `{expected}`")]
    ObjectTypeMismatch {
        /// Attribute type that attempted the restore.
        expected: &'static str,
    },
}

/// Errors raised while restoring a whole-column persistence blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The blob was produced by a store of another attribute type.
    #[error("snapshot type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        /// Attribute type of the restoring store.
        expected: &'static str,
        /// Attribute type recorded in the blob.
        found: String,
    },
    /// The payload digest did not match the recorded digest.
    #[error("snapshot digest mismatch: expected {expected}, found {found}")]
    DigestMismatch {
        /// Hex digest recorded in the blob.
        expected: String,
        /// Hex digest recomputed from the payload.
        found: String,
    },
    /// Encoding the column failed.
    #[error("snapshot encode failed: {0}")]
    Encode(String),
    /// Decoding the payload failed.
    #[error("snapshot decode failed: {0}")]
    Decode(String),
}

/// Errors raised by the attribute type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two factories were registered under the same type name.
    #[error("duplicate registration for attribute type `{0}`")]
    DuplicateRegistration(String),
    /// No factory is registered under the requested type name.
    #[error("attribute type `{0}` not found")]
    NotFound(String),
}

/// Errors raised by an [`crate::AttributeTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Registry lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A store operation failed.
    #[error(transparent)]
    Attr(#[from] AttrError),
    /// The attribute handle does not belong to this table.
    #[error("unknown attribute {0}")]
    UnknownAttribute(AttrId),
    /// An attribute with this name is already declared for the element kind.
    #[error("{kind} attribute `{name}` already declared")]
    DuplicateAttribute {
        /// Element kind of the existing attribute.
        kind: ElementKind,
        /// Attribute name.
        name: String,
    },
    /// A bulk restore did not match the declared attributes.
    #[error("bulk restore expected {expected} columns, found {found}")]
    ColumnCountMismatch {
        /// Declared attribute count.
        expected: usize,
        /// Column count in the snapshot.
        found: usize,
    },
}
