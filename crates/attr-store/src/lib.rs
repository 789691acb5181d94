// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! attr-store: typed columnar attribute stores for mutable property graphs.
//!
//! Every attribute of a graph, vertex, or edge family lives in one dense
//! column indexed by element id. Stores of any concrete type are handled
//! uniformly through [`AttributeStore`], which reads and writes slots in every
//! primitive representation and converts between them. Slot writes made
//! through an [`AttributeTable`] are mirrored into an undo log that talks to
//! stores only through the narrow [`UndoWrite`]/[`UndoRead`] ports.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod coerce;
mod config;
mod decorators;
mod error;
mod ident;
mod object;
mod primitive;
mod registry;
mod snapshot;
mod store;
mod table;
mod tx;
mod txlog;
mod undo;
mod value;

// Re-exports for stable public API
/// Uniform store capability and native representations.
pub use store::{AttributeStore, NativeKind};
/// Primitive-backed stores.
pub use primitive::{
    BooleanStore, ByteStore, DoubleStore, FloatStore, IntegerStore, LongStore, PrimitiveStore,
    ShortStore,
};
/// Object-backed stores and their value contract.
pub use object::{ObjectStore, ObjectValue};
/// Four-corner vertex decorators.
pub use decorators::{DecoratorsParseError, DecoratorsStore, VertexDecorators};
/// Conversion rules between native and external representations.
pub use coerce::{code_unit_to_char, text_to_native, value_to_native, NativeScalar};
/// Generic attribute values.
pub use value::{AttrValue, ErasedObject, ObjectRef};
/// Undo channel ports and their in-memory cells.
pub use undo::{CellReader, CellWriter, UndoCell, UndoRead, UndoWidth, UndoWrite};
/// Transactional undo/redo log.
pub use txlog::{ReplayTarget, SlotEdit, Transaction, UndoLog};
/// Undo transaction identifier.
pub use tx::TxId;
/// Whole-column persistence blobs.
pub use snapshot::StoreSnapshot;
/// Attribute type catalog.
pub use registry::{AttributeRegistry, AttributeType, StoreFactory};
/// Per-context table of declared attributes.
pub use table::AttributeTable;
/// Table settings and config storage.
pub use config::{
    ConfigError, ConfigService, ConfigStore, DirConfigStore, MemoryConfigStore, TableConfig,
};
/// Error taxonomy.
pub use error::{AttrError, RegistryError, SnapshotError, TableError, UndoError};
/// Identifiers and hashing helpers.
pub use ident::{make_context_id, make_copy_context_id, AttrId, ContextId, ElementKind, Hash};
