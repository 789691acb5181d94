// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attribute table: the set of stores owned by one graph context.
//!
//! The table declares attributes through the registry, keeps every store's
//! capacity equal to the element capacity of its kind, and mirrors each slot
//! write into the undo log as a before/after pair of undo cells.
//!
//! Invariants:
//! - `store.capacity() == table.capacity(kind)` for every declared attribute
//!   outside of a capacity change.
//! - Graph-level attributes always have exactly one slot.
//! - Stores are never aliased: [`AttributeTable::copy`] deep-copies every
//!   column into a new context.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::TableConfig;
use crate::error::{AttrError, TableError};
use crate::ident::{make_context_id, make_copy_context_id, AttrId, ContextId, ElementKind};
use crate::registry::AttributeRegistry;
use crate::snapshot::StoreSnapshot;
use crate::store::AttributeStore;
use crate::tx::TxId;
use crate::txlog::{ReplayTarget, SlotEdit, UndoLog};
use crate::undo::{CellWriter, UndoRead};
use crate::value::AttrValue;

#[derive(Debug)]
struct Column {
    name: String,
    kind: ElementKind,
    store: Box<dyn AttributeStore>,
}

#[derive(Debug, Default)]
struct Columns(Vec<Column>);

impl Columns {
    fn get(&self, attr: AttrId) -> Result<&Column, TableError> {
        self.0
            .get(attr.index())
            .ok_or(TableError::UnknownAttribute(attr))
    }

    fn get_mut(&mut self, attr: AttrId) -> Result<&mut Column, TableError> {
        self.0
            .get_mut(attr.index())
            .ok_or(TableError::UnknownAttribute(attr))
    }
}

impl ReplayTarget for Columns {
    fn check_slot(&self, attr: AttrId, id: usize) -> Result<(), TableError> {
        let capacity = self.get(attr)?.store.capacity();
        if id < capacity {
            return Ok(());
        }
        Err(AttrError::IndexOutOfRange { id, capacity }.into())
    }

    fn replay_slot(
        &mut self,
        attr: AttrId,
        id: usize,
        reader: &mut dyn UndoRead,
    ) -> Result<(), TableError> {
        self.get_mut(attr)?.store.restore(id, reader)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Capacities {
    vertex: usize,
    edge: usize,
}

impl Capacities {
    const fn of(self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Graph => 1,
            ElementKind::Vertex => self.vertex,
            ElementKind::Edge => self.edge,
        }
    }
}

/// Stores owned by one graph context.
#[derive(Debug)]
pub struct AttributeTable {
    label: String,
    context: ContextId,
    registry: Arc<AttributeRegistry>,
    capacities: Capacities,
    columns: Columns,
    by_name: FxHashMap<(ElementKind, String), AttrId>,
    log: UndoLog,
    record_undo: bool,
    copies: AtomicU64,
}

impl AttributeTable {
    /// Creates an empty table for the context labelled `label`.
    #[must_use]
    pub fn new(label: &str, registry: Arc<AttributeRegistry>, config: &TableConfig) -> Self {
        Self {
            label: label.to_owned(),
            context: make_context_id(label),
            registry,
            capacities: Capacities {
                vertex: config.vertex_capacity,
                edge: config.edge_capacity,
            },
            columns: Columns::default(),
            by_name: FxHashMap::default(),
            log: UndoLog::new(config.undo_depth),
            record_undo: config.record_undo,
            copies: AtomicU64::new(0),
        }
    }

    /// Context label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Context identity that every store in this table is bound to.
    #[must_use]
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Registry used for declarations.
    #[must_use]
    pub fn registry(&self) -> &Arc<AttributeRegistry> {
        &self.registry
    }

    /// Element capacity of `kind`.
    #[must_use]
    pub fn capacity(&self, kind: ElementKind) -> usize {
        self.capacities.of(kind)
    }

    /// Resizes every store of `kind` to `capacity`.
    ///
    /// Graph-level capacity is fixed at one slot; requests for
    /// [`ElementKind::Graph`] are ignored. Shrinking discards truncated slots,
    /// and undo edits that refer to them fail on replay.
    pub fn set_capacity(&mut self, kind: ElementKind, capacity: usize) {
        match kind {
            ElementKind::Graph => return,
            ElementKind::Vertex => self.capacities.vertex = capacity,
            ElementKind::Edge => self.capacities.edge = capacity,
        }
        for column in self.columns.0.iter_mut().filter(|c| c.kind == kind) {
            column.store.set_capacity(capacity);
        }
        debug!(context = %self.context.short(), %kind, capacity, "resized attribute columns");
    }

    /// Declares a new attribute of type `type_name`.
    ///
    /// # Errors
    /// Returns [`TableError::DuplicateAttribute`] if `name` is already
    /// declared for `kind`, or a registry error for unknown types.
    pub fn declare(
        &mut self,
        kind: ElementKind,
        name: &str,
        type_name: &str,
    ) -> Result<AttrId, TableError> {
        let key = (kind, name.to_owned());
        if self.by_name.contains_key(&key) {
            return Err(TableError::DuplicateAttribute {
                kind,
                name: name.to_owned(),
            });
        }
        let mut store = self.registry.instantiate(type_name)?;
        store.bind(self.context);
        store.set_capacity(self.capacity(kind));

        let attr = AttrId(self.columns.0.len());
        self.columns.0.push(Column {
            name: name.to_owned(),
            kind,
            store,
        });
        self.by_name.insert(key, attr);
        debug!(context = %self.context.short(), %kind, name, type_name, %attr, "declared attribute");
        Ok(attr)
    }

    /// Looks up an attribute by kind and name.
    #[must_use]
    pub fn attribute(&self, kind: ElementKind, name: &str) -> Option<AttrId> {
        self.by_name.get(&(kind, name.to_owned())).copied()
    }

    /// Number of declared attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.0.len()
    }

    /// Returns `true` if no attributes are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.0.is_empty()
    }

    /// Attribute name.
    pub fn name(&self, attr: AttrId) -> Result<&str, TableError> {
        Ok(&self.columns.get(attr)?.name)
    }

    /// Attribute element kind.
    pub fn kind(&self, attr: AttrId) -> Result<ElementKind, TableError> {
        Ok(self.columns.get(attr)?.kind)
    }

    /// Read access to an attribute's store.
    pub fn store(&self, attr: AttrId) -> Result<&dyn AttributeStore, TableError> {
        Ok(self.columns.get(attr)?.store.as_ref())
    }

    /// Attributes in deterministic serialization order:
    /// `(kind, type ordering, name)`.
    #[must_use]
    pub fn ordered_attributes(&self) -> Vec<AttrId> {
        let mut ids: Vec<AttrId> = (0..self.columns.0.len()).map(AttrId).collect();
        ids.sort_by(|a, b| {
            let ca = &self.columns.0[a.index()];
            let cb = &self.columns.0[b.index()];
            (ca.kind, ca.store.ordering(), &ca.name).cmp(&(cb.kind, cb.store.ordering(), &cb.name))
        });
        ids
    }

    /// Replaces an attribute's default. Not recorded in the undo log.
    pub fn set_default(&mut self, attr: AttrId, value: &AttrValue) -> Result<(), TableError> {
        self.columns.get_mut(attr)?.store.set_default(value)?;
        Ok(())
    }

    fn write<F>(&mut self, attr: AttrId, id: usize, f: F) -> Result<(), TableError>
    where
        F: FnOnce(&mut dyn AttributeStore) -> Result<(), AttrError>,
    {
        let column = self.columns.get_mut(attr)?;
        if !self.record_undo {
            f(column.store.as_mut())?;
            return Ok(());
        }
        let mut before = CellWriter::new();
        column.store.save(id, &mut before)?;
        f(column.store.as_mut())?;
        let mut after = CellWriter::new();
        column.store.save(id, &mut after)?;
        self.log.record(SlotEdit {
            attr,
            id,
            before: before.into_cells(),
            after: after.into_cells(),
        });
        Ok(())
    }

    /// Writes a byte, recording undo.
    pub fn set_byte(&mut self, attr: AttrId, id: usize, value: i8) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_byte(id, value))
    }

    /// Writes a short, recording undo.
    pub fn set_short(&mut self, attr: AttrId, id: usize, value: i16) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_short(id, value))
    }

    /// Writes an int, recording undo.
    pub fn set_int(&mut self, attr: AttrId, id: usize, value: i32) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_int(id, value))
    }

    /// Writes a long, recording undo.
    pub fn set_long(&mut self, attr: AttrId, id: usize, value: i64) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_long(id, value))
    }

    /// Writes a float, recording undo.
    pub fn set_float(&mut self, attr: AttrId, id: usize, value: f32) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_float(id, value))
    }

    /// Writes a double, recording undo.
    pub fn set_double(&mut self, attr: AttrId, id: usize, value: f64) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_double(id, value))
    }

    /// Writes a boolean, recording undo.
    pub fn set_boolean(&mut self, attr: AttrId, id: usize, value: bool) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_boolean(id, value))
    }

    /// Writes a char, recording undo.
    pub fn set_char(&mut self, attr: AttrId, id: usize, value: char) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_char(id, value))
    }

    /// Writes text, recording undo.
    pub fn set_string(&mut self, attr: AttrId, id: usize, value: &str) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_string(id, value))
    }

    /// Writes a generic value, recording undo.
    pub fn set_value(
        &mut self,
        attr: AttrId,
        id: usize,
        value: &AttrValue,
    ) -> Result<(), TableError> {
        self.write(attr, id, |s| s.set_object(id, value))
    }

    /// Resets a slot to its default, recording undo.
    pub fn clear(&mut self, attr: AttrId, id: usize) -> Result<(), TableError> {
        self.write(attr, id, |s| s.clear(id))
    }

    /// Opens an undo transaction grouping subsequent writes.
    pub fn begin(&mut self) -> TxId {
        self.log.begin()
    }

    /// Commits the open undo transaction.
    pub fn commit(&mut self) -> Option<TxId> {
        self.log.commit()
    }

    /// Reverses the most recent transaction.
    ///
    /// # Errors
    /// Propagates the first replay failure.
    pub fn undo(&mut self) -> Result<Option<TxId>, TableError> {
        let tx = self.log.undo(&mut self.columns)?;
        trace!(context = %self.context.short(), ?tx, "undo");
        Ok(tx)
    }

    /// Re-applies the most recently undone transaction.
    ///
    /// # Errors
    /// Propagates the first replay failure.
    pub fn redo(&mut self) -> Result<Option<TxId>, TableError> {
        let tx = self.log.redo(&mut self.columns)?;
        trace!(context = %self.context.short(), ?tx, "redo");
        Ok(tx)
    }

    /// Undo log (read-only).
    #[must_use]
    pub fn log(&self) -> &UndoLog {
        &self.log
    }

    /// Deep-copies every store into a new context labelled `label`.
    ///
    /// The copy's context is derived from this table's context and a per-table
    /// copy counter, so it differs from this table and from every other copy
    /// even when `label` repeats. The copy starts with an empty undo log.
    #[must_use]
    pub fn copy(&self, label: &str) -> Self {
        let generation = self.copies.fetch_add(1, Ordering::Relaxed);
        let context = make_copy_context_id(&self.context, generation, label);
        let columns = self
            .columns
            .0
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                kind: column.kind,
                store: column.store.copy(context),
            })
            .collect();
        Self {
            label: label.to_owned(),
            context,
            registry: Arc::clone(&self.registry),
            capacities: self.capacities,
            columns: Columns(columns),
            by_name: self.by_name.clone(),
            log: UndoLog::new(self.log.depth()),
            record_undo: self.record_undo,
            copies: AtomicU64::new(0),
        }
    }

    /// Snapshots every column in declaration order.
    pub fn save_all(&self) -> Result<Vec<StoreSnapshot>, TableError> {
        self.columns
            .0
            .iter()
            .map(|column| column.store.save_data().map_err(TableError::from))
            .collect()
    }

    /// Restores every column from snapshots produced by [`Self::save_all`].
    ///
    /// Either every column is replaced or none is. Element capacities are
    /// taken from the restored columns (the longest column of each kind wins
    /// and shorter ones are padded with their default). The undo log is
    /// cleared.
    pub fn restore_all(&mut self, snapshots: &[StoreSnapshot]) -> Result<(), TableError> {
        if snapshots.len() != self.columns.0.len() {
            return Err(TableError::ColumnCountMismatch {
                expected: self.columns.0.len(),
                found: snapshots.len(),
            });
        }
        let mut restored = Vec::with_capacity(snapshots.len());
        for (column, snapshot) in self.columns.0.iter().zip(snapshots) {
            let mut store = self.registry.instantiate(column.store.type_name())?;
            store.bind(self.context);
            store.restore_data(snapshot)?;
            restored.push(store);
        }

        let mut capacities = Capacities::default();
        for (column, store) in self.columns.0.iter().zip(&restored) {
            match column.kind {
                ElementKind::Graph => {}
                ElementKind::Vertex => {
                    capacities.vertex = capacities.vertex.max(store.capacity());
                }
                ElementKind::Edge => capacities.edge = capacities.edge.max(store.capacity()),
            }
        }
        for (column, mut store) in self.columns.0.iter_mut().zip(restored) {
            store.set_capacity(capacities.of(column.kind));
            column.store = store;
        }
        self.capacities = capacities;
        self.log.clear();
        debug!(
            context = %self.context.short(),
            columns = snapshots.len(),
            vertex_capacity = capacities.vertex,
            edge_capacity = capacities.edge,
            "restored attribute columns"
        );
        Ok(())
    }
}
