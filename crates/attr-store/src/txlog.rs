// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bounded undo/redo log of attribute slot edits.
//!
//! Each edit stores the slot's undo cells before and after the write, as
//! produced by [`crate::AttributeStore::save`]. The log never interprets the
//! cells; replay hands them back to the owning store through a
//! [`ReplayTarget`].
//!
//! Edits are grouped into transactions. An edit recorded while no
//! transaction is open becomes a transaction of its own. Committing after an
//! undo discards the redo tail.

use std::collections::VecDeque;

use tracing::{trace, warn};

use crate::error::TableError;
use crate::ident::AttrId;
use crate::tx::TxId;
use crate::undo::{CellReader, UndoCell, UndoRead};

/// One recorded slot write.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEdit {
    /// Attribute written.
    pub attr: AttrId,
    /// Slot index written.
    pub id: usize,
    /// Cells saved before the write.
    pub before: Vec<UndoCell>,
    /// Cells saved after the write.
    pub after: Vec<UndoCell>,
}

/// A committed group of edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TxId,
    edits: Vec<SlotEdit>,
}

impl Transaction {
    /// Transaction identifier.
    #[must_use]
    pub fn id(&self) -> TxId {
        self.id
    }

    /// Edits in recording order.
    #[must_use]
    pub fn edits(&self) -> &[SlotEdit] {
        &self.edits
    }
}

/// Destination of replayed cells.
pub trait ReplayTarget {
    /// Checks that slot `id` of attribute `attr` can accept replayed cells.
    ///
    /// # Errors
    /// Returns an error if the attribute is unknown or the slot is out of
    /// range.
    fn check_slot(&self, attr: AttrId, id: usize) -> Result<(), TableError>;

    /// Restores slot `id` of attribute `attr` from `reader`.
    ///
    /// # Errors
    /// Returns an error if the attribute is unknown or the store rejects the
    /// cells.
    fn replay_slot(
        &mut self,
        attr: AttrId,
        id: usize,
        reader: &mut dyn UndoRead,
    ) -> Result<(), TableError>;
}

/// Undo/redo log.
#[derive(Debug, Clone)]
pub struct UndoLog {
    depth: usize,
    next_tx: u64,
    open: Option<Transaction>,
    done: VecDeque<Transaction>,
    undone: Vec<Transaction>,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(256)
    }
}

impl UndoLog {
    /// Creates a log retaining at most `depth` committed transactions.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            next_tx: 1,
            open: None,
            done: VecDeque::new(),
            undone: Vec::new(),
        }
    }

    fn issue(&mut self) -> TxId {
        let id = TxId::from_raw(self.next_tx);
        self.next_tx = self.next_tx.wrapping_add(1);
        if self.next_tx == 0 {
            self.next_tx = 1;
        }
        id
    }

    fn push_done(&mut self, tx: Transaction) {
        self.undone.clear();
        self.done.push_back(tx);
        while self.done.len() > self.depth {
            self.done.pop_front();
        }
    }

    /// Opens a transaction, or returns the id of the one already open.
    pub fn begin(&mut self) -> TxId {
        if let Some(open) = &self.open {
            return open.id;
        }
        let id = self.issue();
        self.open = Some(Transaction {
            id,
            edits: Vec::new(),
        });
        id
    }

    /// Records an edit into the open transaction, or as its own transaction.
    pub fn record(&mut self, edit: SlotEdit) {
        if let Some(open) = &mut self.open {
            open.edits.push(edit);
            return;
        }
        let id = self.issue();
        self.push_done(Transaction {
            id,
            edits: vec![edit],
        });
    }

    /// Closes the open transaction. Empty transactions are dropped.
    ///
    /// Returns the committed id, if anything was committed.
    pub fn commit(&mut self) -> Option<TxId> {
        let tx = self.open.take()?;
        if tx.edits.is_empty() {
            return None;
        }
        let id = tx.id;
        trace!(tx = %id, edits = tx.edits.len(), "committed undo transaction");
        self.push_done(tx);
        Some(id)
    }

    /// Maximum number of retained committed transactions.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` while a transaction is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Returns `true` if a committed transaction can be undone.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty() || self.open.as_ref().is_some_and(|tx| !tx.edits.is_empty())
    }

    /// Returns `true` if an undone transaction can be redone.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Committed transactions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Transaction> {
        self.done.iter()
    }

    /// Drops all history, including any open transaction.
    pub fn clear(&mut self) {
        self.open = None;
        self.done.clear();
        self.undone.clear();
    }

    /// Reverses the most recent transaction, committing any open one first.
    ///
    /// Edits are replayed newest first from their `before` cells. Every slot
    /// is checked before anything is written; on failure the transaction
    /// stays on the undo stack and no slot is left half-reverted.
    ///
    /// # Errors
    /// Propagates the first check or replay failure.
    pub fn undo<R>(&mut self, target: &mut R) -> Result<Option<TxId>, TableError>
    where
        R: ReplayTarget + ?Sized,
    {
        self.commit();
        let Some(tx) = self.done.pop_back() else {
            return Ok(None);
        };
        if let Err(err) = replay(target, tx.edits.iter().rev(), Side::Before) {
            self.done.push_back(tx);
            return Err(err);
        }
        trace!(tx = %tx.id, "undid transaction");
        let id = tx.id;
        self.undone.push(tx);
        Ok(Some(id))
    }

    /// Re-applies the most recently undone transaction.
    ///
    /// Edits are replayed oldest first from their `after` cells, with the
    /// same all-or-nothing guarantee as [`Self::undo`].
    ///
    /// # Errors
    /// Propagates the first check or replay failure.
    pub fn redo<R>(&mut self, target: &mut R) -> Result<Option<TxId>, TableError>
    where
        R: ReplayTarget + ?Sized,
    {
        if self.open.is_some() {
            return Ok(None);
        }
        let Some(tx) = self.undone.pop() else {
            return Ok(None);
        };
        if let Err(err) = replay(target, tx.edits.iter(), Side::After) {
            self.undone.push(tx);
            return Err(err);
        }
        trace!(tx = %tx.id, "redid transaction");
        let id = tx.id;
        self.done.push_back(tx);
        Ok(Some(id))
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Before,
    After,
}

impl Side {
    fn cells(self, edit: &SlotEdit) -> &[UndoCell] {
        match self {
            Self::Before => &edit.before,
            Self::After => &edit.after,
        }
    }

    const fn opposite(self) -> Self {
        match self {
            Self::Before => Self::After,
            Self::After => Self::Before,
        }
    }
}

/// Replays `edits` in the given order, writing the `side` cells of each.
///
/// Slots are checked up front. If a store still rejects cells mid-way, the
/// edits already applied are written back from the opposite side.
fn replay<'a, R, I>(target: &mut R, edits: I, side: Side) -> Result<(), TableError>
where
    R: ReplayTarget + ?Sized,
    I: Iterator<Item = &'a SlotEdit> + Clone,
{
    for edit in edits.clone() {
        target.check_slot(edit.attr, edit.id)?;
    }
    let mut applied: Vec<&SlotEdit> = Vec::new();
    for edit in edits {
        let mut reader = CellReader::new(side.cells(edit));
        if let Err(err) = target.replay_slot(edit.attr, edit.id, &mut reader) {
            for done in applied.iter().rev() {
                let mut reader = CellReader::new(side.opposite().cells(done));
                if let Err(rollback) = target.replay_slot(done.attr, done.id, &mut reader) {
                    warn!(attr = %done.attr, id = done.id, %rollback, "undo rollback failed");
                }
            }
            return Err(err);
        }
        applied.push(edit);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::AttrError;

    #[derive(Default)]
    struct Cells {
        slots: Vec<i64>,
        /// Slot whose replay is refused after passing the range check.
        refuse: Option<usize>,
    }

    impl ReplayTarget for Cells {
        fn check_slot(&self, _attr: AttrId, id: usize) -> Result<(), TableError> {
            if id < self.slots.len() {
                return Ok(());
            }
            Err(AttrError::IndexOutOfRange {
                id,
                capacity: self.slots.len(),
            }
            .into())
        }

        fn replay_slot(
            &mut self,
            _attr: AttrId,
            id: usize,
            reader: &mut dyn UndoRead,
        ) -> Result<(), TableError> {
            if self.refuse == Some(id) {
                return Err(AttrError::InvalidArgument {
                    type_name: "long",
                    reason: "refused".into(),
                }
                .into());
            }
            let value = reader
                .take_long()
                .map_err(|err| TableError::Attr(err.into()))?;
            self.slots[id] = value;
            Ok(())
        }
    }

    fn cells(slots: Vec<i64>) -> Cells {
        Cells {
            slots,
            refuse: None,
        }
    }

    fn edit(id: usize, before: i64, after: i64) -> SlotEdit {
        SlotEdit {
            attr: AttrId(0),
            id,
            before: vec![UndoCell::Long(before)],
            after: vec![UndoCell::Long(after)],
        }
    }

    #[test]
    fn undo_and_redo_walk_transactions() {
        let mut log = UndoLog::new(8);
        let mut cells = cells(vec![3, 4]);

        let tx = log.begin();
        assert_eq!(tx.value(), 1);
        log.record(edit(0, 0, 3));
        log.record(edit(1, 0, 4));
        assert_eq!(log.commit(), Some(tx));

        assert_eq!(log.undo(&mut cells).unwrap(), Some(tx));
        assert_eq!(cells.slots, vec![0, 0]);
        assert!(log.can_redo());
        assert_eq!(log.redo(&mut cells).unwrap(), Some(tx));
        assert_eq!(cells.slots, vec![3, 4]);
        assert_eq!(log.redo(&mut cells).unwrap(), None);
    }

    #[test]
    fn new_edits_discard_redo_tail_and_depth_is_bounded() {
        let mut log = UndoLog::new(2);
        let mut cells = cells(vec![0]);
        log.record(edit(0, 0, 1));
        log.record(edit(0, 1, 2));
        log.record(edit(0, 2, 3));
        assert_eq!(log.history().count(), 2);

        log.undo(&mut cells).unwrap();
        assert!(log.can_redo());
        log.record(edit(0, 2, 9));
        assert!(!log.can_redo());
    }

    #[test]
    fn empty_transactions_are_dropped() {
        let mut log = UndoLog::new(4);
        let first = log.begin();
        assert_eq!(log.begin(), first);
        assert_eq!(log.commit(), None);
        assert!(!log.can_undo());
        assert_ne!(log.begin(), first);
    }

    #[test]
    fn out_of_range_undo_writes_nothing_and_keeps_the_transaction() {
        let mut log = UndoLog::new(4);
        let mut cells = cells(vec![10]);
        let tx = log.begin();
        log.record(edit(1, 0, 30));
        log.record(edit(0, 0, 10));
        log.commit();

        assert!(log.undo(&mut cells).is_err());
        assert_eq!(cells.slots, vec![10]);
        assert!(log.can_undo());
        assert!(!log.can_redo());

        cells.slots.push(30);
        assert_eq!(log.undo(&mut cells).unwrap(), Some(tx));
        assert_eq!(cells.slots, vec![0, 0]);
    }

    #[test]
    fn refused_replay_rolls_back_applied_edits() {
        let mut log = UndoLog::new(4);
        let mut cells = cells(vec![1, 2, 3]);
        let tx = log.begin();
        log.record(edit(0, 0, 1));
        log.record(edit(1, 0, 2));
        log.record(edit(2, 0, 3));
        log.commit();

        // Undo replays slot 2 then slot 1; slot 1 refuses.
        cells.refuse = Some(1);
        assert!(log.undo(&mut cells).is_err());
        assert_eq!(cells.slots, vec![1, 2, 3]);
        assert!(log.can_undo());

        cells.refuse = None;
        assert_eq!(log.undo(&mut cells).unwrap(), Some(tx));
        assert_eq!(cells.slots, vec![0, 0, 0]);

        // Redo replays slot 0 then slot 1; slot 1 refuses.
        cells.refuse = Some(1);
        assert!(log.redo(&mut cells).is_err());
        assert_eq!(cells.slots, vec![0, 0, 0]);
        assert!(log.can_redo());

        cells.refuse = None;
        assert_eq!(log.redo(&mut cells).unwrap(), Some(tx));
        assert_eq!(cells.slots, vec![1, 2, 3]);
    }
}
