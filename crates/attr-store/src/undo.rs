// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Narrow read/write ports between stores and an external transaction log.
//!
//! The log never sees a store's backing array. A store writes exactly one cell
//! of its undo width per `save` and reads exactly one cell of the same width
//! per `restore`. Two widths exist: a signed 64-bit integer and an opaque
//! object reference.

use crate::error::UndoError;
use crate::value::ObjectRef;

/// Undo cell width declared by an attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoWidth {
    /// One `i64` per slot.
    Long,
    /// One shared object reference per slot.
    Object,
}

impl UndoWidth {
    /// Short label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Object => "object",
        }
    }
}

/// Write side of the undo channel.
pub trait UndoWrite {
    /// Appends one `i64` cell.
    fn put_long(&mut self, value: i64);
    /// Appends one object-reference cell.
    fn put_object(&mut self, value: ObjectRef);
}

/// Read side of the undo channel.
pub trait UndoRead {
    /// Consumes one `i64` cell.
    fn take_long(&mut self) -> Result<i64, UndoError>;
    /// Consumes one object-reference cell.
    fn take_object(&mut self) -> Result<ObjectRef, UndoError>;
}

/// One recorded undo cell.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoCell {
    /// `i64` cell.
    Long(i64),
    /// Object-reference cell.
    Object(ObjectRef),
}

impl UndoCell {
    /// Width of this cell.
    #[must_use]
    pub const fn width(&self) -> UndoWidth {
        match self {
            Self::Long(_) => UndoWidth::Long,
            Self::Object(_) => UndoWidth::Object,
        }
    }
}

/// Collects cells written by `save`.
#[derive(Debug, Clone, Default)]
pub struct CellWriter {
    cells: Vec<UndoCell>,
}

impl CellWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<UndoCell> {
        self.cells
    }
}

impl UndoWrite for CellWriter {
    fn put_long(&mut self, value: i64) {
        self.cells.push(UndoCell::Long(value));
    }

    fn put_object(&mut self, value: ObjectRef) {
        self.cells.push(UndoCell::Object(value));
    }
}

/// Replays recorded cells in order.
#[derive(Debug, Clone)]
pub struct CellReader<'a> {
    cells: core::slice::Iter<'a, UndoCell>,
}

impl<'a> CellReader<'a> {
    /// Creates a reader over `cells`.
    #[must_use]
    pub fn new(cells: &'a [UndoCell]) -> Self {
        Self {
            cells: cells.iter(),
        }
    }

    /// Number of cells not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cells.len()
    }
}

impl UndoRead for CellReader<'_> {
    fn take_long(&mut self) -> Result<i64, UndoError> {
        match self.cells.next() {
            Some(UndoCell::Long(v)) => Ok(*v),
            Some(cell) => Err(UndoError::WidthMismatch {
                expected: UndoWidth::Long.label(),
                found: cell.width().label(),
            }),
            None => Err(UndoError::Exhausted),
        }
    }

    fn take_object(&mut self) -> Result<ObjectRef, UndoError> {
        match self.cells.next() {
            Some(UndoCell::Object(v)) => Ok(v.clone()),
            Some(cell) => Err(UndoError::WidthMismatch {
                expected: UndoWidth::Object.label(),
                found: cell.width().label(),
            }),
            None => Err(UndoError::Exhausted),
        }
    }
}
