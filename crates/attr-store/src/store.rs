// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The uniform capability every attribute store implements.
//!
//! A store owns one dense, zero-based column of values for a single attribute.
//! The graph core manipulates stores of unknown concrete type exclusively
//! through [`AttributeStore`]; every slot accessor fails with
//! [`AttrError::IndexOutOfRange`] outside `[0, capacity)` and never clamps.

use std::any::Any;
use std::fmt::Debug;

use crate::error::AttrError;
use crate::ident::ContextId;
use crate::snapshot::StoreSnapshot;
use crate::undo::{UndoRead, UndoWidth, UndoWrite};
use crate::value::AttrValue;

/// Native representation backing an attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NativeKind {
    /// `i8` column.
    Byte,
    /// `i16` column.
    Short,
    /// `i32` column.
    Int,
    /// `i64` column.
    Long,
    /// `f32` column.
    Float,
    /// `f64` column.
    Double,
    /// `bool` column.
    Boolean,
    /// Column of shared immutable value objects.
    Object,
}

/// Typed access to one attribute column.
///
/// Reads are total for valid indices: each store converts its native value to
/// whichever representation is requested. Writes from primitive
/// representations into primitive stores are total as well (unparseable text
/// falls back to the type's zero value); object-backed stores reject input they cannot
/// map with [`AttrError::InvalidArgument`].
pub trait AttributeStore: Debug + Send + Sync {
    /// Registered attribute type name.
    fn type_name(&self) -> &'static str;
    /// Native representation of the column.
    fn native_kind(&self) -> NativeKind;
    /// Cross-type ordering rank; stable per type.
    fn ordering(&self) -> i32;
    /// Width of one slot in the undo channel.
    fn undo_width(&self) -> UndoWidth;

    /// Graph context this store is bound to, if any.
    fn context(&self) -> Option<ContextId>;
    /// Binds the store to an owning graph context.
    fn bind(&mut self, context: ContextId);

    /// Number of addressable slots.
    fn capacity(&self) -> usize;
    /// Grows or shrinks the column in place.
    ///
    /// Slots below `min(old, new)` keep their values; new slots hold the
    /// current default. Shrinking discards the truncated slots.
    fn set_capacity(&mut self, capacity: usize);

    /// Current default value.
    fn default_value(&self) -> AttrValue;
    /// Replaces the default, coercing `value` the same way `set_object` does.
    ///
    /// Existing slots are not rewritten.
    fn set_default(&mut self, value: &AttrValue) -> Result<(), AttrError>;

    /// Reads slot `id` as a byte.
    fn get_byte(&self, id: usize) -> Result<i8, AttrError>;
    /// Reads slot `id` as a short.
    fn get_short(&self, id: usize) -> Result<i16, AttrError>;
    /// Reads slot `id` as an int.
    fn get_int(&self, id: usize) -> Result<i32, AttrError>;
    /// Reads slot `id` as a long.
    fn get_long(&self, id: usize) -> Result<i64, AttrError>;
    /// Reads slot `id` as a float.
    fn get_float(&self, id: usize) -> Result<f32, AttrError>;
    /// Reads slot `id` as a double.
    fn get_double(&self, id: usize) -> Result<f64, AttrError>;
    /// Reads slot `id` as a boolean.
    fn get_boolean(&self, id: usize) -> Result<bool, AttrError>;
    /// Reads slot `id` as a char.
    fn get_char(&self, id: usize) -> Result<char, AttrError>;
    /// Reads slot `id` as text.
    fn get_string(&self, id: usize) -> Result<String, AttrError>;
    /// Reads slot `id` as a generic value.
    fn get_object(&self, id: usize) -> Result<AttrValue, AttrError>;

    /// Writes a byte into slot `id`.
    fn set_byte(&mut self, id: usize, value: i8) -> Result<(), AttrError>;
    /// Writes a short into slot `id`.
    fn set_short(&mut self, id: usize, value: i16) -> Result<(), AttrError>;
    /// Writes an int into slot `id`.
    fn set_int(&mut self, id: usize, value: i32) -> Result<(), AttrError>;
    /// Writes a long into slot `id`.
    fn set_long(&mut self, id: usize, value: i64) -> Result<(), AttrError>;
    /// Writes a float into slot `id`.
    fn set_float(&mut self, id: usize, value: f32) -> Result<(), AttrError>;
    /// Writes a double into slot `id`.
    fn set_double(&mut self, id: usize, value: f64) -> Result<(), AttrError>;
    /// Writes a boolean into slot `id`.
    fn set_boolean(&mut self, id: usize, value: bool) -> Result<(), AttrError>;
    /// Writes a char into slot `id`.
    fn set_char(&mut self, id: usize, value: char) -> Result<(), AttrError>;
    /// Writes text into slot `id`.
    fn set_string(&mut self, id: usize, value: &str) -> Result<(), AttrError>;
    /// Writes a generic value into slot `id`.
    fn set_object(&mut self, id: usize, value: &AttrValue) -> Result<(), AttrError>;

    /// Returns `true` iff slot `id` equals the current default.
    fn is_clear(&self, id: usize) -> Result<bool, AttrError>;
    /// Resets slot `id` to the current default.
    fn clear(&mut self, id: usize) -> Result<(), AttrError>;

    /// Produces an independent deep copy bound to `context`.
    fn copy(&self, context: ContextId) -> Box<dyn AttributeStore>;

    /// 32-bit hash of slot `id`, consistent with [`AttributeStore::equals`].
    fn hash_code(&self, id: usize) -> Result<i32, AttrError>;
    /// Native value equality between two slots.
    fn equals(&self, id1: usize, id2: usize) -> Result<bool, AttrError>;

    /// Writes exactly one undo cell holding slot `id`.
    fn save(&self, id: usize, writer: &mut dyn UndoWrite) -> Result<(), AttrError>;
    /// Reads exactly one undo cell into slot `id`.
    fn restore(&mut self, id: usize, reader: &mut dyn UndoRead) -> Result<(), AttrError>;

    /// Snapshots the whole column and its default.
    fn save_data(&self) -> Result<StoreSnapshot, AttrError>;
    /// Replaces the whole column and default from a snapshot.
    ///
    /// The capacity becomes the snapshot's length.
    fn restore_data(&mut self, snapshot: &StoreSnapshot) -> Result<(), AttrError>;

    /// Downcasting hook for callers that know the concrete store type.
    fn as_any(&self) -> &dyn Any;
}

pub(crate) fn slot<T>(data: &[T], id: usize) -> Result<&T, AttrError> {
    data.get(id).ok_or(AttrError::IndexOutOfRange {
        id,
        capacity: data.len(),
    })
}

pub(crate) fn slot_mut<T>(data: &mut [T], id: usize) -> Result<&mut T, AttrError> {
    let capacity = data.len();
    data.get_mut(id)
        .ok_or(AttrError::IndexOutOfRange { id, capacity })
}
