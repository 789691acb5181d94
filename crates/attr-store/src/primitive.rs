// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dense stores of primitive native values.
//!
//! One generic implementation serves every primitive width; the per-width
//! behavior lives entirely in [`NativeScalar`]. Writes are total: unparseable
//! text and unsupported generic values fall back to the type's zero value,
//! never to the store's current default.

use std::any::Any;

use crate::coerce::{text_to_native, value_to_native, NativeScalar};
use crate::error::AttrError;
use crate::ident::ContextId;
use crate::snapshot::{ColumnPayload, StoreSnapshot};
use crate::store::{slot, slot_mut, AttributeStore, NativeKind};
use crate::undo::{UndoRead, UndoWidth, UndoWrite};
use crate::value::AttrValue;

/// `byte` attribute store.
pub type ByteStore = PrimitiveStore<i8>;
/// `short` attribute store.
pub type ShortStore = PrimitiveStore<i16>;
/// `integer` attribute store.
pub type IntegerStore = PrimitiveStore<i32>;
/// `long` attribute store.
pub type LongStore = PrimitiveStore<i64>;
/// `float` attribute store.
pub type FloatStore = PrimitiveStore<f32>;
/// `double` attribute store.
pub type DoubleStore = PrimitiveStore<f64>;
/// `boolean` attribute store.
pub type BooleanStore = PrimitiveStore<bool>;

/// Dense column of `T` values.
#[derive(Debug, Clone)]
pub struct PrimitiveStore<T> {
    data: Vec<T>,
    default: T,
    context: Option<ContextId>,
}

impl<T: NativeScalar> Default for PrimitiveStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativeScalar> PrimitiveStore<T> {
    /// Creates an empty, unbound store with the type-zero default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            default: T::ZERO,
            context: None,
        }
    }

    /// Factory used by the registry.
    #[must_use]
    pub fn boxed() -> Box<dyn AttributeStore> {
        Box::new(Self::new())
    }

    /// Current default in native form.
    #[must_use]
    pub fn native_default(&self) -> T {
        self.default
    }

    /// Read-only view of the backing column.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Reads slot `id` in native form.
    ///
    /// # Errors
    /// Returns [`AttrError::IndexOutOfRange`] outside `[0, capacity)`.
    pub fn get(&self, id: usize) -> Result<T, AttrError> {
        slot(&self.data, id).copied()
    }

    /// Writes slot `id` in native form.
    ///
    /// # Errors
    /// Returns [`AttrError::IndexOutOfRange`] outside `[0, capacity)`.
    pub fn set(&mut self, id: usize, value: T) -> Result<(), AttrError> {
        *slot_mut(&mut self.data, id)? = value;
        Ok(())
    }
}

impl<T: NativeScalar> AttributeStore for PrimitiveStore<T> {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn native_kind(&self) -> NativeKind {
        T::KIND
    }

    fn ordering(&self) -> i32 {
        T::ORDERING
    }

    fn undo_width(&self) -> UndoWidth {
        UndoWidth::Long
    }

    fn context(&self) -> Option<ContextId> {
        self.context
    }

    fn bind(&mut self, context: ContextId) {
        self.context = Some(context);
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn set_capacity(&mut self, capacity: usize) {
        // `resize` keeps the prefix and fills only the appended tail.
        self.data.resize(capacity, self.default);
    }

    fn default_value(&self) -> AttrValue {
        self.default.to_value()
    }

    fn set_default(&mut self, value: &AttrValue) -> Result<(), AttrError> {
        self.default = value_to_native(value, T::ZERO);
        Ok(())
    }

    fn get_byte(&self, id: usize) -> Result<i8, AttrError> {
        Ok(self.get(id)?.to_i8())
    }

    fn get_short(&self, id: usize) -> Result<i16, AttrError> {
        Ok(self.get(id)?.to_i16())
    }

    fn get_int(&self, id: usize) -> Result<i32, AttrError> {
        Ok(self.get(id)?.to_i32())
    }

    fn get_long(&self, id: usize) -> Result<i64, AttrError> {
        Ok(self.get(id)?.to_i64())
    }

    fn get_float(&self, id: usize) -> Result<f32, AttrError> {
        Ok(self.get(id)?.to_f32())
    }

    fn get_double(&self, id: usize) -> Result<f64, AttrError> {
        Ok(self.get(id)?.to_f64())
    }

    fn get_boolean(&self, id: usize) -> Result<bool, AttrError> {
        Ok(self.get(id)?.to_bool())
    }

    fn get_char(&self, id: usize) -> Result<char, AttrError> {
        Ok(self.get(id)?.to_char())
    }

    fn get_string(&self, id: usize) -> Result<String, AttrError> {
        Ok(self.get(id)?.to_text())
    }

    fn get_object(&self, id: usize) -> Result<AttrValue, AttrError> {
        Ok(self.get(id)?.to_value())
    }

    fn set_byte(&mut self, id: usize, value: i8) -> Result<(), AttrError> {
        self.set(id, T::from_i64(i64::from(value)))
    }

    fn set_short(&mut self, id: usize, value: i16) -> Result<(), AttrError> {
        self.set(id, T::from_i64(i64::from(value)))
    }

    fn set_int(&mut self, id: usize, value: i32) -> Result<(), AttrError> {
        self.set(id, T::from_i64(i64::from(value)))
    }

    fn set_long(&mut self, id: usize, value: i64) -> Result<(), AttrError> {
        self.set(id, T::from_i64(value))
    }

    fn set_float(&mut self, id: usize, value: f32) -> Result<(), AttrError> {
        self.set(id, T::from_f64(f64::from(value)))
    }

    fn set_double(&mut self, id: usize, value: f64) -> Result<(), AttrError> {
        self.set(id, T::from_f64(value))
    }

    fn set_boolean(&mut self, id: usize, value: bool) -> Result<(), AttrError> {
        self.set(id, T::from_bool(value))
    }

    fn set_char(&mut self, id: usize, value: char) -> Result<(), AttrError> {
        self.set(id, T::from_char(value))
    }

    fn set_string(&mut self, id: usize, value: &str) -> Result<(), AttrError> {
        self.set(id, text_to_native(value, T::ZERO))
    }

    fn set_object(&mut self, id: usize, value: &AttrValue) -> Result<(), AttrError> {
        self.set(id, value_to_native(value, T::ZERO))
    }

    fn is_clear(&self, id: usize) -> Result<bool, AttrError> {
        Ok(self.get(id)?.same(self.default))
    }

    fn clear(&mut self, id: usize) -> Result<(), AttrError> {
        self.set(id, self.default)
    }

    fn copy(&self, context: ContextId) -> Box<dyn AttributeStore> {
        Box::new(Self {
            data: self.data.clone(),
            default: self.default,
            context: Some(context),
        })
    }

    fn hash_code(&self, id: usize) -> Result<i32, AttrError> {
        Ok(self.get(id)?.hash32())
    }

    fn equals(&self, id1: usize, id2: usize) -> Result<bool, AttrError> {
        Ok(self.get(id1)?.same(self.get(id2)?))
    }

    fn save(&self, id: usize, writer: &mut dyn UndoWrite) -> Result<(), AttrError> {
        writer.put_long(self.get(id)?.to_undo_bits());
        Ok(())
    }

    fn restore(&mut self, id: usize, reader: &mut dyn UndoRead) -> Result<(), AttrError> {
        // Validate the slot before consuming the cell.
        slot(&self.data, id)?;
        let bits = reader.take_long()?;
        self.set(id, T::from_undo_bits(bits))
    }

    fn save_data(&self) -> Result<StoreSnapshot, AttrError> {
        let column = ColumnPayload {
            default: self.default,
            data: self.data.clone(),
        };
        Ok(StoreSnapshot::encode(T::TYPE_NAME, &column)?)
    }

    fn restore_data(&mut self, snapshot: &StoreSnapshot) -> Result<(), AttrError> {
        let column: ColumnPayload<T> = snapshot.decode(T::TYPE_NAME)?;
        self.default = column.default;
        self.data = column.data;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::undo::{CellReader, CellWriter};

    #[test]
    fn long_store_reads_in_every_representation() {
        let mut store = LongStore::new();
        store.set_capacity(5);
        store.set_long(2, 42).unwrap();

        assert_eq!(store.get_string(2).unwrap(), "42");
        assert!(store.get_boolean(2).unwrap());
        assert!(!store.is_clear(2).unwrap());
        assert!(store.is_clear(0).unwrap());
        assert_eq!(store.get_double(2).unwrap(), 42.0);
        assert_eq!(store.get_char(2).unwrap(), '*');
        assert_eq!(store.get_object(2).unwrap(), AttrValue::Long(42));
    }

    #[test]
    fn unparseable_text_falls_back_to_zero_not_the_current_default() {
        let mut store = LongStore::new();
        store.set_capacity(4);
        store.set_long(3, 99).unwrap();
        store.set_string(3, "not-a-number").unwrap();
        assert_eq!(store.get_long(3).unwrap(), 0);

        store.set_default(&AttrValue::Long(7)).unwrap();
        store.set_long(3, 99).unwrap();
        store.set_string(3, "").unwrap();
        assert_eq!(store.get_long(3).unwrap(), 0);
        store.set_object(2, &AttrValue::Null).unwrap();
        assert_eq!(store.get_long(2).unwrap(), 0);
        assert!(!store.is_clear(2).unwrap());
    }

    #[test]
    fn null_default_resets_to_zero() {
        let mut store = LongStore::new();
        store.set_capacity(1);
        store.set_default(&AttrValue::Long(7)).unwrap();
        store.set_default(&AttrValue::Null).unwrap();
        assert_eq!(store.default_value(), AttrValue::Long(0));

        store.set_default(&AttrValue::Long(7)).unwrap();
        store.set_default(&AttrValue::Str("junk".into())).unwrap();
        assert_eq!(store.default_value(), AttrValue::Long(0));
    }

    #[test]
    fn out_of_range_is_reported_not_clamped() {
        let mut store = IntegerStore::new();
        store.set_capacity(2);
        assert_eq!(
            store.get_int(2).unwrap_err(),
            AttrError::IndexOutOfRange { id: 2, capacity: 2 }
        );
        assert!(store.set_int(5, 1).is_err());
        assert!(store.equals(0, 9).is_err());
    }

    #[test]
    fn float_store_round_trips_nan_through_undo() {
        let mut store = FloatStore::new();
        store.set_capacity(2);
        store.set_float(0, f32::NAN).unwrap();
        assert!(store.equals(0, 0).unwrap());

        let mut writer = CellWriter::new();
        store.save(0, &mut writer).unwrap();
        let cells = writer.into_cells();
        store.restore(1, &mut CellReader::new(&cells)).unwrap();
        assert_eq!(
            store.as_slice()[1].to_bits(),
            store.as_slice()[0].to_bits()
        );
    }

    #[test]
    fn default_change_is_not_retroactive() {
        let mut store = ShortStore::new();
        store.set_capacity(2);
        store.set_default(&AttrValue::Str("12".into())).unwrap();
        assert_eq!(store.get_short(0).unwrap(), 0);
        assert!(!store.is_clear(0).unwrap());
        store.clear(0).unwrap();
        assert_eq!(store.get_short(0).unwrap(), 12);
    }

    #[test]
    fn boolean_store_coerces_numbers_and_text() {
        let mut store = BooleanStore::new();
        store.set_capacity(3);
        store.set_long(0, -3).unwrap();
        store.set_string(1, "TRUE").unwrap();
        store.set_double(2, 0.0).unwrap();
        assert!(store.get_boolean(0).unwrap());
        assert!(store.get_boolean(1).unwrap());
        assert_eq!(store.get_int(2).unwrap(), 0);
        assert_eq!(store.get_string(0).unwrap(), "true");
        assert_eq!(store.hash_code(0).unwrap(), 1);
    }
}
