// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dense stores of shared immutable value objects.
//!
//! Object-backed stores are stricter than primitive ones: input that is
//! neither the native object type nor its textual encoding is rejected with
//! [`AttrError::InvalidArgument`] instead of falling back to the type's
//! built-in default.
//! Primitive representations are read totally: text is the value's canonical
//! encoding, `boolean` reports whether the slot holds a non-default value, and
//! numeric or `char` reads yield zero.

use std::any::Any;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AttrError, UndoError};
use crate::ident::ContextId;
use crate::snapshot::{ColumnPayload, StoreSnapshot};
use crate::store::{slot, slot_mut, AttributeStore, NativeKind};
use crate::undo::{UndoRead, UndoWidth, UndoWrite};
use crate::value::{AttrValue, ErasedObject, ObjectRef};

/// An immutable value type stored by reference in an [`ObjectStore`].
pub trait ObjectValue:
    Clone + Eq + Hash + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Registered attribute type name.
    const TYPE_NAME: &'static str;
    /// Cross-type ordering rank.
    const ORDERING: i32;

    /// Built-in default value.
    fn default_value() -> Self;
    /// Parses the canonical textual encoding.
    ///
    /// # Errors
    /// Returns a human-readable reason when `text` is not a valid encoding.
    fn parse_text(text: &str) -> Result<Self, String>;
    /// Canonical textual encoding.
    fn to_text(&self) -> String;
}

impl<T: ObjectValue> ErasedObject for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn text(&self) -> String {
        self.to_text()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn eq_dyn(&self, other: &dyn ErasedObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

/// Dense column of `Arc<T>` values.
#[derive(Debug, Clone)]
pub struct ObjectStore<T> {
    data: Vec<Arc<T>>,
    default: Arc<T>,
    context: Option<ContextId>,
}

impl<T: ObjectValue> Default for ObjectStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ObjectValue> ObjectStore<T> {
    /// Creates an empty, unbound store with the type's built-in default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            default: Arc::new(T::default_value()),
            context: None,
        }
    }

    /// Factory used by the registry.
    #[must_use]
    pub fn boxed() -> Box<dyn AttributeStore> {
        Box::new(Self::new())
    }

    /// Reads slot `id` as a shared native value.
    ///
    /// # Errors
    /// Returns [`AttrError::IndexOutOfRange`] outside `[0, capacity)`.
    pub fn get(&self, id: usize) -> Result<Arc<T>, AttrError> {
        slot(&self.data, id).map(Arc::clone)
    }

    /// Writes a native value into slot `id`.
    ///
    /// # Errors
    /// Returns [`AttrError::IndexOutOfRange`] outside `[0, capacity)`.
    pub fn set(&mut self, id: usize, value: Arc<T>) -> Result<(), AttrError> {
        *slot_mut(&mut self.data, id)? = value;
        Ok(())
    }

    /// Current default in native form.
    #[must_use]
    pub fn native_default(&self) -> Arc<T> {
        Arc::clone(&self.default)
    }

    fn invalid(reason: String) -> AttrError {
        AttrError::InvalidArgument {
            type_name: T::TYPE_NAME,
            reason,
        }
    }

    fn convert_text(text: &str) -> Result<Arc<T>, AttrError> {
        if text.is_empty() {
            return Ok(Arc::new(T::default_value()));
        }
        T::parse_text(text).map(Arc::new).map_err(Self::invalid)
    }

    /// Maps `value` to the native type. `Null` and empty text map to the
    /// type's built-in default, never to the store's current default.
    fn convert(value: &AttrValue) -> Result<Arc<T>, AttrError> {
        match value {
            AttrValue::Null => Ok(Arc::new(T::default_value())),
            AttrValue::Object(obj) => obj.downcast::<T>().ok_or_else(|| {
                Self::invalid(format!("cannot convert `{}` object", obj.type_name()))
            }),
            AttrValue::Str(text) => Self::convert_text(text),
            other => Err(Self::invalid(format!(
                "cannot convert {} value",
                other.kind_name()
            ))),
        }
    }

    fn assign(&mut self, id: usize, value: &AttrValue) -> Result<(), AttrError> {
        slot(&self.data, id)?;
        let converted = Self::convert(value)?;
        self.set(id, converted)
    }

    fn is_default(&self, value: &Arc<T>) -> bool {
        Arc::ptr_eq(value, &self.default) || **value == *self.default
    }
}

impl<T: ObjectValue> AttributeStore for ObjectStore<T> {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Object
    }

    fn ordering(&self) -> i32 {
        T::ORDERING
    }

    fn undo_width(&self) -> UndoWidth {
        UndoWidth::Object
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
        let fill = Arc::clone(&self.default);
        self.data.resize(capacity, fill);
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Object(ObjectRef::new(Arc::clone(&self.default)))
    }

    fn set_default(&mut self, value: &AttrValue) -> Result<(), AttrError> {
        self.default = Self::convert(value)?;
        Ok(())
    }

    fn get_byte(&self, id: usize) -> Result<i8, AttrError> {
        slot(&self.data, id).map(|_| 0)
    }

    fn get_short(&self, id: usize) -> Result<i16, AttrError> {
        slot(&self.data, id).map(|_| 0)
    }

    fn get_int(&self, id: usize) -> Result<i32, AttrError> {
        slot(&self.data, id).map(|_| 0)
    }

    fn get_long(&self, id: usize) -> Result<i64, AttrError> {
        slot(&self.data, id).map(|_| 0)
    }

    fn get_float(&self, id: usize) -> Result<f32, AttrError> {
        slot(&self.data, id).map(|_| 0.0)
    }

    fn get_double(&self, id: usize) -> Result<f64, AttrError> {
        slot(&self.data, id).map(|_| 0.0)
    }

    fn get_boolean(&self, id: usize) -> Result<bool, AttrError> {
        slot(&self.data, id).map(|value| !self.is_default(value))
    }

    fn get_char(&self, id: usize) -> Result<char, AttrError> {
        slot(&self.data, id).map(|_| '\0')
    }

    fn get_string(&self, id: usize) -> Result<String, AttrError> {
        slot(&self.data, id).map(|value| value.to_text())
    }

    fn get_object(&self, id: usize) -> Result<AttrValue, AttrError> {
        Ok(AttrValue::Object(ObjectRef::new(self.get(id)?)))
    }

    fn set_byte(&mut self, id: usize, value: i8) -> Result<(), AttrError> {
        self.assign(id, &AttrValue::Byte(value))
    }

    fn set_short(&mut self, id: usize, value: i16) -> Result<(), AttrError> {
        self.assign(id, &AttrValue::Short(value))
    }

    fn set_int(&mut self, id: usize, value: i32) -> Result<(), AttrError> {
        self.assign(id, &AttrValue::Int(value))
    }

    fn set_long(&mut self, id: usize, value: i64) -> Result<(), AttrError> {
        self.assign(id, &AttrValue::Long(value))
    }

    fn set_float(&mut self, id: usize, value: f32) -> Result<(), AttrError> {
        self.assign(id, &AttrValue::Float(value))
    }

    fn set_double(&mut self, id: usize, value: f64) -> Result<(), AttrError> {
        self.assign(id, &AttrValue::Double(value))
    }

    fn set_boolean(&mut self, id: usize, value: bool) -> Result<(), AttrError> {
        self.assign(id, &AttrValue::Bool(value))
    }

    fn set_char(&mut self, id: usize, value: char) -> Result<(), AttrError> {
        self.assign(id, &AttrValue::Char(value))
    }

    fn set_string(&mut self, id: usize, value: &str) -> Result<(), AttrError> {
        slot(&self.data, id)?;
        let converted = Self::convert_text(value)?;
        self.set(id, converted)
    }

    fn set_object(&mut self, id: usize, value: &AttrValue) -> Result<(), AttrError> {
        self.assign(id, value)
    }

    fn is_clear(&self, id: usize) -> Result<bool, AttrError> {
        slot(&self.data, id).map(|value| self.is_default(value))
    }

    fn clear(&mut self, id: usize) -> Result<(), AttrError> {
        let fill = Arc::clone(&self.default);
        self.set(id, fill)
    }

    fn copy(&self, context: ContextId) -> Box<dyn AttributeStore> {
        // Slot values are immutable; only the column itself is duplicated.
        Box::new(Self {
            data: self.data.clone(),
            default: Arc::clone(&self.default),
            context: Some(context),
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn hash_code(&self, id: usize) -> Result<i32, AttrError> {
        let value = slot(&self.data, id)?;
        let mut hasher = FxHasher::default();
        value.hash(&mut hasher);
        Ok(hasher.finish() as i32)
    }

    fn equals(&self, id1: usize, id2: usize) -> Result<bool, AttrError> {
        let a = slot(&self.data, id1)?;
        let b = slot(&self.data, id2)?;
        Ok(Arc::ptr_eq(a, b) || a == b)
    }

    fn save(&self, id: usize, writer: &mut dyn UndoWrite) -> Result<(), AttrError> {
        writer.put_object(ObjectRef::new(self.get(id)?));
        Ok(())
    }

    fn restore(&mut self, id: usize, reader: &mut dyn UndoRead) -> Result<(), AttrError> {
        slot(&self.data, id)?;
        let obj = reader.take_object()?;
        let value = obj.downcast::<T>().ok_or(UndoError::ObjectTypeMismatch {
            expected: T::TYPE_NAME,
        })?;
        self.set(id, value)
    }

    fn save_data(&self) -> Result<StoreSnapshot, AttrError> {
        let column = ColumnPayload {
            default: &*self.default,
            data: self.data.iter().map(|value| &**value).collect(),
        };
        Ok(StoreSnapshot::encode(T::TYPE_NAME, &column)?)
    }

    fn restore_data(&mut self, snapshot: &StoreSnapshot) -> Result<(), AttrError> {
        let column: ColumnPayload<T> = snapshot.decode(T::TYPE_NAME)?;
        let default = Arc::new(column.default);
        // Slots equal to the default share its allocation again.
        self.data = column
            .data
            .into_iter()
            .map(|value| {
                if value == *default {
                    Arc::clone(&default)
                } else {
                    Arc::new(value)
                }
            })
            .collect();
        self.default = default;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
