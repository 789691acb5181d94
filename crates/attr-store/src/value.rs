// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Generic attribute values.
//!
//! [`AttrValue`] is the loosely typed representation exchanged through
//! `get_object`/`set_object` and used for defaults. Complex value types travel
//! as [`ObjectRef`]: a shared reference to an immutable value object whose
//! concrete type is only known to the store that owns it.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// Object-safe view of an immutable value object.
///
/// Implemented for every [`crate::ObjectValue`]; stores and the undo log hold
/// values through this trait without knowing the concrete type.
pub trait ErasedObject: Any + Debug + Send + Sync {
    /// Attribute type name of the owning store (e.g. `"decorators"`).
    fn type_name(&self) -> &'static str;
    /// Canonical textual encoding of the value.
    fn text(&self) -> String;
    /// Borrowed view for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Owned view for downcasting to `Arc<T>`.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    /// Value equality across the erased boundary.
    fn eq_dyn(&self, other: &dyn ErasedObject) -> bool;
}

/// Shared reference to an immutable value object.
#[derive(Clone, Debug)]
pub struct ObjectRef(Arc<dyn ErasedObject>);

impl ObjectRef {
    /// Wraps a shared value object.
    pub fn new<T: ErasedObject>(value: Arc<T>) -> Self {
        Self(value)
    }

    /// Attribute type name of the referenced value.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Canonical textual encoding of the referenced value.
    pub fn text(&self) -> String {
        self.0.text()
    }

    /// Returns the referenced value as `Arc<T>` when it has type `T`.
    pub fn downcast<T: ErasedObject>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).into_any().downcast::<T>().ok()
    }

    /// Returns `true` if both references point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.eq_dyn(other.0.as_ref())
    }
}

/// Loosely typed attribute value.
///
/// `Null` stands for "no value" and always coerces to the receiving type's
/// built-in default.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// Absent value.
    Null,
    /// Signed 8-bit integer.
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// Boolean.
    Bool(bool),
    /// Character.
    Char(char),
    /// Text.
    Str(String),
    /// Immutable value object of a complex attribute type.
    Object(ObjectRef),
}

impl AttrValue {
    /// Short name of the value's dynamic kind, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` for [`AttrValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_value! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Bool,
    char => Char,
    String => Str,
    ObjectRef => Object,
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl<T> From<Option<T>> for AttrValue
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
