// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Catalog of attribute types keyed by type name.
//!
//! The registry is an explicitly constructed value: build it once at startup
//! (usually via [`AttributeRegistry::with_builtins`]) and hand it to every
//! graph context. It never holds per-graph data; each lookup instantiates a
//! fresh, empty store.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::coerce::NativeScalar;
use crate::decorators::VertexDecorators;
use crate::error::RegistryError;
use crate::object::{ObjectStore, ObjectValue};
use crate::primitive::PrimitiveStore;
use crate::store::{AttributeStore, NativeKind};

/// Factory producing a fresh, empty, unbound store.
pub type StoreFactory = fn() -> Box<dyn AttributeStore>;

/// Registered attribute type.
#[derive(Debug, Clone, Copy)]
pub struct AttributeType {
    /// Unique type name.
    pub name: &'static str,
    /// Native representation.
    pub native: NativeKind,
    /// Cross-type ordering rank.
    pub ordering: i32,
    /// Store factory.
    pub factory: StoreFactory,
}

impl AttributeType {
    /// Descriptor for a primitive store of `T`.
    #[must_use]
    pub fn primitive<T: NativeScalar>() -> Self {
        Self {
            name: T::TYPE_NAME,
            native: T::KIND,
            ordering: T::ORDERING,
            factory: PrimitiveStore::<T>::boxed,
        }
    }

    /// Descriptor for an object store of `T`.
    #[must_use]
    pub fn object<T: ObjectValue>() -> Self {
        Self {
            name: T::TYPE_NAME,
            native: NativeKind::Object,
            ordering: T::ORDERING,
            factory: ObjectStore::<T>::boxed,
        }
    }

    /// Instantiates a fresh store.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn AttributeStore> {
        (self.factory)()
    }
}

/// Attribute type registry.
#[derive(Debug, Default)]
pub struct AttributeRegistry {
    types: FxHashMap<&'static str, AttributeType>,
}

impl AttributeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in attribute type.
    ///
    /// # Errors
    /// Propagates [`RegistryError::DuplicateRegistration`]; the built-in set is
    /// duplicate-free, so this only fails if the set itself is broken.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(AttributeType::primitive::<bool>())?;
        registry.register(AttributeType::primitive::<i8>())?;
        registry.register(AttributeType::primitive::<i16>())?;
        registry.register(AttributeType::primitive::<i32>())?;
        registry.register(AttributeType::primitive::<i64>())?;
        registry.register(AttributeType::primitive::<f32>())?;
        registry.register(AttributeType::primitive::<f64>())?;
        registry.register(AttributeType::object::<VertexDecorators>())?;
        Ok(registry)
    }

    /// Registers an attribute type.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateRegistration`] if the name is taken.
    pub fn register(&mut self, ty: AttributeType) -> Result<(), RegistryError> {
        if self.types.contains_key(ty.name) {
            return Err(RegistryError::DuplicateRegistration(ty.name.to_owned()));
        }
        debug!(name = ty.name, ordering = ty.ordering, "registered attribute type");
        self.types.insert(ty.name, ty);
        Ok(())
    }

    /// Looks up a type by name.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] for unknown names.
    pub fn lookup(&self, name: &str) -> Result<&AttributeType, RegistryError> {
        self.types
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_owned()))
    }

    /// Instantiates a fresh store of the named type.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] for unknown names.
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn AttributeStore>, RegistryError> {
        Ok(self.lookup(name)?.instantiate())
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered types sorted by `(ordering, name)`.
    #[must_use]
    pub fn types(&self) -> Vec<&AttributeType> {
        let mut out: Vec<&AttributeType> = self.types.values().collect();
        out.sort_by_key(|ty| (ty.ordering, ty.name));
        out
    }
}
