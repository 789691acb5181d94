// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use attr_store::{
    AttrValue, AttributeRegistry, AttributeTable, AttributeType, ElementKind, NativeKind, ObjectRef,
    ObjectStore, ObjectValue, RegistryError, TableConfig, UndoWidth, VertexDecorators,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Colour {
    r: u8,
    g: u8,
    b: u8,
}

impl ObjectValue for Colour {
    const TYPE_NAME: &'static str = "colour";
    const ORDERING: i32 = 12;

    fn default_value() -> Self {
        Self { r: 0, g: 0, b: 0 }
    }

    fn parse_text(text: &str) -> Result<Self, String> {
        let hex = text.strip_prefix('#').ok_or("missing `#`")?;
        if hex.len() != 6 {
            return Err(format!("expected 6 hex digits, got `{hex}`"));
        }
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16).map_err(|err| err.to_string())
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    fn to_text(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn registry() -> Arc<AttributeRegistry> {
    let mut registry = AttributeRegistry::with_builtins().expect("builtins");
    registry.register(AttributeType::object::<Colour>()).unwrap();
    Arc::new(registry)
}

#[test]
fn registered_object_type_is_usable_through_a_table() {
    let registry = registry();
    let ty = registry.lookup("colour").unwrap();
    assert_eq!(ty.native, NativeKind::Object);
    assert_eq!(registry.types().last().map(|ty| ty.name), Some("colour"));

    let config = TableConfig {
        vertex_capacity: 2,
        ..TableConfig::default()
    };
    let mut t = AttributeTable::new("graph", registry, &config);
    let fill = t.declare(ElementKind::Vertex, "fill", "colour").unwrap();
    assert_eq!(t.store(fill).unwrap().undo_width(), UndoWidth::Object);

    t.set_string(fill, 1, "#ff8000").unwrap();
    assert_eq!(t.store(fill).unwrap().get_string(1).unwrap(), "#ff8000");
    assert!(t.set_string(fill, 1, "orange").is_err());

    let store = t
        .store(fill)
        .unwrap()
        .as_any()
        .downcast_ref::<ObjectStore<Colour>>()
        .unwrap();
    assert_eq!(*store.get(1).unwrap(), Colour { r: 255, g: 128, b: 0 });

    t.undo().unwrap();
    assert!(t.store(fill).unwrap().is_clear(1).unwrap());
}

#[test]
fn foreign_objects_are_rejected() {
    let registry = registry();
    let mut store = registry.instantiate("colour").unwrap();
    store.set_capacity(1);
    let foreign = ObjectRef::new(Arc::new(VertexDecorators::NONE));
    assert!(store.set_object(0, &AttrValue::Object(foreign)).is_err());
}

#[test]
fn reregistering_a_name_is_detected() {
    let mut registry = AttributeRegistry::new();
    registry.register(AttributeType::object::<Colour>()).unwrap();
    assert_eq!(
        registry.register(AttributeType::object::<Colour>()),
        Err(RegistryError::DuplicateRegistration("colour".into()))
    );
    assert_eq!(registry.len(), 1);
}
