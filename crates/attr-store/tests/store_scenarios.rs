// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use attr_store::{
    make_context_id, AttrError, AttrValue, AttributeRegistry, AttributeStore, DecoratorsStore,
    LongStore, ObjectRef, VertexDecorators,
};

fn long_store(capacity: usize) -> Box<dyn AttributeStore> {
    let registry = AttributeRegistry::with_builtins().expect("builtins");
    let mut store = registry.instantiate("long").expect("long type");
    store.set_capacity(capacity);
    store
}

#[test]
fn set_long_reads_back_in_text_and_boolean() {
    let mut store = long_store(5);
    store.set_long(2, 42).unwrap();

    assert_eq!(store.get_string(2).unwrap(), "42");
    assert!(store.get_boolean(2).unwrap());
    assert!(!store.is_clear(2).unwrap());
    assert!(store.is_clear(0).unwrap());
}

#[test]
fn unparseable_text_leaves_default_without_error() {
    let mut store = long_store(5);
    store.set_long(3, 11).unwrap();
    store.set_string(3, "not-a-number").unwrap();
    assert_eq!(store.get_object(3).unwrap(), store.default_value());
    assert!(store.is_clear(3).unwrap());
}

#[test]
fn growth_fills_new_slots_with_current_default() {
    let mut store = long_store(3);
    store.set_long(0, -1).unwrap();
    store.set_long(2, 9).unwrap();
    store.set_default(&AttrValue::Long(7)).unwrap();
    store.set_capacity(6);

    let values: Vec<i64> = (0..6).map(|id| store.get_long(id).unwrap()).collect();
    assert_eq!(values, [-1, 0, 9, 7, 7, 7]);
}

#[test]
fn copy_is_independent_of_original() {
    let mut original = long_store(4);
    original.bind(make_context_id("left"));
    original.set_long(1, 5).unwrap();

    let mut copy = original.copy(make_context_id("right"));
    copy.set_long(1, 6).unwrap();
    copy.set_capacity(8);

    assert_eq!(original.get_long(1).unwrap(), 5);
    assert_eq!(original.capacity(), 4);
    assert_eq!(copy.get_long(1).unwrap(), 6);
    assert_eq!(copy.context(), Some(make_context_id("right")));
    assert_eq!(original.context(), Some(make_context_id("left")));
}

#[test]
fn clear_restores_default_object() {
    let mut store = LongStore::new();
    store.set_capacity(2);
    store.set_default(&AttrValue::Int(3)).unwrap();
    store.set_long(1, 8).unwrap();
    store.clear(1).unwrap();
    assert!(store.is_clear(1).unwrap());
    assert_eq!(store.get_object(1).unwrap(), AttrValue::Long(3));
}

#[test]
fn default_slots_compare_equal() {
    let mut store = long_store(4);
    store.set_long(2, 1).unwrap();
    assert!(store.equals(0, 3).unwrap());
    assert!(!store.equals(0, 2).unwrap());
    assert_eq!(store.hash_code(0).unwrap(), store.hash_code(3).unwrap());
}

#[test]
fn decorators_store_accepts_text_and_objects() {
    let mut store = DecoratorsStore::new();
    store.set_capacity(3);

    store.set_string(0, r#""in";;"out";;"#).unwrap();
    let expected = VertexDecorators::new(Some("in"), None, Some("out"), None);
    assert_eq!(*store.get(0).unwrap(), expected);
    assert_eq!(store.get_string(0).unwrap(), r#""in";;"out";;"#);
    assert!(store.get_boolean(0).unwrap());
    assert_eq!(store.get_long(0).unwrap(), 0);

    let shared = Arc::new(VertexDecorators::new(None, Some("x"), None, None));
    store
        .set_object(1, &AttrValue::Object(ObjectRef::new(Arc::clone(&shared))))
        .unwrap();
    assert!(Arc::ptr_eq(&store.get(1).unwrap(), &shared));

    assert!(store.is_clear(2).unwrap());
    assert_eq!(store.get_string(2).unwrap(), ";;;;");
    assert!(!store.get_boolean(2).unwrap());
}

#[test]
fn decorators_store_rejects_unmappable_input() {
    let mut store = DecoratorsStore::new();
    store.set_capacity(1);
    store.set_string(0, r#""a";;;;"#).unwrap();

    assert!(matches!(
        store.set_long(0, 3),
        Err(AttrError::InvalidArgument {
            type_name: "decorators",
            ..
        })
    ));
    assert!(matches!(
        store.set_string(0, "north"),
        Err(AttrError::InvalidArgument { .. })
    ));
    // Rejected writes leave the slot untouched.
    assert_eq!(store.get_string(0).unwrap(), r#""a";;;;"#);

    store.set_object(0, &AttrValue::Null).unwrap();
    assert!(store.is_clear(0).unwrap());
    assert_eq!(
        store.set_string(4, ";;;;").unwrap_err(),
        AttrError::IndexOutOfRange { id: 4, capacity: 1 }
    );
}

#[test]
fn decorators_copy_shares_values_but_not_column() {
    let mut store = DecoratorsStore::new();
    store.set_capacity(2);
    store.set_string(0, r#""a";;;;"#).unwrap();

    let mut copy = store.copy(make_context_id("copy"));
    copy.set_string(0, r#";"b";;;"#).unwrap();

    assert_eq!(store.get_string(0).unwrap(), r#""a";;;;"#);
    assert_eq!(copy.get_string(0).unwrap(), r#";"b";;;"#);
    assert!(copy.equals(1, 1).unwrap());
}
