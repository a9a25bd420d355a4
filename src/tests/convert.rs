// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::context;
use crate::Value;

#[test]
fn to_object_wraps_primitives_with_builtin_prototypes() {
    let context = context();
    let engine = context.engine();

    for (primitive, prototype) in [
        (Value::Number, engine.number_prototype()),
        (Value::Boolean, engine.boolean_prototype()),
        (Value::String, engine.string_prototype()),
    ] {
        let wrapped = context.convert_to_object(primitive);
        let object = wrapped.as_object().expect("primitive must wrap to object");
        assert_eq!(context.prototype(object), Some(prototype));
    }
}

#[test]
fn to_object_is_idempotent() {
    let context = context();

    for primitive in [Value::Number, Value::Boolean, Value::String] {
        let once = context.convert_to_object(primitive);
        let twice = context.convert_to_object(once);
        assert_eq!(once, twice);
    }
}

#[test]
fn to_object_maps_null_and_undefined() {
    let context = context();

    assert_eq!(context.convert_to_object(Value::Null), Value::Null);
    assert_eq!(context.convert_to_object(Value::Undefined), Value::Null);
}

#[test]
fn to_number_of_primitives_is_the_number_singleton() {
    let context = context();

    for value in [
        Value::Null,
        Value::Undefined,
        Value::Number,
        Value::Boolean,
        Value::String,
    ] {
        assert_eq!(context.convert_to_number(value), Value::Number);
    }
}

#[test]
fn to_number_of_wrapper_goes_through_value_of() {
    let context = context();

    // the Number wrapper's prototype declares valueOf -> number
    let wrapped = context.convert_to_object(Value::Number);
    assert_eq!(context.convert_to_number(wrapped), Value::Number);

    // a bare object only sees Object.prototype.valueOf, which declares no
    // return kind, so the conversion stays unknown
    let plain = context.engine().new_object();
    assert_eq!(
        context.convert_to_number(Value::Object(plain)),
        Value::Undefined
    );
}

#[test]
fn to_string_of_objects_goes_through_to_string_member() {
    let context = context();

    let plain = context.engine().new_object();
    assert_eq!(
        context.convert_to_string(Value::Object(plain)),
        Value::String
    );
    assert_eq!(context.convert_to_string(Value::Number), Value::String);
}

#[test]
fn to_number_of_color_is_unknown() {
    let context = context();

    assert_eq!(context.convert_to_number(Value::Color), Value::Undefined);
}

#[test]
fn type_ids_of_primitives() {
    let context = context();

    assert_eq!(context.type_id(Value::Null), "null");
    assert_eq!(context.type_id(Value::Undefined), "undefined");
    assert_eq!(context.type_id(Value::Number), "number");
    assert_eq!(context.type_id(Value::Boolean), "boolean");
    assert_eq!(context.type_id(Value::String), "string");
    assert_eq!(context.type_id(Value::Color), "string");
    assert_eq!(context.type_id(Value::AnchorLine), "AnchorLine");
}

#[test]
fn type_ids_of_objects_fall_back_to_kind_names() {
    let context = context();
    let engine = context.engine();

    let anonymous = engine.new_object();
    assert_eq!(context.type_id(Value::Object(anonymous)), "object");

    let named = engine.new_object();
    engine.set_class_name(named, "Rectangle");
    assert_eq!(context.type_id(Value::Object(named)), "Rectangle");

    let function = engine.new_function();
    assert_eq!(context.type_id(Value::Function(function)), "Function");
}

#[test]
fn type_id_of_global_object() {
    let context = context();

    assert_eq!(
        context.type_id(Value::Object(context.engine().global_object())),
        "Global"
    );
}
