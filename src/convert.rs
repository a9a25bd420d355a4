// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type-level conversions, implemented as value visitors.
//!
//! No numeric or textual coercion is modeled: converting a primitive yields
//! the canonical singleton of the target kind, and converting an object asks
//! for its `valueOf`/`toString` member and narrows that function's declared
//! return value. A conversion with no defined outcome yields `Undefined`.

use crate::context::Context;
use crate::engine::Engine;
use crate::value::{ObjectId, Value, ValueVisitor};

pub(crate) struct ConvertToNumber<'a> {
    context: &'a Context,
    result: Option<Value>,
}

impl<'a> ConvertToNumber<'a> {
    pub fn new(context: &'a Context) -> Self {
        ConvertToNumber {
            context,
            result: None,
        }
    }

    pub fn convert(mut self, value: Value) -> Value {
        value.accept(&mut self);
        self.result.unwrap_or(Value::Undefined)
    }

    fn value_of(&self, object: ObjectId) -> Option<Value> {
        let function = self.context.lookup_member(object, "valueOf")?.as_function()?;
        let result = self.context.engine().call(function);
        result.is_number().then_some(result)
    }
}

impl ValueVisitor for ConvertToNumber<'_> {
    fn visit_null(&mut self) {
        self.result = Some(Value::Number);
    }

    fn visit_undefined(&mut self) {
        self.result = Some(Value::Number);
    }

    fn visit_number(&mut self) {
        self.result = Some(Value::Number);
    }

    fn visit_boolean(&mut self) {
        self.result = Some(Value::Number);
    }

    fn visit_string(&mut self) {
        self.result = Some(Value::Number);
    }

    fn visit_object(&mut self, object: ObjectId) {
        self.result = self.value_of(object);
    }

    fn visit_function(&mut self, function: ObjectId) {
        self.result = self.value_of(function);
    }
}

pub(crate) struct ConvertToString<'a> {
    context: &'a Context,
    result: Option<Value>,
}

impl<'a> ConvertToString<'a> {
    pub fn new(context: &'a Context) -> Self {
        ConvertToString {
            context,
            result: None,
        }
    }

    pub fn convert(mut self, value: Value) -> Value {
        value.accept(&mut self);
        self.result.unwrap_or(Value::Undefined)
    }

    fn to_string_member(&self, object: ObjectId) -> Option<Value> {
        let function = self
            .context
            .lookup_member(object, "toString")?
            .as_function()?;
        let result = self.context.engine().call(function);
        result.is_string().then_some(result)
    }
}

impl ValueVisitor for ConvertToString<'_> {
    fn visit_null(&mut self) {
        self.result = Some(Value::String);
    }

    fn visit_undefined(&mut self) {
        self.result = Some(Value::String);
    }

    fn visit_number(&mut self) {
        self.result = Some(Value::String);
    }

    fn visit_boolean(&mut self) {
        self.result = Some(Value::String);
    }

    fn visit_string(&mut self) {
        self.result = Some(Value::String);
    }

    fn visit_object(&mut self, object: ObjectId) {
        self.result = self.to_string_member(object);
    }

    fn visit_function(&mut self, function: ObjectId) {
        self.result = self.to_string_member(function);
    }
}

pub(crate) struct ConvertToObject<'a> {
    context: &'a Context,
    result: Option<Value>,
}

impl<'a> ConvertToObject<'a> {
    pub fn new(context: &'a Context) -> Self {
        ConvertToObject {
            context,
            result: None,
        }
    }

    pub fn convert(mut self, value: Value) -> Value {
        value.accept(&mut self);
        self.result.unwrap_or(Value::Undefined)
    }
}

impl ValueVisitor for ConvertToObject<'_> {
    fn visit_null(&mut self) {
        self.result = Some(Value::Null);
    }

    fn visit_undefined(&mut self) {
        self.result = Some(Value::Null);
    }

    fn visit_number(&mut self) {
        let engine = self.context.engine();
        self.result = Some(engine.construct(engine.number_ctor()));
    }

    fn visit_boolean(&mut self) {
        let engine = self.context.engine();
        self.result = Some(engine.construct(engine.boolean_ctor()));
    }

    fn visit_string(&mut self) {
        let engine = self.context.engine();
        self.result = Some(engine.construct(engine.string_ctor()));
    }

    fn visit_object(&mut self, object: ObjectId) {
        self.result = Some(Value::Object(object));
    }

    fn visit_function(&mut self, function: ObjectId) {
        self.result = Some(Value::Function(function));
    }
}

/// Display string for a value's kind.
pub(crate) struct TypeId<'a> {
    engine: &'a Engine,
    result: String,
}

impl<'a> TypeId<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        TypeId {
            engine,
            result: String::new(),
        }
    }

    pub fn type_id(mut self, value: Value) -> String {
        self.result = "unknown".to_string();
        value.accept(&mut self);
        self.result
    }
}

impl ValueVisitor for TypeId<'_> {
    fn visit_null(&mut self) {
        self.result = "null".to_string();
    }

    fn visit_undefined(&mut self) {
        self.result = "undefined".to_string();
    }

    fn visit_number(&mut self) {
        self.result = "number".to_string();
    }

    fn visit_boolean(&mut self) {
        self.result = "boolean".to_string();
    }

    fn visit_string(&mut self) {
        self.result = "string".to_string();
    }

    fn visit_color(&mut self) {
        self.result = "string".to_string();
    }

    fn visit_anchor_line(&mut self) {
        self.result = "AnchorLine".to_string();
    }

    fn visit_object(&mut self, object: ObjectId) {
        let class_name = self.engine.class_name(object);
        self.result = if class_name.is_empty() {
            "object".to_string()
        } else {
            class_name
        };
    }

    fn visit_function(&mut self, function: ObjectId) {
        let class_name = self.engine.class_name(function);
        self.result = if class_name.is_empty() {
            "Function".to_string()
        } else {
            class_name
        };
    }
}
