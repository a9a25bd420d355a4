// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core value model.
//!
//! A [`Value`] is the typed result of analysis, not a runtime datum: the
//! primitive kinds carry no payload because the model only answers "what kind
//! of thing is this", never "what is its numeric value". Objects, functions
//! and references are handles into the arenas of the [`crate::Engine`] that
//! allocated them; a handle is only meaningful together with its engine.

/// Handle to an object value owned by an [`crate::Engine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub(crate) u32);

/// Handle to a deferred value owned by an [`crate::Engine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceId(pub(crate) u32);

/// A value produced by analysis.
///
/// The seven payload-free variants are canonical singletons. `Function` is an
/// object specialization (it narrows through [`Value::as_object`] too), and
/// `Reference` is not a real value at all but a promise to compute one later
/// given a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Null,
    Undefined,
    Number,
    Boolean,
    String,
    Color,
    AnchorLine,
    Object(ObjectId),
    Function(ObjectId),
    Reference(ReferenceId),
}

impl Value {
    pub fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_number(self) -> bool {
        matches!(self, Value::Number)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, Value::Boolean)
    }

    pub fn is_string(self) -> bool {
        matches!(self, Value::String)
    }

    pub fn is_color(self) -> bool {
        matches!(self, Value::Color)
    }

    pub fn is_anchor_line(self) -> bool {
        matches!(self, Value::AnchorLine)
    }

    /// Narrow to an object handle. Functions are objects too.
    pub fn as_object(self) -> Option<ObjectId> {
        match self {
            Value::Object(object) | Value::Function(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_function(self) -> Option<ObjectId> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_reference(self) -> Option<ReferenceId> {
        match self {
            Value::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Double dispatch into `visitor`.
    pub fn accept(self, visitor: &mut dyn ValueVisitor) {
        match self {
            Value::Null => visitor.visit_null(),
            Value::Undefined => visitor.visit_undefined(),
            Value::Number => visitor.visit_number(),
            Value::Boolean => visitor.visit_boolean(),
            Value::String => visitor.visit_string(),
            Value::Color => visitor.visit_color(),
            Value::AnchorLine => visitor.visit_anchor_line(),
            Value::Object(object) => visitor.visit_object(object),
            Value::Function(function) => visitor.visit_function(function),
            Value::Reference(reference) => visitor.visit_reference(reference),
        }
    }
}

/// Visitor over concrete value kinds.
///
/// Every method defaults to a no-op so visitors degrade gracefully when a new
/// kind appears; concrete visitors used downstream still have to opt in to
/// each kind they care about.
pub trait ValueVisitor {
    fn visit_null(&mut self) {}
    fn visit_undefined(&mut self) {}
    fn visit_number(&mut self) {}
    fn visit_boolean(&mut self) {}
    fn visit_string(&mut self) {}
    fn visit_color(&mut self) {}
    fn visit_anchor_line(&mut self) {}
    fn visit_object(&mut self, _object: ObjectId) {}
    fn visit_function(&mut self, _function: ObjectId) {}
    fn visit_reference(&mut self, _reference: ReferenceId) {}
}
