// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Deferred values.
//!
//! A reference is created once while scopes are built and queried many times;
//! resolution is a pure function of `(resolver, context)` and is guarded
//! against cycles by the context's reentrancy stack, which treats a reference
//! already under resolution as having no value.

use std::rc::Rc;

use crate::ast::{
    Expression, LiteralKind, PropertyDefinition, QualifiedName, SignalDefinition,
    VariableDeclaration,
};
use crate::context::Context;
use crate::document::Document;
use crate::value::Value;

/// How a deferred value is computed once a context is available.
#[derive(Clone, Debug)]
pub enum Resolver {
    /// No way to produce a value; resolves to `Undefined`.
    Opaque,
    /// A script variable: classified by its initializer's literal kind.
    Variable {
        document: Rc<Document>,
        declaration: Rc<VariableDeclaration>,
    },
    /// A declared component property: the declared type wins unless the
    /// declaration is untyped (or `variant`) and carries an initializer.
    Property {
        document: Rc<Document>,
        property: Rc<PropertyDefinition>,
    },
    /// A declared signal; its handler value stays unknown.
    Signal {
        document: Rc<Document>,
        signal: Rc<SignalDefinition>,
    },
    /// A component's prototype, named by qualified type: resolved against the
    /// document's type environment.
    PrototypeType {
        document: Rc<Document>,
        type_name: QualifiedName,
    },
}

impl Resolver {
    pub(crate) fn resolve(&self, context: &Context) -> Option<Value> {
        match self {
            Resolver::Opaque => Some(Value::Undefined),
            Resolver::Variable { declaration, .. } => {
                Some(literal_value(declaration.initializer.as_ref()))
            }
            Resolver::Property { property, .. } => {
                let untyped = matches!(property.member_type.as_deref(), None | Some("variant"));
                if untyped && property.expression.is_some() {
                    return Some(literal_value(property.expression.as_ref()));
                }
                match property.member_type.as_deref() {
                    Some(member_type) => {
                        Some(context.engine().default_value_for_builtin_type(member_type))
                    }
                    None => Some(Value::Undefined),
                }
            }
            Resolver::Signal { .. } => Some(Value::Undefined),
            Resolver::PrototypeType {
                document,
                type_name,
            } => context
                .lookup_type(document, &type_name.parts)
                .map(Value::Object),
        }
    }
}

fn literal_value(expression: Option<&Expression>) -> Value {
    match expression {
        Some(Expression::Literal(LiteralKind::Number)) => Value::Number,
        Some(Expression::Literal(LiteralKind::String)) => Value::String,
        Some(Expression::Literal(LiteralKind::Boolean)) => Value::Boolean,
        Some(Expression::Literal(LiteralKind::Null)) => Value::Null,
        _ => Value::Undefined,
    }
}
