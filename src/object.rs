// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Object storage and the member-enumeration protocol.
//!
//! Every object value is an arena slot holding its class name, an optional
//! prototype, the stored member map, and a backing that describes where its
//! synthesized members come from: a plain dictionary, a function shape, an
//! externally described type, an AST-backed component, a declared enum, or a
//! per-document import environment.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::ast::SourceLocation;
use crate::document::ImportInfo;
use crate::meta::{ComponentVersion, TypeDescription};
use crate::value::{ReferenceId, Value};

/// Cooperative callbacks for enumerating an object's visible members.
///
/// Returning `false` from any callback stops the enumeration. Defaults accept
/// everything, so a processor only overrides the member categories it cares
/// about.
pub trait MemberProcessor {
    fn process_property(&mut self, _name: &str, _value: Value) -> bool {
        true
    }

    fn process_enumerator(&mut self, _name: &str, _value: Value) -> bool {
        true
    }

    fn process_signal(&mut self, _name: &str, _value: Value) -> bool {
        true
    }

    fn process_slot(&mut self, _name: &str, _value: Value) -> bool {
        true
    }

    fn process_generated_slot(&mut self, _name: &str, _value: Value) -> bool {
        true
    }
}

/// Single-target collector: stops at the first member with a matching name,
/// whatever its category.
pub(crate) struct LookupMember<'a> {
    name: &'a str,
    value: Option<Value>,
}

impl<'a> LookupMember<'a> {
    pub fn new(name: &'a str) -> Self {
        LookupMember { name, value: None }
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    fn check(&mut self, name: &str, value: Value) -> bool {
        if self.value.is_some() {
            return false;
        }
        if name == self.name {
            self.value = Some(value);
            return false;
        }
        true
    }
}

impl MemberProcessor for LookupMember<'_> {
    fn process_property(&mut self, name: &str, value: Value) -> bool {
        self.check(name, value)
    }

    fn process_enumerator(&mut self, name: &str, value: Value) -> bool {
        self.check(name, value)
    }

    fn process_signal(&mut self, name: &str, value: Value) -> bool {
        self.check(name, value)
    }

    fn process_slot(&mut self, name: &str, value: Value) -> bool {
        self.check(name, value)
    }

    fn process_generated_slot(&mut self, name: &str, value: Value) -> bool {
        self.check(name, value)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ObjectData {
    pub class_name: String,
    pub prototype: Option<Value>,
    pub members: BTreeMap<String, Value>,
    pub backing: ObjectBacking,
}

impl ObjectData {
    pub fn plain() -> Self {
        Self::with_backing(ObjectBacking::Plain)
    }

    pub fn with_backing(backing: ObjectBacking) -> Self {
        ObjectData {
            class_name: String::new(),
            prototype: None,
            members: BTreeMap::new(),
            backing,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum ObjectBacking {
    Plain,
    Function(FunctionData),
    MetaType(MetaTypeData),
    Component(ComponentData),
    Enum(EnumData),
    TypeEnvironment(TypeEnvironmentData),
}

/// Builtin constructors get dedicated construct behavior; everything else
/// constructs a fresh plain object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BuiltinCtor {
    Object,
    Function,
    Array,
    String,
    Boolean,
    Number,
    Date,
    RegExp,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FunctionData {
    pub arguments: Vec<Value>,
    pub argument_names: Vec<String>,
    pub return_value: Option<Value>,
    pub variadic: bool,
    pub ctor: Option<BuiltinCtor>,
    pub location: Option<(String, SourceLocation)>,
}

/// An object value standing in for one export of an externally described
/// type.
#[derive(Clone, Debug)]
pub(crate) struct MetaTypeData {
    pub description: Arc<TypeDescription>,
    pub package: String,
    pub version: ComponentVersion,
}

/// An object value built from a component declaration in a document.
#[derive(Clone, Debug)]
pub(crate) struct ComponentData {
    pub file_name: String,
    pub location: SourceLocation,
    pub properties: Vec<ComponentProperty>,
    pub signals: Vec<ComponentSignal>,
    pub default_property: Option<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct ComponentProperty {
    pub name: String,
    pub reference: ReferenceId,
    pub changed_handler: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ComponentSignal {
    pub name: String,
    pub reference: ReferenceId,
    pub handler: String,
}

/// A declared enum surfaced as a value: its keys are the members.
#[derive(Clone, Debug)]
pub(crate) struct EnumData {
    pub name: String,
    pub keys: Vec<String>,
}

/// The per-document environment of imported names.
#[derive(Clone, Debug, Default)]
pub(crate) struct TypeEnvironmentData {
    pub imports: Vec<(Value, ImportInfo)>,
}

/// `clicked` becomes `onClicked`.
pub(crate) fn signal_handler_name(signal: &str) -> String {
    let mut name = String::with_capacity(signal.len() + 2);
    name.push_str("on");
    let mut chars = signal.chars();
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

/// `text` becomes `onTextChanged`.
pub(crate) fn changed_handler_name(property: &str) -> String {
    let mut name = signal_handler_name(property);
    name.push_str("Changed");
    name
}
