// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The parsed-program surface this core consumes, read-only.
//!
//! Parsing happens elsewhere; the analyzer is handed declarations that are
//! already broken down to the level of detail the static model uses. In
//! particular, initializer expressions are reduced to their literal kind:
//! the model never evaluates code, it only classifies it.

use core::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        SourceLocation { line, column }
    }
}

/// A dotted name such as `UI.Item`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualifiedName {
    pub parts: Vec<String>,
    pub location: SourceLocation,
}

impl QualifiedName {
    pub fn new(parts: Vec<String>, location: SourceLocation) -> Self {
        QualifiedName { parts, location }
    }

    pub fn from_dotted(name: &str) -> Self {
        QualifiedName {
            parts: name.split('.').map(str::to_string).collect(),
            location: SourceLocation::default(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
    Null,
}

/// An initializer expression, reduced to what the static model can classify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expression {
    Literal(LiteralKind),
    Function,
    Unresolved,
}

/// `var x = ...` in a script scope.
#[derive(Clone, Debug)]
pub struct VariableDeclaration {
    pub name: String,
    pub initializer: Option<Expression>,
    pub location: SourceLocation,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, initializer: Option<Expression>) -> Self {
        VariableDeclaration {
            name: name.into(),
            initializer,
            location: SourceLocation::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FunctionDeclaration {
    pub name: String,
    pub parameters: Vec<String>,
    pub location: SourceLocation,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, parameters: Vec<String>) -> Self {
        FunctionDeclaration {
            name: name.into(),
            parameters,
            location: SourceLocation::default(),
        }
    }
}

/// A property declared on a component, optionally typed, optionally with an
/// initializer binding.
#[derive(Clone, Debug)]
pub struct PropertyDefinition {
    pub name: String,
    pub member_type: Option<String>,
    pub expression: Option<Expression>,
    pub is_default: bool,
    pub location: SourceLocation,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, member_type: Option<String>) -> Self {
        PropertyDefinition {
            name: name.into(),
            member_type,
            expression: None,
            is_default: false,
            location: SourceLocation::default(),
        }
    }

    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = Some(expression);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

#[derive(Clone, Debug)]
pub struct SignalDefinition {
    pub name: String,
    pub parameters: Vec<String>,
    pub location: SourceLocation,
}

impl SignalDefinition {
    pub fn new(name: impl Into<String>, parameters: Vec<String>) -> Self {
        SignalDefinition {
            name: name.into(),
            parameters,
            location: SourceLocation::default(),
        }
    }
}

/// A component instantiation with its declared members.
#[derive(Clone, Debug)]
pub struct ComponentDefinition {
    pub type_name: QualifiedName,
    pub properties: Vec<std::rc::Rc<PropertyDefinition>>,
    pub signals: Vec<std::rc::Rc<SignalDefinition>>,
    pub location: SourceLocation,
}

impl ComponentDefinition {
    pub fn new(type_name: QualifiedName) -> Self {
        ComponentDefinition {
            location: type_name.location,
            type_name,
            properties: Vec::new(),
            signals: Vec::new(),
        }
    }
}
