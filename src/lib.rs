// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

pub mod ast;
mod context;
mod convert;
mod document;
mod engine;
mod library;
mod loader;
mod meta;
mod object;
mod reference;
mod value;

pub use context::{ComponentChain, Context, ScopeChain};
pub use document::{Document, ImportInfo, ImportKind};
pub use engine::Engine;
pub use library::LibraryTypes;
pub use loader::{
    load_type_description, load_type_description_files, parse_type_descriptions,
    TypeDescriptionError,
};
pub use meta::{
    ComponentVersion, Export, MetaEnum, MetaMethod, MetaProperty, MethodAccess, MethodKind,
    TypeDescription, TypeRegistry,
};
pub use object::MemberProcessor;
pub use reference::Resolver;
pub use value::{ObjectId, ReferenceId, Value, ValueVisitor};

#[cfg(test)]
mod tests;
