// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Documents and import records.
//!
//! A [`Document`] is the stable identity of one analyzed file plus the bind
//! artifacts an external collaborator supplies for it: the document's root
//! object value and its "ids" environment. Both are opaque to this core and
//! may be absent.

use std::cell::Cell;

use crate::meta::ComponentVersion;
use crate::value::Value;

#[derive(Debug, Default)]
pub struct Document {
    file_name: String,
    root_object: Cell<Option<Value>>,
    id_environment: Cell<Option<Value>>,
}

impl Document {
    pub fn new(file_name: impl Into<String>) -> Self {
        Document {
            file_name: file_name.into(),
            root_object: Cell::new(None),
            id_environment: Cell::new(None),
        }
    }

    /// The document's identity; also the key of per-document context caches.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn set_root_object_value(&self, value: Option<Value>) {
        self.root_object.set(value);
    }

    pub fn root_object_value(&self) -> Option<Value> {
        self.root_object.get()
    }

    pub fn set_id_environment(&self, value: Option<Value>) {
        self.id_environment.set(value);
    }

    pub fn id_environment(&self) -> Option<Value> {
        self.id_environment.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    /// `import "file.qs"`: a single document imported under its own name.
    File,
    /// `import Package 1.0`: a versioned library import.
    Library,
    /// The implicit import of the document's directory.
    Directory,
}

/// How one import contributes names to a document's type environment.
#[derive(Clone, Debug)]
pub struct ImportInfo {
    kind: ImportKind,
    name: String,
    id: Option<String>,
    version: ComponentVersion,
}

impl ImportInfo {
    pub fn new(kind: ImportKind, name: impl Into<String>, version: ComponentVersion) -> Self {
        ImportInfo {
            kind,
            name: name.into(),
            id: None,
            version,
        }
    }

    /// Attach the `as Name` qualifier under which the import is visible.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn version(&self) -> ComponentVersion {
        self.version
    }
}
