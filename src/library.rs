// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-engine store of materialized library types.
//!
//! Every export record of every loaded description becomes one object value,
//! indexed by package and by its qualified `"package.name major.minor"` id.
//! Prototype chains are rebuilt per package: when a superclass has no export
//! in the package of the current export, an unexported stand-in is
//! synthesized on demand so each package sees an unbroken chain.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::engine::Engine;
use crate::meta::{ComponentVersion, Export, TypeDescription};
use crate::value::{ObjectId, Value};

#[derive(Clone, Debug)]
struct LibraryEntry {
    name: String,
    version: ComponentVersion,
    value: ObjectId,
}

#[derive(Default)]
pub struct LibraryTypes {
    by_package: RefCell<HashMap<String, Vec<LibraryEntry>>>,
    by_qualified_name: RefCell<HashMap<String, ObjectId>>,
}

impl LibraryTypes {
    pub(crate) fn new() -> Self {
        LibraryTypes::default()
    }

    /// Materialize a batch of descriptions. Re-loading an already known
    /// `(package, name, version)` combination is a no-op.
    pub fn load(&self, engine: &Engine, objects: &[Arc<TypeDescription>]) {
        for description in objects {
            for export in description.exports() {
                if self
                    .by_qualified_name
                    .borrow()
                    .contains_key(export.qualified_name())
                {
                    continue;
                }
                let value = engine.new_library_object(
                    description,
                    export.name(),
                    export.package(),
                    export.version(),
                );
                self.by_package
                    .borrow_mut()
                    .entry(export.package().to_string())
                    .or_default()
                    .push(LibraryEntry {
                        name: export.name().to_string(),
                        version: export.version(),
                        value,
                    });
                self.by_qualified_name
                    .borrow_mut()
                    .insert(export.qualified_name().to_string(), value);
            }
        }

        // wire prototype chains, synthesizing same-package stand-ins for
        // superclasses that are not exported in the export's own package
        for description in objects {
            if description.superclass().is_none() {
                continue;
            }
            for export in description.exports() {
                let value = self
                    .by_qualified_name
                    .borrow()
                    .get(export.qualified_name())
                    .copied();
                let Some(mut value) = value else {
                    continue;
                };

                let mut current = Arc::clone(description);
                loop {
                    let Some(superclass) = current.superclass().cloned() else {
                        break;
                    };
                    let super_name = current.superclass_name().unwrap_or_default().to_string();
                    let (super_value, created) =
                        self.get_or_create(engine, export.package(), &super_name, &superclass);
                    engine.set_prototype(value, Value::Object(super_value));
                    if !created {
                        break;
                    }
                    value = super_value;
                    current = superclass;
                }
            }
        }
    }

    fn get_or_create(
        &self,
        engine: &Engine,
        package: &str,
        base_name: &str,
        description: &Arc<TypeDescription>,
    ) -> (ObjectId, bool) {
        let mut type_name = base_name.to_string();
        let mut version = ComponentVersion::none();
        for export in description.exports() {
            if export.package() == package {
                type_name = export.name().to_string();
                version = export.version();
                break;
            }
        }

        let qualified = Export::qualified_id(package, &type_name, version);
        if let Some(&value) = self.by_qualified_name.borrow().get(&qualified) {
            return (value, false);
        }
        let value =
            engine.new_library_object(description, &type_name, package, ComponentVersion::none());
        self.by_qualified_name.borrow_mut().insert(qualified, value);
        (value, true)
    }

    /// The types an `import package version` statement brings into scope:
    /// per exported name, the highest version not exceeding the requested
    /// one.
    pub fn types_for_import(&self, package: &str, version: ComponentVersion) -> Vec<ObjectId> {
        let mut by_name: BTreeMap<String, LibraryEntry> = BTreeMap::new();
        if let Some(entries) = self.by_package.borrow().get(package) {
            for entry in entries {
                if entry.version > version {
                    continue;
                }
                match by_name.get(&entry.name) {
                    Some(previous) if previous.version >= entry.version => {}
                    _ => {
                        by_name.insert(entry.name.clone(), entry.clone());
                    }
                }
            }
        }
        by_name.into_values().map(|entry| entry.value).collect()
    }

    /// Resolve a dotted `package.Name` (or bare `Name`) to the highest
    /// registered version. The split is on the last dot.
    pub fn type_for_import(&self, qualified_name: &str) -> Option<ObjectId> {
        let (package, name) = match qualified_name.rsplit_once('.') {
            Some((package, name)) => (package, name),
            None => ("", qualified_name),
        };

        let mut candidate: Option<LibraryEntry> = None;
        if let Some(entries) = self.by_package.borrow().get(package) {
            for entry in entries {
                if entry.name != name {
                    continue;
                }
                match &candidate {
                    Some(previous) if previous.version >= entry.version => {}
                    _ => candidate = Some(entry.clone()),
                }
            }
        }
        candidate.map(|entry| entry.value)
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.by_package.borrow().contains_key(package)
    }

    pub fn type_by_qualified_id(&self, qualified_name: &str) -> Option<ObjectId> {
        self.by_qualified_name.borrow().get(qualified_name).copied()
    }

    pub fn type_by_qualified_name(
        &self,
        package: &str,
        name: &str,
        version: ComponentVersion,
    ) -> Option<ObjectId> {
        self.type_by_qualified_id(&Export::qualified_id(package, name, version))
    }
}
