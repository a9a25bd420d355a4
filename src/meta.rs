// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Data model for externally described component types.
//!
//! A [`TypeDescription`] is the synthetic stand-in for a host type that is not
//! expressed in the analyzed language itself: its properties, enums, methods
//! and the `(package, name, version)` exports under which import resolution
//! can see it. Descriptions are parsed from XML documents (see [`crate::loader`]),
//! linked into superclass chains in a second pass, and kept in an append-only
//! [`TypeRegistry`] that analysis sessions share.

use core::fmt;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde::Serialize;

/// A `major.minor` component version. `-1` marks an unversioned component;
/// unversioned sorts below every real version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ComponentVersion {
    major: i32,
    minor: i32,
}

impl ComponentVersion {
    pub const NO_VERSION: i32 = -1;

    pub fn new(major: i32, minor: i32) -> Self {
        ComponentVersion { major, minor }
    }

    pub fn none() -> Self {
        ComponentVersion {
            major: Self::NO_VERSION,
            minor: Self::NO_VERSION,
        }
    }

    pub fn major(&self) -> i32 {
        self.major
    }

    pub fn minor(&self) -> i32 {
        self.minor
    }

    pub fn is_valid(&self) -> bool {
        self.major != Self::NO_VERSION
    }
}

impl Default for ComponentVersion {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A named enumeration with ordered key/value pairs.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MetaEnum {
    name: String,
    keys: Vec<String>,
    values: Vec<i32>,
}

impl MetaEnum {
    pub fn new(name: impl Into<String>) -> Self {
        MetaEnum {
            name: name.into(),
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_key(&mut self, key: impl Into<String>, value: i32) {
        self.keys.push(key.into());
        self.values.push(value);
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn value_of(&self, key: &str) -> Option<i32> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|index| self.values[index])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MethodKind {
    Signal,
    Slot,
    Method,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MethodAccess {
    Private,
    Protected,
    Public,
}

/// A method, slot or signal of an externally described type.
#[derive(Clone, Debug, Serialize)]
pub struct MetaMethod {
    name: String,
    return_type: Option<String>,
    parameter_names: Vec<String>,
    parameter_types: Vec<String>,
    kind: MethodKind,
    access: MethodAccess,
}

impl MetaMethod {
    pub fn new(name: impl Into<String>, return_type: Option<String>, kind: MethodKind) -> Self {
        MetaMethod {
            name: name.into(),
            return_type,
            parameter_names: Vec::new(),
            parameter_types: Vec::new(),
            kind,
            access: MethodAccess::Public,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn access(&self) -> MethodAccess {
        self.access
    }

    /// The parameter name may be empty when the description omits it.
    pub fn add_parameter(&mut self, name: impl Into<String>, type_name: impl Into<String>) {
        self.parameter_names.push(name.into());
        self.parameter_types.push(type_name.into());
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_names.len()
    }
}

/// A property of an externally described type.
#[derive(Clone, Debug, Serialize)]
pub struct MetaProperty {
    name: String,
    type_name: String,
    is_list: bool,
}

impl MetaProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, is_list: bool) -> Self {
        MetaProperty {
            name: name.into(),
            type_name: type_name.into(),
            is_list,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }
}

/// A `(package, exported name, version)` record under which a type is visible
/// to import resolution.
#[derive(Clone, Debug, Serialize)]
pub struct Export {
    package: String,
    name: String,
    version: ComponentVersion,
    qualified_name: String,
}

impl Export {
    pub fn new(package: impl Into<String>, name: impl Into<String>, version: ComponentVersion) -> Self {
        let package = package.into();
        let name = name.into();
        let qualified_name = Self::qualified_id(&package, &name, version);
        Export {
            package,
            name,
            version,
            qualified_name,
        }
    }

    /// The `"package.name major.minor"` key used to index materialized types.
    pub fn qualified_id(package: &str, name: &str, version: ComponentVersion) -> String {
        format!("{package}.{name} {version}")
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> ComponentVersion {
        self.version
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }
}

/// Synthetic description of one externally registered component type.
///
/// Built once by the loader, then immutable except for the superclass link,
/// which is patched in a second pass after all descriptions of a batch are
/// known. Export graphs are acyclic by construction, so the link is a plain
/// shared pointer.
#[derive(Debug, Default, Serialize)]
pub struct TypeDescription {
    name: String,
    default_property: Option<String>,
    superclass_name: Option<String>,
    #[serde(skip)]
    superclass: OnceLock<Arc<TypeDescription>>,
    exports: Vec<Export>,
    enums: Vec<MetaEnum>,
    #[serde(skip)]
    enum_index: HashMap<String, usize>,
    properties: Vec<MetaProperty>,
    #[serde(skip)]
    property_index: HashMap<String, usize>,
    methods: Vec<MetaMethod>,
}

impl TypeDescription {
    pub fn new(name: impl Into<String>) -> Self {
        TypeDescription {
            name: name.into(),
            ..TypeDescription::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_default_property(&mut self, name: impl Into<String>) {
        self.default_property = Some(name.into());
    }

    pub fn default_property(&self) -> Option<&str> {
        self.default_property.as_deref()
    }

    pub fn set_superclass_name(&mut self, name: impl Into<String>) {
        self.superclass_name = Some(name.into());
    }

    pub fn superclass_name(&self) -> Option<&str> {
        self.superclass_name.as_deref()
    }

    /// Link the resolved superclass. The link is set at most once; later
    /// calls are ignored.
    pub fn set_superclass(&self, superclass: Arc<TypeDescription>) {
        let _ = self.superclass.set(superclass);
    }

    pub fn superclass(&self) -> Option<&Arc<TypeDescription>> {
        self.superclass.get()
    }

    pub fn add_export(
        &mut self,
        name: impl Into<String>,
        package: impl Into<String>,
        version: ComponentVersion,
    ) {
        self.exports.push(Export::new(package, name, version));
    }

    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    pub fn add_enum(&mut self, meta_enum: MetaEnum) {
        self.enum_index
            .insert(meta_enum.name().to_string(), self.enums.len());
        self.enums.push(meta_enum);
    }

    pub fn enums(&self) -> &[MetaEnum] {
        &self.enums
    }

    pub fn enumerator(&self, name: &str) -> Option<&MetaEnum> {
        self.enum_index.get(name).map(|&index| &self.enums[index])
    }

    pub fn add_property(&mut self, property: MetaProperty) {
        self.property_index
            .insert(property.name().to_string(), self.properties.len());
        self.properties.push(property);
    }

    pub fn properties(&self) -> &[MetaProperty] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&MetaProperty> {
        self.property_index
            .get(name)
            .map(|&index| &self.properties[index])
    }

    pub fn add_method(&mut self, method: MetaMethod) {
        self.methods.push(method);
    }

    pub fn methods(&self) -> &[MetaMethod] {
        &self.methods
    }

    /// Dump one description for catalog debugging.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether `base` appears in this description's superclass chain,
    /// compared by identity.
    pub fn inherits(self: &Arc<Self>, base: &Arc<TypeDescription>) -> bool {
        let mut current = Arc::clone(self);
        loop {
            if Arc::ptr_eq(&current, base) {
                return true;
            }
            match current.superclass.get() {
                Some(superclass) => {
                    let superclass = Arc::clone(superclass);
                    current = superclass;
                }
                None => return false,
            }
        }
    }
}

/// Append-only shared store of parsed type descriptions.
///
/// The registry outlives the engines that materialize it, so producers (for
/// instance a background indexer parsing description files) may append
/// concurrently; the append is the one locked operation in this subsystem.
#[derive(Default)]
pub struct TypeRegistry {
    objects: Mutex<Vec<Arc<TypeDescription>>>,
}

lazy_static! {
    /// Process-wide catalog shared by sessions that do not bring their own.
    static ref GLOBAL_TYPE_REGISTRY: TypeRegistry = TypeRegistry::new();
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    pub fn global() -> &'static TypeRegistry {
        &GLOBAL_TYPE_REGISTRY
    }

    pub fn register(&self, object: Arc<TypeDescription>) {
        self.objects.lock().push(object);
    }

    pub fn register_batch(&self, objects: impl IntoIterator<Item = Arc<TypeDescription>>) {
        self.objects.lock().extend(objects);
    }

    pub fn snapshot(&self) -> Vec<Arc<TypeDescription>> {
        self.objects.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Dump the whole catalog for debugging.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}
