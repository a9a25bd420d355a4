// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! XML reader for component type descriptions.
//!
//! A description document has a `<module>` root containing `<type>` elements;
//! each type carries `<property>`, `<enum>`, `<signal>`, `<method>` and
//! `<exports>` children. Malformed elements are reported as one error each
//! and skipped; everything that parsed stays usable, so a batch with a broken
//! file still registers the good files.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use roxmltree::Node;
use thiserror::Error;
use tracing::{debug, warn};

use crate::meta::{
    ComponentVersion, MetaEnum, MetaMethod, MetaProperty, MethodKind, TypeDescription, TypeRegistry,
};

/// One malformed file or element in a type-description batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeDescriptionError {
    #[error("{document}: {message}")]
    Document { document: String, message: String },
    #[error("{document}: the document root is not a <module> element")]
    NotAModule { document: String },
    #[error("{document}: unexpected element <{child}> in <{parent}>")]
    UnexpectedElement {
        document: String,
        child: String,
        parent: String,
    },
    #[error("{document}: invalid value '{value}' for attribute {attribute} in <{tag}>")]
    InvalidAttribute {
        document: String,
        value: String,
        attribute: String,
        tag: String,
    },
    #[error("{document}: <{tag}> has no valid {attribute} attribute")]
    MissingAttribute {
        document: String,
        tag: String,
        attribute: String,
    },
}

/// Parse every file of a batch into `registry`.
///
/// Returns one error per malformed file or element; partially parsed input is
/// still linked and registered.
pub fn load_type_description_files<P: AsRef<Path>>(
    registry: &TypeRegistry,
    files: &[P],
) -> Vec<TypeDescriptionError> {
    let mut objects = BTreeMap::new();
    let mut errors = Vec::new();

    for file in files {
        let path = file.as_ref();
        let document = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(source) => {
                let mut reader = TypeDescriptionReader::new(&document);
                reader.read(&source, &mut objects);
                errors.extend(reader.into_errors());
            }
            Err(error) => errors.push(TypeDescriptionError::Document {
                document,
                message: error.to_string(),
            }),
        }
    }

    registry.register_batch(link_superclasses(objects));
    errors
}

/// Parse a single in-memory document into `registry`. `label` identifies the
/// document in error messages.
pub fn load_type_description(
    registry: &TypeRegistry,
    label: &str,
    source: &str,
) -> Vec<TypeDescriptionError> {
    let (objects, errors) = parse_type_descriptions(label, source);
    registry.register_batch(objects);
    errors
}

/// Parse a single document without touching any registry.
pub fn parse_type_descriptions(
    label: &str,
    source: &str,
) -> (Vec<Arc<TypeDescription>>, Vec<TypeDescriptionError>) {
    let mut objects = BTreeMap::new();
    let mut reader = TypeDescriptionReader::new(label);
    reader.read(source, &mut objects);
    (link_superclasses(objects), reader.into_errors())
}

/// Resolve `extends` names against the whole batch. An unresolved superclass
/// leaves the type without a link; it is not a load failure.
fn link_superclasses(objects: BTreeMap<String, TypeDescription>) -> Vec<Arc<TypeDescription>> {
    let by_name: BTreeMap<String, Arc<TypeDescription>> = objects
        .into_iter()
        .map(|(name, object)| (name, Arc::new(object)))
        .collect();

    for object in by_name.values() {
        let Some(super_name) = object.superclass_name() else {
            continue;
        };
        match by_name.get(super_name) {
            Some(superclass) => object.set_superclass(Arc::clone(superclass)),
            None => warn!(
                "cannot resolve superclass {super_name} for {}",
                object.name()
            ),
        }
    }

    by_name.into_values().collect()
}

struct TypeDescriptionReader<'a> {
    document: &'a str,
    errors: Vec<TypeDescriptionError>,
}

fn elements<'d, 'i>(node: Node<'d, 'i>) -> impl Iterator<Item = Node<'d, 'i>> {
    node.children().filter(|child| child.is_element())
}

impl<'a> TypeDescriptionReader<'a> {
    fn new(document: &'a str) -> Self {
        TypeDescriptionReader {
            document,
            errors: Vec::new(),
        }
    }

    fn into_errors(self) -> Vec<TypeDescriptionError> {
        self.errors
    }

    fn read(&mut self, source: &str, objects: &mut BTreeMap<String, TypeDescription>) {
        let dom = match roxmltree::Document::parse(source) {
            Ok(dom) => dom,
            Err(error) => {
                self.errors.push(TypeDescriptionError::Document {
                    document: self.document.to_string(),
                    message: error.to_string(),
                });
                return;
            }
        };

        let root = dom.root_element();
        if root.tag_name().name() != "module" {
            self.errors.push(TypeDescriptionError::NotAModule {
                document: self.document.to_string(),
            });
            return;
        }
        for attribute in root.attributes() {
            self.ignored_attribute(attribute.name(), "module");
        }

        for child in elements(root) {
            if child.tag_name().name() == "type" {
                self.read_type(child, objects);
            } else {
                self.unexpected_element(child.tag_name().name(), "module");
            }
        }
    }

    fn read_type(&mut self, node: Node<'_, '_>, objects: &mut BTreeMap<String, TypeDescription>) {
        const TAG: &str = "type";

        let mut name = None;
        let mut default_property = None;
        let mut extends = None;
        for attribute in node.attributes() {
            match attribute.name() {
                "name" => name = Some(attribute.value().to_string()),
                "defaultProperty" => default_property = Some(attribute.value().to_string()),
                "extends" => {
                    if !attribute.value().is_empty() {
                        extends = Some(attribute.value().to_string());
                    }
                }
                other => self.ignored_attribute(other, TAG),
            }
        }

        let Some(name) = name.filter(|name| !name.is_empty()) else {
            self.missing_attribute(TAG, "name");
            return;
        };
        if extends.as_deref() == Some(name.as_str()) {
            // a self-extending type is malformed and never inserted
            self.invalid_attribute(&name, "extends", TAG);
            return;
        }

        let mut object = TypeDescription::new(&name);
        if let Some(extends) = extends {
            object.set_superclass_name(extends);
        }
        if let Some(default_property) = default_property {
            object.set_default_property(default_property);
        }

        for child in elements(node) {
            match child.tag_name().name() {
                "property" => self.read_property(child, &mut object),
                "enum" => self.read_enum(child, &mut object),
                "signal" => self.read_signal(child, &mut object),
                "method" => self.read_method(child, &mut object),
                "exports" => self.read_exports(child, &mut object),
                other => self.unexpected_element(other, TAG),
            }
        }

        // every type is additionally visible under its unqualified name
        object.add_export(&name, "", ComponentVersion::none());
        objects.insert(name, object);
    }

    fn read_property(&mut self, node: Node<'_, '_>, object: &mut TypeDescription) {
        const TAG: &str = "property";

        let mut name = None;
        let mut type_name = None;
        let mut is_list = false;
        for attribute in node.attributes() {
            match attribute.name() {
                "name" => name = Some(attribute.value().to_string()),
                "type" => type_name = Some(attribute.value().to_string()),
                "isList" => match attribute.value() {
                    "true" => is_list = true,
                    "false" => is_list = false,
                    other => {
                        self.invalid_attribute(other, "isList", TAG);
                        return;
                    }
                },
                other => self.ignored_attribute(other, TAG),
            }
        }

        match (name, type_name) {
            (Some(name), Some(type_name)) if !name.is_empty() && !type_name.is_empty() => {
                object.add_property(MetaProperty::new(name, type_name, is_list));
            }
            (Some(name), _) if !name.is_empty() => self.missing_attribute(TAG, "type"),
            _ => self.missing_attribute(TAG, "name"),
        }

        for child in elements(node) {
            self.unexpected_element(child.tag_name().name(), TAG);
        }
    }

    fn read_enum(&mut self, node: Node<'_, '_>, object: &mut TypeDescription) {
        const TAG: &str = "enum";

        let mut name = None;
        for attribute in node.attributes() {
            match attribute.name() {
                "name" => name = Some(attribute.value().to_string()),
                other => self.ignored_attribute(other, TAG),
            }
        }

        let Some(name) = name.filter(|name| !name.is_empty()) else {
            self.missing_attribute(TAG, "name");
            return;
        };

        let mut meta_enum = MetaEnum::new(name);
        for child in elements(node) {
            if child.tag_name().name() == "enumerator" {
                self.read_enumerator(child, &mut meta_enum);
            } else {
                self.unexpected_element(child.tag_name().name(), TAG);
            }
        }
        object.add_enum(meta_enum);
    }

    fn read_enumerator(&mut self, node: Node<'_, '_>, meta_enum: &mut MetaEnum) {
        const TAG: &str = "enumerator";

        let mut name = None;
        let mut value = 0;
        for attribute in node.attributes() {
            match attribute.name() {
                "name" => name = Some(attribute.value().to_string()),
                "value" => match attribute.value().parse::<i32>() {
                    Ok(parsed) => value = parsed,
                    // a bad value is reported but does not abort the enum
                    Err(_) => self.invalid_attribute(attribute.value(), "value", TAG),
                },
                other => self.ignored_attribute(other, TAG),
            }
        }

        match name.filter(|name| !name.is_empty()) {
            Some(name) => meta_enum.add_key(name, value),
            None => self.missing_attribute(TAG, "name"),
        }

        for child in elements(node) {
            self.unexpected_element(child.tag_name().name(), TAG);
        }
    }

    fn read_signal(&mut self, node: Node<'_, '_>, object: &mut TypeDescription) {
        const TAG: &str = "signal";

        let mut name = None;
        for attribute in node.attributes() {
            match attribute.name() {
                "name" => name = Some(attribute.value().to_string()),
                other => self.ignored_attribute(other, TAG),
            }
        }

        let Some(name) = name.filter(|name| !name.is_empty()) else {
            self.missing_attribute(TAG, "name");
            return;
        };

        let mut method = MetaMethod::new(name, None, MethodKind::Signal);
        for child in elements(node) {
            if child.tag_name().name() == "param" {
                self.read_param(child, &mut method);
            } else {
                self.unexpected_element(child.tag_name().name(), TAG);
            }
        }
        object.add_method(method);
    }

    fn read_method(&mut self, node: Node<'_, '_>, object: &mut TypeDescription) {
        const TAG: &str = "method";

        let mut name = None;
        let mut return_type = None;
        for attribute in node.attributes() {
            match attribute.name() {
                "name" => name = Some(attribute.value().to_string()),
                // a method without a type attribute returns nothing
                "type" => return_type = Some(attribute.value().to_string()),
                other => self.ignored_attribute(other, TAG),
            }
        }

        let Some(name) = name.filter(|name| !name.is_empty()) else {
            self.missing_attribute(TAG, "name");
            return;
        };

        let mut method = MetaMethod::new(name, return_type, MethodKind::Slot);
        for child in elements(node) {
            if child.tag_name().name() == "param" {
                self.read_param(child, &mut method);
            } else {
                self.unexpected_element(child.tag_name().name(), TAG);
            }
        }
        object.add_method(method);
    }

    fn read_param(&mut self, node: Node<'_, '_>, method: &mut MetaMethod) {
        const TAG: &str = "param";

        let mut name = String::new();
        let mut type_name = String::new();
        for attribute in node.attributes() {
            match attribute.name() {
                // the name attribute is optional
                "name" => name = attribute.value().to_string(),
                "type" => type_name = attribute.value().to_string(),
                other => self.ignored_attribute(other, TAG),
            }
        }

        if type_name.is_empty() {
            self.missing_attribute(TAG, "type");
        }
        method.add_parameter(name, type_name);

        for child in elements(node) {
            self.unexpected_element(child.tag_name().name(), TAG);
        }
    }

    fn read_exports(&mut self, node: Node<'_, '_>, object: &mut TypeDescription) {
        const TAG: &str = "exports";
        const CHILD_TAG: &str = "export";

        for child in elements(node) {
            if child.tag_name().name() != CHILD_TAG {
                self.unexpected_element(child.tag_name().name(), TAG);
                continue;
            }

            let mut package = String::new();
            let mut name = String::new();
            let mut version = Some(ComponentVersion::none());
            for attribute in child.attributes() {
                match attribute.name() {
                    "module" => package = attribute.value().to_string(),
                    "type" => name = attribute.value().to_string(),
                    "version" => match parse_version(attribute.value()) {
                        Some(parsed) => version = Some(parsed),
                        None => {
                            self.invalid_attribute(attribute.value(), "version", CHILD_TAG);
                            version = None;
                        }
                    },
                    other => self.ignored_attribute(other, CHILD_TAG),
                }
            }

            // a malformed version drops the export entry, not the type
            if let Some(version) = version {
                object.add_export(name, package, version);
            }
        }
    }

    fn unexpected_element(&mut self, child: &str, parent: &str) {
        self.errors.push(TypeDescriptionError::UnexpectedElement {
            document: self.document.to_string(),
            child: child.to_string(),
            parent: parent.to_string(),
        });
    }

    fn invalid_attribute(&mut self, value: &str, attribute: &str, tag: &str) {
        self.errors.push(TypeDescriptionError::InvalidAttribute {
            document: self.document.to_string(),
            value: value.to_string(),
            attribute: attribute.to_string(),
            tag: tag.to_string(),
        });
    }

    fn missing_attribute(&mut self, tag: &str, attribute: &str) {
        self.errors.push(TypeDescriptionError::MissingAttribute {
            document: self.document.to_string(),
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        });
    }

    fn ignored_attribute(&mut self, attribute: &str, tag: &str) {
        debug!("ignoring attribute {attribute} in tag <{tag}>");
    }
}

/// `"major"` or `"major.minor"`, both plain integers.
fn parse_version(value: &str) -> Option<ComponentVersion> {
    match value.split_once('.') {
        None => value
            .parse::<i32>()
            .ok()
            .map(|major| ComponentVersion::new(major, ComponentVersion::NO_VERSION)),
        Some((major, minor)) => {
            let major = major.parse::<i32>().ok()?;
            let minor = minor.parse::<i32>().ok()?;
            Some(ComponentVersion::new(major, minor))
        }
    }
}
