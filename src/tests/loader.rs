// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{
    load_type_description, load_type_description_files, parse_type_descriptions,
    ComponentVersion, MethodKind, TypeDescriptionError, TypeRegistry,
};

#[test]
fn a_complete_type_parses_with_all_members() {
    let (objects, errors) = parse_type_descriptions(
        "<buffer>",
        r#"<module>
             <type name="Item" defaultProperty="data" extends="Base">
               <property name="width" type="int"/>
               <property name="children" type="Item" isList="true"/>
               <enum name="Mode">
                 <enumerator name="A" value="0"/>
                 <enumerator name="B" value="1"/>
               </enum>
               <signal name="clicked">
                 <param name="position" type="point"/>
               </signal>
               <method name="update" type="int">
                 <param name="flag" type="bool"/>
               </method>
               <exports>
                 <export module="UI" type="Item" version="1.0"/>
               </exports>
             </type>
           </module>"#,
    );
    assert_eq!(errors, vec![]);
    assert_eq!(objects.len(), 1);

    let item = &objects[0];
    assert_eq!(item.name(), "Item");
    assert_eq!(item.default_property(), Some("data"));
    assert_eq!(item.superclass_name(), Some("Base"));
    // Base is not part of this document, so the link stays unresolved
    assert!(item.superclass().is_none());

    assert_eq!(item.properties().len(), 2);
    let children = item.property("children").expect("children property");
    assert_eq!(children.type_name(), "Item");
    assert!(children.is_list());
    assert!(!item.property("width").expect("width").is_list());

    let mode = item.enumerator("Mode").expect("Mode enum");
    assert_eq!(mode.keys(), ["A", "B"]);
    assert!(mode.has_key("B"));
    assert!(!mode.has_key("C"));

    assert_eq!(item.methods().len(), 2);
    let clicked = &item.methods()[0];
    assert_eq!(clicked.kind(), MethodKind::Signal);
    assert_eq!(clicked.parameter_names(), ["position"]);
    assert_eq!(clicked.parameter_types(), ["point"]);
    let update = &item.methods()[1];
    assert_eq!(update.kind(), MethodKind::Slot);
    assert_eq!(update.return_type(), Some("int"));

    // explicit export plus the implicit unqualified one
    assert_eq!(item.exports().len(), 2);
    let explicit = &item.exports()[0];
    assert_eq!(explicit.package(), "UI");
    assert_eq!(explicit.version(), ComponentVersion::new(1, 0));
    assert_eq!(explicit.qualified_name(), "UI.Item 1.0");
    let implicit = &item.exports()[1];
    assert_eq!(implicit.package(), "");
    assert_eq!(implicit.name(), "Item");
    assert!(!implicit.version().is_valid());
}

#[test]
fn a_type_without_a_name_is_skipped_but_reported() {
    let registry = TypeRegistry::new();
    let errors = load_type_description(
        &registry,
        "<buffer>",
        r#"<module>
             <type name="Good"/>
             <type defaultProperty="data"/>
           </module>"#,
    );
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        TypeDescriptionError::MissingAttribute { .. }
    ));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.snapshot()[0].name(), "Good");
}

#[test]
fn a_self_extending_type_is_rejected() {
    let registry = TypeRegistry::new();
    let errors = load_type_description(
        &registry,
        "<buffer>",
        r#"<module>
             <type name="Loop" extends="Loop"/>
           </module>"#,
    );
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        TypeDescriptionError::InvalidAttribute { .. }
    ));
    assert!(registry.is_empty());
}

#[test]
fn a_malformed_version_drops_only_that_export() {
    let (objects, errors) = parse_type_descriptions(
        "<buffer>",
        r#"<module>
             <type name="Item">
               <exports>
                 <export module="UI" type="Item" version="one"/>
                 <export module="UI" type="Item" version="2.0"/>
               </exports>
             </type>
           </module>"#,
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(objects.len(), 1);
    let exports = objects[0].exports();
    // the good explicit export and the implicit one survive
    assert_eq!(exports.len(), 2);
    assert_eq!(exports[0].version(), ComponentVersion::new(2, 0));
}

#[test]
fn version_strings_may_omit_the_minor_number() {
    let (objects, errors) = parse_type_descriptions(
        "<buffer>",
        r#"<module>
             <type name="Item">
               <exports><export module="UI" type="Item" version="4"/></exports>
             </type>
           </module>"#,
    );
    assert_eq!(errors, vec![]);
    let version = objects[0].exports()[0].version();
    assert_eq!(version.major(), 4);
    assert_eq!(version.minor(), ComponentVersion::NO_VERSION);
}

#[test]
fn a_bad_enumerator_value_keeps_the_enum() {
    let (objects, errors) = parse_type_descriptions(
        "<buffer>",
        r#"<module>
             <type name="Item">
               <enum name="Mode">
                 <enumerator name="A" value="0"/>
                 <enumerator name="B" value="nope"/>
               </enum>
             </type>
           </module>"#,
    );
    assert_eq!(errors.len(), 1);
    let mode = objects[0].enumerator("Mode").expect("Mode survives");
    assert_eq!(mode.keys(), ["A", "B"]);
}

#[test]
fn a_property_without_a_type_is_reported() {
    let (objects, errors) = parse_type_descriptions(
        "<buffer>",
        r#"<module>
             <type name="Item">
               <property name="width"/>
               <property name="height" type="int"/>
             </type>
           </module>"#,
    );
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        TypeDescriptionError::MissingAttribute { .. }
    ));
    assert_eq!(objects[0].properties().len(), 1);
}

#[test]
fn a_document_without_a_module_root_is_an_error() {
    let registry = TypeRegistry::new();
    let errors = load_type_description(&registry, "<buffer>", "<types/>");
    assert_eq!(
        errors,
        vec![TypeDescriptionError::NotAModule {
            document: "<buffer>".to_string()
        }]
    );
    assert!(registry.is_empty());
}

#[test]
fn unparsable_xml_is_a_single_document_error() {
    let registry = TypeRegistry::new();
    let errors = load_type_description(&registry, "<buffer>", "<module><type");
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], TypeDescriptionError::Document { .. }));
}

#[test]
fn superclasses_link_within_one_batch() {
    let (objects, errors) = parse_type_descriptions(
        "<buffer>",
        r#"<module>
             <type name="Base"/>
             <type name="Derived" extends="Base"/>
           </module>"#,
    );
    assert_eq!(errors, vec![]);
    let derived = objects
        .iter()
        .find(|object| object.name() == "Derived")
        .expect("Derived");
    let base = objects
        .iter()
        .find(|object| object.name() == "Base")
        .expect("Base");
    let linked = derived.superclass().expect("linked superclass");
    assert!(std::sync::Arc::ptr_eq(linked, base));
    assert!(derived.inherits(base));
    assert!(!base.inherits(derived));
}

#[test]
fn superclasses_link_across_files_of_one_batch() {
    let directory = std::env::temp_dir().join("quillsem-loader-test");
    std::fs::create_dir_all(&directory).expect("temp dir");
    let base_path = directory.join("base.xml");
    let derived_path = directory.join("derived.xml");
    std::fs::write(&base_path, r#"<module><type name="Base"/></module>"#).expect("write");
    std::fs::write(
        &derived_path,
        r#"<module><type name="Derived" extends="Base"/></module>"#,
    )
    .expect("write");

    let registry = TypeRegistry::new();
    let errors = load_type_description_files(&registry, &[&base_path, &derived_path]);
    assert_eq!(errors, vec![]);

    let snapshot = registry.snapshot();
    let derived = snapshot
        .iter()
        .find(|object| object.name() == "Derived")
        .expect("Derived");
    assert_eq!(
        derived.superclass().map(|super_| super_.name()),
        Some("Base")
    );

    std::fs::remove_file(base_path).ok();
    std::fs::remove_file(derived_path).ok();
}

#[test]
fn a_missing_file_does_not_abort_the_batch() {
    let directory = std::env::temp_dir().join("quillsem-loader-test");
    std::fs::create_dir_all(&directory).expect("temp dir");
    let good_path = directory.join("good.xml");
    std::fs::write(&good_path, r#"<module><type name="Good"/></module>"#).expect("write");
    let missing_path = directory.join("does-not-exist.xml");

    let registry = TypeRegistry::new();
    let errors = load_type_description_files(&registry, &[&good_path, &missing_path]);
    assert_eq!(errors.len(), 1);
    assert_eq!(registry.len(), 1);

    std::fs::remove_file(good_path).ok();
}

#[test]
fn catalogs_serialize_for_debugging() {
    let registry = TypeRegistry::new();
    let errors = load_type_description(
        &registry,
        "<buffer>",
        r#"<module><type name="Item" defaultProperty="data"/></module>"#,
    );
    assert_eq!(errors, vec![]);
    let dump = registry.to_json_string().expect("serializable catalog");
    assert!(dump.contains("\"Item\""));
}
