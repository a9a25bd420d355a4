// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::rc::Rc;

use super::{context, context_with_catalog};
use crate::{
    ComponentChain, ComponentVersion, Document, ImportInfo, ImportKind, ObjectId, Value,
};

#[test]
fn innermost_scope_wins_and_reports_provenance() {
    let mut context = context();
    let engine = context.engine();

    let global = engine.new_object_with_prototype(None);
    let outer = engine.new_object_with_prototype(None);
    let inner = engine.new_object_with_prototype(None);
    engine.set_property(global, "x", Value::String);
    engine.set_property(outer, "x", Value::Number);
    engine.set_property(inner, "x", Value::Boolean);
    engine.set_property(global, "g", Value::Color);

    let chain = context.scope_chain_mut();
    chain.global_scope = Some(global);
    chain.js_scopes = vec![outer, inner];
    chain.update();

    assert_eq!(context.lookup("x"), (Value::Boolean, Some(inner)));
    assert_eq!(context.lookup("g"), (Value::Color, Some(global)));
    assert_eq!(context.lookup("missing"), (Value::Undefined, None));
}

fn document_with_bind(
    context: &crate::Context,
    file_name: &str,
) -> (Rc<Document>, ObjectId, ObjectId) {
    let engine = context.engine();
    let root = engine.new_object_with_prototype(None);
    let ids = engine.new_object_with_prototype(None);
    let document = Rc::new(Document::new(file_name));
    document.set_root_object_value(Some(Value::Object(root)));
    document.set_id_environment(Some(Value::Object(ids)));
    (document, root, ids)
}

#[test]
fn scope_chain_order_includes_instantiating_components() {
    let mut context = context();

    let global = context.engine().new_object_with_prototype(None);
    let (parent_document, parent_root, parent_ids) = document_with_bind(&context, "parent.qs");
    let (document, root, ids) = document_with_bind(&context, "child.qs");
    let scope_object = context.engine().new_object_with_prototype(None);
    let environment = context.engine().new_type_environment();
    let js_scope = context.engine().new_object_with_prototype(None);

    let mut component = ComponentChain::new(document);
    component
        .instantiating_components
        .push(ComponentChain::new(parent_document));

    let chain = context.scope_chain_mut();
    chain.global_scope = Some(global);
    chain.component_scope = Some(component);
    chain.scope_objects = vec![scope_object];
    chain.type_environment = Some(environment);
    chain.js_scopes = vec![js_scope];
    chain.update();

    assert_eq!(
        chain.all(),
        [
            global,
            parent_root,
            parent_ids,
            root,
            scope_object,
            ids,
            environment,
            js_scope
        ]
    );
}

#[test]
fn root_object_is_not_duplicated_when_it_is_a_scope_object() {
    let mut context = context();

    let (document, root, ids) = document_with_bind(&context, "child.qs");

    let chain = context.scope_chain_mut();
    chain.component_scope = Some(ComponentChain::new(document));
    chain.scope_objects = vec![root];
    chain.update();

    assert_eq!(chain.all(), [root, ids]);
}

#[test]
fn root_script_scope_ignores_instantiating_components() {
    let mut context = context();

    let (parent_document, parent_root, _) = document_with_bind(&context, "parent.qs");
    let (document, root, ids) = document_with_bind(&context, "script.qs");
    let js_scope = context.engine().new_object_with_prototype(None);

    let mut component = ComponentChain::new(document);
    component
        .instantiating_components
        .push(ComponentChain::new(parent_document));

    let chain = context.scope_chain_mut();
    chain.component_scope = Some(component);
    chain.js_scopes = vec![js_scope];
    chain.update();

    assert!(!chain.all().contains(&parent_root));
    assert_eq!(chain.all(), [root, ids, js_scope]);
}

#[test]
fn type_environment_resolves_imports_in_the_chain() {
    let mut context = context_with_catalog(
        r#"<module>
             <type name="Item">
               <property name="width" type="int"/>
               <exports><export module="UI" type="Item" version="1.0"/></exports>
             </type>
           </module>"#,
    );
    let document = Rc::new(Document::new("app.qs"));

    let engine = context.engine();
    let import = engine.new_object_with_prototype(None);
    for id in engine
        .library_types()
        .types_for_import("UI", ComponentVersion::new(1, 0))
    {
        engine.set_property(import, &engine.class_name(id), Value::Object(id));
    }
    let environment = engine.new_type_environment();
    engine.add_import(
        environment,
        Value::Object(import),
        ImportInfo::new(ImportKind::Library, "UI", ComponentVersion::new(1, 0)),
    );
    context.set_type_environment(&document, environment);

    let chain = context.scope_chain_mut();
    chain.type_environment = Some(environment);
    chain.update();

    let (value, scope) = context.lookup("Item");
    let item = value.as_object().expect("the import resolves to the type");
    assert_eq!(context.engine().class_name(item), "Item");
    assert_eq!(scope, Some(environment));

    // dotted resolution through the same environment
    assert_eq!(context.lookup_type(&document, &["Item"]), Some(item));
    assert_eq!(context.lookup_type(&document, &["Missing"]), None);

    let info = context
        .import_info(environment, "Item")
        .expect("import provenance");
    assert_eq!(info.name(), "UI");
}

#[test]
fn qualified_imports_resolve_segment_by_segment() {
    let context = context_with_catalog(
        r#"<module>
             <type name="Item">
               <property name="width" type="int"/>
               <exports><export module="UI" type="Item" version="1.0"/></exports>
             </type>
           </module>"#,
    );
    let document = Rc::new(Document::new("app.qs"));

    let engine = context.engine();
    let import = engine.new_object_with_prototype(None);
    for id in engine
        .library_types()
        .types_for_import("UI", ComponentVersion::new(1, 0))
    {
        engine.set_property(import, &engine.class_name(id), Value::Object(id));
    }
    let environment = engine.new_type_environment();
    engine.add_import(
        environment,
        Value::Object(import),
        ImportInfo::new(ImportKind::Library, "UI", ComponentVersion::new(1, 0)).with_id("Controls"),
    );
    context.set_type_environment(&document, environment);

    let item = context
        .lookup_type(&document, &["Controls", "Item"])
        .expect("qualified reference");
    assert_eq!(engine.class_name(item), "Item");

    // the unqualified name is hidden behind the id
    assert_eq!(context.lookup_type(&document, &["Item"]), None);
}

#[test]
fn computed_property_values_are_memoized_per_object() {
    let context = context();
    let engine = context.engine();

    let object = engine.new_object_with_prototype(None);
    let other = engine.new_object_with_prototype(None);

    assert_eq!(context.property(object, "computed"), Value::Undefined);
    context.set_property(object, "computed", Value::Number);
    assert_eq!(context.property(object, "computed"), Value::Number);
    assert_eq!(context.property(other, "computed"), Value::Undefined);
}

#[test]
fn global_scope_exposes_the_builtin_graph() {
    let mut context = context();
    let global = context.engine().global_object();

    let chain = context.scope_chain_mut();
    chain.global_scope = Some(global);
    chain.update();

    let (math, scope) = context.lookup("Math");
    assert!(math.as_object().is_some());
    assert_eq!(scope, Some(global));

    let (object_ctor, _) = context.lookup("Object");
    assert!(object_ctor.as_function().is_some());

    let (host, _) = context.lookup("Quill");
    let host = host.as_object().expect("host utility object");
    assert!(context.lookup_member(host, "rgba").is_some());
}
