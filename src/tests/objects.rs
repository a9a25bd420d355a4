// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::rc::Rc;

use super::{context, context_with_catalog};
use crate::ast::{
    ComponentDefinition, PropertyDefinition, QualifiedName, SignalDefinition,
};
use crate::{
    ComponentVersion, Document, ImportInfo, ImportKind, MemberProcessor, ObjectId, Resolver, Value,
};

#[test]
fn own_members_shadow_prototypes() {
    let context = context();
    let engine = context.engine();

    let base = engine.new_object_with_prototype(None);
    engine.set_property(base, "x", Value::String);
    engine.set_property(base, "y", Value::Boolean);

    let derived = engine.new_object_with_prototype(Some(base));
    engine.set_property(derived, "x", Value::Number);

    assert_eq!(context.lookup_member(derived, "x"), Some(Value::Number));
    assert_eq!(context.lookup_member(derived, "y"), Some(Value::Boolean));
    assert_eq!(context.lookup_member(derived, "z"), None);
    assert_eq!(context.lookup_own_member(derived, "y"), None);
}

#[test]
fn missing_member_is_distinct_from_undefined_member() {
    let context = context();
    let engine = context.engine();

    let object = engine.new_object_with_prototype(None);
    engine.set_property(object, "declared", Value::Undefined);

    assert_eq!(
        context.lookup_member(object, "declared"),
        Some(Value::Undefined)
    );
    assert_eq!(context.lookup_member(object, "missing"), None);

    engine.remove_property(object, "declared");
    assert_eq!(context.lookup_member(object, "declared"), None);
}

#[test]
fn lookup_matches_a_manual_prototype_walk() {
    let context = context();
    let engine = context.engine();

    let a = engine.new_object_with_prototype(None);
    let b = engine.new_object_with_prototype(Some(a));
    let c = engine.new_object_with_prototype(Some(b));
    engine.set_property(a, "inherited", Value::String);
    engine.set_property(b, "inherited", Value::Number);
    engine.set_property(c, "own", Value::Boolean);

    for name in ["own", "inherited", "absent"] {
        let mut manual = None;
        let mut current = Some(c);
        while let Some(object) = current {
            if let Some(value) = engine.member(object, name) {
                manual = Some(value);
                break;
            }
            current = context.prototype(object);
        }
        assert_eq!(context.lookup_member(c, name), manual);
    }
}

#[test]
fn prototype_cycles_terminate_as_not_found() {
    let context = context();
    let engine = context.engine();

    let a = engine.new_object_with_prototype(None);
    let b = engine.new_object_with_prototype(None);
    engine.set_prototype(a, Value::Object(b));
    engine.set_prototype(b, Value::Object(a));

    assert_eq!(context.prototype(a), Some(b));
    assert_eq!(context.prototype(b), Some(a));
    assert_eq!(context.lookup_member(a, "anything"), None);
    assert_eq!(context.default_property_name(a), None);
}

#[test]
fn self_cycle_still_finds_own_members() {
    let context = context();
    let engine = context.engine();

    let object = engine.new_object_with_prototype(None);
    engine.set_prototype(object, Value::Object(object));
    engine.set_property(object, "x", Value::Number);

    assert_eq!(context.lookup_member(object, "x"), Some(Value::Number));
    assert_eq!(context.lookup_member(object, "y"), None);
}

#[test]
fn deferred_prototype_resolves_through_the_context() {
    let context = context_with_catalog(
        r#"<module>
             <type name="Item">
               <property name="width" type="int"/>
               <exports><export module="UI" type="Item" version="1.0"/></exports>
             </type>
           </module>"#,
    );
    let engine = context.engine();
    let document = Rc::new(Document::new("app.qs"));

    // the type environment exposes the import's types as its members
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

    let instance = engine.new_object_with_prototype(None);
    let prototype = engine.new_reference(Resolver::PrototypeType {
        document: Rc::clone(&document),
        type_name: QualifiedName::from_dotted("Item"),
    });
    engine.set_prototype(instance, prototype);

    assert_eq!(context.lookup_member(instance, "width"), Some(Value::Number));
    assert_eq!(context.lookup_member(instance, "height"), None);
}

#[test]
fn unresolvable_deferred_prototype_ends_the_chain() {
    let context = context();
    let engine = context.engine();
    let document = Rc::new(Document::new("app.qs"));

    let instance = engine.new_object_with_prototype(None);
    let prototype = engine.new_reference(Resolver::PrototypeType {
        document,
        type_name: QualifiedName::from_dotted("Missing"),
    });
    engine.set_prototype(instance, prototype);
    engine.set_property(instance, "x", Value::Number);

    assert_eq!(context.prototype(instance), None);
    assert_eq!(context.lookup_member(instance, "x"), Some(Value::Number));
    assert_eq!(context.lookup_member(instance, "y"), None);
}

#[derive(Default)]
struct Collector {
    properties: Vec<String>,
    signals: Vec<String>,
    generated_slots: Vec<String>,
}

impl MemberProcessor for Collector {
    fn process_property(&mut self, name: &str, _value: Value) -> bool {
        self.properties.push(name.to_string());
        true
    }

    fn process_signal(&mut self, name: &str, _value: Value) -> bool {
        self.signals.push(name.to_string());
        true
    }

    fn process_generated_slot(&mut self, name: &str, _value: Value) -> bool {
        self.generated_slots.push(name.to_string());
        true
    }
}

fn component_object(context: &crate::Context, document: &Rc<Document>) -> ObjectId {
    let mut component = ComponentDefinition::new(QualifiedName::from_dotted("Item"));
    component.properties.push(Rc::new(
        PropertyDefinition::new("title", Some("string".to_string())).as_default(),
    ));
    component
        .signals
        .push(Rc::new(SignalDefinition::new("clicked", vec![])));
    context.engine().new_component_object(document, &component)
}

#[test]
fn component_objects_synthesize_declared_members() {
    let context = context();
    let document = Rc::new(Document::new("app.qs"));
    let object = component_object(&context, &document);

    let mut collector = Collector::default();
    context.engine().process_members(object, &mut collector);

    assert_eq!(collector.properties, vec!["title"]);
    assert_eq!(collector.signals, vec!["clicked"]);
    assert_eq!(collector.generated_slots, vec!["onTitleChanged", "onClicked"]);

    // the declared property resolves to its declared type
    let title = context.lookup_member(object, "title").expect("title");
    let reference = title.as_reference().expect("deferred member");
    assert_eq!(context.lookup_reference(reference), Some(Value::String));

    assert_eq!(context.default_property_name(object), Some("title".into()));
}

#[test]
fn component_objects_report_source_locations() {
    let context = context();
    let document = Rc::new(Document::new("app.qs"));
    let object = component_object(&context, &document);

    let (file, _) = context
        .engine()
        .source_location(Value::Object(object))
        .expect("components have a source location");
    assert_eq!(file, "app.qs");
}

#[test]
fn variable_references_classify_their_initializers() {
    let context = context();
    let engine = context.engine();
    let document = Rc::new(Document::new("app.qs"));

    use crate::ast::{Expression, LiteralKind, VariableDeclaration};
    let cases = [
        (Some(Expression::Literal(LiteralKind::Number)), Value::Number),
        (Some(Expression::Literal(LiteralKind::String)), Value::String),
        (
            Some(Expression::Literal(LiteralKind::Boolean)),
            Value::Boolean,
        ),
        (Some(Expression::Literal(LiteralKind::Null)), Value::Null),
        (Some(Expression::Unresolved), Value::Undefined),
        (None, Value::Undefined),
    ];
    for (initializer, expected) in cases {
        let reference = engine
            .new_reference(Resolver::Variable {
                document: Rc::clone(&document),
                declaration: Rc::new(VariableDeclaration::new("x", initializer)),
            })
            .as_reference()
            .expect("reference value");
        assert_eq!(context.lookup_reference(reference), Some(expected));
    }
}

#[test]
fn declared_functions_expose_their_parameter_names() {
    let context = context();
    let engine = context.engine();
    let document = Rc::new(Document::new("app.qs"));

    use crate::ast::FunctionDeclaration;
    let declaration =
        FunctionDeclaration::new("move", vec!["dx".to_string(), "dy".to_string()]);
    let function = engine.new_function_from_declaration(&document, &declaration);

    assert_eq!(engine.argument_count(function), 2);
    assert_eq!(engine.argument_name(function, 0), "dx");
    assert!(engine.is_variadic(function));
    assert_eq!(context.type_id(Value::Function(function)), "Function");
    // declared script functions inherit Function.prototype members
    assert!(context.lookup_member(function, "apply").is_some());
    assert_eq!(context.lookup_member(function, "length"), Some(Value::Number));

    let (file, _) = engine
        .source_location(Value::Function(function))
        .expect("declared functions have a location");
    assert_eq!(file, "app.qs");
}

#[test]
fn enumeration_stops_when_the_processor_declines() {
    let context = context();
    let engine = context.engine();

    let object = engine.new_object_with_prototype(None);
    engine.set_property(object, "a", Value::Number);
    engine.set_property(object, "b", Value::Number);
    engine.set_property(object, "c", Value::Number);

    struct StopAfterFirst(usize);
    impl MemberProcessor for StopAfterFirst {
        fn process_property(&mut self, _name: &str, _value: Value) -> bool {
            self.0 += 1;
            false
        }
    }

    let mut processor = StopAfterFirst(0);
    assert!(!engine.process_members(object, &mut processor));
    assert_eq!(processor.0, 1);
}
