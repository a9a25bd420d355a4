// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The analysis engine: sole owner of every value of one session.
//!
//! All objects and references live in the engine's arenas and die with it.
//! On construction the engine allocates the standard-library graph (Object,
//! Function, Array, String, Boolean, Number, Date, RegExp with their
//! well-known members), the `Math` and `console` objects, the `Quill` host
//! utility object, and materializes the shared catalog of externally
//! described types into per-engine library objects.
//!
//! Member values in the builtin graph are always the generic "unknown
//! arguments, declared return kind" shape: the model answers "does X have
//! member Y and what kind is it", never "what does X compute".

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::ast::{ComponentDefinition, FunctionDeclaration, SourceLocation};
use crate::convert::TypeId;
use crate::document::{Document, ImportInfo};
use crate::library::LibraryTypes;
use crate::meta::{
    ComponentVersion, MetaEnum, MetaMethod, MetaProperty, MethodAccess, MethodKind,
    TypeDescription, TypeRegistry,
};
use crate::object::{
    changed_handler_name, signal_handler_name, BuiltinCtor, ComponentData, ComponentProperty,
    ComponentSignal, EnumData, FunctionData, LookupMember, MemberProcessor, MetaTypeData,
    ObjectBacking, ObjectData, TypeEnvironmentData,
};
use crate::reference::Resolver;
use crate::value::{ObjectId, ReferenceId, Value};

/// The name of the host utility object, and of the externally described type
/// its prototype is wired to when a catalog provides one.
const HOST_OBJECT_NAME: &str = "Quill";

pub struct Engine {
    objects: RefCell<Vec<ObjectData>>,
    references: RefCell<Vec<Resolver>>,
    method_signatures: RefCell<HashMap<(ObjectId, usize), Value>>,

    object_prototype: ObjectId,
    function_prototype: ObjectId,
    number_prototype: ObjectId,
    boolean_prototype: ObjectId,
    string_prototype: ObjectId,
    array_prototype: ObjectId,
    date_prototype: ObjectId,
    regexp_prototype: ObjectId,

    object_ctor: ObjectId,
    function_ctor: ObjectId,
    array_ctor: ObjectId,
    string_ctor: ObjectId,
    boolean_ctor: ObjectId,
    number_ctor: ObjectId,
    date_ctor: ObjectId,
    regexp_ctor: ObjectId,

    global_object: ObjectId,
    math_object: ObjectId,
    host_object: ObjectId,
    font_object: ObjectId,
    point_object: ObjectId,
    size_object: ObjectId,
    rect_object: ObjectId,
    vector3d_object: ObjectId,

    library_types: LibraryTypes,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(TypeRegistry::global())
    }
}

impl Engine {
    pub fn new(registry: &TypeRegistry) -> Engine {
        let placeholder = ObjectId(0);
        let mut engine = Engine {
            objects: RefCell::new(Vec::new()),
            references: RefCell::new(Vec::new()),
            method_signatures: RefCell::new(HashMap::new()),
            object_prototype: placeholder,
            function_prototype: placeholder,
            number_prototype: placeholder,
            boolean_prototype: placeholder,
            string_prototype: placeholder,
            array_prototype: placeholder,
            date_prototype: placeholder,
            regexp_prototype: placeholder,
            object_ctor: placeholder,
            function_ctor: placeholder,
            array_ctor: placeholder,
            string_ctor: placeholder,
            boolean_ctor: placeholder,
            number_ctor: placeholder,
            date_ctor: placeholder,
            regexp_ctor: placeholder,
            global_object: placeholder,
            math_object: placeholder,
            host_object: placeholder,
            font_object: placeholder,
            point_object: placeholder,
            size_object: placeholder,
            rect_object: placeholder,
            vector3d_object: placeholder,
            library_types: LibraryTypes::new(),
        };
        engine.initialize_prototypes();

        engine
            .library_types
            .load(&engine, &registry.snapshot());

        // the host object is useful even when it is not exported by any
        // description; if a catalog describes it, inherit those members too
        if let Some(host_type) = engine.library_types.type_for_import(HOST_OBJECT_NAME) {
            engine.set_prototype(engine.host_object, Value::Object(host_type));
        }

        engine
    }

    // -- allocation ---------------------------------------------------------

    pub(crate) fn allocate(&self, data: ObjectData) -> ObjectId {
        let mut objects = self.objects.borrow_mut();
        let id = ObjectId(objects.len() as u32);
        objects.push(data);
        id
    }

    pub(crate) fn allocate_reference(&self, resolver: Resolver) -> ReferenceId {
        let mut references = self.references.borrow_mut();
        let id = ReferenceId(references.len() as u32);
        references.push(resolver);
        id
    }

    /// Register a deferred value.
    pub fn new_reference(&self, resolver: Resolver) -> Value {
        Value::Reference(self.allocate_reference(resolver))
    }

    pub(crate) fn resolver(&self, reference: ReferenceId) -> Resolver {
        self.references
            .borrow()
            .get(reference.0 as usize)
            .cloned()
            .unwrap_or(Resolver::Opaque)
    }

    /// A fresh object with the default object prototype.
    pub fn new_object(&self) -> ObjectId {
        self.new_object_with_prototype(Some(self.object_prototype))
    }

    pub fn new_object_with_prototype(&self, prototype: Option<ObjectId>) -> ObjectId {
        let mut data = ObjectData::plain();
        data.prototype = prototype.map(Value::Object);
        self.allocate(data)
    }

    /// A fresh function value with the function prototype and no declared
    /// arguments or return value.
    pub fn new_function(&self) -> ObjectId {
        let function = FunctionData {
            variadic: true,
            ..FunctionData::default()
        };
        let mut data = ObjectData::with_backing(ObjectBacking::Function(function));
        data.class_name = "Function".to_string();
        data.prototype = Some(Value::Object(self.function_prototype));
        self.allocate(data)
    }

    pub fn new_array(&self) -> Value {
        self.construct(self.array_ctor)
    }

    fn new_ctor(&self, ctor: BuiltinCtor) -> ObjectId {
        let function = FunctionData {
            variadic: true,
            ctor: Some(ctor),
            ..FunctionData::default()
        };
        let mut data = ObjectData::with_backing(ObjectBacking::Function(function));
        data.class_name = "Function".to_string();
        self.allocate(data)
    }

    // -- object accessors ---------------------------------------------------

    pub fn class_name(&self, object: ObjectId) -> String {
        self.objects
            .borrow()
            .get(object.0 as usize)
            .map(|data| data.class_name.clone())
            .unwrap_or_default()
    }

    pub fn set_class_name(&self, object: ObjectId, name: &str) {
        if let Some(data) = self.objects.borrow_mut().get_mut(object.0 as usize) {
            data.class_name = name.to_string();
        }
    }

    pub(crate) fn prototype_value(&self, object: ObjectId) -> Option<Value> {
        self.objects
            .borrow()
            .get(object.0 as usize)
            .and_then(|data| data.prototype)
    }

    /// No cycle check happens here: cycles are tolerated and defused lazily
    /// by the lookup-time guards.
    pub fn set_prototype(&self, object: ObjectId, prototype: Value) {
        if let Some(data) = self.objects.borrow_mut().get_mut(object.0 as usize) {
            data.prototype = Some(prototype);
        }
    }

    pub fn set_property(&self, object: ObjectId, name: &str, value: Value) {
        if let Some(data) = self.objects.borrow_mut().get_mut(object.0 as usize) {
            data.members.insert(name.to_string(), value);
        }
    }

    pub fn remove_property(&self, object: ObjectId, name: &str) {
        if let Some(data) = self.objects.borrow_mut().get_mut(object.0 as usize) {
            data.members.remove(name);
        }
    }

    /// The stored member map only; synthesized members go through
    /// [`Engine::process_members`].
    pub fn member(&self, object: ObjectId, name: &str) -> Option<Value> {
        self.objects
            .borrow()
            .get(object.0 as usize)
            .and_then(|data| data.members.get(name).copied())
    }

    pub fn members(&self, object: ObjectId) -> Vec<(String, Value)> {
        self.objects
            .borrow()
            .get(object.0 as usize)
            .map(|data| {
                data.members
                    .iter()
                    .map(|(name, value)| (name.clone(), *value))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn backing(&self, object: ObjectId) -> ObjectBacking {
        self.objects
            .borrow()
            .get(object.0 as usize)
            .map(|data| data.backing.clone())
            .unwrap_or(ObjectBacking::Plain)
    }

    fn is_function_backed(&self, object: ObjectId) -> bool {
        matches!(
            self.objects
                .borrow()
                .get(object.0 as usize)
                .map(|data| &data.backing),
            Some(ObjectBacking::Function(_))
        )
    }

    pub(crate) fn is_type_environment(&self, object: ObjectId) -> bool {
        matches!(
            self.objects
                .borrow()
                .get(object.0 as usize)
                .map(|data| &data.backing),
            Some(ObjectBacking::TypeEnvironment(_))
        )
    }

    // -- functions ----------------------------------------------------------

    fn with_function_data<R>(
        &self,
        function: ObjectId,
        f: impl FnOnce(&FunctionData) -> R,
    ) -> Option<R> {
        match self.objects.borrow().get(function.0 as usize) {
            Some(ObjectData {
                backing: ObjectBacking::Function(data),
                ..
            }) => Some(f(data)),
            _ => None,
        }
    }

    fn with_function_data_mut(&self, function: ObjectId, f: impl FnOnce(&mut FunctionData)) {
        if let Some(ObjectData {
            backing: ObjectBacking::Function(data),
            ..
        }) = self.objects.borrow_mut().get_mut(function.0 as usize)
        {
            f(data);
        }
    }

    pub fn set_return_value(&self, function: ObjectId, value: Value) {
        self.with_function_data_mut(function, |data| data.return_value = Some(value));
    }

    pub fn add_argument(&self, function: ObjectId, value: Value) {
        self.with_function_data_mut(function, |data| data.arguments.push(value));
    }

    pub fn argument_count(&self, function: ObjectId) -> usize {
        self.with_function_data(function, |data| data.arguments.len())
            .unwrap_or(0)
    }

    pub fn argument(&self, function: ObjectId, index: usize) -> Value {
        self.with_function_data(function, |data| data.arguments.get(index).copied())
            .flatten()
            .unwrap_or(Value::Undefined)
    }

    pub fn argument_name(&self, function: ObjectId, index: usize) -> String {
        let declared = self
            .with_function_data(function, |data| {
                data.argument_names
                    .get(index)
                    .filter(|name| !name.is_empty())
                    .cloned()
            })
            .flatten();
        declared.unwrap_or_else(|| format!("arg{}", index + 1))
    }

    pub fn is_variadic(&self, function: ObjectId) -> bool {
        self.with_function_data(function, |data| data.variadic)
            .unwrap_or(false)
    }

    pub fn return_value(&self, function: ObjectId) -> Value {
        self.with_function_data(function, |data| data.return_value)
            .flatten()
            .unwrap_or(Value::Undefined)
    }

    /// "Calling" a function in this static model yields its declared return
    /// value; no invocation is modeled.
    pub fn call(&self, function: ObjectId) -> Value {
        self.return_value(function)
    }

    /// Construct through a function value. Builtin constructors produce a
    /// wrapper object with the matching prototype; anything else produces a
    /// plain object.
    pub fn construct(&self, function: ObjectId) -> Value {
        let ctor = self
            .with_function_data(function, |data| data.ctor)
            .flatten();
        let object = match ctor {
            Some(BuiltinCtor::Object) => {
                let object = self.new_object();
                self.set_class_name(object, "Object");
                self.set_property(object, "length", Value::Number);
                object
            }
            Some(BuiltinCtor::Function) => {
                let object = self.new_object_with_prototype(Some(self.function_prototype));
                self.set_class_name(object, "Function");
                self.set_property(object, "length", Value::Number);
                object
            }
            Some(BuiltinCtor::Array) => {
                let object = self.new_object_with_prototype(Some(self.array_prototype));
                self.set_class_name(object, "Array");
                self.set_property(object, "length", Value::Number);
                object
            }
            Some(BuiltinCtor::String) => {
                let object = self.new_object_with_prototype(Some(self.string_prototype));
                self.set_class_name(object, "String");
                self.set_property(object, "length", Value::Number);
                object
            }
            Some(BuiltinCtor::Boolean) => {
                let object = self.new_object_with_prototype(Some(self.boolean_prototype));
                self.set_class_name(object, "Boolean");
                object
            }
            Some(BuiltinCtor::Number) => {
                let object = self.new_object_with_prototype(Some(self.number_prototype));
                self.set_class_name(object, "Number");
                object
            }
            Some(BuiltinCtor::Date) => {
                let object = self.new_object_with_prototype(Some(self.date_prototype));
                self.set_class_name(object, "Date");
                object
            }
            Some(BuiltinCtor::RegExp) => {
                let object = self.new_object_with_prototype(Some(self.regexp_prototype));
                self.set_class_name(object, "RegExp");
                self.set_property(object, "source", Value::String);
                self.set_property(object, "global", Value::Boolean);
                self.set_property(object, "ignoreCase", Value::Boolean);
                self.set_property(object, "multiline", Value::Boolean);
                self.set_property(object, "lastIndex", Value::Number);
                object
            }
            None => self.new_object(),
        };
        Value::Object(object)
    }

    /// Attach a function-shaped member: `argument_count` unknown arguments
    /// and an optional declared return kind.
    pub fn add_function(
        &self,
        object: ObjectId,
        name: &str,
        result: Option<Value>,
        argument_count: usize,
    ) {
        let function = self.new_function();
        if let Some(result) = result {
            self.set_return_value(function, result);
        }
        for _ in 0..argument_count {
            self.add_argument(function, Value::Undefined);
        }
        self.set_property(object, name, Value::Function(function));
    }

    // -- member enumeration -------------------------------------------------

    /// Enumerate every member this object exposes, stored or synthesized.
    /// Returns `false` when the processor stopped the enumeration.
    pub fn process_members(&self, object: ObjectId, processor: &mut dyn MemberProcessor) -> bool {
        match self.backing(object) {
            ObjectBacking::MetaType(data) => {
                if !self.process_meta_members(object, &data, processor) {
                    return false;
                }
            }
            ObjectBacking::Component(data) => {
                if !self.process_component_members(&data, processor) {
                    return false;
                }
            }
            ObjectBacking::TypeEnvironment(data) => {
                // import environments expose nothing but their imports
                return self.process_import_members(&data, processor);
            }
            _ => {}
        }

        for (name, value) in self.members(object) {
            if !processor.process_property(&name, value) {
                return false;
            }
        }
        true
    }

    fn process_meta_members(
        &self,
        object: ObjectId,
        data: &MetaTypeData,
        processor: &mut dyn MemberProcessor,
    ) -> bool {
        let description = &data.description;

        for meta_enum in description.enums() {
            for key in meta_enum.keys() {
                if !processor.process_enumerator(key, Value::Number) {
                    return false;
                }
            }
        }

        for property in description.properties() {
            let value = self.meta_property_value(object, property);
            if !processor.process_property(property.name(), value) {
                return false;
            }
        }

        for (index, method) in description.methods().iter().enumerate() {
            let signature = self.method_signature(object, index, method);
            match method.kind() {
                MethodKind::Slot if method.access() == MethodAccess::Public => {
                    if !processor.process_slot(method.name(), signature) {
                        return false;
                    }
                }
                MethodKind::Signal if method.access() != MethodAccess::Private => {
                    if !processor.process_signal(method.name(), signature) {
                        return false;
                    }
                    let handler = signal_handler_name(method.name());
                    if !processor.process_generated_slot(&handler, signature) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        true
    }

    fn process_component_members(
        &self,
        data: &ComponentData,
        processor: &mut dyn MemberProcessor,
    ) -> bool {
        for property in &data.properties {
            let value = Value::Reference(property.reference);
            if !processor.process_property(&property.name, value) {
                return false;
            }
            if !processor.process_generated_slot(&property.changed_handler, value) {
                return false;
            }
        }
        for signal in &data.signals {
            let value = Value::Reference(signal.reference);
            if !processor.process_signal(&signal.name, value) {
                return false;
            }
            if !processor.process_generated_slot(&signal.handler, value) {
                return false;
            }
        }
        true
    }

    fn process_import_members(
        &self,
        data: &TypeEnvironmentData,
        processor: &mut dyn MemberProcessor,
    ) -> bool {
        for (import, info) in &data.imports {
            if let Some(id) = info.id() {
                if !processor.process_property(id, *import) {
                    return false;
                }
                continue;
            }
            match info.kind() {
                crate::document::ImportKind::File => {
                    let Some(object) = import.as_object() else {
                        continue;
                    };
                    if !processor.process_property(&self.class_name(object), *import) {
                        return false;
                    }
                }
                _ => {
                    if let Some(object) = import.as_object() {
                        if !self.process_members(object, processor) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// A member by name, ignoring prototypes: the stored map first, then the
    /// synthesized members surfaced by the enumeration protocol.
    pub(crate) fn own_member(&self, object: ObjectId, name: &str) -> Option<Value> {
        if let Some(value) = self.member(object, name) {
            return Some(value);
        }
        if self.is_function_backed(object) && name == "length" {
            return Some(Value::Number);
        }
        let mut lookup = LookupMember::new(name);
        self.process_members(object, &mut lookup);
        lookup.into_value()
    }

    /// The function wrapper for one meta method, created on first use and
    /// cached by method index.
    pub(crate) fn method_signature(
        &self,
        object: ObjectId,
        index: usize,
        method: &MetaMethod,
    ) -> Value {
        if let Some(value) = self.method_signatures.borrow().get(&(object, index)) {
            return *value;
        }
        let function = FunctionData {
            arguments: vec![Value::Undefined; method.parameter_count()],
            argument_names: method.parameter_names().to_vec(),
            ..FunctionData::default()
        };
        let id = self.allocate(ObjectData::with_backing(ObjectBacking::Function(function)));
        let value = Value::Function(id);
        self.method_signatures
            .borrow_mut()
            .insert((object, index), value);
        value
    }

    // -- externally described types -----------------------------------------

    fn meta_data(&self, object: ObjectId) -> Option<MetaTypeData> {
        match self.backing(object) {
            ObjectBacking::MetaType(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn new_library_object(
        &self,
        description: &Arc<TypeDescription>,
        name: &str,
        package: &str,
        version: ComponentVersion,
    ) -> ObjectId {
        let mut data = ObjectData::with_backing(ObjectBacking::MetaType(MetaTypeData {
            description: Arc::clone(description),
            package: package.to_string(),
            version,
        }));
        data.class_name = name.to_string();
        self.allocate(data)
    }

    /// The package an externally described object was materialized for.
    pub fn package_name(&self, object: ObjectId) -> Option<String> {
        self.meta_data(object).map(|data| data.package)
    }

    pub fn component_version(&self, object: ObjectId) -> Option<ComponentVersion> {
        self.meta_data(object).map(|data| data.version)
    }

    /// The default-property name this object itself declares, component- or
    /// description-backed. Prototype chains are walked by the context.
    pub(crate) fn declared_default_property(&self, object: ObjectId) -> Option<String> {
        match self.backing(object) {
            ObjectBacking::Component(data) => data.default_property,
            ObjectBacking::MetaType(data) => {
                data.description.default_property().map(str::to_string)
            }
            _ => None,
        }
    }

    /// The declared type name of a property, searched along the description's
    /// superclass chain.
    pub fn property_type(&self, object: ObjectId, property_name: &str) -> Option<String> {
        let data = self.meta_data(object)?;
        let mut current = Some(Arc::clone(&data.description));
        while let Some(description) = current {
            if let Some(property) = description.property(property_name) {
                return Some(property.type_name().to_string());
            }
            current = description.superclass().cloned();
        }
        None
    }

    pub fn is_list_property(&self, object: ObjectId, property_name: &str) -> bool {
        self.meta_data(object)
            .and_then(|data| {
                data.description
                    .property(property_name)
                    .map(MetaProperty::is_list)
            })
            .unwrap_or(false)
    }

    pub fn is_enum(&self, object: ObjectId, type_name: &str) -> bool {
        self.meta_data(object)
            .map(|data| data.description.enumerator(type_name).is_some())
            .unwrap_or(false)
    }

    pub fn enum_contains_key(&self, object: ObjectId, enum_name: &str, key: &str) -> bool {
        self.meta_data(object)
            .and_then(|data| {
                data.description
                    .enumerator(enum_name)
                    .map(|meta_enum| meta_enum.has_key(key))
            })
            .unwrap_or(false)
    }

    /// Whether this object's description inherits `base`, by identity.
    pub fn is_derived_from(&self, object: ObjectId, base: &Arc<TypeDescription>) -> bool {
        self.meta_data(object)
            .map(|data| data.description.inherits(base))
            .unwrap_or(false)
    }

    /// The keys of an enum value.
    pub fn enum_keys(&self, object: ObjectId) -> Option<Vec<String>> {
        match self.backing(object) {
            ObjectBacking::Enum(data) => Some(data.keys),
            _ => None,
        }
    }

    /// The declared name of an enum value.
    pub fn enum_name(&self, object: ObjectId) -> Option<String> {
        match self.backing(object) {
            ObjectBacking::Enum(data) => Some(data.name),
            _ => None,
        }
    }

    /// Map a property's declared type name to a value: an externally
    /// described type of that name wins, then the builtin synonyms, then the
    /// object's own enums; anything else stays unknown.
    pub(crate) fn meta_property_value(&self, object: ObjectId, property: &MetaProperty) -> Value {
        let type_name = property.type_name();

        if let Some(library_type) = self.library_types.type_for_import(type_name) {
            return Value::Object(library_type);
        }
        if let Some(value) = self.builtin_property_value(type_name) {
            return value;
        }
        if let Some(data) = self.meta_data(object) {
            if let Some(meta_enum) = data.description.enumerator(type_name) {
                return Value::Object(self.new_enum_object(meta_enum));
            }
        }
        Value::Undefined
    }

    fn builtin_property_value(&self, type_name: &str) -> Option<Value> {
        match type_name {
            "string" | "url" | "bytearray" => Some(Value::String),
            "bool" | "boolean" => Some(Value::Boolean),
            "int" | "float" | "double" | "real" | "long" => Some(Value::Number),
            "color" => Some(Value::Color),
            "anchorline" => Some(Value::AnchorLine),
            "font" => Some(Value::Object(self.font_object)),
            "point" | "vector2d" => Some(Value::Object(self.point_object)),
            "size" => Some(Value::Object(self.size_object)),
            "rect" => Some(Value::Object(self.rect_object)),
            "vector3d" => Some(Value::Object(self.vector3d_object)),
            _ => None,
        }
    }

    fn new_enum_object(&self, meta_enum: &MetaEnum) -> ObjectId {
        let mut data = ObjectData::with_backing(ObjectBacking::Enum(EnumData {
            name: meta_enum.name().to_string(),
            keys: meta_enum.keys().to_vec(),
        }));
        data.class_name = meta_enum.name().to_string();
        for key in meta_enum.keys() {
            data.members.insert(key.clone(), Value::Number);
        }
        self.allocate(data)
    }

    /// The declared default value for a builtin property type name.
    pub fn default_value_for_builtin_type(&self, type_name: &str) -> Value {
        match type_name {
            "string" | "url" => Value::String,
            "bool" => Value::Boolean,
            "int" | "real" => Value::Number,
            "color" => Value::Color,
            _ => Value::Undefined,
        }
    }

    // -- AST-backed values --------------------------------------------------

    /// An object value for a component declaration: every declared property
    /// and signal becomes a deferred member, plus the generated change and
    /// signal handlers.
    pub fn new_component_object(
        &self,
        document: &Rc<Document>,
        component: &ComponentDefinition,
    ) -> ObjectId {
        let mut properties = Vec::with_capacity(component.properties.len());
        let mut signals = Vec::with_capacity(component.signals.len());
        let mut default_property = None;

        for property in &component.properties {
            let reference = self.allocate_reference(Resolver::Property {
                document: Rc::clone(document),
                property: Rc::clone(property),
            });
            if property.is_default && default_property.is_none() {
                default_property = Some(property.name.clone());
            }
            properties.push(ComponentProperty {
                name: property.name.clone(),
                reference,
                changed_handler: changed_handler_name(&property.name),
            });
        }
        for signal in &component.signals {
            let reference = self.allocate_reference(Resolver::Signal {
                document: Rc::clone(document),
                signal: Rc::clone(signal),
            });
            signals.push(ComponentSignal {
                name: signal.name.clone(),
                reference,
                handler: signal_handler_name(&signal.name),
            });
        }

        self.allocate(ObjectData::with_backing(ObjectBacking::Component(
            ComponentData {
                file_name: document.file_name().to_string(),
                location: component.location,
                properties,
                signals,
                default_property,
            },
        )))
    }

    /// A function value for a script function declaration.
    pub fn new_function_from_declaration(
        &self,
        document: &Rc<Document>,
        declaration: &FunctionDeclaration,
    ) -> ObjectId {
        let function = FunctionData {
            arguments: vec![Value::Undefined; declaration.parameters.len()],
            argument_names: declaration.parameters.clone(),
            variadic: true,
            location: Some((document.file_name().to_string(), declaration.location)),
            ..FunctionData::default()
        };
        let mut data = ObjectData::with_backing(ObjectBacking::Function(function));
        data.class_name = "Function".to_string();
        data.prototype = Some(Value::Object(self.function_prototype));
        self.allocate(data)
    }

    /// Where an AST-backed value was declared, for go-to-definition style
    /// consumers.
    pub fn source_location(&self, value: Value) -> Option<(String, SourceLocation)> {
        match value {
            Value::Object(object) | Value::Function(object) => match self.backing(object) {
                ObjectBacking::Component(data) => Some((data.file_name, data.location)),
                ObjectBacking::Function(data) => data.location,
                _ => None,
            },
            Value::Reference(reference) => match self.resolver(reference) {
                Resolver::Variable {
                    document,
                    declaration,
                } => Some((document.file_name().to_string(), declaration.location)),
                Resolver::Property { document, property } => {
                    Some((document.file_name().to_string(), property.location))
                }
                Resolver::Signal { document, signal } => {
                    Some((document.file_name().to_string(), signal.location))
                }
                _ => None,
            },
            _ => None,
        }
    }

    // -- type environments --------------------------------------------------

    pub fn new_type_environment(&self) -> ObjectId {
        self.allocate(ObjectData::with_backing(ObjectBacking::TypeEnvironment(
            TypeEnvironmentData::default(),
        )))
    }

    pub fn add_import(&self, environment: ObjectId, import: Value, info: ImportInfo) {
        if let Some(ObjectData {
            backing: ObjectBacking::TypeEnvironment(data),
            ..
        }) = self.objects.borrow_mut().get_mut(environment.0 as usize)
        {
            data.imports.push((import, info));
        }
    }

    // -- well-known objects -------------------------------------------------

    pub fn global_object(&self) -> ObjectId {
        self.global_object
    }

    pub fn object_prototype(&self) -> ObjectId {
        self.object_prototype
    }

    pub fn function_prototype(&self) -> ObjectId {
        self.function_prototype
    }

    pub fn number_prototype(&self) -> ObjectId {
        self.number_prototype
    }

    pub fn boolean_prototype(&self) -> ObjectId {
        self.boolean_prototype
    }

    pub fn string_prototype(&self) -> ObjectId {
        self.string_prototype
    }

    pub fn array_prototype(&self) -> ObjectId {
        self.array_prototype
    }

    pub fn date_prototype(&self) -> ObjectId {
        self.date_prototype
    }

    pub fn regexp_prototype(&self) -> ObjectId {
        self.regexp_prototype
    }

    pub fn object_ctor(&self) -> ObjectId {
        self.object_ctor
    }

    pub fn function_ctor(&self) -> ObjectId {
        self.function_ctor
    }

    pub fn array_ctor(&self) -> ObjectId {
        self.array_ctor
    }

    pub fn string_ctor(&self) -> ObjectId {
        self.string_ctor
    }

    pub fn boolean_ctor(&self) -> ObjectId {
        self.boolean_ctor
    }

    pub fn number_ctor(&self) -> ObjectId {
        self.number_ctor
    }

    pub fn date_ctor(&self) -> ObjectId {
        self.date_ctor
    }

    pub fn regexp_ctor(&self) -> ObjectId {
        self.regexp_ctor
    }

    pub fn math_object(&self) -> ObjectId {
        self.math_object
    }

    pub fn host_object(&self) -> ObjectId {
        self.host_object
    }

    pub fn font_object(&self) -> ObjectId {
        self.font_object
    }

    pub fn point_object(&self) -> ObjectId {
        self.point_object
    }

    pub fn size_object(&self) -> ObjectId {
        self.size_object
    }

    pub fn rect_object(&self) -> ObjectId {
        self.rect_object
    }

    pub fn vector3d_object(&self) -> ObjectId {
        self.vector3d_object
    }

    pub fn library_types(&self) -> &LibraryTypes {
        &self.library_types
    }

    /// The display name of a value's kind.
    pub fn type_id(&self, value: Value) -> String {
        TypeId::new(self).type_id(value)
    }

    // -- standard library ---------------------------------------------------

    fn initialize_prototypes(&mut self) {
        self.object_prototype = self.new_object_with_prototype(None);
        self.function_prototype = self.new_object_with_prototype(Some(self.object_prototype));
        self.number_prototype = self.new_object_with_prototype(Some(self.object_prototype));
        self.boolean_prototype = self.new_object_with_prototype(Some(self.object_prototype));
        self.string_prototype = self.new_object_with_prototype(Some(self.object_prototype));
        self.array_prototype = self.new_object_with_prototype(Some(self.object_prototype));
        self.date_prototype = self.new_object_with_prototype(Some(self.object_prototype));
        self.regexp_prototype = self.new_object_with_prototype(Some(self.object_prototype));

        self.global_object = self.new_object();
        self.set_class_name(self.global_object, "Global");

        self.object_ctor = self.new_ctor(BuiltinCtor::Object);
        self.set_prototype(self.object_ctor, Value::Object(self.function_prototype));
        self.set_property(self.object_ctor, "prototype", Value::Object(self.object_prototype));
        let fresh_object = self.new_object();
        self.set_return_value(self.object_ctor, Value::Object(fresh_object));

        self.function_ctor = self.new_ctor(BuiltinCtor::Function);
        self.set_prototype(self.function_ctor, Value::Object(self.function_prototype));
        self.set_property(
            self.function_ctor,
            "prototype",
            Value::Object(self.function_prototype),
        );
        let fresh_function = self.new_function();
        self.set_return_value(self.function_ctor, Value::Function(fresh_function));

        self.array_ctor = self.new_ctor(BuiltinCtor::Array);
        self.set_prototype(self.array_ctor, Value::Object(self.function_prototype));
        self.set_property(self.array_ctor, "prototype", Value::Object(self.array_prototype));
        let fresh_array = self.new_array();
        self.set_return_value(self.array_ctor, fresh_array);

        self.string_ctor = self.new_ctor(BuiltinCtor::String);
        self.set_prototype(self.string_ctor, Value::Object(self.function_prototype));
        self.set_property(self.string_ctor, "prototype", Value::Object(self.string_prototype));
        self.set_return_value(self.string_ctor, Value::String);

        self.boolean_ctor = self.new_ctor(BuiltinCtor::Boolean);
        self.set_prototype(self.boolean_ctor, Value::Object(self.function_prototype));
        self.set_property(
            self.boolean_ctor,
            "prototype",
            Value::Object(self.boolean_prototype),
        );
        self.set_return_value(self.boolean_ctor, Value::Boolean);

        self.number_ctor = self.new_ctor(BuiltinCtor::Number);
        self.set_prototype(self.number_ctor, Value::Object(self.function_prototype));
        self.set_property(self.number_ctor, "prototype", Value::Object(self.number_prototype));
        self.set_return_value(self.number_ctor, Value::Number);

        self.date_ctor = self.new_ctor(BuiltinCtor::Date);
        self.set_prototype(self.date_ctor, Value::Object(self.function_prototype));
        self.set_property(self.date_ctor, "prototype", Value::Object(self.date_prototype));
        self.set_return_value(self.date_ctor, Value::Object(self.date_prototype));

        self.regexp_ctor = self.new_ctor(BuiltinCtor::RegExp);
        self.set_prototype(self.regexp_ctor, Value::Object(self.function_prototype));
        self.set_property(self.regexp_ctor, "prototype", Value::Object(self.regexp_prototype));
        self.set_return_value(self.regexp_ctor, Value::Object(self.regexp_prototype));

        self.add_function(self.object_ctor, "getPrototypeOf", None, 1);
        self.add_function(self.object_ctor, "getOwnPropertyDescriptor", None, 2);
        let names_array = self.new_array();
        self.add_function(self.object_ctor, "getOwnPropertyNames", Some(names_array), 1);
        self.add_function(self.object_ctor, "create", None, 1);
        self.add_function(self.object_ctor, "defineProperty", None, 3);
        self.add_function(self.object_ctor, "defineProperties", None, 2);
        self.add_function(self.object_ctor, "seal", None, 1);
        self.add_function(self.object_ctor, "freeze", None, 1);
        self.add_function(self.object_ctor, "preventExtensions", None, 1);
        self.add_function(self.object_ctor, "isSealed", Some(Value::Boolean), 1);
        self.add_function(self.object_ctor, "isFrozen", Some(Value::Boolean), 1);
        self.add_function(self.object_ctor, "isExtensible", Some(Value::Boolean), 1);
        let keys_array = self.new_array();
        self.add_function(self.object_ctor, "keys", Some(keys_array), 1);

        self.add_function(self.object_prototype, "toString", Some(Value::String), 0);
        self.add_function(self.object_prototype, "toLocaleString", Some(Value::String), 0);
        self.add_function(self.object_prototype, "valueOf", None, 0);
        self.add_function(self.object_prototype, "hasOwnProperty", Some(Value::Boolean), 1);
        self.add_function(self.object_prototype, "isPrototypeOf", Some(Value::Boolean), 1);
        self.add_function(
            self.object_prototype,
            "propertyIsEnumerable",
            Some(Value::Boolean),
            1,
        );

        self.set_property(
            self.function_prototype,
            "constructor",
            Value::Function(self.function_ctor),
        );
        self.add_function(self.function_prototype, "toString", Some(Value::String), 0);
        self.add_function(self.function_prototype, "apply", None, 2);
        self.add_function(self.function_prototype, "call", None, 1);
        self.add_function(self.function_prototype, "bind", None, 1);

        self.add_function(self.array_ctor, "isArray", Some(Value::Boolean), 1);

        self.set_property(
            self.array_prototype,
            "constructor",
            Value::Function(self.array_ctor),
        );
        self.add_function(self.array_prototype, "toString", Some(Value::String), 0);
        self.add_function(self.array_prototype, "toLocaleString", Some(Value::String), 0);
        self.add_function(self.array_prototype, "concat", None, 0);
        self.add_function(self.array_prototype, "join", None, 1);
        self.add_function(self.array_prototype, "pop", None, 0);
        self.add_function(self.array_prototype, "push", None, 0);
        self.add_function(self.array_prototype, "reverse", None, 0);
        self.add_function(self.array_prototype, "shift", None, 0);
        self.add_function(self.array_prototype, "slice", None, 2);
        self.add_function(self.array_prototype, "sort", None, 1);
        self.add_function(self.array_prototype, "splice", None, 2);
        self.add_function(self.array_prototype, "unshift", None, 0);
        self.add_function(self.array_prototype, "indexOf", Some(Value::Number), 1);
        self.add_function(self.array_prototype, "lastIndexOf", Some(Value::Number), 1);
        self.add_function(self.array_prototype, "every", None, 1);
        self.add_function(self.array_prototype, "some", None, 1);
        self.add_function(self.array_prototype, "forEach", None, 1);
        self.add_function(self.array_prototype, "map", None, 1);
        self.add_function(self.array_prototype, "filter", None, 1);
        self.add_function(self.array_prototype, "reduce", None, 1);
        self.add_function(self.array_prototype, "reduceRight", None, 1);

        self.add_function(self.string_ctor, "fromCharCode", Some(Value::String), 0);

        self.set_property(
            self.string_prototype,
            "constructor",
            Value::Function(self.string_ctor),
        );
        self.add_function(self.string_prototype, "toString", Some(Value::String), 0);
        self.add_function(self.string_prototype, "valueOf", Some(Value::String), 0);
        self.add_function(self.string_prototype, "charAt", Some(Value::String), 1);
        self.add_function(self.string_prototype, "charCodeAt", Some(Value::Number), 1);
        self.add_function(self.string_prototype, "concat", Some(Value::String), 0);
        self.add_function(self.string_prototype, "indexOf", Some(Value::Number), 2);
        self.add_function(self.string_prototype, "lastIndexOf", Some(Value::Number), 2);
        self.add_function(self.string_prototype, "localeCompare", Some(Value::Boolean), 1);
        let match_array = self.new_array();
        self.add_function(self.string_prototype, "match", Some(match_array), 1);
        self.add_function(self.string_prototype, "replace", Some(Value::String), 2);
        self.add_function(self.string_prototype, "search", Some(Value::Number), 1);
        self.add_function(self.string_prototype, "slice", Some(Value::String), 2);
        let split_array = self.new_array();
        self.add_function(self.string_prototype, "split", Some(split_array), 1);
        self.add_function(self.string_prototype, "substring", Some(Value::String), 2);
        self.add_function(self.string_prototype, "toLowerCase", Some(Value::String), 0);
        self.add_function(self.string_prototype, "toLocaleLowerCase", Some(Value::String), 0);
        self.add_function(self.string_prototype, "toUpperCase", Some(Value::String), 0);
        self.add_function(self.string_prototype, "toLocaleUpperCase", Some(Value::String), 0);
        self.add_function(self.string_prototype, "trim", Some(Value::String), 0);

        self.set_property(
            self.boolean_prototype,
            "constructor",
            Value::Function(self.boolean_ctor),
        );
        self.add_function(self.boolean_prototype, "toString", Some(Value::String), 0);
        self.add_function(self.boolean_prototype, "valueOf", Some(Value::Boolean), 0);

        self.set_property(self.number_ctor, "MAX_VALUE", Value::Number);
        self.set_property(self.number_ctor, "MIN_VALUE", Value::Number);
        self.set_property(self.number_ctor, "NaN", Value::Number);
        self.set_property(self.number_ctor, "NEGATIVE_INFINITY", Value::Number);
        self.set_property(self.number_ctor, "POSITIVE_INFINITY", Value::Number);

        self.set_property(
            self.number_prototype,
            "constructor",
            Value::Function(self.number_ctor),
        );
        self.add_function(self.number_prototype, "toString", Some(Value::String), 0);
        self.add_function(self.number_prototype, "toLocaleString", Some(Value::String), 0);
        self.add_function(self.number_prototype, "valueOf", Some(Value::Number), 0);
        self.add_function(self.number_prototype, "toFixed", Some(Value::Number), 1);
        self.add_function(self.number_prototype, "toExponential", Some(Value::Number), 1);
        self.add_function(self.number_prototype, "toPrecision", Some(Value::Number), 1);

        self.math_object = self.new_object();
        self.set_property(self.math_object, "E", Value::Number);
        self.set_property(self.math_object, "LN10", Value::Number);
        self.set_property(self.math_object, "LN2", Value::Number);
        self.set_property(self.math_object, "LOG2E", Value::Number);
        self.set_property(self.math_object, "LOG10E", Value::Number);
        self.set_property(self.math_object, "PI", Value::Number);
        self.set_property(self.math_object, "SQRT1_2", Value::Number);
        self.set_property(self.math_object, "SQRT2", Value::Number);

        for name in [
            "abs", "acos", "asin", "atan", "ceil", "cos", "exp", "floor", "log", "round", "sin",
            "sqrt", "tan",
        ] {
            self.add_function(self.math_object, name, Some(Value::Number), 1);
        }
        self.add_function(self.math_object, "atan2", Some(Value::Number), 2);
        self.add_function(self.math_object, "max", Some(Value::Number), 0);
        self.add_function(self.math_object, "min", Some(Value::Number), 0);
        self.add_function(self.math_object, "pow", Some(Value::Number), 2);
        self.add_function(self.math_object, "random", Some(Value::Number), 1);

        self.add_function(self.date_ctor, "parse", Some(Value::Number), 1);
        self.add_function(self.date_ctor, "now", Some(Value::Number), 0);

        self.set_property(
            self.date_prototype,
            "constructor",
            Value::Function(self.date_ctor),
        );
        for name in [
            "toString",
            "toDateString",
            "toTimeString",
            "toLocaleString",
            "toLocaleDateString",
            "toLocaleTimeString",
            "toUTCString",
            "toISOString",
        ] {
            self.add_function(self.date_prototype, name, Some(Value::String), 0);
        }
        for name in [
            "valueOf",
            "getTime",
            "getFullYear",
            "getUTCFullYear",
            "getMonth",
            "getUTCMonth",
            "getDate",
            "getUTCDate",
            "getHours",
            "getUTCHours",
            "getMinutes",
            "getUTCMinutes",
            "getSeconds",
            "getUTCSeconds",
            "getMilliseconds",
            "getUTCMilliseconds",
            "getTimezoneOffset",
        ] {
            self.add_function(self.date_prototype, name, Some(Value::Number), 0);
        }
        for name in [
            "setTime",
            "setMilliseconds",
            "setUTCMilliseconds",
            "setSeconds",
            "setUTCSeconds",
            "setMinutes",
            "setUTCMinutes",
            "setHours",
            "setUTCHours",
            "setDate",
            "setUTCDate",
            "setMonth",
            "setUTCMonth",
            "setFullYear",
            "setUTCFullYear",
        ] {
            self.add_function(self.date_prototype, name, None, 1);
        }
        self.add_function(self.date_prototype, "toJSON", Some(Value::String), 1);

        self.set_property(
            self.regexp_prototype,
            "constructor",
            Value::Function(self.regexp_ctor),
        );
        let exec_array = self.new_array();
        self.add_function(self.regexp_prototype, "exec", Some(exec_array), 1);
        self.add_function(self.regexp_prototype, "test", Some(Value::Boolean), 1);
        self.add_function(self.regexp_prototype, "toString", Some(Value::String), 0);

        self.set_property(self.global_object, "Math", Value::Object(self.math_object));
        self.set_property(self.global_object, "Object", Value::Function(self.object_ctor));
        self.set_property(
            self.global_object,
            "Function",
            Value::Function(self.function_ctor),
        );
        self.set_property(self.global_object, "Array", Value::Function(self.array_ctor));
        self.set_property(self.global_object, "String", Value::Function(self.string_ctor));
        self.set_property(
            self.global_object,
            "Boolean",
            Value::Function(self.boolean_ctor),
        );
        self.set_property(self.global_object, "Number", Value::Function(self.number_ctor));
        self.set_property(self.global_object, "Date", Value::Function(self.date_ctor));
        self.set_property(self.global_object, "RegExp", Value::Function(self.regexp_ctor));

        // host utilities
        self.host_object = self.new_object_with_prototype(None);
        self.add_function(self.host_object, "rgba", None, 4);
        self.add_function(self.host_object, "hsla", None, 4);
        self.add_function(self.host_object, "rect", None, 4);
        self.add_function(self.host_object, "point", None, 2);
        self.add_function(self.host_object, "size", None, 2);
        self.add_function(self.host_object, "vector3d", None, 3);
        self.add_function(self.host_object, "lighter", None, 1);
        self.add_function(self.host_object, "darker", None, 1);
        self.add_function(self.host_object, "tint", None, 2);
        self.add_function(self.host_object, "openUrlExternally", None, 1);
        self.add_function(self.host_object, "md5", None, 1);
        self.add_function(self.host_object, "btoa", None, 1);
        self.add_function(self.host_object, "atob", None, 1);
        self.add_function(self.host_object, "quit", None, 0);
        self.add_function(self.host_object, "resolvedUrl", None, 1);

        let console_object = self.new_object_with_prototype(None);
        self.add_function(console_object, "log", None, 1);
        self.add_function(console_object, "debug", None, 1);

        self.set_property(self.global_object, "console", Value::Object(console_object));
        self.set_property(
            self.global_object,
            HOST_OBJECT_NAME,
            Value::Object(self.host_object),
        );

        self.font_object = self.new_object_with_prototype(None);
        self.set_class_name(self.font_object, "Font");
        self.set_property(self.font_object, "family", Value::String);
        self.set_property(self.font_object, "weight", Value::Undefined);
        self.set_property(self.font_object, "capitalization", Value::Undefined);
        self.set_property(self.font_object, "bold", Value::Boolean);
        self.set_property(self.font_object, "italic", Value::Boolean);
        self.set_property(self.font_object, "underline", Value::Boolean);
        self.set_property(self.font_object, "overline", Value::Boolean);
        self.set_property(self.font_object, "strikeout", Value::Boolean);
        self.set_property(self.font_object, "pointSize", Value::Number);
        self.set_property(self.font_object, "pixelSize", Value::Number);
        self.set_property(self.font_object, "letterSpacing", Value::Number);
        self.set_property(self.font_object, "wordSpacing", Value::Number);

        self.point_object = self.new_object_with_prototype(None);
        self.set_class_name(self.point_object, "Point");
        self.set_property(self.point_object, "x", Value::Number);
        self.set_property(self.point_object, "y", Value::Number);

        self.size_object = self.new_object_with_prototype(None);
        self.set_class_name(self.size_object, "Size");
        self.set_property(self.size_object, "width", Value::Number);
        self.set_property(self.size_object, "height", Value::Number);

        self.rect_object = self.new_object_with_prototype(None);
        self.set_class_name(self.rect_object, "Rect");
        self.set_property(self.rect_object, "x", Value::Number);
        self.set_property(self.rect_object, "y", Value::Number);
        self.set_property(self.rect_object, "width", Value::Number);
        self.set_property(self.rect_object, "height", Value::Number);

        self.vector3d_object = self.new_object_with_prototype(None);
        self.set_class_name(self.vector3d_object, "Vector3D");
        self.set_property(self.vector3d_object, "x", Value::Number);
        self.set_property(self.vector3d_object, "y", Value::Number);
        self.set_property(self.vector3d_object, "z", Value::Number);
    }
}
