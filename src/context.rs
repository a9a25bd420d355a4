// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Scope chains and the per-query context.
//!
//! The context owns the engine of one analysis session plus everything a
//! top-level query needs: the scope chain, the per-document type
//! environments, a per-object computed-property side table, and the
//! reentrancy stack that keeps reference resolution from recursing into
//! itself. Queries never fail; a name that resolves nowhere is `Undefined`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use tracing::debug;

use crate::convert::{ConvertToNumber, ConvertToObject, ConvertToString};
use crate::document::{Document, ImportInfo, ImportKind};
use crate::engine::Engine;
use crate::meta::TypeRegistry;
use crate::object::ObjectBacking;
use crate::value::{ObjectId, ReferenceId, Value};

/// The chain of instantiating components leading to one document.
#[derive(Clone, Debug, Default)]
pub struct ComponentChain {
    pub instantiating_components: Vec<ComponentChain>,
    pub document: Option<Rc<Document>>,
}

impl ComponentChain {
    pub fn new(document: Rc<Document>) -> Self {
        ComponentChain {
            instantiating_components: Vec::new(),
            document: Some(document),
        }
    }

    /// Depth-first over the parents, then this document's root and ids.
    fn collect(&self, list: &mut Vec<ObjectId>) {
        for parent in &self.instantiating_components {
            parent.collect(list);
        }
        let Some(document) = &self.document else {
            return;
        };
        if let Some(root) = document.root_object_value().and_then(Value::as_object) {
            list.push(root);
        }
        if let Some(ids) = document.id_environment().and_then(Value::as_object) {
            list.push(ids);
        }
    }
}

/// The ordered list of lookup scopes for one document, recombined by
/// [`ScopeChain::update`] whenever an input changes. Later entries shadow
/// earlier ones: lookup walks the flattened list back to front.
#[derive(Clone, Debug, Default)]
pub struct ScopeChain {
    pub global_scope: Option<ObjectId>,
    pub component_scope: Option<ComponentChain>,
    pub scope_objects: Vec<ObjectId>,
    pub type_environment: Option<ObjectId>,
    pub js_scopes: Vec<ObjectId>,
    all: Vec<ObjectId>,
}

impl ScopeChain {
    pub fn update(&mut self) {
        self.all.clear();

        if let Some(global) = self.global_scope {
            self.all.push(global);
        }

        // the root scope of a plain script file does not see instantiating
        // components
        if self.js_scopes.len() != 1 || !self.scope_objects.is_empty() {
            if let Some(component) = &self.component_scope {
                for parent in &component.instantiating_components {
                    parent.collect(&mut self.all);
                }
            }
        }

        let mut root = None;
        let mut ids = None;
        if let Some(component) = &self.component_scope {
            if let Some(document) = &component.document {
                root = document.root_object_value().and_then(Value::as_object);
                ids = document.id_environment().and_then(Value::as_object);
            }
        }

        if let Some(root) = root {
            if !self.scope_objects.contains(&root) {
                self.all.push(root);
            }
        }
        self.all.extend(self.scope_objects.iter().copied());
        if let Some(ids) = ids {
            self.all.push(ids);
        }
        if let Some(types) = self.type_environment {
            self.all.push(types);
        }
        self.all.extend(self.js_scopes.iter().copied());
    }

    pub fn all(&self) -> &[ObjectId] {
        &self.all
    }
}

pub struct Context {
    engine: Engine,
    scope_chain: ScopeChain,
    type_environments: RefCell<HashMap<String, ObjectId>>,
    properties: RefCell<HashMap<ObjectId, BTreeMap<String, Value>>>,
    reference_stack: RefCell<Vec<ReferenceId>>,
    resolved_references: RefCell<HashMap<ReferenceId, Option<Value>>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::with_engine(Engine::default())
    }
}

impl Context {
    pub fn new(registry: &TypeRegistry) -> Context {
        Self::with_engine(Engine::new(registry))
    }

    pub fn with_engine(engine: Engine) -> Context {
        Context {
            engine,
            scope_chain: ScopeChain::default(),
            type_environments: RefCell::new(HashMap::new()),
            properties: RefCell::new(HashMap::new()),
            reference_stack: RefCell::new(Vec::new()),
            resolved_references: RefCell::new(HashMap::new()),
        }
    }

    /// The engine lives exactly as long as the context.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn scope_chain(&self) -> &ScopeChain {
        &self.scope_chain
    }

    pub fn scope_chain_mut(&mut self) -> &mut ScopeChain {
        &mut self.scope_chain
    }

    pub fn type_environment(&self, document: &Document) -> Option<ObjectId> {
        self.type_environments
            .borrow()
            .get(document.file_name())
            .copied()
    }

    pub fn set_type_environment(&self, document: &Document, environment: ObjectId) {
        self.type_environments
            .borrow_mut()
            .insert(document.file_name().to_string(), environment);
    }

    /// Resolve a bare identifier against the scope chain, innermost first.
    /// Also reports which scope produced the match, for provenance.
    pub fn lookup(&self, name: &str) -> (Value, Option<ObjectId>) {
        for scope in self.scope_chain.all().iter().rev() {
            if let Some(member) = self.lookup_member(*scope, name) {
                return (member, Some(*scope));
            }
        }
        (Value::Undefined, None)
    }

    /// Resolve a dotted type path against the document's type environment,
    /// narrowing every step to an object.
    pub fn lookup_type<S: AsRef<str>>(
        &self,
        document: &Document,
        parts: &[S],
    ) -> Option<ObjectId> {
        let mut object = self.type_environment(document)?;
        for part in parts {
            let value = self.lookup_member(object, part.as_ref())?;
            object = value.as_object()?;
        }
        Some(object)
    }

    /// Reentrancy-guarded reference resolution: a reference already on the
    /// stack is a cycle and resolves to no value. Top-level resolutions are
    /// memoized per context.
    pub fn lookup_reference(&self, reference: ReferenceId) -> Option<Value> {
        let top_level = {
            let mut stack = self.reference_stack.borrow_mut();
            if stack.contains(&reference) {
                debug!("reference cycle defused during resolution");
                return None;
            }
            let top_level = stack.is_empty();
            if top_level {
                if let Some(resolved) = self.resolved_references.borrow().get(&reference) {
                    return *resolved;
                }
            }
            stack.push(reference);
            top_level
        };

        let resolver = self.engine.resolver(reference);
        let value = resolver.resolve(self);

        self.reference_stack.borrow_mut().pop();
        if top_level {
            self.resolved_references.borrow_mut().insert(reference, value);
        }
        value
    }

    /// Narrow an object's prototype, resolving a deferred prototype through
    /// this context.
    pub fn prototype(&self, object: ObjectId) -> Option<ObjectId> {
        match self.engine.prototype_value(object)? {
            Value::Object(prototype) | Value::Function(prototype) => Some(prototype),
            Value::Reference(reference) => {
                self.lookup_reference(reference).and_then(Value::as_object)
            }
            _ => None,
        }
    }

    /// Full member lookup: own members first, then synthesized members, then
    /// the prototype chain. A prototype cycle terminates the walk with "not
    /// found".
    pub fn lookup_member(&self, object: ObjectId, name: &str) -> Option<Value> {
        self.lookup_member_impl(object, name, true)
    }

    /// Member lookup that does not consult prototypes.
    pub fn lookup_own_member(&self, object: ObjectId, name: &str) -> Option<Value> {
        self.lookup_member_impl(object, name, false)
    }

    fn lookup_member_impl(
        &self,
        object: ObjectId,
        name: &str,
        examine_prototypes: bool,
    ) -> Option<Value> {
        let mut visited = HashSet::new();
        let mut current = object;
        loop {
            if !visited.insert(current) {
                debug!("prototype cycle defused during member lookup");
                return None;
            }
            if self.engine.is_type_environment(current) {
                return self.type_environment_member(current, name);
            }
            if let Some(value) = self.engine.own_member(current, name) {
                return Some(value);
            }
            if !examine_prototypes {
                return None;
            }
            match self.prototype(current) {
                Some(prototype) => current = prototype,
                None => return None,
            }
        }
    }

    /// An object's property by name, through the full member protocol.
    pub fn property_value(&self, object: ObjectId, name: &str) -> Option<Value> {
        self.lookup_member(object, name)
    }

    fn type_environment_member(&self, environment: ObjectId, name: &str) -> Option<Value> {
        let ObjectBacking::TypeEnvironment(data) = self.engine.backing(environment) else {
            return None;
        };
        for (import, info) in &data.imports {
            if let Some(id) = info.id() {
                if id == name {
                    return Some(*import);
                }
                continue;
            }
            match info.kind() {
                ImportKind::File => {
                    if let Some(object) = import.as_object() {
                        if self.engine.class_name(object) == name {
                            return Some(*import);
                        }
                    }
                }
                _ => {
                    if let Some(object) = import.as_object() {
                        if let Some(value) = self.lookup_member(object, name) {
                            return Some(value);
                        }
                    }
                }
            }
        }
        None
    }

    /// Which import of the environment supplies `name` (the first dotted
    /// segment of it).
    pub fn import_info(&self, environment: ObjectId, name: &str) -> Option<ImportInfo> {
        let first = name.split('.').next().unwrap_or(name);
        let ObjectBacking::TypeEnvironment(data) = self.engine.backing(environment) else {
            return None;
        };
        for (import, info) in &data.imports {
            if let Some(id) = info.id() {
                if id == first {
                    return Some(info.clone());
                }
                continue;
            }
            match info.kind() {
                ImportKind::File => {
                    if let Some(object) = import.as_object() {
                        if self.engine.class_name(object) == first {
                            return Some(info.clone());
                        }
                    }
                }
                _ => {
                    if let Some(object) = import.as_object() {
                        if self.lookup_member(object, first).is_some() {
                            return Some(info.clone());
                        }
                    }
                }
            }
        }
        None
    }

    /// The first non-empty declared default-property name along the
    /// prototype chain.
    pub fn default_property_name(&self, object: ObjectId) -> Option<String> {
        let mut visited = HashSet::new();
        let mut current = Some(object);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            if let Some(name) = self.engine.declared_default_property(id) {
                if !name.is_empty() {
                    return Some(name);
                }
            }
            current = self.prototype(id);
        }
        None
    }

    /// The memoized computed value of `(object, name)`, `Undefined` when
    /// nothing was stored.
    pub fn property(&self, object: ObjectId, name: &str) -> Value {
        self.properties
            .borrow()
            .get(&object)
            .and_then(|map| map.get(name))
            .copied()
            .unwrap_or(Value::Undefined)
    }

    pub fn set_property(&self, object: ObjectId, name: &str, value: Value) {
        self.properties
            .borrow_mut()
            .entry(object)
            .or_default()
            .insert(name.to_string(), value);
    }

    pub fn convert_to_number(&self, value: Value) -> Value {
        ConvertToNumber::new(self).convert(value)
    }

    // boolean conversion is approximated by the number conversion
    pub fn convert_to_boolean(&self, value: Value) -> Value {
        self.convert_to_number(value)
    }

    pub fn convert_to_string(&self, value: Value) -> Value {
        ConvertToString::new(self).convert(value)
    }

    pub fn convert_to_object(&self, value: Value) -> Value {
        ConvertToObject::new(self).convert(value)
    }

    pub fn type_id(&self, value: Value) -> String {
        self.engine.type_id(value)
    }
}
