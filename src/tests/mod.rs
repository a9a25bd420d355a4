// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod convert;
mod loader;
mod objects;
mod scopes;

use crate::{load_type_description, Context, TypeRegistry};

/// A context over an empty catalog.
pub(crate) fn context() -> Context {
    Context::new(&TypeRegistry::new())
}

/// A context whose engine has materialized the given description document.
pub(crate) fn context_with_catalog(xml: &str) -> Context {
    let registry = TypeRegistry::new();
    let errors = load_type_description(&registry, "<catalog>", xml);
    assert!(errors.is_empty(), "catalog did not parse cleanly: {errors:?}");
    Context::new(&registry)
}
