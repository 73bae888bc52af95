//! Namespace contexts: the places a partially qualified name may be found
//!
//! A context is a label (`System.Collections`, `App.Outer`, or empty for the
//! global namespace) plus the catalog row it stands for. Nested types are
//! contexts too, since `Outer.Inner` is found by qualifying `Inner` with the
//! label of `Outer`.

use crate::catalog::{CatalogError, CatalogResult, CatalogSession};
use crate::types::{NamedTypeId, NamespaceId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContextScope {
    Namespace(NamespaceId),
    Type(NamedTypeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamespaceContext {
    label: String,
    scope: ContextScope,
}

impl NamespaceContext {
    pub fn namespace(label: impl Into<String>, id: NamespaceId) -> Self {
        Self {
            label: label.into(),
            scope: ContextScope::Namespace(id),
        }
    }

    pub fn type_scope(label: impl Into<String>, id: NamedTypeId) -> Self {
        Self {
            label: label.into(),
            scope: ContextScope::Type(id),
        }
    }

    /// Context for the global namespace of `session`
    pub fn global(session: &CatalogSession) -> Self {
        Self::namespace("", session.global_namespace())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn scope(&self) -> ContextScope {
        self.scope
    }

    pub fn is_global(&self) -> bool {
        self.label.is_empty()
    }

    /// `name` as it would be spelled from inside this context
    pub fn qualify(&self, name: &str) -> String {
        if self.is_global() {
            name.to_string()
        } else {
            format!("{}.{name}", self.label)
        }
    }
}

/// Append every context of `extra` whose label is not in `contexts` yet.
///
/// Order is preserved, so the first occurrence of a label keeps its position.
pub fn merge_contexts<'a>(
    contexts: &mut Vec<NamespaceContext>,
    extra: impl IntoIterator<Item = &'a NamespaceContext>,
) {
    for context in extra {
        if !contexts.iter().any(|c| c.label == context.label) {
            contexts.push(context.clone());
        }
    }
}

/// Contexts for `namespace` and each namespace containing it, innermost first.
///
/// The global namespace comes last.
pub fn namespace_chain(
    session: &CatalogSession,
    namespace: NamespaceId,
) -> CatalogResult<Vec<NamespaceContext>> {
    let mut chain = Vec::new();
    let mut current = Some(namespace);
    while let Some(id) = current {
        let ns = session
            .namespace(id)
            .ok_or(CatalogError::MissingNamespaceId { id })?;
        chain.push(NamespaceContext::namespace(ns.name.clone(), id));
        current = ns.parent;
    }
    Ok(chain)
}

/// Contexts visible from inside a documented type, from the catalog alone.
///
/// The type itself, then its containing types outward, then its namespace
/// chain ending with the global namespace.
pub fn visible_from_type(
    session: &CatalogSession,
    type_id: NamedTypeId,
) -> CatalogResult<Vec<NamespaceContext>> {
    let mut contexts = Vec::new();
    let mut current = Some(type_id);
    let mut namespace = None;

    while let Some(id) = current {
        let doc = session.documented(id)?;
        contexts.push(NamespaceContext::type_scope(doc.full_name.clone(), id));
        namespace = Some(doc.namespace);
        current = doc.containing_type;
    }

    if let Some(namespace) = namespace {
        let chain = namespace_chain(session, namespace)?;
        merge_contexts(&mut contexts, &chain);
    }
    Ok(contexts)
}
