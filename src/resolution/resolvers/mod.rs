//! The four named-type resolvers
//!
//! Each resolver answers one question: does this descriptor name a type of my
//! kind? `Ok(None)` means "not mine", and the chain moves on. `Err` means the
//! catalog is inconsistent and resolution stops.
//!
//! Tuple descriptors are special: every resolver hands them to the structural
//! tuple matcher, whatever its own kind.
//!
//! Finding a type only stages rows that creation permission covers (new
//! external and tuple types). Local-type rows and namespaces learned by
//! external types are carried in [`Resolved`] and only staged by
//! [`Resolved::commit`], once the whole reference tree resolved.

mod documented;
mod external;
mod local;
mod tuple;

use super::chain::ResolverChain;
use super::descriptor::TypeDescriptor;
use super::namespace::{NamespaceContext, merge_contexts, visible_from_type};
use crate::catalog::{CatalogSession, NamedType, NamedTypeKind};
use crate::error::ResolveResult;
use crate::types::NamedTypeId;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// A resolver of one named-type kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TypeResolver {
    Documented,
    Local,
    External,
    Tuple,
}

impl TypeResolver {
    pub const ALL: [TypeResolver; 4] = [
        TypeResolver::Documented,
        TypeResolver::Local,
        TypeResolver::External,
        TypeResolver::Tuple,
    ];

    /// Kind of catalog row this resolver finds or creates
    pub fn entity_kind(self) -> NamedTypeKind {
        match self {
            TypeResolver::Documented => NamedTypeKind::Documented,
            TypeResolver::Local => NamedTypeKind::Local,
            TypeResolver::External => NamedTypeKind::External,
            TypeResolver::Tuple => NamedTypeKind::Tuple,
        }
    }

    pub fn find_type(
        self,
        chain: &ResolverChain,
        session: &mut CatalogSession,
        descriptor: &TypeDescriptor,
        scope: &ResolveScope<'_>,
    ) -> ResolveResult<Option<Resolved>> {
        if descriptor.is_tuple() {
            return tuple::find(chain, session, descriptor, scope);
        }

        match self {
            TypeResolver::Documented => {
                let contexts = scope.applicable_contexts(session, descriptor)?;
                let found = documented::find(session, descriptor, contexts.as_deref());
                Ok(found.map(Resolved::named))
            }
            TypeResolver::Local => local::find(session, descriptor, scope),
            TypeResolver::External => {
                let contexts = scope.applicable_contexts(session, descriptor)?;
                external::find(session, descriptor, contexts.as_deref(), scope.allow_create)
            }
            // Only tuple descriptors are tuples
            TypeResolver::Tuple => Ok(None),
        }
    }
}

impl fmt::Display for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entity_kind())
    }
}

/// Named type a descriptor resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A row the session already holds
    Existing(NamedTypeId),
    /// A use of a type parameter; its local-type row is staged on commit
    Local {
        declaring_type: NamedTypeId,
        index: u32,
        name: String,
    },
}

/// A resolved descriptor.
///
/// For tuples, `elements` holds the resolution of each element descriptor so
/// the reference tree can reuse it instead of resolving the elements again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub target: Target,
    /// Namespaces an external target learns on commit
    pub learned_namespaces: BTreeSet<String>,
    pub elements: Vec<Resolved>,
}

impl Resolved {
    pub fn named(named_type: NamedTypeId) -> Self {
        Self::new(Target::Existing(named_type))
    }

    pub fn new(target: Target) -> Self {
        Self {
            target,
            learned_namespaces: BTreeSet::new(),
            elements: Vec::new(),
        }
    }

    /// The catalogued type, if resolution did not defer its row
    pub fn existing(&self) -> Option<NamedTypeId> {
        match self.target {
            Target::Existing(id) => Some(id),
            Target::Local { .. } => None,
        }
    }

    /// Whether this resolution names the same type as `stored`.
    ///
    /// Documented types compare by full name, everything else by simple name.
    pub fn same_identity(
        &self,
        session: &CatalogSession,
        stored: &NamedType,
    ) -> ResolveResult<bool> {
        Ok(match &self.target {
            Target::Existing(id) => stored.same_identity(session.require_named_type(*id)?),
            Target::Local { name, .. } => stored.name() == name,
        })
    }

    /// Stage the deferred local-type row or learned namespaces and return the
    /// named type. Element resolutions are left alone.
    pub fn commit(&self, session: &mut CatalogSession) -> ResolveResult<NamedTypeId> {
        match &self.target {
            Target::Existing(id) => {
                if !self.learned_namespaces.is_empty() {
                    let added = session.extend_external_namespaces(
                        *id,
                        self.learned_namespaces.iter().map(String::as_str),
                    )?;
                    if added > 0 {
                        debug!(named_type = %id, added, "external type seen from new namespaces");
                    }
                }
                Ok(*id)
            }
            Target::Local {
                declaring_type,
                index,
                name,
            } => {
                let id = session.add_local_type(*declaring_type, *index, name);
                debug!(%name, index, %declaring_type, %id, "staged local type");
                Ok(id)
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Existing(id) => write!(f, "{id}"),
            Target::Local { name, .. } => write!(f, "local {name}"),
        }
    }
}

/// Everything a resolver may consult besides the descriptor itself
#[derive(Debug, Clone, Copy)]
pub struct ResolveScope<'a> {
    /// Type whose source contains the reference
    pub container: NamedTypeId,
    /// Contexts from the outer `using` directives of the source file
    pub file_contexts: &'a [NamespaceContext],
    /// Whether unseen external and tuple types may be catalogued
    pub allow_create: bool,
}

impl ResolveScope<'_> {
    /// Contexts to search for a descriptor, innermost first.
    ///
    /// `None` when the descriptor is fully resolved. Otherwise its own contexts
    /// merged with those visible from a documented container and the file
    /// contexts, ending with the global namespace.
    pub fn applicable_contexts(
        &self,
        session: &CatalogSession,
        descriptor: &TypeDescriptor,
    ) -> ResolveResult<Option<Vec<NamespaceContext>>> {
        let Some(own) = descriptor.namespace_context() else {
            return Ok(None);
        };

        let mut contexts = own.to_vec();
        if let Some(NamedType::Documented(_)) = session.named_type(self.container) {
            merge_contexts(&mut contexts, &visible_from_type(session, self.container)?);
        }
        merge_contexts(&mut contexts, self.file_contexts);
        merge_contexts(&mut contexts, [&NamespaceContext::global(session)]);
        Ok(Some(contexts))
    }
}
