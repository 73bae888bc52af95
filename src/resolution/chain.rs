//! Ordered chain of named-type resolvers
//!
//! The order is not hard-coded: each resolver states which resolvers it must
//! run before, and the chain is the topological order of those constraints.
//! Type parameters shadow documented types, documented types shadow external
//! ones, and the external resolver, which may create rows, goes last.

use super::descriptor::TypeDescriptor;
use super::resolvers::{ResolveScope, Resolved, TypeResolver};
use super::topo::topological_sort;
use crate::catalog::CatalogSession;
use crate::error::{ResolveError, ResolveResult};
use tracing::{trace, warn};

/// `(before, after)` pairs
pub const RESOLVER_ORDERING: &[(TypeResolver, TypeResolver)] = &[
    (TypeResolver::Local, TypeResolver::Documented),
    (TypeResolver::Documented, TypeResolver::Tuple),
    (TypeResolver::Tuple, TypeResolver::External),
];

#[derive(Debug, Clone)]
pub struct ResolverChain {
    order: Vec<TypeResolver>,
}

impl ResolverChain {
    /// The standard chain: Local, Documented, Tuple, External
    pub fn new() -> ResolveResult<Self> {
        Self::with_constraints(&TypeResolver::ALL, RESOLVER_ORDERING)
    }

    pub fn with_constraints(
        resolvers: &[TypeResolver],
        constraints: &[(TypeResolver, TypeResolver)],
    ) -> ResolveResult<Self> {
        let order = topological_sort(resolvers, constraints).map_err(|cycle| {
            ResolveError::ResolverOrder {
                members: cycle
                    .remaining
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })?;
        Ok(Self { order })
    }

    pub fn order(&self) -> &[TypeResolver] {
        &self.order
    }

    /// Resolve one descriptor to a named type.
    ///
    /// Resolvers are consulted in order and the first match wins. Tuple
    /// descriptors take the same path in every resolver, so only the first one
    /// is asked.
    pub fn resolve(
        &self,
        session: &mut CatalogSession,
        descriptor: &TypeDescriptor,
        scope: &ResolveScope<'_>,
    ) -> ResolveResult<Resolved> {
        let resolvers = if descriptor.is_tuple() {
            &self.order[..self.order.len().min(1)]
        } else {
            &self.order[..]
        };

        for resolver in resolvers {
            if let Some(resolved) = resolver.find_type(self, session, descriptor, scope)? {
                trace!(
                    name = descriptor.name(),
                    %resolver,
                    target = %resolved.target,
                    "resolved type"
                );
                return Ok(resolved);
            }
        }

        warn!(name = %descriptor, "no resolver matched type");
        Err(ResolveError::Unresolved {
            name: descriptor.to_string(),
        })
    }
}
