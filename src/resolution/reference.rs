//! Type-reference resolver: descriptor tree in, persisted reference tree out
//!
//! The reference tree has the same shape as the descriptor tree. Each node
//! points at the named type its descriptor resolved to and keeps the
//! descriptor's array rank.

use super::analyzer::TypeAnalysis;
use super::chain::ResolverChain;
use super::descriptor::TypeDescriptor;
use super::resolvers::{ResolveScope, Resolved};
use crate::catalog::{CatalogSession, NamedType};
use crate::error::{ResolveError, ResolveResult};
use crate::types::TypeReferenceId;
use tracing::debug;

/// A fully resolved node, not yet staged
#[derive(Debug)]
struct ResolvedNode {
    resolved: Resolved,
    rank: u32,
    children: Vec<ResolvedNode>,
}

#[derive(Debug, Clone)]
pub struct TypeReferenceResolver {
    chain: ResolverChain,
}

impl TypeReferenceResolver {
    pub fn new() -> ResolveResult<Self> {
        Ok(Self {
            chain: ResolverChain::new()?,
        })
    }

    pub fn with_chain(chain: ResolverChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &ResolverChain {
        &self.chain
    }

    /// Resolve every node of the analysis and stage the reference tree.
    ///
    /// Returns the root reference. Local types, learned namespaces and
    /// reference rows are only staged once the whole tree resolved. New
    /// external and tuple types are staged while resolving, which only
    /// happens when creation is allowed.
    pub fn resolve(
        &self,
        session: &mut CatalogSession,
        analysis: &TypeAnalysis,
    ) -> ResolveResult<TypeReferenceId> {
        if !matches!(session.named_type(analysis.container), Some(NamedType::Documented(_))) {
            return Err(ResolveError::InvalidAnalysis {
                reason: format!("container {} is not a documented type", analysis.container),
            });
        }
        if session.source_file(analysis.source_file).is_none() {
            return Err(ResolveError::InvalidAnalysis {
                reason: format!("source file {} is not catalogued", analysis.source_file),
            });
        }

        let scope = ResolveScope {
            container: analysis.container,
            file_contexts: &analysis.file_contexts,
            allow_create: analysis.allow_create,
        };

        let resolved = self.chain.resolve(session, &analysis.root, &scope)?;
        let tree = self.resolve_tree(session, &analysis.root, resolved, &scope)?;
        let root = stage(session, &tree, None)?;
        debug!(
            descriptor = %analysis.root,
            %root,
            "staged type reference"
        );
        Ok(root)
    }

    fn resolve_tree(
        &self,
        session: &mut CatalogSession,
        descriptor: &TypeDescriptor,
        mut resolved: Resolved,
        scope: &ResolveScope<'_>,
    ) -> ResolveResult<ResolvedNode> {
        let mut elements = std::mem::take(&mut resolved.elements).into_iter();
        let mut children = Vec::with_capacity(descriptor.argument_count());

        for argument in descriptor.arguments() {
            // Tuple elements were resolved while matching the tuple
            let child = match elements.next() {
                Some(element) if descriptor.is_tuple() => element,
                _ => self.chain.resolve(session, argument, scope)?,
            };
            children.push(self.resolve_tree(session, argument, child, scope)?);
        }

        Ok(ResolvedNode {
            resolved,
            rank: descriptor.rank(),
            children,
        })
    }
}

fn stage(
    session: &mut CatalogSession,
    node: &ResolvedNode,
    parent: Option<TypeReferenceId>,
) -> ResolveResult<TypeReferenceId> {
    let named_type = node.resolved.commit(session)?;
    let id = session.add_type_reference(named_type, node.rank, parent);
    for child in &node.children {
        stage(session, child, Some(id))?;
    }
    Ok(id)
}
