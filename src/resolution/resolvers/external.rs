use super::Resolved;
use crate::catalog::CatalogSession;
use crate::error::ResolveResult;
use crate::parsing::csharp::names::PREDEFINED_NAMESPACE;
use crate::resolution::descriptor::TypeDescriptor;
use crate::resolution::namespace::NamespaceContext;
use crate::types::NamedTypeId;
use std::collections::BTreeSet;
use tracing::debug;

/// Namespaces an external type named by `descriptor` could live in.
///
/// Each context label joined with the dotted qualifier of the name, or the
/// qualifier alone when the name is fully resolved. Keywords live in `System`.
pub(super) fn effective_namespaces(
    descriptor: &TypeDescriptor,
    contexts: Option<&[NamespaceContext]>,
) -> BTreeSet<String> {
    let (qualifier, _) = descriptor.split_qualifier();

    match contexts {
        Some(contexts) => contexts
            .iter()
            .map(|context| match qualifier {
                Some(qualifier) => context.qualify(qualifier),
                None => context.label().to_string(),
            })
            .collect(),
        None if descriptor.is_predefined() => BTreeSet::from([PREDEFINED_NAMESPACE.to_string()]),
        None => BTreeSet::from([qualifier.unwrap_or_default().to_string()]),
    }
}

/// Namespaces that can tie a lookup to a catalogued external type.
///
/// Every context list ends with the global namespace, so for a name looked
/// up through contexts the global namespace proves nothing. It only counts
/// for a name rooted there, or when no other namespace is left.
fn witnesses<'a>(
    effective: &'a BTreeSet<String>,
    contexts: Option<&[NamespaceContext]>,
) -> Vec<&'a str> {
    let all = effective.iter().map(String::as_str);
    if contexts.is_none() {
        return all.collect();
    }
    let scoped: Vec<&str> = all.clone().filter(|ns| !ns.is_empty()).collect();
    if scoped.is_empty() { all.collect() } else { scoped }
}

/// Find an external type by simple name and arity whose possible namespaces
/// overlap the effective ones, or stage a new one when creation is allowed.
///
/// A match learns every effective namespace it did not know yet once the
/// resolution is committed. When several rows match, the oldest wins.
pub(super) fn find(
    session: &mut CatalogSession,
    descriptor: &TypeDescriptor,
    contexts: Option<&[NamespaceContext]>,
    allow_create: bool,
) -> ResolveResult<Option<Resolved>> {
    let (_, simple_name) = descriptor.split_qualifier();
    let arity = descriptor.argument_count() as u32;
    let effective = effective_namespaces(descriptor, contexts);
    let witnesses = witnesses(&effective, contexts);

    let matching: Vec<NamedTypeId> = session
        .external_candidates(simple_name, arity)
        .into_iter()
        .filter(|id| {
            session
                .named_type(*id)
                .and_then(|ty| ty.as_external())
                .is_some_and(|ext| ext.could_live_in(witnesses.iter().copied()))
        })
        .collect();

    if let Some(&first) = matching.first() {
        if matching.len() > 1 {
            debug!(
                name = simple_name,
                arity,
                candidates = matching.len(),
                chosen = %first,
                "ambiguous external type, using the oldest"
            );
        }
        return Ok(Some(Resolved {
            learned_namespaces: effective,
            ..Resolved::named(first)
        }));
    }

    if !allow_create {
        debug!(name = simple_name, arity, "no external type and creation is disabled");
        return Ok(None);
    }

    let id = session.add_external_type(simple_name, arity, effective);
    debug!(name = simple_name, arity, %id, "staged external type");
    Ok(Some(Resolved::named(id)))
}
