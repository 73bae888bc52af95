use super::{ResolveScope, Resolved};
use crate::catalog::{CatalogSession, NewTupleElement};
use crate::error::ResolveResult;
use crate::resolution::chain::ResolverChain;
use crate::resolution::descriptor::{TypeDescriptor, default_element_name};
use crate::types::NamedTypeId;
use tracing::debug;

/// Resolve a tuple descriptor by structure.
///
/// Elements are resolved through the whole chain first. A catalogued tuple
/// matches when it has the same number of elements and every position agrees
/// on name, rank and element type. Without a match a new tuple is staged and
/// flushed straight away, when creation is allowed. Its element rows need
/// element types, so the element resolutions are committed first.
pub(super) fn find(
    chain: &ResolverChain,
    session: &mut CatalogSession,
    descriptor: &TypeDescriptor,
    scope: &ResolveScope<'_>,
) -> ResolveResult<Option<Resolved>> {
    let elements = descriptor.arguments();
    let mut resolved = Vec::with_capacity(elements.len());
    for element in elements {
        resolved.push(chain.resolve(session, element, scope)?);
    }

    for candidate in session.tuple_candidates(elements.len()) {
        if matches(session, candidate, elements, &resolved)? {
            debug!(tuple = descriptor.name(), %candidate, "tuple type matched");
            return Ok(Some(Resolved {
                elements: resolved,
                ..Resolved::named(candidate)
            }));
        }
    }

    if !scope.allow_create {
        debug!(tuple = descriptor.name(), "no tuple type and creation is disabled");
        return Ok(None);
    }

    let mut new_elements = Vec::with_capacity(elements.len());
    for (index, (element, resolution)) in elements.iter().zip(resolved.iter_mut()).enumerate() {
        let element_type = resolution.commit(session)?;
        *resolution = Resolved {
            elements: std::mem::take(&mut resolution.elements),
            ..Resolved::named(element_type)
        };
        new_elements.push(NewTupleElement {
            name: element_name(element, index),
            rank: element.rank(),
            element_type,
        });
    }
    let id = session.add_tuple_type(descriptor.name(), new_elements);
    session.save_changes()?;
    debug!(tuple = descriptor.name(), %id, "created tuple type");

    Ok(Some(Resolved {
        elements: resolved,
        ..Resolved::named(id)
    }))
}

fn element_name(element: &TypeDescriptor, index: usize) -> String {
    element
        .element_name()
        .map_or_else(|| default_element_name(index), str::to_string)
}

fn matches(
    session: &CatalogSession,
    candidate: NamedTypeId,
    elements: &[TypeDescriptor],
    resolved: &[Resolved],
) -> ResolveResult<bool> {
    let rows = session.tuple_elements(candidate)?;
    if rows.len() != elements.len() {
        return Ok(false);
    }

    for (index, ((row, element), resolution)) in rows.iter().zip(elements).zip(resolved).enumerate() {
        if row.name != element_name(element, index) || row.rank != element.rank() {
            return Ok(false);
        }
        let stored = session.require_named_type(row.element_type)?;
        if !resolution.same_identity(session, stored)? {
            return Ok(false);
        }
    }
    Ok(true)
}
