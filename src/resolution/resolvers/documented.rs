use crate::catalog::CatalogSession;
use crate::resolution::descriptor::TypeDescriptor;
use crate::resolution::namespace::NamespaceContext;
use crate::types::NamedTypeId;
use tracing::trace;

/// Look a descriptor up among the types declared in the documented source.
///
/// The name is qualified with each context in turn; the first documented type
/// with that full name and the descriptor's arity wins. Never creates rows.
pub(super) fn find(
    session: &CatalogSession,
    descriptor: &TypeDescriptor,
    contexts: Option<&[NamespaceContext]>,
) -> Option<NamedTypeId> {
    let arity = descriptor.argument_count() as u32;

    let found = match contexts {
        None => session.find_documented(descriptor.name(), arity),
        Some(contexts) => contexts
            .iter()
            .find_map(|context| session.find_documented(&context.qualify(descriptor.name()), arity)),
    };

    if let Some(id) = found {
        trace!(name = descriptor.name(), arity, %id, "documented type matched");
    }
    found
}
