use super::{ResolveScope, Resolved, Target};
use crate::catalog::{CatalogSession, NamedType};
use crate::error::ResolveResult;
use crate::resolution::descriptor::TypeDescriptor;
use tracing::{debug, trace};

/// Match a descriptor against the type parameters in scope of the container.
///
/// Only undotted names without type arguments can be type parameters. The
/// container's own parameters are tried first, then those of each containing
/// type, since nested types see the parameters of their outer types. Every
/// match becomes a fresh local-type row when the resolution is committed.
pub(super) fn find(
    session: &mut CatalogSession,
    descriptor: &TypeDescriptor,
    scope: &ResolveScope<'_>,
) -> ResolveResult<Option<Resolved>> {
    if !matches!(session.named_type(scope.container), Some(NamedType::Documented(_))) {
        return Ok(None);
    }
    if descriptor.is_predefined()
        || descriptor.is_fully_resolved()
        || descriptor.argument_count() > 0
        || descriptor.name().contains('.')
    {
        return Ok(None);
    }

    let mut declaring = Some(scope.container);
    while let Some(type_id) = declaring {
        let doc = session.documented(type_id)?;
        let next = doc.containing_type;

        if doc.has_type_parameters() {
            let params = session.ensure_type_parameters(type_id)?;
            if let Some(param) = params.iter().find(|p| p.name == descriptor.name()) {
                debug!(
                    name = %param.name,
                    index = param.ordinal,
                    declaring_type = %type_id,
                    "type parameter in scope"
                );
                return Ok(Some(Resolved::new(Target::Local {
                    declaring_type: type_id,
                    index: param.ordinal,
                    name: param.name.clone(),
                })));
            }
        }
        declaring = next;
    }

    trace!(name = descriptor.name(), "not a type parameter in scope");
    Ok(None)
}
