//! Shared fixture: parse a source, catalogue it and resolve field types

use sharpdoc::catalog::{CatalogSession, NamedType};
use sharpdoc::indexing::DeclarationCataloger;
use sharpdoc::parsing::csharp::syntax;
use sharpdoc::parsing::{CSharpParser, SourceUnit};
use sharpdoc::resolution::{TypeNodeAnalyzer, TypeReferenceResolver};
use sharpdoc::{NamedTypeId, ScanError, TypeReferenceId};
use tree_sitter::Node;

/// Parse `code` as `path` and run the declaration pass over it
pub fn catalogue(session: &mut CatalogSession, path: &str, code: &str) -> SourceUnit {
    let unit = CSharpParser::new()
        .expect("Failed to create C# parser")
        .parse(path, code.to_string())
        .expect("Failed to parse source");
    DeclarationCataloger::new(session).catalog(&unit);
    unit
}

/// Type node of the field named `field`
pub fn field_type<'u>(unit: &'u SourceUnit, field: &str) -> Node<'u> {
    let declarator = unit
        .find_text("identifier", field)
        .and_then(|name| name.parent())
        .unwrap_or_else(|| panic!("no field named {field}"));
    declarator
        .parent()
        .and_then(|declaration| declaration.child_by_field_name("type"))
        .unwrap_or_else(|| panic!("field {field} has no type"))
}

/// Documented type declaring the node
pub fn container_of(session: &CatalogSession, unit: &SourceUnit, node: Node<'_>) -> NamedTypeId {
    let decl = syntax::innermost_scope_type(node).expect("node outside any type");
    let full_name = syntax::type_full_name(decl, unit.source()).expect("unnamed type");
    session
        .find_documented(&full_name, syntax::type_parameter_count(decl))
        .unwrap_or_else(|| panic!("{full_name} is not catalogued"))
}

/// Analyze and resolve the type of `field`, staging its reference tree
pub fn resolve_field(
    session: &mut CatalogSession,
    unit: &SourceUnit,
    field: &str,
    allow_create: bool,
) -> Result<TypeReferenceId, ScanError> {
    let node = field_type(unit, field);
    let container = container_of(session, unit, node);
    let analysis = TypeNodeAnalyzer::new(session, unit, container, allow_create).analyze(node)?;
    Ok(TypeReferenceResolver::new()?.resolve(session, &analysis)?)
}

/// Named type at the root of a reference
pub fn root_type(session: &CatalogSession, reference: TypeReferenceId) -> (NamedTypeId, &NamedType) {
    let id = session
        .type_reference(reference)
        .expect("reference was not staged")
        .named_type;
    (id, session.named_type(id).expect("dangling named type"))
}
