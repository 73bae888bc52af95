//! First pass: catalogue what a file declares
//!
//! Records the file with its outer `using` namespaces, every namespace it
//! declares or imports, and every type declaration as a documented type.
//! References are resolved in the second pass, once all files of a scan
//! have been through this one.

use crate::catalog::{CatalogSession, DocumentedType, TypeDeclKind};
use crate::parsing::csharp::SourceUnit;
use crate::parsing::csharp::syntax;
use crate::types::{NamedTypeId, SourceFileId};
use tracing::{debug, trace};
use tree_sitter::Node;

/// Result of cataloguing one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOutcome {
    /// The file was new; this many types were declared in it
    Catalogued {
        file: SourceFileId,
        documented_types: usize,
    },
    /// The catalog already knew the file
    AlreadyCatalogued { file: SourceFileId },
}

pub struct DeclarationCataloger<'a> {
    session: &'a mut CatalogSession,
}

impl<'a> DeclarationCataloger<'a> {
    pub fn new(session: &'a mut CatalogSession) -> Self {
        Self { session }
    }

    pub fn catalog(&mut self, unit: &SourceUnit) -> CatalogOutcome {
        if let Some(file) = self.session.find_source_file(unit.path()) {
            debug!(path = %unit.path().display(), "file already catalogued");
            return CatalogOutcome::AlreadyCatalogued { file };
        }

        let usings = syntax::usings_in(unit.root(), unit.source())
            .iter()
            .map(|name| self.session.ensure_namespace(name))
            .collect();
        let file = self.session.add_source_file(unit.path(), usings);

        let mut documented_types = 0;
        self.visit(unit, file, unit.root(), None, &mut documented_types);
        debug!(
            path = %unit.path().display(),
            documented_types,
            "catalogued declarations"
        );

        CatalogOutcome::Catalogued {
            file,
            documented_types,
        }
    }

    fn visit(
        &mut self,
        unit: &SourceUnit,
        file: SourceFileId,
        node: Node<'_>,
        containing_type: Option<NamedTypeId>,
        count: &mut usize,
    ) {
        let mut containing_type = containing_type;

        if syntax::is_namespace_declaration(node) {
            let namespace = syntax::namespace_of(node, unit.source());
            if let Some(name) = syntax::namespace_name(node, unit.source()) {
                let full_name = if namespace.is_empty() {
                    name
                } else {
                    format!("{namespace}.{name}")
                };
                self.session.ensure_namespace(&full_name);
            }
            for using in syntax::namespace_block_usings(node, unit.source()) {
                self.session.ensure_namespace(&using);
            }
        } else if syntax::is_type_declaration(node) {
            if let Some(id) = self.catalog_type(unit, file, node, containing_type) {
                *count += 1;
                containing_type = Some(id);
            }
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(unit, file, child, containing_type, count);
        }
    }

    /// Find or stage the documented type for a declaration.
    ///
    /// Partial declarations share one row, keyed by full name and arity.
    fn catalog_type(
        &mut self,
        unit: &SourceUnit,
        file: SourceFileId,
        decl: Node<'_>,
        containing_type: Option<NamedTypeId>,
    ) -> Option<NamedTypeId> {
        let source = unit.source();
        let decl_kind = TypeDeclKind::from_node_kind(decl.kind())?;
        let name = syntax::declaration_name(decl, source)?;
        let full_name = syntax::type_full_name(decl, source)?;
        let type_parameters = syntax::type_parameters(decl, source);
        let arity = type_parameters.len() as u32;

        if let Some(existing) = self.session.find_documented(&full_name, arity) {
            trace!(%full_name, arity, "partial declaration of known type");
            return Some(existing);
        }

        let namespace = self
            .session
            .ensure_namespace(&syntax::namespace_of(decl, source));
        let id = self.session.add_documented_type(DocumentedType {
            name: name.to_string(),
            full_name: full_name.clone(),
            namespace,
            containing_type,
            decl_kind,
            accessibility: syntax::accessibility(decl, source),
            source_file: file,
            type_parameter_count: arity,
            type_parameters: Some(type_parameters),
        });
        trace!(%full_name, arity, %id, "staged documented type");
        Some(id)
    }
}
