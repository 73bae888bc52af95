//! Type-node analyzer: syntax node in, descriptor tree out
//!
//! The analyzer reads the catalog but never writes to it. It needs the source
//! file and every enclosing type and namespace to be catalogued already, which
//! the declaration pass guarantees.

use super::descriptor::TypeDescriptor;
use super::namespace::{NamespaceContext, merge_contexts};
use crate::catalog::{CatalogError, CatalogSession, NamedType, TypeParameter};
use crate::error::{AnalyzeError, AnalyzeResult};
use crate::parsing::csharp::names::{self, QualifiedName, ResolvedNameState};
use crate::parsing::csharp::syntax::{self, TypeSyntaxKind};
use crate::parsing::csharp::SourceUnit;
use crate::types::{NamedTypeId, Range, SourceFileId};
use tracing::{debug, warn};
use tree_sitter::Node;

/// Deepest generic or tuple nesting accepted
pub const MAX_TYPE_DEPTH: usize = 64;

/// Everything needed to resolve one type reference
#[derive(Debug, Clone)]
pub struct TypeAnalysis {
    pub root: TypeDescriptor,
    /// Documented type whose source contains the reference
    pub container: NamedTypeId,
    pub source_file: SourceFileId,
    /// Contexts from the file's outer `using` directives
    pub file_contexts: Vec<NamespaceContext>,
    /// Type parameters of the container, loaded if they were not yet
    pub type_parameters: Vec<TypeParameter>,
    pub allow_create: bool,
}

pub struct TypeNodeAnalyzer<'a> {
    session: &'a mut CatalogSession,
    unit: &'a SourceUnit,
    container: NamedTypeId,
    allow_create: bool,
}

/// Per-analysis cache of the lexical contexts, which are the same for every
/// node of one type expression
struct BuildState {
    file_contexts: Vec<NamespaceContext>,
    lexical: Option<Vec<NamespaceContext>>,
}

impl<'a> TypeNodeAnalyzer<'a> {
    pub fn new(
        session: &'a mut CatalogSession,
        unit: &'a SourceUnit,
        container: NamedTypeId,
        allow_create: bool,
    ) -> Self {
        Self {
            session,
            unit,
            container,
            allow_create,
        }
    }

    /// Build the descriptor tree for `node` and collect its resolution inputs
    pub fn analyze(&mut self, node: Node<'_>) -> AnalyzeResult<TypeAnalysis> {
        let source_file = self
            .session
            .find_source_file(self.unit.path())
            .ok_or_else(|| AnalyzeError::MissingSourceFile {
                path: self.unit.path().to_path_buf(),
            })?;

        let has_type_parameters = match self.session.named_type(self.container) {
            Some(NamedType::Documented(doc)) => doc.has_type_parameters(),
            Some(_) => {
                return Err(AnalyzeError::NotDocumented {
                    id: self.container,
                });
            }
            None => {
                return Err(CatalogError::MissingNamedType {
                    id: self.container,
                }
                .into());
            }
        };
        let type_parameters = if has_type_parameters {
            self.session.ensure_type_parameters(self.container)?
        } else {
            Vec::new()
        };

        let mut state = BuildState {
            file_contexts: self.file_contexts(source_file)?,
            lexical: None,
        };
        let root = self.build(node, &mut state, 0)?;
        debug!(
            container = %self.container,
            descriptor = %root,
            nodes = root.node_count(),
            "analyzed type node"
        );

        Ok(TypeAnalysis {
            root,
            container: self.container,
            source_file,
            file_contexts: state.file_contexts,
            type_parameters,
            allow_create: self.allow_create,
        })
    }

    fn file_contexts(&self, file: SourceFileId) -> AnalyzeResult<Vec<NamespaceContext>> {
        let file = self
            .session
            .source_file(file)
            .ok_or(CatalogError::MissingSourceFileId { id: file })?;

        file.usings
            .iter()
            .map(|&id| {
                let ns = self
                    .session
                    .namespace(id)
                    .ok_or(CatalogError::MissingNamespaceId { id })?;
                Ok(NamespaceContext::namespace(ns.name.clone(), id))
            })
            .collect()
    }

    fn unsupported(&self, node: Node<'_>) -> AnalyzeError {
        AnalyzeError::UnsupportedNode {
            kind: node.kind().to_string(),
            range: Range::of_node(node),
        }
    }

    fn build(
        &self,
        node: Node<'_>,
        state: &mut BuildState,
        depth: usize,
    ) -> AnalyzeResult<TypeDescriptor> {
        if depth > MAX_TYPE_DEPTH {
            return Err(AnalyzeError::TooDeep {
                range: Range::of_node(node),
                limit: MAX_TYPE_DEPTH,
            });
        }
        let Some(kind) = TypeSyntaxKind::of(node) else {
            return Err(self.unsupported(node));
        };

        match kind {
            TypeSyntaxKind::SimpleBaseType
            | TypeSyntaxKind::TypeConstraint
            | TypeSyntaxKind::NullableType => {
                let inner = syntax::wrapped_type(node).ok_or_else(|| self.unsupported(node))?;
                self.build(inner, state, depth + 1)
            }
            TypeSyntaxKind::ArrayType => {
                let element = syntax::wrapped_type(node).ok_or_else(|| self.unsupported(node))?;
                let mut descriptor = self.build(element, state, depth + 1)?;
                descriptor.add_rank(syntax::array_rank(node));
                Ok(descriptor)
            }
            TypeSyntaxKind::PredefinedType
            | TypeSyntaxKind::Identifier
            | TypeSyntaxKind::GenericName
            | TypeSyntaxKind::QualifiedName
            | TypeSyntaxKind::AliasQualifiedName => self.build_named(node, kind, state, depth),
            TypeSyntaxKind::TupleType => self.build_tuple(node, state, depth),
            TypeSyntaxKind::TupleElement | TypeSyntaxKind::TypeArgumentList => {
                Err(self.unsupported(node))
            }
        }
    }

    fn qualify(&self, node: Node<'_>) -> AnalyzeResult<QualifiedName> {
        let qualified = names::qualify(node, self.unit.source());
        if qualified.state == ResolvedNameState::Failed {
            let range = Range::of_node(node);
            let reason = qualified.failure.unwrap_or_default();
            warn!(text = %qualified.name, %range, %reason, "cannot qualify type name");
            return Err(AnalyzeError::NameResolution {
                text: qualified.name,
                range,
                reason,
            });
        }
        Ok(qualified)
    }

    fn build_named(
        &self,
        node: Node<'_>,
        kind: TypeSyntaxKind,
        state: &mut BuildState,
        depth: usize,
    ) -> AnalyzeResult<TypeDescriptor> {
        let qualified = self.qualify(node)?;
        let mut descriptor = if kind == TypeSyntaxKind::PredefinedType {
            TypeDescriptor::predefined(qualified.name)
        } else {
            TypeDescriptor::new(qualified.name, qualified.state)
        };
        if qualified.state == ResolvedNameState::PartiallyResolved {
            descriptor = descriptor.with_context(self.lexical_contexts(node, state)?.to_vec());
        }

        // Type arguments sit on the last segment of a qualified name
        let generic = match kind {
            TypeSyntaxKind::GenericName => Some(node),
            TypeSyntaxKind::QualifiedName | TypeSyntaxKind::AliasQualifiedName => node
                .child_by_field_name("name")
                .filter(|name| name.kind() == "generic_name"),
            _ => None,
        };
        if let Some(generic) = generic {
            let mut cursor = generic.walk();
            let arguments = generic
                .named_children(&mut cursor)
                .find(|child| child.kind() == "type_argument_list");
            if let Some(arguments) = arguments {
                let mut inner = arguments.walk();
                for argument in arguments.named_children(&mut inner) {
                    descriptor.push_argument(self.build(argument, state, depth + 1)?);
                }
            }
        }
        Ok(descriptor)
    }

    fn build_tuple(
        &self,
        node: Node<'_>,
        state: &mut BuildState,
        depth: usize,
    ) -> AnalyzeResult<TypeDescriptor> {
        let qualified = self.qualify(node)?;
        let mut tuple = TypeDescriptor::tuple(qualified.name);

        let mut cursor = node.walk();
        for element in node.named_children(&mut cursor) {
            if element.kind() != "tuple_element" {
                continue;
            }
            let ty = syntax::wrapped_type(element).ok_or_else(|| self.unsupported(element))?;
            let mut descriptor = self.build(ty, state, depth + 1)?;

            let name = element.child_by_field_name("name").or_else(|| {
                let mut inner = element.walk();
                element
                    .named_children(&mut inner)
                    .filter(|child| child.kind() == "identifier" && *child != ty)
                    .last()
            });
            if let Some(name) = name {
                descriptor.set_element_name(self.unit.text(name));
            }
            tuple.push_argument(descriptor);
        }
        Ok(tuple)
    }

    fn lexical_contexts<'s>(
        &self,
        node: Node<'_>,
        state: &'s mut BuildState,
    ) -> AnalyzeResult<&'s [NamespaceContext]> {
        if state.lexical.is_none() {
            let mut contexts = self.scope_contexts(node)?;
            merge_contexts(&mut contexts, &state.file_contexts);
            merge_contexts(&mut contexts, [&NamespaceContext::global(self.session)]);
            state.lexical = Some(contexts);
        }
        Ok(state.lexical.as_deref().unwrap_or_default())
    }

    /// Contexts opened by the declarations around `node`, innermost first:
    /// the enclosing type scopes, then for each enclosing namespace its own
    /// name, the `using`s of its block and its implied parents.
    fn scope_contexts(&self, node: Node<'_>) -> AnalyzeResult<Vec<NamespaceContext>> {
        let source = self.unit.source();
        let mut contexts = Vec::new();
        let anchor = syntax::innermost_scope_type(node);

        if let Some(decl) = anchor {
            let mut type_decls = vec![decl];
            type_decls.extend(syntax::enclosing_type_declarations(decl));
            for type_decl in type_decls {
                let full_name =
                    syntax::type_full_name(type_decl, source).ok_or_else(|| self.unsupported(type_decl))?;
                let arity = syntax::type_parameter_count(type_decl);
                let id = self
                    .session
                    .find_documented(&full_name, arity)
                    .ok_or_else(|| AnalyzeError::UncataloguedType {
                        full_name: full_name.clone(),
                    })?;
                contexts.push(NamespaceContext::type_scope(full_name, id));
            }
        }

        let namespaces = syntax::enclosing_namespaces(anchor.unwrap_or(node));
        let names: Vec<Option<String>> = namespaces
            .iter()
            .map(|ns| syntax::namespace_name(*ns, source))
            .collect();

        for (ns_decl, full_name) in namespaces.iter().zip(block_full_names(&names)) {
            let Some(full_name) = full_name else {
                continue;
            };

            let context = self.namespace_context(&full_name)?;
            merge_contexts(&mut contexts, [&context]);

            for using in syntax::namespace_block_usings(*ns_decl, source) {
                let context = self.namespace_context(&using)?;
                merge_contexts(&mut contexts, [&context]);
            }

            let mut parent = full_name.rsplit_once('.').map(|(outer, _)| outer);
            while let Some(label) = parent {
                let context = self.namespace_context(label)?;
                merge_contexts(&mut contexts, [&context]);
                parent = label.rsplit_once('.').map(|(outer, _)| outer);
            }
        }
        Ok(contexts)
    }

    fn namespace_context(&self, name: &str) -> AnalyzeResult<NamespaceContext> {
        let id = self
            .session
            .find_namespace(name)
            .ok_or_else(|| CatalogError::MissingNamespace {
                name: name.to_string(),
            })?;
        Ok(NamespaceContext::namespace(name, id))
    }
}

/// Full name of each enclosing namespace block, innermost first.
///
/// `names` holds each block's own name, innermost first. Unnamed blocks, which
/// only occur in broken source, get no full name and add nothing to the
/// others.
fn block_full_names(names: &[Option<String>]) -> Vec<Option<String>> {
    (0..names.len())
        .map(|level| {
            names[level].as_ref()?;
            Some(
                names[level..]
                    .iter()
                    .rev()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("."),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexing::declarations::DeclarationCataloger;
    use crate::parsing::csharp::CSharpParser;

    const SOURCE: &str = r#"
using System;
using System.Collections.Generic;

namespace App.Models
{
    using App.Shared;

    public class Container<T>
    {
        public Dictionary<string, List<int>> lookup;
        public int[][] jagged;
        public T item;
        public (int Id, string) pair;
        public global::System.Guid id;
        public Other::Thing broken;
    }
}
"#;

    fn setup() -> (CatalogSession, SourceUnit, NamedTypeId) {
        let mut parser = CSharpParser::new().unwrap();
        let unit = parser.parse("Container.cs", SOURCE.to_string()).unwrap();
        let mut session = CatalogSession::in_memory();
        DeclarationCataloger::new(&mut session).catalog(&unit);
        let container = session.find_documented("App.Models.Container", 1).unwrap();
        (session, unit, container)
    }

    fn field_type<'u>(unit: &'u SourceUnit, field: &str) -> Node<'u> {
        let declarator = unit.find_text("identifier", field).unwrap().parent().unwrap();
        declarator
            .parent()
            .unwrap()
            .child_by_field_name("type")
            .unwrap()
    }

    #[test]
    fn test_nested_generic_shape() {
        let (mut session, unit, container) = setup();
        let node = field_type(&unit, "lookup");
        let analysis = TypeNodeAnalyzer::new(&mut session, &unit, container, true)
            .analyze(node)
            .unwrap();

        let root = &analysis.root;
        assert_eq!(root.name(), "Dictionary");
        assert_eq!(root.argument_count(), 2);
        assert!(root.arguments()[0].is_predefined());
        assert_eq!(root.arguments()[1].name(), "List");
        assert_eq!(root.arguments()[1].arguments()[0].name(), "int");
        assert_eq!(root.to_string(), "Dictionary<string, List<int>>");
        assert_eq!(analysis.type_parameters.len(), 1);
    }

    #[test]
    fn test_partial_names_carry_contexts_in_order() {
        let (mut session, unit, container) = setup();
        let node = field_type(&unit, "lookup");
        let analysis = TypeNodeAnalyzer::new(&mut session, &unit, container, true)
            .analyze(node)
            .unwrap();

        let labels: Vec<&str> = analysis
            .root
            .namespace_context()
            .unwrap()
            .iter()
            .map(NamespaceContext::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "App.Models.Container",
                "App.Models",
                "App.Shared",
                "App",
                "System",
                "System.Collections.Generic",
                ""
            ]
        );

        // Keywords are already qualified
        assert!(analysis.root.arguments()[0].namespace_context().is_none());
    }

    #[test]
    fn test_unnamed_namespace_blocks_are_skipped() {
        let names = [
            Some("Inner".to_string()),
            None,
            None,
            Some("Outer.Core".to_string()),
        ];
        assert_eq!(
            block_full_names(&names),
            vec![
                Some("Outer.Core.Inner".to_string()),
                None,
                None,
                Some("Outer.Core".to_string()),
            ]
        );
    }

    #[test]
    fn test_jagged_array_rank() {
        let (mut session, unit, container) = setup();
        let node = field_type(&unit, "jagged");
        let analysis = TypeNodeAnalyzer::new(&mut session, &unit, container, true)
            .analyze(node)
            .unwrap();

        assert_eq!(analysis.root.name(), "int");
        assert_eq!(analysis.root.rank(), 2);
    }

    #[test]
    fn test_tuple_elements() {
        let (mut session, unit, container) = setup();
        let node = field_type(&unit, "pair");
        let analysis = TypeNodeAnalyzer::new(&mut session, &unit, container, true)
            .analyze(node)
            .unwrap();

        let root = &analysis.root;
        assert!(root.is_tuple());
        assert_eq!(root.argument_count(), 2);
        assert_eq!(root.arguments()[0].element_name(), Some("Id"));
        assert_eq!(root.arguments()[1].element_name(), None);
    }

    #[test]
    fn test_global_alias_has_no_context() {
        let (mut session, unit, container) = setup();
        let node = field_type(&unit, "id");
        let analysis = TypeNodeAnalyzer::new(&mut session, &unit, container, true)
            .analyze(node)
            .unwrap();

        assert!(analysis.root.is_fully_resolved());
        assert_eq!(analysis.root.name(), "System.Guid");
        assert!(analysis.root.namespace_context().is_none());
    }

    #[test]
    fn test_extern_alias_fails_analysis() {
        let (mut session, unit, container) = setup();
        let node = field_type(&unit, "broken");
        let err = TypeNodeAnalyzer::new(&mut session, &unit, container, true)
            .analyze(node)
            .unwrap_err();
        assert_eq!(err.status_code(), "NAME_RESOLUTION_FAILED");
    }

    #[test]
    fn test_unsupported_node_kind() {
        let (mut session, unit, container) = setup();
        let class = unit.find_first("class_declaration").unwrap();
        let err = TypeNodeAnalyzer::new(&mut session, &unit, container, true)
            .analyze(class)
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::UnsupportedNode { .. }));
    }

    #[test]
    fn test_uncatalogued_file_is_rejected() {
        let (mut session, _, container) = setup();
        let other = CSharpParser::new()
            .unwrap()
            .parse("Other.cs", "class X { int y; }".to_string())
            .unwrap();
        let node = other.find_first("predefined_type").unwrap();
        let err = TypeNodeAnalyzer::new(&mut session, &other, container, true)
            .analyze(node)
            .unwrap_err();
        assert_eq!(err.status_code(), "MISSING_SOURCE_FILE");
    }
}
