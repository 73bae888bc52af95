//! Structural queries over the tree-sitter C# grammar
//!
//! tree-sitter-c-sharp does not expose every child through a field name, so
//! most helpers try the field first and fall back to scanning children by kind,
//! the same way the declaration walker always has.

use crate::catalog::{Accessibility, TypeParameter, UsageRole, Variance};
use tree_sitter::Node;

/// Node kinds that the type-node analyzer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSyntaxKind {
    /// Base-list entry carrying constructor arguments (`: Base(x)`)
    SimpleBaseType,
    /// One entry of a `where T : ...` clause
    TypeConstraint,
    Identifier,
    PredefinedType,
    ArrayType,
    GenericName,
    TupleType,
    TupleElement,
    TypeArgumentList,
    QualifiedName,
    AliasQualifiedName,
    NullableType,
}

impl TypeSyntaxKind {
    pub fn of(node: Node<'_>) -> Option<Self> {
        let kind = match node.kind() {
            "primary_constructor_base_type" => Self::SimpleBaseType,
            "type_parameter_constraint" => Self::TypeConstraint,
            "identifier" => Self::Identifier,
            "predefined_type" => Self::PredefinedType,
            "array_type" => Self::ArrayType,
            "generic_name" => Self::GenericName,
            "tuple_type" => Self::TupleType,
            "tuple_element" => Self::TupleElement,
            "type_argument_list" => Self::TypeArgumentList,
            "qualified_name" => Self::QualifiedName,
            "alias_qualified_name" => Self::AliasQualifiedName,
            "nullable_type" => Self::NullableType,
            _ => return None,
        };
        Some(kind)
    }

    /// Kinds that stand for a complete type on their own
    pub fn is_type(self) -> bool {
        !matches!(
            self,
            Self::TupleElement | Self::TypeArgumentList | Self::TypeConstraint
        )
    }
}

pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

pub fn is_type_declaration(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "class_declaration"
            | "interface_declaration"
            | "struct_declaration"
            | "record_declaration"
            | "record_struct_declaration"
            | "enum_declaration"
            | "delegate_declaration"
    )
}

/// Declarations that open a type scope for member lookup
pub fn is_scope_type_declaration(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "class_declaration"
            | "interface_declaration"
            | "struct_declaration"
            | "record_declaration"
            | "record_struct_declaration"
    )
}

pub fn is_namespace_declaration(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "namespace_declaration" | "file_scoped_namespace_declaration"
    )
}

fn first_child_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|child| kinds.contains(&child.kind()))
}

fn has_child_of_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|child| child.kind() == kind)
}

/// Name of a type, member or parameter declaration
pub fn declaration_name<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name("name")
        .or_else(|| first_child_of_kind(node, &["identifier"]))
        .map(|name| node_text(name, source))
}

/// Dotted name of a namespace declaration, whitespace removed
pub fn namespace_name(node: Node<'_>, source: &str) -> Option<String> {
    let name = node
        .child_by_field_name("name")
        .or_else(|| first_child_of_kind(node, &["qualified_name", "identifier"]))?;
    Some(
        node_text(name, source)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect(),
    )
}

/// Namespace declarations enclosing `node`, innermost first.
///
/// A file-scoped namespace may be a sibling of the declarations it governs
/// rather than their parent, so it is picked up from the compilation unit
/// when no ancestor provides it.
pub fn enclosing_namespaces(node: Node<'_>) -> Vec<Node<'_>> {
    let mut found = Vec::new();
    let mut file_scoped_seen = false;
    let mut current = node.parent();

    while let Some(ancestor) = current {
        if is_namespace_declaration(ancestor) {
            file_scoped_seen |= ancestor.kind() == "file_scoped_namespace_declaration";
            found.push(ancestor);
        }
        if ancestor.kind() == "compilation_unit" && !file_scoped_seen {
            let mut cursor = ancestor.walk();
            let file_scoped = ancestor
                .children(&mut cursor)
                .find(|child| {
                    child.kind() == "file_scoped_namespace_declaration"
                        && *child != node
                        && child.start_byte() <= node.start_byte()
                });
            if let Some(file_scoped) = file_scoped {
                found.push(file_scoped);
            }
        }
        current = ancestor.parent();
    }
    found
}

/// Full name of the namespace containing `node`; empty for the global namespace
pub fn namespace_of(node: Node<'_>, source: &str) -> String {
    let mut parts: Vec<String> = enclosing_namespaces(node)
        .into_iter()
        .filter_map(|ns| namespace_name(ns, source))
        .collect();
    parts.reverse();
    parts.join(".")
}

/// Type declarations enclosing `node` (itself excluded), innermost first
pub fn enclosing_type_declarations(node: Node<'_>) -> Vec<Node<'_>> {
    let mut found = Vec::new();
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if is_type_declaration(ancestor) {
            found.push(ancestor);
        }
        current = ancestor.parent();
    }
    found
}

/// Innermost class, interface, struct or record declaration containing `node`
pub fn innermost_scope_type(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if is_scope_type_declaration(candidate) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// `Namespace.Outer.Name` for a type declaration, without type parameters
pub fn type_full_name(decl: Node<'_>, source: &str) -> Option<String> {
    let name = declaration_name(decl, source)?;
    let mut parts = Vec::new();
    for outer in enclosing_type_declarations(decl).into_iter().rev() {
        parts.push(declaration_name(outer, source)?.to_string());
    }
    parts.push(name.to_string());

    let namespace = namespace_of(decl, source);
    if namespace.is_empty() {
        Some(parts.join("."))
    } else {
        Some(format!("{namespace}.{}", parts.join(".")))
    }
}

fn type_parameter_list(decl: Node<'_>) -> Option<Node<'_>> {
    decl.child_by_field_name("type_parameters")
        .or_else(|| first_child_of_kind(decl, &["type_parameter_list"]))
}

/// Declared type parameters in order, with their variance
pub fn type_parameters(decl: Node<'_>, source: &str) -> Vec<TypeParameter> {
    let Some(list) = type_parameter_list(decl) else {
        return Vec::new();
    };

    let mut params = Vec::new();
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        if param.kind() != "type_parameter" {
            continue;
        }
        let Some(name) = declaration_name(param, source) else {
            continue;
        };
        let variance = if has_child_of_kind(param, "out") {
            Variance::Covariant
        } else if has_child_of_kind(param, "in") {
            Variance::Contravariant
        } else {
            Variance::None
        };
        params.push(TypeParameter {
            ordinal: params.len() as u32,
            name: name.to_string(),
            variance,
        });
    }
    params
}

/// Number of declared type parameters
pub fn type_parameter_count(decl: Node<'_>) -> u32 {
    type_parameter_list(decl).map_or(0, |list| {
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|child| child.kind() == "type_parameter")
            .count() as u32
    })
}

/// Accessibility from the modifiers, with C# defaults when none are written
pub fn accessibility(decl: Node<'_>, source: &str) -> Accessibility {
    let mut cursor = decl.walk();
    let modifiers: Vec<&str> = decl
        .children(&mut cursor)
        .filter(|child| child.kind() == "modifier")
        .map(|child| node_text(child, source))
        .collect();
    let has = |word: &str| modifiers.iter().any(|m| *m == word);

    if has("public") {
        Accessibility::Public
    } else if has("protected") && has("internal") {
        Accessibility::ProtectedInternal
    } else if has("private") && has("protected") {
        Accessibility::PrivateProtected
    } else if has("protected") {
        Accessibility::Protected
    } else if has("internal") {
        Accessibility::Internal
    } else if has("private") || !enclosing_type_declarations(decl).is_empty() {
        // Nested types default to private
        Accessibility::Private
    } else {
        Accessibility::Internal
    }
}

/// Namespace imported by a `using` directive.
///
/// Alias (`using X = ...`) and `using static` directives import no namespace
/// and yield `None`.
pub fn using_namespace(directive: Node<'_>, source: &str) -> Option<String> {
    if has_child_of_kind(directive, "=")
        || has_child_of_kind(directive, "name_equals")
        || has_child_of_kind(directive, "static")
    {
        return None;
    }

    let mut cursor = directive.walk();
    let name = directive
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "qualified_name" | "identifier"))
        .last()?;
    Some(
        node_text(name, source)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect(),
    )
}

/// Namespaces imported by `using` directives that are direct children of `scope`
pub fn usings_in(scope: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = scope.walk();
    scope
        .children(&mut cursor)
        .filter(|child| child.kind() == "using_directive")
        .filter_map(|directive| using_namespace(directive, source))
        .collect()
}

/// `using` directives declared inside a namespace block
pub fn namespace_block_usings(ns_decl: Node<'_>, source: &str) -> Vec<String> {
    match ns_decl
        .child_by_field_name("body")
        .or_else(|| first_child_of_kind(ns_decl, &["declaration_list"]))
    {
        Some(body) => usings_in(body, source),
        None => usings_in(ns_decl, source),
    }
}

/// Member list of a type declaration
pub fn declaration_body(decl: Node<'_>) -> Option<Node<'_>> {
    decl.child_by_field_name("body")
        .or_else(|| first_child_of_kind(decl, &["declaration_list"]))
}

/// Entries of the base list, in source order
pub fn base_types(decl: Node<'_>) -> Vec<Node<'_>> {
    let Some(list) = first_child_of_kind(decl, &["base_list"]) else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|child| child.kind() != "argument_list")
        .collect()
}

/// Type inside a wrapper node such as a constraint or nullable type
pub fn wrapped_type(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("type").or_else(|| {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .find(|child| TypeSyntaxKind::of(*child).is_some_and(TypeSyntaxKind::is_type))
    })
}

/// `where` clauses as (type parameter, constraint nodes naming a type).
///
/// `class`, `struct`, `new()` and similar constraints name no type and are
/// left out.
pub fn constraint_clauses<'t>(decl: Node<'t>, source: &str) -> Vec<(String, Vec<Node<'t>>)> {
    let mut clauses = Vec::new();
    let mut cursor = decl.walk();
    for clause in decl.children(&mut cursor) {
        if clause.kind() != "type_parameter_constraints_clause" {
            continue;
        }
        let Some(target) = clause
            .child_by_field_name("target")
            .or_else(|| first_child_of_kind(clause, &["identifier"]))
        else {
            continue;
        };

        let mut inner = clause.walk();
        let constraints = clause
            .children(&mut inner)
            .filter(|c| c.kind() == "type_parameter_constraint" && wrapped_type(*c).is_some())
            .collect();
        clauses.push((node_text(target, source).to_string(), constraints));
    }
    clauses
}

/// Dimensions added by the rank specifiers directly under an array type.
///
/// `[]` adds one, `[,]` adds two.
pub fn array_rank(array: Node<'_>) -> u32 {
    let mut cursor = array.walk();
    array
        .children(&mut cursor)
        .filter(|child| child.kind() == "array_rank_specifier")
        .map(|specifier| {
            let mut inner = specifier.walk();
            specifier
                .children(&mut inner)
                .filter(|token| token.kind() == ",")
                .count() as u32
                + 1
        })
        .sum()
}

/// A type written in a member signature
#[derive(Debug, Clone, Copy)]
pub struct MemberType<'t> {
    pub role: UsageRole,
    pub node: Node<'t>,
}

/// Member signatures of a type declaration
#[derive(Debug, Default)]
pub struct MemberTypes<'t> {
    pub types: Vec<(MemberType<'t>, String)>,
    /// Generic methods, which are not scanned
    pub skipped_methods: Vec<String>,
}

/// Types written in field, property, method and constructor signatures.
///
/// Each entry carries the member name it was found on; parameters are named
/// `Method.parameter`. Nested type declarations are not descended into.
pub fn member_types<'t>(decl: Node<'t>, source: &str) -> MemberTypes<'t> {
    let mut members = MemberTypes::default();
    let Some(body) = declaration_body(decl) else {
        return members;
    };

    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "field_declaration" => {
                let Some(declaration) = first_child_of_kind(member, &["variable_declaration"])
                else {
                    continue;
                };
                let Some(ty) = declaration.child_by_field_name("type") else {
                    continue;
                };
                let mut inner = declaration.walk();
                let names: Vec<&str> = declaration
                    .named_children(&mut inner)
                    .filter(|child| child.kind() == "variable_declarator")
                    .filter_map(|declarator| declaration_name(declarator, source))
                    .collect();
                members.types.push((
                    MemberType {
                        role: UsageRole::Field,
                        node: ty,
                    },
                    names.join(", "),
                ));
            }
            "property_declaration" => {
                if let (Some(ty), Some(name)) = (
                    member.child_by_field_name("type"),
                    declaration_name(member, source),
                ) {
                    members.types.push((
                        MemberType {
                            role: UsageRole::Property,
                            node: ty,
                        },
                        name.to_string(),
                    ));
                }
            }
            "method_declaration" => {
                let Some(name) = declaration_name(member, source) else {
                    continue;
                };
                if type_parameter_list(member).is_some() {
                    members.skipped_methods.push(name.to_string());
                    continue;
                }
                let returns = member
                    .child_by_field_name("returns")
                    .or_else(|| member.child_by_field_name("type"));
                if let Some(returns) = returns
                    && node_text(returns, source) != "void"
                {
                    members.types.push((
                        MemberType {
                            role: UsageRole::ReturnType,
                            node: returns,
                        },
                        name.to_string(),
                    ));
                }
                push_parameters(member, name, source, &mut members);
            }
            "constructor_declaration" => {
                if let Some(name) = declaration_name(member, source) {
                    push_parameters(member, name, source, &mut members);
                }
            }
            _ => {}
        }
    }
    members
}

fn push_parameters<'t>(
    member: Node<'t>,
    member_name: &str,
    source: &str,
    members: &mut MemberTypes<'t>,
) {
    let Some(list) = member
        .child_by_field_name("parameters")
        .or_else(|| first_child_of_kind(member, &["parameter_list"]))
    else {
        return;
    };

    let mut cursor = list.walk();
    for parameter in list.named_children(&mut cursor) {
        if parameter.kind() != "parameter" {
            continue;
        }
        let (Some(ty), Some(name)) = (
            parameter.child_by_field_name("type"),
            declaration_name(parameter, source),
        ) else {
            continue;
        };
        members.types.push((
            MemberType {
                role: UsageRole::Parameter,
                node: ty,
            },
            format!("{member_name}.{name}"),
        ));
    }
}
