//! Qualified-name service for type syntax
//!
//! Decides, from syntax alone, how much of a type name is already known.
//! `global::`-rooted names and C# keywords are fully resolved; everything else
//! is only partially resolved and must be looked up against the namespaces in
//! scope.

use super::syntax::node_text;
use serde::Serialize;
use tree_sitter::Node;

/// How far a type name could be qualified without consulting the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResolvedNameState {
    FullyResolved,
    PartiallyResolved,
    Failed,
}

/// Outcome of qualifying one type node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub state: ResolvedNameState,
    /// Dotted name without type arguments; the display form for tuples
    pub name: String,
    /// Why qualification failed
    pub failure: Option<String>,
}

impl QualifiedName {
    fn fully(name: impl Into<String>) -> Self {
        Self {
            state: ResolvedNameState::FullyResolved,
            name: name.into(),
            failure: None,
        }
    }

    fn partially(name: impl Into<String>) -> Self {
        Self {
            state: ResolvedNameState::PartiallyResolved,
            name: name.into(),
            failure: None,
        }
    }

    fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            state: ResolvedNameState::Failed,
            name: name.into(),
            failure: Some(reason.into()),
        }
    }
}

/// Namespace that C# keyword types live in
pub const PREDEFINED_NAMESPACE: &str = "System";

const GLOBAL_ALIAS: &str = "global";

/// Qualify an identifier, predefined type, generic name, qualified name,
/// alias-qualified name or tuple type.
pub fn qualify(node: Node<'_>, source: &str) -> QualifiedName {
    let text = node_text(node, source);
    if node.is_error() || node.is_missing() || node.has_error() {
        return QualifiedName::failed(text, "type syntax contains errors");
    }

    match node.kind() {
        "predefined_type" => QualifiedName::fully(text),
        "identifier" => QualifiedName::partially(text),
        "generic_name" => match generic_identifier(node, source) {
            Some(name) => QualifiedName::partially(name),
            None => QualifiedName::failed(text, "generic name without identifier"),
        },
        "qualified_name" => qualify_dotted(node, source),
        "alias_qualified_name" => qualify_alias(node, source),
        "tuple_type" => QualifiedName::partially(tuple_display_name(node, source)),
        other => QualifiedName::failed(text, format!("'{other}' does not name a type")),
    }
}

fn generic_identifier<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    let mut cursor = node.walk();
    let ident = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "identifier")?;
    Some(node_text(ident, source))
}

/// Simple name segment: an identifier, or a generic name without its arguments
fn simple_segment<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    match node.kind() {
        "identifier" => Some(node_text(node, source)),
        "generic_name" => generic_identifier(node, source),
        _ => None,
    }
}

fn qualified_parts(node: Node<'_>) -> Option<(Node<'_>, Node<'_>)> {
    let qualifier = node.child_by_field_name("qualifier")?;
    let name = node.child_by_field_name("name")?;
    Some((qualifier, name))
}

fn qualify_dotted(node: Node<'_>, source: &str) -> QualifiedName {
    let text = node_text(node, source);
    let Some((qualifier, name)) = qualified_parts(node) else {
        return QualifiedName::failed(text, "qualified name without qualifier");
    };
    let Some(last) = simple_segment(name, source) else {
        return QualifiedName::failed(text, "unsupported name segment");
    };

    // Type arguments are only meaningful on the last segment
    let prefix = match qualifier.kind() {
        "identifier" => QualifiedName::partially(node_text(qualifier, source)),
        "qualified_name" => qualify_dotted(qualifier, source),
        "alias_qualified_name" => qualify_alias(qualifier, source),
        "generic_name" => {
            return QualifiedName::failed(text, "type arguments on a qualifier are not supported");
        }
        other => return QualifiedName::failed(text, format!("unsupported qualifier '{other}'")),
    };

    match prefix.state {
        ResolvedNameState::Failed => prefix,
        state => QualifiedName {
            state,
            name: format!("{}.{last}", prefix.name),
            failure: None,
        },
    }
}

fn qualify_alias(node: Node<'_>, source: &str) -> QualifiedName {
    let text = node_text(node, source);
    let alias = node
        .child_by_field_name("alias")
        .map(|alias| node_text(alias, source));
    let name = node
        .child_by_field_name("name")
        .and_then(|name| simple_segment(name, source));

    match (alias, name) {
        (Some(GLOBAL_ALIAS), Some(name)) => QualifiedName::fully(name),
        (Some(alias), Some(_)) => {
            QualifiedName::failed(text, format!("extern alias '{alias}' is not supported"))
        }
        _ => QualifiedName::failed(text, "malformed alias-qualified name"),
    }
}

/// Source text of a tuple type with whitespace runs collapsed
pub fn tuple_display_name(node: Node<'_>, source: &str) -> String {
    let collapsed = node_text(node, source)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut display = String::with_capacity(collapsed.len());
    for ch in collapsed.chars() {
        match ch {
            ',' | ')' | '>' | ']' => {
                if display.ends_with(' ') {
                    display.pop();
                }
                display.push(ch);
                if ch == ',' {
                    display.push(' ');
                }
            }
            ' ' if display.ends_with([' ', '(', '<', '[']) => {}
            _ => display.push(ch),
        }
    }
    display
}
