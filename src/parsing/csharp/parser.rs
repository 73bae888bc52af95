//! C# parser implementation using tree-sitter
//!
//! **Tree-sitter ABI Version**: ABI-14 (tree-sitter-c-sharp 0.23.1)
//!
//! The parser only builds syntax trees. Everything that reads them works on a
//! [`SourceUnit`], which keeps the tree, its source text and the file path
//! together so nodes can always be turned back into text.

use crate::error::{ParseError, ParseResult};
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser, Tree};

/// C# language parser using tree-sitter
///
/// # Example Usage
///
/// ```no_run
/// use sharpdoc::parsing::csharp::CSharpParser;
///
/// let mut parser = CSharpParser::new().expect("Failed to create parser");
/// let unit = parser
///     .parse("Foo.cs", "class Foo { int Bar; }".to_string())
///     .expect("Failed to parse");
/// assert_eq!(unit.root().kind(), "compilation_unit");
/// ```
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    /// Create a new C# parser
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_c_sharp::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::ParserInit {
                language: "C#".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { parser })
    }

    /// Parse one file. Syntax errors do not fail the parse; they surface as
    /// error nodes that later stages reject individually.
    pub fn parse(&mut self, path: impl Into<PathBuf>, source: String) -> ParseResult<SourceUnit> {
        let path = path.into();
        let Some(tree) = self.parser.parse(&source, None) else {
            return Err(ParseError::NoTree { path });
        };

        Ok(SourceUnit { path, source, tree })
    }
}

/// A parsed source file
pub struct SourceUnit {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl SourceUnit {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`
    pub fn text(&self, node: Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// First node of `kind` in document order
    pub fn find_first(&self, kind: &str) -> Option<Node<'_>> {
        find_descendant(self.root(), &|node| node.kind() == kind)
    }

    /// First node of `kind` whose text equals `text`
    pub fn find_text(&self, kind: &str, text: &str) -> Option<Node<'_>> {
        find_descendant(self.root(), &|node| {
            node.kind() == kind && self.text(node) == text
        })
    }
}

impl std::fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceUnit")
            .field("path", &self.path)
            .field("bytes", &self.source.len())
            .finish()
    }
}

fn find_descendant<'t>(node: Node<'t>, predicate: &dyn Fn(Node<'t>) -> bool) -> Option<Node<'t>> {
    if predicate(node) {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = find_descendant(child, predicate) {
            return Some(found);
        }
    }
    None
}
