//! Type catalog and reference resolution for C# documentation
//!
//! Sources are parsed with tree-sitter, their declarations are recorded as
//! documented types, and every type written in a base list, constraint or
//! member signature is resolved to a tree of references against the catalog.

pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod indexing;
pub mod parsing;
pub mod resolution;
pub mod types;

// Explicit exports for better API clarity
pub use catalog::{CatalogError, CatalogResult, CatalogSession, NamedType, NamedTypeKind};
pub use config::Settings;
pub use error::{
    AnalyzeError, AnalyzeResult, ParseError, ParseResult, ResolveError, ResolveResult, ScanError,
    ScanResult,
};
pub use indexing::{FileWalker, ScanSummary, Scanner};
pub use parsing::{CSharpParser, SourceUnit};
pub use resolution::{TypeNodeAnalyzer, TypeReferenceResolver};
pub use types::{NamedTypeId, NamespaceId, Range, SourceFileId, TypeReferenceId};
