//! C# language support for sharpdoc
//!
//! # Architecture
//!
//! - [`parser`] - Tree-sitter parser setup and the parsed [`SourceUnit`]
//! - [`syntax`] - Structural queries: declarations, namespaces, usings, members
//! - [`names`] - Qualification of type names from syntax alone
//!
//! # Example
//!
//! ```no_run
//! use sharpdoc::parsing::csharp::{CSharpParser, names};
//!
//! let mut parser = CSharpParser::new().expect("Failed to create parser");
//! let unit = parser
//!     .parse("A.cs", "class A { global::System.Guid id; }".to_string())
//!     .expect("Failed to parse");
//! let node = unit.find_first("qualified_name").unwrap();
//! assert_eq!(names::qualify(node, unit.source()).name, "System.Guid");
//! ```

pub mod names;
pub mod parser;
pub mod syntax;

pub use names::{QualifiedName, ResolvedNameState};
pub use parser::{CSharpParser, SourceUnit};
pub use syntax::TypeSyntaxKind;
