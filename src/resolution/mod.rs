//! Type-reference resolution
//!
//! Turns a C# type syntax node into a tree of catalog references in two
//! steps. The [`analyzer`] reads the syntax into a [`TypeDescriptor`] tree,
//! attaching the namespaces in scope wherever a name is not fully qualified.
//! The [`reference`] resolver then runs every descriptor through the
//! [`ResolverChain`] and stages one reference row per descriptor.
//!
//! ```no_run
//! use sharpdoc::catalog::CatalogSession;
//! use sharpdoc::indexing::DeclarationCataloger;
//! use sharpdoc::parsing::CSharpParser;
//! use sharpdoc::resolution::{TypeNodeAnalyzer, TypeReferenceResolver};
//!
//! let mut parser = CSharpParser::new().unwrap();
//! let unit = parser
//!     .parse("A.cs", "class A { System.Uri home; }".to_string())
//!     .unwrap();
//! let mut session = CatalogSession::in_memory();
//! DeclarationCataloger::new(&mut session).catalog(&unit);
//!
//! let container = session.find_documented("A", 0).unwrap();
//! let node = unit.find_first("qualified_name").unwrap();
//! let analysis = TypeNodeAnalyzer::new(&mut session, &unit, container, true)
//!     .analyze(node)
//!     .unwrap();
//! let root = TypeReferenceResolver::new()
//!     .unwrap()
//!     .resolve(&mut session, &analysis)
//!     .unwrap();
//! session.save_changes().unwrap();
//! # let _ = root;
//! ```

pub mod analyzer;
pub mod chain;
pub mod descriptor;
pub mod namespace;
pub mod reference;
pub mod resolvers;
pub mod topo;

pub use analyzer::{TypeAnalysis, TypeNodeAnalyzer};
pub use chain::ResolverChain;
pub use descriptor::{ResolvedNameState, TypeDescriptor};
pub use namespace::{ContextScope, NamespaceContext};
pub use reference::TypeReferenceResolver;
pub use resolvers::{ResolveScope, Resolved, Target, TypeResolver};
