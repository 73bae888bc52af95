//! Persistent catalog of namespaces, source files and named types
//!
//! The catalog is the relational model documentation is rendered from.
//! [`CatalogSession`] is the unit of work the resolution pipeline talks to;
//! [`SqliteStore`] is where a session's staged rows end up.

pub mod error;
pub mod model;
pub mod session;
pub mod sqlite;

pub use error::{CatalogError, CatalogResult};
pub use model::{
    Accessibility, DocumentedType, ExternalType, LocalType, NamedType, NamedTypeKind, Namespace,
    NewTupleElement, SourceFile, TupleElement, TupleType, TypeDeclKind, TypeParameter,
    TypeReference, TypeUsage, UsageRole, Variance,
};
pub use session::{CatalogSession, CatalogStats, PendingChanges};
pub use sqlite::{CatalogTable, SqliteStore};
