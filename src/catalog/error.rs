use std::path::PathBuf;
use thiserror::Error;

use crate::types::{NamedTypeId, NamespaceId, SourceFileId};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Namespace '{name}' is not catalogued")]
    MissingNamespace { name: String },

    #[error("Namespace {id} is not catalogued")]
    MissingNamespaceId { id: NamespaceId },

    #[error("Source file '{}' is not catalogued", path.display())]
    MissingSourceFile { path: PathBuf },

    #[error("Source file {id} is not catalogued")]
    MissingSourceFileId { id: SourceFileId },

    #[error("Named type {id} is not catalogued")]
    MissingNamedType { id: NamedTypeId },

    #[error("Named type {id} is not a documented type")]
    NotDocumented { id: NamedTypeId },

    #[error("Type parameters of '{type_name}' are not loaded and no store is attached")]
    TypeParametersUnavailable { type_name: String },

    #[error("Invalid value '{value}' in column {column}")]
    InvalidColumn { column: &'static str, value: String },

    #[error("Catalog appears to be corrupted: {reason}")]
    Corrupted { reason: String },
}

impl CatalogError {
    /// Whether the error means an earlier cataloguing phase did not run.
    pub fn is_missing_prerequisite(&self) -> bool {
        matches!(
            self,
            Self::MissingNamespace { .. }
                | Self::MissingNamespaceId { .. }
                | Self::MissingSourceFile { .. }
                | Self::MissingSourceFileId { .. }
                | Self::MissingNamedType { .. }
                | Self::NotDocumented { .. }
                | Self::TypeParametersUnavailable { .. }
        )
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
