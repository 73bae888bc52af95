//! Error types for the C# type catalog
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages. Each stage of the pipeline
//! owns one enum: parsing, type-node analysis, reference resolution and the
//! scanning driver that ties them together.

use crate::catalog::CatalogError;
use crate::types::{NamedTypeId, Range};
use std::path::PathBuf;
use thiserror::Error;

/// Errors specific to parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    #[error("Parser produced no syntax tree for '{}'", path.display())]
    NoTree { path: PathBuf },
}

/// Errors raised while turning a syntax node into a type descriptor
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Unsupported type syntax '{kind}' at {range}")]
    UnsupportedNode { kind: String, range: Range },

    #[error("Type syntax at {range} is nested deeper than {limit} levels")]
    TooDeep { range: Range, limit: usize },

    #[error("Source file '{}' is not catalogued", path.display())]
    MissingSourceFile { path: PathBuf },

    #[error("Named type {id} is not a documented type")]
    NotDocumented { id: NamedTypeId },

    #[error("Enclosing type '{full_name}' is not catalogued")]
    UncataloguedType { full_name: String },

    #[error("Cannot qualify type name '{text}' at {range}: {reason}")]
    NameResolution {
        text: String,
        range: Range,
        reason: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors raised while resolving a descriptor tree against the catalog
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Type analysis is not valid for resolution: {reason}")]
    InvalidAnalysis { reason: String },

    #[error("No resolver matched type '{name}'")]
    Unresolved { name: String },

    #[error("Resolver ordering contains a cycle through {members}")]
    ResolverOrder { members: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors raised by the scanning driver
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read file '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl AnalyzeError {
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::UnsupportedNode { .. } => "UNSUPPORTED_NODE",
            Self::TooDeep { .. } => "TYPE_TOO_DEEP",
            Self::MissingSourceFile { .. } => "MISSING_SOURCE_FILE",
            Self::NotDocumented { .. } => "NOT_DOCUMENTED",
            Self::UncataloguedType { .. } => "UNCATALOGUED_TYPE",
            Self::NameResolution { .. } => "NAME_RESOLUTION_FAILED",
            Self::Catalog(_) => "CATALOG_ERROR",
        }
    }
}

impl ResolveError {
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::InvalidAnalysis { .. } => "INVALID_ANALYSIS",
            Self::Unresolved { .. } => "UNRESOLVED_TYPE",
            Self::ResolverOrder { .. } => "RESOLVER_ORDER",
            Self::Catalog(_) => "CATALOG_ERROR",
        }
    }
}

impl ScanError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
            Self::Analyze(e) => e.status_code(),
            Self::Resolve(e) => e.status_code(),
            Self::Catalog(_) => "CATALOG_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// Whether a scan can move on to the next usage after this error.
    ///
    /// Storage failures are not; a missing catalog row only affects the
    /// usage that needed it.
    pub fn is_recoverable(&self) -> bool {
        let catalog = match self {
            Self::Catalog(e)
            | Self::Analyze(AnalyzeError::Catalog(e))
            | Self::Resolve(ResolveError::Catalog(e)) => e,
            Self::Config { .. } => return false,
            _ => return true,
        };
        catalog.is_missing_prerequisite()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::Catalog(e) if e.is_missing_prerequisite() => vec![
                "Run 'sharpdoc scan --force' so declarations are catalogued before references",
            ],
            Self::Catalog(_) => vec![
                "Run 'sharpdoc scan --force' to rebuild the catalog from scratch",
                "Check disk space and permissions for the catalog directory",
            ],
            Self::Resolve(ResolveError::Unresolved { .. }) => vec![
                "Enable 'resolution.allow_create' to catalogue unseen external types",
            ],
            Self::Config { .. } => vec!["Run 'sharpdoc init --force' to regenerate settings"],
            _ => vec![],
        }
    }
}

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for type-node analysis
pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Result type alias for reference resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type alias for scanning
pub type ScanResult<T> = Result<T, ScanError>;
