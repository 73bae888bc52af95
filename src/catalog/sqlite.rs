//! SQLite backend of the catalog
//!
//! Named types share one table discriminated by `kind`. Type references and
//! usages are write-only from the session's point of view: on open only their
//! highest ids are read back so new rows continue the sequence.

use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::error::{CatalogError, CatalogResult};
use super::model::{
    Accessibility, DocumentedType, ExternalType, LocalType, NamedType, NamedTypeKind, Namespace,
    SourceFile, TupleElement, TupleType, TypeParameter, TypeReference, TypeUsage, Variance,
};
use crate::types::{NamedTypeId, NamespaceId, SourceFileId, TupleElementId, TypeReferenceId};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS namespaces (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    parent_id INTEGER REFERENCES namespaces(id)
);
CREATE TABLE IF NOT EXISTS source_files (
    id INTEGER PRIMARY KEY,
    path TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS source_file_usings (
    file_id INTEGER NOT NULL REFERENCES source_files(id),
    ordinal INTEGER NOT NULL,
    namespace_id INTEGER NOT NULL REFERENCES namespaces(id),
    PRIMARY KEY (file_id, ordinal)
);
CREATE TABLE IF NOT EXISTS named_types (
    id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    arity INTEGER NOT NULL,
    full_name TEXT,
    namespace_id INTEGER REFERENCES namespaces(id),
    containing_type_id INTEGER REFERENCES named_types(id),
    decl_kind TEXT,
    accessibility TEXT,
    source_file_id INTEGER REFERENCES source_files(id),
    declaring_type_id INTEGER REFERENCES named_types(id),
    type_parameter_index INTEGER
);
CREATE INDEX IF NOT EXISTS idx_named_types_lookup ON named_types(kind, name, arity);
CREATE TABLE IF NOT EXISTS type_parameters (
    declaring_type_id INTEGER NOT NULL REFERENCES named_types(id),
    ordinal INTEGER NOT NULL,
    name TEXT NOT NULL,
    variance TEXT NOT NULL,
    PRIMARY KEY (declaring_type_id, ordinal)
);
CREATE TABLE IF NOT EXISTS external_type_namespaces (
    type_id INTEGER NOT NULL REFERENCES named_types(id),
    namespace TEXT NOT NULL,
    PRIMARY KEY (type_id, namespace)
);
CREATE TABLE IF NOT EXISTS tuple_elements (
    id INTEGER PRIMARY KEY,
    tuple_id INTEGER NOT NULL REFERENCES named_types(id),
    ordinal INTEGER NOT NULL,
    name TEXT NOT NULL,
    rank INTEGER NOT NULL,
    element_type_id INTEGER NOT NULL REFERENCES named_types(id),
    UNIQUE (tuple_id, ordinal)
);
CREATE TABLE IF NOT EXISTS type_references (
    id INTEGER PRIMARY KEY,
    named_type_id INTEGER NOT NULL REFERENCES named_types(id),
    rank INTEGER NOT NULL,
    parent_id INTEGER REFERENCES type_references(id)
);
CREATE TABLE IF NOT EXISTS type_usages (
    id INTEGER PRIMARY KEY,
    owner_type_id INTEGER NOT NULL REFERENCES named_types(id),
    reference_id INTEGER NOT NULL REFERENCES type_references(id),
    role TEXT NOT NULL,
    member_name TEXT
);
"#;

/// Everything the session keeps resident after opening a catalog
#[derive(Debug, Default)]
pub struct LoadedCatalog {
    pub namespaces: Vec<Namespace>,
    pub files: Vec<SourceFile>,
    pub named_types: BTreeMap<NamedTypeId, NamedType>,
    pub tuple_elements: Vec<TupleElement>,
    pub max_type_reference_id: u32,
    pub max_type_usage_id: u32,
}

/// Rows to write in one flush, borrowed from the session
#[derive(Debug, Default)]
pub struct ChangeSet<'a> {
    pub namespaces: Vec<&'a Namespace>,
    pub files: Vec<&'a SourceFile>,
    pub named_types: Vec<(NamedTypeId, &'a NamedType)>,
    pub external_namespaces: Vec<(NamedTypeId, &'a str)>,
    pub tuple_elements: Vec<&'a TupleElement>,
    pub type_references: Vec<&'a TypeReference>,
    pub type_usages: Vec<&'a TypeUsage>,
}

impl ChangeSet<'_> {
    pub fn len(&self) -> usize {
        self.namespaces.len()
            + self.files.len()
            + self.named_types.len()
            + self.external_namespaces.len()
            + self.tuple_elements.len()
            + self.type_references.len()
            + self.type_usages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (creating if needed) a catalog database file
    pub fn open(path: &Path) -> CatalogResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> CatalogResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> CatalogResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> CatalogResult<LoadedCatalog> {
        let mut loaded = LoadedCatalog {
            namespaces: self.load_namespaces()?,
            files: self.load_files()?,
            named_types: self.load_named_types()?,
            tuple_elements: self.load_tuple_elements()?,
            ..LoadedCatalog::default()
        };

        for element in &loaded.tuple_elements {
            match loaded.named_types.get_mut(&element.tuple) {
                Some(NamedType::Tuple(tuple)) => tuple.elements.push(element.id),
                _ => {
                    return Err(CatalogError::Corrupted {
                        reason: format!(
                            "tuple element {} points at {} which is not a tuple",
                            element.id, element.tuple
                        ),
                    });
                }
            }
        }

        loaded.max_type_reference_id = self.max_id("type_references")?;
        loaded.max_type_usage_id = self.max_id("type_usages")?;
        Ok(loaded)
    }

    fn max_id(&self, table: &str) -> CatalogResult<u32> {
        let max: Option<i64> =
            self.conn
                .query_row(&format!("SELECT MAX(id) FROM {table}"), [], |row| row.get(0))?;
        Ok(max.unwrap_or(0) as u32)
    }

    fn load_namespaces(&self) -> CatalogResult<Vec<Namespace>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, parent_id FROM namespaces ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Namespace {
                id: NamespaceId(row.get(0)?),
                name: row.get(1)?,
                parent: row.get::<_, Option<u32>>(2)?.and_then(NamespaceId::new),
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn load_files(&self) -> CatalogResult<Vec<SourceFile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, path FROM source_files ORDER BY id")?;
        let mut files: Vec<SourceFile> = stmt
            .query_map([], |row| {
                Ok(SourceFile {
                    id: SourceFileId(row.get(0)?),
                    path: PathBuf::from(row.get::<_, String>(1)?),
                    usings: Vec::new(),
                })
            })?
            .collect::<Result<_, _>>()?;

        let mut usings = self.conn.prepare(
            "SELECT namespace_id FROM source_file_usings WHERE file_id = ?1 ORDER BY ordinal",
        )?;
        for file in &mut files {
            file.usings = usings
                .query_map([file.id.to_sql()], |row| Ok(NamespaceId(row.get(0)?)))?
                .collect::<Result<_, _>>()?;
        }
        Ok(files)
    }

    fn load_named_types(&self) -> CatalogResult<BTreeMap<NamedTypeId, NamedType>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, name, arity, full_name, namespace_id, containing_type_id, \
             decl_kind, accessibility, source_file_id, declaring_type_id, type_parameter_index \
             FROM named_types ORDER BY id",
        )?;
        let raw: Vec<RawNamedType> = stmt
            .query_map([], RawNamedType::from_row)?
            .collect::<Result<_, _>>()?;

        let mut namespaces_of = self
            .conn
            .prepare("SELECT namespace FROM external_type_namespaces WHERE type_id = ?1")?;

        let mut named_types = BTreeMap::new();
        for row in raw {
            let id = NamedTypeId(row.id);
            let kind: NamedTypeKind = parse_column("kind", &row.kind)?;
            let ty = match kind {
                NamedTypeKind::Documented => NamedType::Documented(DocumentedType {
                    full_name: required("full_name", row.full_name)?,
                    namespace: NamespaceId(required("namespace_id", row.namespace_id)?),
                    containing_type: row.containing_type_id.and_then(NamedTypeId::new),
                    decl_kind: parse_column("decl_kind", &required("decl_kind", row.decl_kind)?)?,
                    accessibility: parse_column(
                        "accessibility",
                        &required("accessibility", row.accessibility)?,
                    )?,
                    source_file: SourceFileId(required("source_file_id", row.source_file_id)?),
                    type_parameter_count: row.arity,
                    // Parameterless types have nothing to load lazily
                    type_parameters: (row.arity == 0).then(Vec::new),
                    name: row.name,
                }),
                NamedTypeKind::External => {
                    let possible_namespaces: BTreeSet<String> = namespaces_of
                        .query_map([row.id], |r| r.get(0))?
                        .collect::<Result<_, _>>()?;
                    NamedType::External(ExternalType {
                        name: row.name,
                        arity: row.arity,
                        accessibility: match row.accessibility {
                            Some(text) => parse_column("accessibility", &text)?,
                            None => Accessibility::External,
                        },
                        possible_namespaces,
                    })
                }
                NamedTypeKind::Local => NamedType::Local(LocalType {
                    name: row.name,
                    declaring_type: NamedTypeId(required(
                        "declaring_type_id",
                        row.declaring_type_id,
                    )?),
                    type_parameter_index: required(
                        "type_parameter_index",
                        row.type_parameter_index,
                    )?,
                }),
                NamedTypeKind::Tuple => NamedType::Tuple(TupleType {
                    display_name: row.name,
                    elements: Vec::new(),
                }),
            };
            named_types.insert(id, ty);
        }
        Ok(named_types)
    }

    fn load_tuple_elements(&self) -> CatalogResult<Vec<TupleElement>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, tuple_id, ordinal, name, rank, element_type_id \
             FROM tuple_elements ORDER BY tuple_id, ordinal",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TupleElement {
                id: TupleElementId(row.get(0)?),
                tuple: NamedTypeId(row.get(1)?),
                ordinal: row.get(2)?,
                name: row.get(3)?,
                rank: row.get(4)?,
                element_type: NamedTypeId(row.get(5)?),
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Fetch the declared type parameters of one documented type
    pub fn load_type_parameters(&self, declaring_type: NamedTypeId) -> CatalogResult<Vec<TypeParameter>> {
        let mut stmt = self.conn.prepare(
            "SELECT ordinal, name, variance FROM type_parameters \
             WHERE declaring_type_id = ?1 ORDER BY ordinal",
        )?;
        let raw: Vec<(u32, String, String)> = stmt
            .query_map([declaring_type.to_sql()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<_, _>>()?;

        raw.into_iter()
            .map(|(ordinal, name, variance)| {
                Ok(TypeParameter {
                    ordinal,
                    name,
                    variance: parse_column::<Variance>("variance", &variance)?,
                })
            })
            .collect()
    }

    /// Write a change set inside one transaction
    pub fn write(&mut self, changes: &ChangeSet<'_>) -> CatalogResult<()> {
        let tx = self.conn.transaction()?;

        for ns in &changes.namespaces {
            tx.execute(
                "INSERT INTO namespaces (id, name, parent_id) VALUES (?1, ?2, ?3)",
                params![ns.id.to_sql(), ns.name, ns.parent.map(|p| p.to_sql())],
            )?;
        }

        for file in &changes.files {
            tx.execute(
                "INSERT INTO source_files (id, path) VALUES (?1, ?2)",
                params![file.id.to_sql(), file.path.to_string_lossy().into_owned()],
            )?;
            for (ordinal, ns) in file.usings.iter().enumerate() {
                tx.execute(
                    "INSERT INTO source_file_usings (file_id, ordinal, namespace_id) VALUES (?1, ?2, ?3)",
                    params![file.id.to_sql(), ordinal as i64, ns.to_sql()],
                )?;
            }
        }

        for (id, ty) in &changes.named_types {
            insert_named_type(&tx, *id, ty)?;
        }

        for (id, ns) in &changes.external_namespaces {
            tx.execute(
                "INSERT OR IGNORE INTO external_type_namespaces (type_id, namespace) VALUES (?1, ?2)",
                params![id.to_sql(), ns],
            )?;
        }

        for element in &changes.tuple_elements {
            tx.execute(
                "INSERT INTO tuple_elements (id, tuple_id, ordinal, name, rank, element_type_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    element.id.to_sql(),
                    element.tuple.to_sql(),
                    element.ordinal,
                    element.name,
                    element.rank,
                    element.element_type.to_sql()
                ],
            )?;
        }

        for reference in &changes.type_references {
            tx.execute(
                "INSERT INTO type_references (id, named_type_id, rank, parent_id) VALUES (?1, ?2, ?3, ?4)",
                params![
                    reference.id.to_sql(),
                    reference.named_type.to_sql(),
                    reference.rank,
                    reference.parent.map(|p| p.to_sql())
                ],
            )?;
        }

        for usage in &changes.type_usages {
            tx.execute(
                "INSERT INTO type_usages (id, owner_type_id, reference_id, role, member_name) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    usage.id.to_sql(),
                    usage.owner.to_sql(),
                    usage.reference.to_sql(),
                    usage.role.as_str(),
                    usage.member_name
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Number of rows in a catalog table
    pub fn count(&self, table: CatalogTable) -> CatalogResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.as_str()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Children of a persisted type reference, in insertion order
    pub fn reference_children(&self, parent: TypeReferenceId) -> CatalogResult<Vec<TypeReference>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, named_type_id, rank, parent_id FROM type_references \
             WHERE parent_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([parent.to_sql()], |row| {
            Ok(TypeReference {
                id: TypeReferenceId(row.get(0)?),
                named_type: NamedTypeId(row.get(1)?),
                rank: row.get(2)?,
                parent: row
                    .get::<_, Option<u32>>(3)?
                    .and_then(TypeReferenceId::new),
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn find_namespace_id(&self, name: &str) -> CatalogResult<Option<NamespaceId>> {
        Ok(self
            .conn
            .query_row("SELECT id FROM namespaces WHERE name = ?1", [name], |row| {
                Ok(NamespaceId(row.get(0)?))
            })
            .optional()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    Namespaces,
    SourceFiles,
    NamedTypes,
    TupleElements,
    TypeReferences,
    TypeUsages,
}

impl CatalogTable {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Namespaces => "namespaces",
            Self::SourceFiles => "source_files",
            Self::NamedTypes => "named_types",
            Self::TupleElements => "tuple_elements",
            Self::TypeReferences => "type_references",
            Self::TypeUsages => "type_usages",
        }
    }
}

fn insert_named_type(
    tx: &rusqlite::Transaction<'_>,
    id: NamedTypeId,
    ty: &NamedType,
) -> CatalogResult<()> {
    let kind = ty.kind().as_str();
    match ty {
        NamedType::Documented(doc) => {
            tx.execute(
                "INSERT INTO named_types (id, kind, name, arity, full_name, namespace_id, \
                 containing_type_id, decl_kind, accessibility, source_file_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id.to_sql(),
                    kind,
                    doc.name,
                    doc.type_parameter_count,
                    doc.full_name,
                    doc.namespace.to_sql(),
                    doc.containing_type.map(|t| t.to_sql()),
                    doc.decl_kind.as_str(),
                    doc.accessibility.as_str(),
                    doc.source_file.to_sql()
                ],
            )?;
            for param in doc.type_parameters.iter().flatten() {
                tx.execute(
                    "INSERT INTO type_parameters (declaring_type_id, ordinal, name, variance) \
                     VALUES (?1, ?2, ?3, ?4)",
                    params![id.to_sql(), param.ordinal, param.name, param.variance.as_str()],
                )?;
            }
        }
        NamedType::External(ext) => {
            tx.execute(
                "INSERT INTO named_types (id, kind, name, arity, accessibility) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_sql(),
                    kind,
                    ext.name,
                    ext.arity,
                    ext.accessibility.as_str()
                ],
            )?;
            for ns in &ext.possible_namespaces {
                tx.execute(
                    "INSERT OR IGNORE INTO external_type_namespaces (type_id, namespace) VALUES (?1, ?2)",
                    params![id.to_sql(), ns],
                )?;
            }
        }
        NamedType::Local(local) => {
            tx.execute(
                "INSERT INTO named_types (id, kind, name, arity, declaring_type_id, type_parameter_index) \
                 VALUES (?1, ?2, ?3, 0, ?4, ?5)",
                params![
                    id.to_sql(),
                    kind,
                    local.name,
                    local.declaring_type.to_sql(),
                    local.type_parameter_index
                ],
            )?;
        }
        NamedType::Tuple(tuple) => {
            tx.execute(
                "INSERT INTO named_types (id, kind, name, arity) VALUES (?1, ?2, ?3, ?4)",
                params![
                    id.to_sql(),
                    kind,
                    tuple.display_name,
                    tuple.element_count() as i64
                ],
            )?;
        }
    }
    Ok(())
}

/// Column values of one `named_types` row before kind dispatch
struct RawNamedType {
    id: u32,
    kind: String,
    name: String,
    arity: u32,
    full_name: Option<String>,
    namespace_id: Option<u32>,
    containing_type_id: Option<u32>,
    decl_kind: Option<String>,
    accessibility: Option<String>,
    source_file_id: Option<u32>,
    declaring_type_id: Option<u32>,
    type_parameter_index: Option<u32>,
}

impl RawNamedType {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            name: row.get(2)?,
            arity: row.get(3)?,
            full_name: row.get(4)?,
            namespace_id: row.get(5)?,
            containing_type_id: row.get(6)?,
            decl_kind: row.get(7)?,
            accessibility: row.get(8)?,
            source_file_id: row.get(9)?,
            declaring_type_id: row.get(10)?,
            type_parameter_index: row.get(11)?,
        })
    }
}

fn required<T>(column: &'static str, value: Option<T>) -> CatalogResult<T> {
    value.ok_or_else(|| CatalogError::InvalidColumn {
        column,
        value: "NULL".to_string(),
    })
}

fn parse_column<T: std::str::FromStr>(column: &'static str, value: &str) -> CatalogResult<T> {
    value.parse().map_err(|_| CatalogError::InvalidColumn {
        column,
        value: value.to_string(),
    })
}
