//! In-memory unit of work over the catalog
//!
//! Rows added through the session are staged: they are immediately visible
//! to every lookup and are written to the attached store by
//! [`CatalogSession::save_changes`]. A session without a store keeps
//! everything in memory and treats a flush as clearing the pending set.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::{CatalogError, CatalogResult};
use super::model::{
    Accessibility, DocumentedType, ExternalType, LocalType, NamedType, NamedTypeKind, Namespace,
    NewTupleElement, SourceFile, TupleElement, TupleType, TypeParameter, TypeReference,
    TypeUsage, UsageRole,
};
use super::sqlite::{ChangeSet, SqliteStore};
use crate::types::{
    IdCounter, NamedTypeId, NamespaceId, SourceFileId, TupleElementId, TypeReferenceId,
    TypeUsageId,
};

/// Ids of rows created since the last flush, in creation order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingChanges {
    pub namespaces: Vec<NamespaceId>,
    pub files: Vec<SourceFileId>,
    pub named_types: Vec<NamedTypeId>,
    /// Namespaces added to external types that were already stored
    pub external_namespaces: Vec<(NamedTypeId, String)>,
    pub tuple_elements: Vec<TupleElementId>,
    pub type_references: Vec<TypeReferenceId>,
    pub type_usages: Vec<TypeUsageId>,
}

impl PendingChanges {
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

/// Row counts of everything resident in a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CatalogStats {
    pub namespaces: usize,
    pub files: usize,
    pub documented_types: usize,
    pub external_types: usize,
    pub local_types: usize,
    pub tuple_types: usize,
    pub type_references: usize,
    pub type_usages: usize,
}

#[derive(Debug)]
pub struct CatalogSession {
    store: Option<SqliteStore>,

    namespaces: BTreeMap<NamespaceId, Namespace>,
    namespace_by_name: HashMap<String, NamespaceId>,
    global_namespace: NamespaceId,

    files: BTreeMap<SourceFileId, SourceFile>,
    file_by_path: HashMap<PathBuf, SourceFileId>,

    named_types: BTreeMap<NamedTypeId, NamedType>,
    /// full name -> documented types (one per arity)
    documented_by_name: HashMap<String, Vec<NamedTypeId>>,
    /// simple name -> external types, ascending ids
    external_by_name: HashMap<String, Vec<NamedTypeId>>,
    /// element count -> tuple types, ascending ids
    tuples_by_count: HashMap<usize, Vec<NamedTypeId>>,
    tuple_elements: BTreeMap<TupleElementId, TupleElement>,

    /// Only rows created by this session; stored ones are write-only
    type_references: BTreeMap<TypeReferenceId, TypeReference>,
    type_usages: BTreeMap<TypeUsageId, TypeUsage>,

    pending: PendingChanges,

    namespace_ids: IdCounter<NamespaceId>,
    file_ids: IdCounter<SourceFileId>,
    named_type_ids: IdCounter<NamedTypeId>,
    tuple_element_ids: IdCounter<TupleElementId>,
    type_reference_ids: IdCounter<TypeReferenceId>,
    type_usage_ids: IdCounter<TypeUsageId>,
}

impl CatalogSession {
    /// A session with no backing store
    pub fn in_memory() -> Self {
        let mut session = Self::empty(None);
        session.global_namespace = session.ensure_namespace("");
        session
    }

    /// Open a session over a SQLite catalog, creating the file if needed
    pub fn open(path: &Path) -> CatalogResult<Self> {
        Self::with_store(SqliteStore::open(path)?)
    }

    pub fn with_store(store: SqliteStore) -> CatalogResult<Self> {
        let loaded = store.load()?;
        let mut session = Self::empty(Some(store));

        session.namespace_ids =
            IdCounter::after(loaded.namespaces.iter().map(|n| n.id.value()).max().unwrap_or(0));
        session.file_ids =
            IdCounter::after(loaded.files.iter().map(|f| f.id.value()).max().unwrap_or(0));
        session.named_type_ids = IdCounter::after(
            loaded
                .named_types
                .keys()
                .next_back()
                .map_or(0, |id| id.value()),
        );
        session.tuple_element_ids = IdCounter::after(
            loaded
                .tuple_elements
                .iter()
                .map(|e| e.id.value())
                .max()
                .unwrap_or(0),
        );
        session.type_reference_ids = IdCounter::after(loaded.max_type_reference_id);
        session.type_usage_ids = IdCounter::after(loaded.max_type_usage_id);

        for ns in loaded.namespaces {
            session.index_namespace(ns);
        }
        for file in loaded.files {
            session.file_by_path.insert(file.path.clone(), file.id);
            session.files.insert(file.id, file);
        }
        for (id, ty) in loaded.named_types {
            session.index_named_type(id, ty);
        }
        for element in loaded.tuple_elements {
            session.tuple_elements.insert(element.id, element);
        }

        session.global_namespace = session.ensure_namespace("");
        debug!(
            namespaces = session.namespaces.len(),
            named_types = session.named_types.len(),
            "opened catalog session"
        );
        Ok(session)
    }

    fn empty(store: Option<SqliteStore>) -> Self {
        Self {
            store,
            namespaces: BTreeMap::new(),
            namespace_by_name: HashMap::new(),
            // Replaced by the constructors once the row exists
            global_namespace: NamespaceId(1),
            files: BTreeMap::new(),
            file_by_path: HashMap::new(),
            named_types: BTreeMap::new(),
            documented_by_name: HashMap::new(),
            external_by_name: HashMap::new(),
            tuples_by_count: HashMap::new(),
            tuple_elements: BTreeMap::new(),
            type_references: BTreeMap::new(),
            type_usages: BTreeMap::new(),
            pending: PendingChanges::default(),
            namespace_ids: IdCounter::new(),
            file_ids: IdCounter::new(),
            named_type_ids: IdCounter::new(),
            tuple_element_ids: IdCounter::new(),
            type_reference_ids: IdCounter::new(),
            type_usage_ids: IdCounter::new(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&SqliteStore> {
        self.store.as_ref()
    }

    // ---- namespaces ----------------------------------------------------

    fn index_namespace(&mut self, ns: Namespace) {
        self.namespace_by_name.insert(ns.name.clone(), ns.id);
        self.namespaces.insert(ns.id, ns);
    }

    pub fn global_namespace(&self) -> NamespaceId {
        self.global_namespace
    }

    pub fn namespace(&self, id: NamespaceId) -> Option<&Namespace> {
        self.namespaces.get(&id)
    }

    pub fn find_namespace(&self, name: &str) -> Option<NamespaceId> {
        self.namespace_by_name.get(name).copied()
    }

    /// Find or stage a namespace together with every enclosing namespace
    pub fn ensure_namespace(&mut self, name: &str) -> NamespaceId {
        if let Some(id) = self.find_namespace(name) {
            return id;
        }

        let parent = match name.rsplit_once('.') {
            Some((outer, _)) => Some(self.ensure_namespace(outer)),
            None if name.is_empty() => None,
            None => Some(self.ensure_namespace("")),
        };

        let id = self.namespace_ids.next_id();
        self.index_namespace(Namespace {
            id,
            name: name.to_string(),
            parent,
        });
        self.pending.namespaces.push(id);
        id
    }

    // ---- source files ----------------------------------------------------

    pub fn source_file(&self, id: SourceFileId) -> Option<&SourceFile> {
        self.files.get(&id)
    }

    pub fn find_source_file(&self, path: &Path) -> Option<SourceFileId> {
        self.file_by_path.get(path).copied()
    }

    pub fn add_source_file(&mut self, path: &Path, usings: Vec<NamespaceId>) -> SourceFileId {
        let id = self.file_ids.next_id();
        self.file_by_path.insert(path.to_path_buf(), id);
        self.files.insert(
            id,
            SourceFile {
                id,
                path: path.to_path_buf(),
                usings,
            },
        );
        self.pending.files.push(id);
        id
    }

    pub fn source_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    // ---- named types -----------------------------------------------------

    fn index_named_type(&mut self, id: NamedTypeId, ty: NamedType) {
        match &ty {
            NamedType::Documented(doc) => {
                self.documented_by_name
                    .entry(doc.full_name.clone())
                    .or_default()
                    .push(id);
            }
            NamedType::External(ext) => {
                self.external_by_name
                    .entry(ext.name.clone())
                    .or_default()
                    .push(id);
            }
            NamedType::Tuple(tuple) => {
                self.tuples_by_count
                    .entry(tuple.element_count())
                    .or_default()
                    .push(id);
            }
            NamedType::Local(_) => {}
        }
        self.named_types.insert(id, ty);
    }

    fn stage_named_type(&mut self, ty: NamedType) -> NamedTypeId {
        let id = self.named_type_ids.next_id();
        self.index_named_type(id, ty);
        self.pending.named_types.push(id);
        id
    }

    pub fn named_type(&self, id: NamedTypeId) -> Option<&NamedType> {
        self.named_types.get(&id)
    }

    pub fn require_named_type(&self, id: NamedTypeId) -> CatalogResult<&NamedType> {
        self.named_type(id)
            .ok_or(CatalogError::MissingNamedType { id })
    }

    pub fn named_types(&self) -> impl Iterator<Item = (NamedTypeId, &NamedType)> {
        self.named_types.iter().map(|(id, ty)| (*id, ty))
    }

    pub fn named_types_of_kind(
        &self,
        kind: NamedTypeKind,
    ) -> impl Iterator<Item = (NamedTypeId, &NamedType)> {
        self.named_types().filter(move |(_, ty)| ty.kind() == kind)
    }

    pub fn documented(&self, id: NamedTypeId) -> CatalogResult<&DocumentedType> {
        self.require_named_type(id)?
            .as_documented()
            .ok_or(CatalogError::NotDocumented { id })
    }

    /// Documented type by full name (without type parameters) and arity
    pub fn find_documented(&self, full_name: &str, arity: u32) -> Option<NamedTypeId> {
        self.documented_by_name.get(full_name)?.iter().copied().find(|id| {
            self.named_types
                .get(id)
                .is_some_and(|ty| ty.arity() == arity)
        })
    }

    pub fn add_documented_type(&mut self, ty: DocumentedType) -> NamedTypeId {
        self.stage_named_type(NamedType::Documented(ty))
    }

    /// Type parameters of a documented type, fetched from the store on first use
    pub fn ensure_type_parameters(&mut self, id: NamedTypeId) -> CatalogResult<Vec<TypeParameter>> {
        let doc = self.documented(id)?;
        if let Some(params) = &doc.type_parameters {
            return Ok(params.clone());
        }

        let type_name = doc.full_name.clone();
        let store = self
            .store
            .as_ref()
            .ok_or(CatalogError::TypeParametersUnavailable { type_name: type_name.clone() })?;
        let params = store.load_type_parameters(id)?;
        debug!(type_name = %type_name, count = params.len(), "loaded type parameters");

        if let Some(NamedType::Documented(doc)) = self.named_types.get_mut(&id) {
            if params.len() as u32 != doc.type_parameter_count {
                return Err(CatalogError::Corrupted {
                    reason: format!(
                        "'{}' declares {} type parameters but {} are stored",
                        doc.full_name,
                        doc.type_parameter_count,
                        params.len()
                    ),
                });
            }
            doc.type_parameters = Some(params.clone());
        }
        Ok(params)
    }

    /// External types with this simple name and arity, oldest first
    pub fn external_candidates(&self, name: &str, arity: u32) -> Vec<NamedTypeId> {
        self.external_by_name
            .get(name)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|id| self.named_types.get(id).is_some_and(|ty| ty.arity() == arity))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn add_external_type(
        &mut self,
        name: &str,
        arity: u32,
        possible_namespaces: BTreeSet<String>,
    ) -> NamedTypeId {
        self.stage_named_type(NamedType::External(ExternalType {
            name: name.to_string(),
            arity,
            accessibility: Accessibility::External,
            possible_namespaces,
        }))
    }

    /// Record further namespaces an external type may live in.
    ///
    /// Returns how many namespaces were new. Existing entries are never removed.
    pub fn extend_external_namespaces<'a>(
        &mut self,
        id: NamedTypeId,
        namespaces: impl IntoIterator<Item = &'a str>,
    ) -> CatalogResult<usize> {
        let already_pending = self.pending.named_types.contains(&id);
        let Some(NamedType::External(ext)) = self.named_types.get_mut(&id) else {
            return Err(CatalogError::MissingNamedType { id });
        };

        let mut added = 0;
        for ns in namespaces {
            if ext.possible_namespaces.insert(ns.to_string()) {
                added += 1;
                // A staged row is written with its full set anyway
                if !already_pending {
                    self.pending.external_namespaces.push((id, ns.to_string()));
                }
            }
        }
        Ok(added)
    }

    pub fn add_local_type(
        &mut self,
        declaring_type: NamedTypeId,
        type_parameter_index: u32,
        name: &str,
    ) -> NamedTypeId {
        self.stage_named_type(NamedType::Local(LocalType {
            name: name.to_string(),
            declaring_type,
            type_parameter_index,
        }))
    }

    /// Tuple types with this many elements, oldest first
    pub fn tuple_candidates(&self, element_count: usize) -> Vec<NamedTypeId> {
        self.tuples_by_count
            .get(&element_count)
            .cloned()
            .unwrap_or_default()
    }

    pub fn tuple_elements(&self, tuple: NamedTypeId) -> CatalogResult<Vec<&TupleElement>> {
        let Some(NamedType::Tuple(tuple_type)) = self.named_types.get(&tuple) else {
            return Err(CatalogError::MissingNamedType { id: tuple });
        };
        tuple_type
            .elements
            .iter()
            .map(|id| {
                self.tuple_elements.get(id).ok_or_else(|| CatalogError::Corrupted {
                    reason: format!("tuple {tuple} lists missing element {id}"),
                })
            })
            .collect()
    }

    pub fn add_tuple_type(
        &mut self,
        display_name: &str,
        elements: Vec<NewTupleElement>,
    ) -> NamedTypeId {
        let tuple_id = self.named_type_ids.next_id();
        let mut element_ids = Vec::with_capacity(elements.len());

        for (ordinal, element) in elements.into_iter().enumerate() {
            let id = self.tuple_element_ids.next_id();
            self.tuple_elements.insert(
                id,
                TupleElement {
                    id,
                    tuple: tuple_id,
                    ordinal: ordinal as u32,
                    name: element.name,
                    rank: element.rank,
                    element_type: element.element_type,
                },
            );
            element_ids.push(id);
        }

        self.index_named_type(
            tuple_id,
            NamedType::Tuple(TupleType {
                display_name: display_name.to_string(),
                elements: element_ids.clone(),
            }),
        );
        self.pending.named_types.push(tuple_id);
        self.pending.tuple_elements.extend(element_ids);
        tuple_id
    }

    // ---- references and usages -------------------------------------------

    pub fn add_type_reference(
        &mut self,
        named_type: NamedTypeId,
        rank: u32,
        parent: Option<TypeReferenceId>,
    ) -> TypeReferenceId {
        let id = self.type_reference_ids.next_id();
        self.type_references.insert(
            id,
            TypeReference {
                id,
                named_type,
                rank,
                parent,
            },
        );
        self.pending.type_references.push(id);
        id
    }

    pub fn type_reference(&self, id: TypeReferenceId) -> Option<&TypeReference> {
        self.type_references.get(&id)
    }

    /// Children of a reference created by this session, in creation order
    pub fn reference_children(&self, parent: TypeReferenceId) -> Vec<&TypeReference> {
        self.type_references
            .values()
            .filter(|r| r.parent == Some(parent))
            .collect()
    }

    pub fn add_type_usage(
        &mut self,
        owner: NamedTypeId,
        reference: TypeReferenceId,
        role: UsageRole,
        member_name: Option<String>,
    ) -> TypeUsageId {
        let id = self.type_usage_ids.next_id();
        self.type_usages.insert(
            id,
            TypeUsage {
                id,
                owner,
                reference,
                role,
                member_name,
            },
        );
        self.pending.type_usages.push(id);
        id
    }

    pub fn type_usages(&self) -> impl Iterator<Item = &TypeUsage> {
        self.type_usages.values()
    }

    // ---- unit of work ----------------------------------------------------

    pub fn pending_changes(&self) -> &PendingChanges {
        &self.pending
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Flush staged rows to the store. Returns the number of rows written.
    pub fn save_changes(&mut self) -> CatalogResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let Some(mut store) = self.store.take() else {
            let count = self.pending.len();
            self.pending = PendingChanges::default();
            return Ok(count);
        };

        let result = self
            .change_set()
            .and_then(|changes| store.write(&changes).map(|()| changes.len()));
        self.store = Some(store);

        let written = result?;
        debug!(rows = written, "flushed catalog changes");
        self.pending = PendingChanges::default();
        Ok(written)
    }

    fn change_set(&self) -> CatalogResult<ChangeSet<'_>> {
        let pending = &self.pending;
        let missing = |what: &str, id: &dyn std::fmt::Display| CatalogError::Corrupted {
            reason: format!("pending {what} {id} has no row"),
        };

        let mut changes = ChangeSet::default();
        for id in &pending.namespaces {
            changes
                .namespaces
                .push(self.namespaces.get(id).ok_or_else(|| missing("namespace", id))?);
        }
        for id in &pending.files {
            changes
                .files
                .push(self.files.get(id).ok_or_else(|| missing("file", id))?);
        }
        for id in &pending.named_types {
            let ty = self
                .named_types
                .get(id)
                .ok_or_else(|| missing("named type", id))?;
            changes.named_types.push((*id, ty));
        }
        for (id, ns) in &pending.external_namespaces {
            changes.external_namespaces.push((*id, ns.as_str()));
        }
        for id in &pending.tuple_elements {
            changes.tuple_elements.push(
                self.tuple_elements
                    .get(id)
                    .ok_or_else(|| missing("tuple element", id))?,
            );
        }
        for id in &pending.type_references {
            changes.type_references.push(
                self.type_references
                    .get(id)
                    .ok_or_else(|| missing("type reference", id))?,
            );
        }
        for id in &pending.type_usages {
            changes.type_usages.push(
                self.type_usages
                    .get(id)
                    .ok_or_else(|| missing("type usage", id))?,
            );
        }
        Ok(changes)
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            namespaces: self.namespaces.len(),
            files: self.files.len(),
            type_references: self.type_references.len(),
            type_usages: self.type_usages.len(),
            ..CatalogStats::default()
        };
        for ty in self.named_types.values() {
            match ty.kind() {
                NamedTypeKind::Documented => stats.documented_types += 1,
                NamedTypeKind::External => stats.external_types += 1,
                NamedTypeKind::Local => stats.local_types += 1,
                NamedTypeKind::Tuple => stats.tuple_types += 1,
            }
        }
        stats
    }
}
