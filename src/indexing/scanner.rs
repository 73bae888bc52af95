//! Two-pass scan of C# sources into the catalog
//!
//! The first pass catalogues the declarations of every file so that the
//! second pass, which resolves the types written in base lists, constraints
//! and member signatures, can see types declared anywhere in the scan.

use super::declarations::{CatalogOutcome, DeclarationCataloger};
use crate::Settings;
use crate::catalog::{CatalogSession, UsageRole};
use crate::error::{ScanError, ScanResult};
use crate::parsing::csharp::syntax;
use crate::parsing::csharp::{CSharpParser, SourceUnit};
use crate::resolution::{TypeNodeAnalyzer, TypeReferenceResolver};
use crate::types::{NamedTypeId, Range, TypeReferenceId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tree_sitter::Node;

/// Failures kept in a summary; later ones are only counted
const MAX_REPORTED_FAILURES: usize = 100;

/// One usage or file that could not be scanned
#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub range: Option<Range>,
    pub code: &'static str,
    pub message: String,
}

/// Statistics collected during a scan
#[derive(Debug, Default, Serialize)]
pub struct ScanSummary {
    /// Files catalogued by this scan
    pub files_scanned: usize,
    /// Files the catalog already knew
    pub files_skipped: usize,
    /// Files that could not be read or parsed
    pub files_failed: usize,
    pub documented_types: usize,
    /// Type reference rows staged, nested ones included
    pub references: usize,
    pub usages: usize,
    /// Usages and files that failed, reported ones first
    pub failure_count: usize,
    pub failures: Vec<ScanFailure>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ScanSummary {
    fn add_failure(&mut self, path: &Path, range: Option<Range>, error: &ScanError) {
        if self.failures.len() < MAX_REPORTED_FAILURES {
            self.failures.push(ScanFailure {
                path: path.to_path_buf(),
                range,
                code: error.status_code(),
                message: error.to_string(),
            });
        }
        self.failure_count += 1;
    }
}

pub struct Scanner {
    parser: CSharpParser,
    resolver: TypeReferenceResolver,
    allow_create: bool,
}

impl Scanner {
    pub fn new(allow_create: bool) -> ScanResult<Self> {
        Ok(Self {
            parser: CSharpParser::new()?,
            resolver: TypeReferenceResolver::new()?,
            allow_create,
        })
    }

    pub fn from_settings(settings: &Settings) -> ScanResult<Self> {
        Self::new(settings.resolution.allow_create)
    }

    /// Read and parse one file
    pub fn read(&mut self, path: &Path) -> ScanResult<SourceUnit> {
        let source = std::fs::read_to_string(path).map_err(|source| ScanError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parser.parse(path, source)?)
    }

    /// Scan files from disk. Unreadable files are counted as failures.
    pub fn scan_files(
        &mut self,
        session: &mut CatalogSession,
        paths: &[PathBuf],
    ) -> ScanResult<ScanSummary> {
        let mut summary = ScanSummary::default();
        let mut units = Vec::with_capacity(paths.len());
        for path in paths {
            match self.read(path) {
                Ok(unit) => units.push(unit),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    summary.files_failed += 1;
                    summary.add_failure(path, None, &e);
                }
            }
        }
        self.scan_units(session, units, summary)
    }

    /// Scan sources that are already in memory
    pub fn scan_sources(
        &mut self,
        session: &mut CatalogSession,
        sources: impl IntoIterator<Item = (PathBuf, String)>,
    ) -> ScanResult<ScanSummary> {
        let units = sources
            .into_iter()
            .map(|(path, source)| self.parser.parse(path, source))
            .collect::<Result<Vec<_>, _>>()?;
        self.scan_units(session, units, ScanSummary::default())
    }

    fn scan_units(
        &self,
        session: &mut CatalogSession,
        units: Vec<SourceUnit>,
        mut summary: ScanSummary,
    ) -> ScanResult<ScanSummary> {
        let started = Instant::now();

        let mut fresh = Vec::with_capacity(units.len());
        let mut cataloger = DeclarationCataloger::new(session);
        for unit in units {
            if unit.has_errors() {
                debug!(path = %unit.path().display(), "file has syntax errors");
            }
            match cataloger.catalog(&unit) {
                CatalogOutcome::Catalogued {
                    documented_types, ..
                } => {
                    summary.files_scanned += 1;
                    summary.documented_types += documented_types;
                    fresh.push(unit);
                }
                CatalogOutcome::AlreadyCatalogued { .. } => summary.files_skipped += 1,
            }
        }

        let references_before = session.stats().type_references;
        for unit in &fresh {
            self.scan_references(session, unit, &mut summary)?;
        }
        summary.references = session.stats().type_references - references_before;
        summary.elapsed = started.elapsed();

        info!(
            files = summary.files_scanned,
            skipped = summary.files_skipped,
            types = summary.documented_types,
            usages = summary.usages,
            failures = summary.failure_count,
            "scan complete"
        );
        Ok(summary)
    }

    fn scan_references(
        &self,
        session: &mut CatalogSession,
        unit: &SourceUnit,
        summary: &mut ScanSummary,
    ) -> ScanResult<()> {
        let source = unit.source();
        for decl in type_declarations(unit.root()) {
            let (Some(full_name), arity) = (
                syntax::type_full_name(decl, source),
                syntax::type_parameter_count(decl),
            ) else {
                continue;
            };
            let Some(owner) = session.find_documented(&full_name, arity) else {
                warn!(%full_name, arity, "declaration missing from catalog");
                continue;
            };

            for base in syntax::base_types(decl) {
                self.record(session, unit, owner, base, UsageRole::BaseType, None, summary)?;
            }
            for (parameter, constraints) in syntax::constraint_clauses(decl, source) {
                for constraint in constraints {
                    self.record(
                        session,
                        unit,
                        owner,
                        constraint,
                        UsageRole::Constraint,
                        Some(parameter.clone()),
                        summary,
                    )?;
                }
            }

            let members = syntax::member_types(decl, source);
            for method in &members.skipped_methods {
                debug!(%full_name, %method, "generic method not scanned");
            }
            for (member, name) in members.types {
                self.record(session, unit, owner, member.node, member.role, Some(name), summary)?;
            }
        }
        Ok(())
    }

    /// Resolve one usage and stage its row. Recoverable failures are counted.
    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        session: &mut CatalogSession,
        unit: &SourceUnit,
        owner: NamedTypeId,
        node: Node<'_>,
        role: UsageRole,
        member: Option<String>,
        summary: &mut ScanSummary,
    ) -> ScanResult<()> {
        match self.resolve_usage(session, unit, owner, node) {
            Ok(reference) => {
                session.add_type_usage(owner, reference, role, member);
                summary.usages += 1;
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                let range = Range::of_node(node);
                warn!(
                    path = %unit.path().display(),
                    %range,
                    role = role.as_str(),
                    code = e.status_code(),
                    error = %e,
                    "type usage not resolved"
                );
                summary.add_failure(unit.path(), Some(range), &e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn resolve_usage(
        &self,
        session: &mut CatalogSession,
        unit: &SourceUnit,
        owner: NamedTypeId,
        node: Node<'_>,
    ) -> ScanResult<TypeReferenceId> {
        let analysis = TypeNodeAnalyzer::new(session, unit, owner, self.allow_create).analyze(node)?;
        Ok(self.resolver.resolve(session, &analysis)?)
    }
}

/// Every type declaration under `node`, in document order
fn type_declarations(node: Node<'_>) -> Vec<Node<'_>> {
    let mut found = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if syntax::is_type_declaration(current) {
            found.push(current);
        }
        let mut cursor = current.walk();
        let children: Vec<_> = current.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NamedType, NamedTypeKind};

    fn scan(files: &[(&str, &str)], allow_create: bool) -> (CatalogSession, ScanSummary) {
        let mut session = CatalogSession::in_memory();
        let summary = Scanner::new(allow_create)
            .unwrap()
            .scan_sources(
                &mut session,
                files
                    .iter()
                    .map(|(path, code)| (PathBuf::from(path), code.to_string())),
            )
            .unwrap();
        (session, summary)
    }

    #[test]
    fn test_usages_across_files() {
        let (session, summary) = scan(
            &[
                (
                    "Shapes.cs",
                    r#"
namespace App.Shapes
{
    public interface IShape { double Area { get; } }
    public class Circle : IShape
    {
        public double Radius;
        public double Area => 0;
        public Circle Scale(double factor) => this;
    }
}
"#,
                ),
                (
                    "Canvas.cs",
                    r#"
using System.Collections.Generic;
using App.Shapes;

namespace App
{
    public class Canvas
    {
        public List<IShape> Shapes { get; set; }
        public void Add(IShape shape) { }
    }
}
"#,
                ),
            ],
            true,
        );

        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.documented_types, 3);
        assert_eq!(summary.failure_count, 0, "{:?}", summary.failures);
        // IShape.Area, Circle : IShape, Radius, Area, Scale return, Scale.factor,
        // Canvas.Shapes, Canvas.Add.shape
        assert_eq!(summary.usages, 8);

        let canvas = session.find_documented("App.Canvas", 0).unwrap();
        let shape = session.find_documented("App.Shapes.IShape", 0).unwrap();
        let parameter = session
            .type_usages()
            .find(|u| u.owner == canvas && u.role == UsageRole::Parameter)
            .unwrap();
        assert_eq!(parameter.member_name.as_deref(), Some("Add.shape"));
        assert_eq!(
            session.type_reference(parameter.reference).unwrap().named_type,
            shape
        );

        let list = session
            .type_usages()
            .find(|u| u.owner == canvas && u.role == UsageRole::Property)
            .unwrap();
        let root = session.type_reference(list.reference).unwrap();
        match session.named_type(root.named_type).unwrap() {
            NamedType::External(ext) => assert_eq!(ext.name, "List"),
            other => panic!("expected external List, got {other:?}"),
        }
        let children = session.reference_children(root.id);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].named_type, shape);
    }

    #[test]
    fn test_constraints_record_parameter_name() {
        let (session, summary) = scan(
            &[(
                "Repo.cs",
                "namespace App { interface IEntity { } class Repo<T> where T : class, IEntity, new() { } }",
            )],
            true,
        );

        assert_eq!(summary.usages, 1);
        let usage = session.type_usages().next().unwrap();
        assert_eq!(usage.role, UsageRole::Constraint);
        assert_eq!(usage.member_name.as_deref(), Some("T"));
    }

    #[test]
    fn test_unresolved_usages_are_counted_not_fatal() {
        let (session, summary) = scan(
            &[(
                "Widget.cs",
                "namespace App { class Widget { Missing.Thing a; int b; } }",
            )],
            false,
        );

        assert_eq!(summary.usages, 0);
        assert_eq!(summary.failure_count, 2);
        assert_eq!(summary.failures[0].code, "UNRESOLVED_TYPE");
        assert_eq!(
            session
                .named_types_of_kind(NamedTypeKind::External)
                .count(),
            0
        );
    }

    #[test]
    fn test_rescanning_skips_known_files() {
        let mut session = CatalogSession::in_memory();
        let mut scanner = Scanner::new(true).unwrap();
        let sources = || vec![(PathBuf::from("A.cs"), "class A { int x; }".to_string())];

        let first = scanner.scan_sources(&mut session, sources()).unwrap();
        let second = scanner.scan_sources(&mut session, sources()).unwrap();

        assert_eq!(first.usages, 1);
        assert_eq!(second.files_skipped, 1);
        assert_eq!(second.usages, 0);
        assert_eq!(session.type_usages().count(), 1);
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let mut session = CatalogSession::in_memory();
        let summary = Scanner::new(true)
            .unwrap()
            .scan_files(&mut session, &[PathBuf::from("/nonexistent/Nope.cs")])
            .unwrap();

        assert_eq!(summary.files_failed, 1);
        assert_eq!(summary.failures[0].code, "FILE_READ_ERROR");
    }
}
