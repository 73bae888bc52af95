//! Table formatting utilities for structured output.

use crate::catalog::{CatalogSession, NamedType};
use crate::indexing::ScanSummary;
use crate::types::NamedTypeId;
use comfy_table::{
    Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};
use serde::Serialize;

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Create a new table builder.
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    /// Set the table headers.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    /// Add a row to the table.
    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    /// Build and return the formatted table.
    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// One named type as listed by `sharpdoc types`
#[derive(Debug, Clone, Serialize)]
pub struct TypeRow {
    pub id: u32,
    pub kind: &'static str,
    pub name: String,
    pub arity: u32,
    pub detail: String,
}

impl TypeRow {
    pub fn new(session: &CatalogSession, id: NamedTypeId, ty: &NamedType) -> Self {
        let detail = match ty {
            NamedType::Documented(doc) => {
                format!("{} {}", doc.accessibility.as_str(), doc.decl_kind.as_str())
            }
            NamedType::External(ext) => ext
                .possible_namespaces
                .iter()
                .map(|ns| if ns.is_empty() { "<global>" } else { ns.as_str() })
                .collect::<Vec<_>>()
                .join(", "),
            NamedType::Local(local) => {
                let owner = session
                    .named_type(local.declaring_type)
                    .map(|owner| owner.full_name().to_string())
                    .unwrap_or_else(|| local.declaring_type.to_string());
                format!("{owner} #{}", local.type_parameter_index)
            }
            NamedType::Tuple(tuple) => format!("{} elements", tuple.element_count()),
        };
        Self {
            id: id.value(),
            kind: ty.kind().as_str(),
            name: ty.full_name().to_string(),
            arity: ty.arity(),
            detail,
        }
    }
}

/// Create a table of catalogued named types.
pub fn create_types_table(rows: &[TypeRow]) -> String {
    rows.iter()
        .fold(
            TableBuilder::new().set_headers(vec!["Id", "Kind", "Name", "Arity", "Detail"]),
            |table, row| {
                table.add_row(vec![
                    row.id.to_string(),
                    row.kind.to_string(),
                    row.name.clone(),
                    row.arity.to_string(),
                    row.detail.clone(),
                ])
            },
        )
        .build()
}

/// Create a summary table for scan results.
pub fn create_scan_table(summary: &ScanSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);

    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec!["Files scanned", &summary.files_scanned.to_string()]);
    table.add_row(vec!["Files skipped", &summary.files_skipped.to_string()]);
    table.add_row(vec!["Documented types", &summary.documented_types.to_string()]);
    table.add_row(vec!["Type usages", &summary.usages.to_string()]);
    table.add_row(vec!["Type references", &summary.references.to_string()]);
    table.add_row(vec![
        "Time elapsed",
        &format!("{:.2}s", summary.elapsed.as_secs_f64()),
    ]);

    let color = if summary.failure_count == 0 {
        Color::Green
    } else {
        Color::Yellow
    };
    table.add_row(vec![
        Cell::new("Failures"),
        Cell::new(summary.failure_count)
            .fg(color)
            .add_attribute(Attribute::Bold),
    ]);

    table.to_string()
}
