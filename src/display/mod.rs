//! Terminal output for the command-line interface.
//!
//! Provides styled tables, spinners and themed messages.

pub mod progress;
pub mod tables;
pub mod theme;

pub use progress::{create_spinner, with_spinner};
pub use tables::{TableBuilder, TypeRow, create_scan_table, create_types_table};
pub use theme::{THEME, Theme};
