//! Scanning C# sources into the catalog
//!
//! [`FileWalker`] finds the files, [`DeclarationCataloger`] records what each
//! declares and [`Scanner`] drives both passes over a set of files.

pub mod declarations;
pub mod scanner;
pub mod walker;

pub use declarations::{CatalogOutcome, DeclarationCataloger};
pub use scanner::{ScanFailure, ScanSummary, Scanner};
pub use walker::FileWalker;
