pub mod csharp;

pub use csharp::{CSharpParser, SourceUnit};
