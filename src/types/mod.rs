mod id_counter;

pub use id_counter::IdCounter;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a catalog row identifier.
///
/// Identifiers are 1-based; `0` is never a valid id, which lets SQLite's
/// `INTEGER PRIMARY KEY` values map onto them directly.
macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(value: u32) -> Option<Self> {
                if value == 0 { None } else { Some(Self(value)) }
            }

            pub fn value(&self) -> u32 {
                self.0
            }

            /// Convert to the signed form used in SQL parameters
            pub fn to_sql(self) -> i64 {
                i64::from(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<std::num::NonZeroU32> for $name {
            fn from(value: std::num::NonZeroU32) -> Self {
                Self(value.get())
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

catalog_id!(
    /// Namespace row (the global namespace included)
    NamespaceId
);
catalog_id!(
    /// Source file row
    SourceFileId
);
catalog_id!(
    /// Any named type: documented, external, local or tuple
    NamedTypeId
);
catalog_id!(TupleElementId);
catalog_id!(
    /// Node of a persisted type-reference tree
    TypeReferenceId
);
catalog_id!(TypeUsageId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start_line: u32,
    pub start_column: u16,
    pub end_line: u32,
    pub end_column: u16,
}

impl Range {
    pub fn new(start_line: u32, start_column: u16, end_line: u32, end_column: u16) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Range covered by a tree-sitter node (0-based rows and columns)
    pub fn of_node(node: tree_sitter::Node<'_>) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self::new(
            start.row as u32,
            start.column as u16,
            end.row as u32,
            end.column as u16,
        )
    }

    pub fn contains(&self, line: u32, column: u16) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }

        if line == self.start_line && column < self.start_column {
            return false;
        }

        if line == self.end_line && column > self.end_column {
            return false;
        }

        true
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Humans count lines from 1
        write!(f, "{}:{}", self.start_line + 1, self.start_column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_id_creation() {
        assert!(NamedTypeId::new(0).is_none());

        let id = NamedTypeId::new(42).unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_sql(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_ids_are_ordered() {
        let a = TypeReferenceId::new(3).unwrap();
        let b = TypeReferenceId::new(7).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_range_contains() {
        let range = Range::new(10, 5, 15, 20);

        assert!(range.contains(12, 10));
        assert!(range.contains(10, 5));
        assert!(range.contains(15, 20));

        assert!(!range.contains(9, 10));
        assert!(!range.contains(16, 0));
        assert!(!range.contains(10, 4));
        assert!(!range.contains(15, 21));
    }

    #[test]
    fn test_range_display_is_one_based() {
        let range = Range::new(0, 0, 0, 4);
        assert_eq!(range.to_string(), "1:1");
    }
}
