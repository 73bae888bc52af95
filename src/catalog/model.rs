//! Catalog rows
//!
//! Every named type lives in one id space ([`NamedTypeId`]) and is one of four
//! closed variants of [`NamedType`]. The SQLite backend stores them in a single
//! table discriminated by [`NamedTypeKind`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::{
    NamedTypeId, NamespaceId, SourceFileId, TupleElementId, TypeReferenceId, TypeUsageId,
};

/// Parses the text form written by `as_str` back into the enum.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(concat!("Unknown ", stringify!($name))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedTypeKind {
    Documented,
    External,
    Local,
    Tuple,
}

text_enum!(NamedTypeKind {
    Documented => "documented",
    External => "external",
    Local => "local",
    Tuple => "tuple",
});

/// Declaration keyword of a documented type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Struct,
    Record,
    Enum,
    Delegate,
}

text_enum!(TypeDeclKind {
    Class => "class",
    Interface => "interface",
    Struct => "struct",
    Record => "record",
    Enum => "enum",
    Delegate => "delegate",
});

impl TypeDeclKind {
    /// Map a tree-sitter declaration node kind
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(Self::Class),
            "interface_declaration" => Some(Self::Interface),
            "struct_declaration" => Some(Self::Struct),
            "record_declaration" | "record_struct_declaration" => Some(Self::Record),
            "enum_declaration" => Some(Self::Enum),
            "delegate_declaration" => Some(Self::Delegate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    Private,
    /// Defined outside the documented source
    External,
}

text_enum!(Accessibility {
    Public => "public",
    Internal => "internal",
    Protected => "protected",
    ProtectedInternal => "protected internal",
    PrivateProtected => "private protected",
    Private => "private",
    External => "external",
});

/// Variance modifier for generic type parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variance {
    /// No variance modifier
    None,

    /// Covariant (`out T`)
    Covariant,

    /// Contravariant (`in T`)
    Contravariant,
}

text_enum!(Variance {
    None => "none",
    Covariant => "out",
    Contravariant => "in",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: NamespaceId,
    /// Fully qualified name; empty for the global namespace
    pub name: String,
    pub parent: Option<NamespaceId>,
}

impl Namespace {
    pub fn is_global(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: SourceFileId,
    pub path: PathBuf,
    /// Outer-scope `using` directives, in declaration order
    pub usings: Vec<NamespaceId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameter {
    pub ordinal: u32,
    pub name: String,
    pub variance: Variance,
}

/// A type declared in the source under documentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentedType {
    /// Simple name without type parameters
    pub name: String,
    /// `Namespace.Outer.Name`, without type parameters
    pub full_name: String,
    pub namespace: NamespaceId,
    pub containing_type: Option<NamedTypeId>,
    pub decl_kind: TypeDeclKind,
    pub accessibility: Accessibility,
    pub source_file: SourceFileId,
    pub type_parameter_count: u32,
    /// `None` until loaded from the store
    pub type_parameters: Option<Vec<TypeParameter>>,
}

impl DocumentedType {
    pub fn arity(&self) -> u32 {
        self.type_parameter_count
    }

    pub fn has_type_parameters(&self) -> bool {
        self.type_parameter_count > 0
    }

    pub fn type_parameters_loaded(&self) -> bool {
        self.type_parameters.is_some()
    }
}

/// A type referenced from source but defined elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalType {
    pub name: String,
    pub arity: u32,
    pub accessibility: Accessibility,
    /// Every namespace the type was seen from; only ever grows
    pub possible_namespaces: BTreeSet<String>,
}

impl ExternalType {
    pub fn could_live_in<'a>(&self, mut namespaces: impl Iterator<Item = &'a str>) -> bool {
        namespaces.any(|ns| self.possible_namespaces.contains(ns))
    }
}

/// Use of a documented type's own type parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalType {
    pub name: String,
    pub declaring_type: NamedTypeId,
    pub type_parameter_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleType {
    pub display_name: String,
    /// Element rows in ordinal order
    pub elements: Vec<TupleElementId>,
}

impl TupleType {
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleElement {
    pub id: TupleElementId,
    pub tuple: NamedTypeId,
    pub ordinal: u32,
    pub name: String,
    pub rank: u32,
    pub element_type: NamedTypeId,
}

/// Element of a tuple shape that has not been staged yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTupleElement {
    pub name: String,
    pub rank: u32,
    pub element_type: NamedTypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NamedType {
    Documented(DocumentedType),
    External(ExternalType),
    Local(LocalType),
    Tuple(TupleType),
}

impl NamedType {
    pub fn kind(&self) -> NamedTypeKind {
        match self {
            NamedType::Documented(_) => NamedTypeKind::Documented,
            NamedType::External(_) => NamedTypeKind::External,
            NamedType::Local(_) => NamedTypeKind::Local,
            NamedType::Tuple(_) => NamedTypeKind::Tuple,
        }
    }

    /// Simple name; the display form for tuples
    pub fn name(&self) -> &str {
        match self {
            NamedType::Documented(t) => &t.name,
            NamedType::External(t) => &t.name,
            NamedType::Local(t) => &t.name,
            NamedType::Tuple(t) => &t.display_name,
        }
    }

    /// Fully qualified name where one is known, the simple name otherwise
    pub fn full_name(&self) -> &str {
        match self {
            NamedType::Documented(t) => &t.full_name,
            other => other.name(),
        }
    }

    pub fn arity(&self) -> u32 {
        match self {
            NamedType::Documented(t) => t.arity(),
            NamedType::External(t) => t.arity,
            NamedType::Local(_) => 0,
            NamedType::Tuple(t) => t.element_count() as u32,
        }
    }

    pub fn as_documented(&self) -> Option<&DocumentedType> {
        match self {
            NamedType::Documented(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_external(&self) -> Option<&ExternalType> {
        match self {
            NamedType::External(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_local(&self) -> Option<&LocalType> {
        match self {
            NamedType::Local(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleType> {
        match self {
            NamedType::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Identity used when comparing tuple element types.
    ///
    /// Documented types compare by fully qualified name, everything else by
    /// simple name.
    pub fn same_identity(&self, other: &NamedType) -> bool {
        match (self, other) {
            (NamedType::Documented(a), NamedType::Documented(b)) => a.full_name == b.full_name,
            _ => self.name() == other.name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReference {
    pub id: TypeReferenceId,
    pub named_type: NamedTypeId,
    pub rank: u32,
    pub parent: Option<TypeReferenceId>,
}

/// Where a type reference appears relative to its owning type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageRole {
    BaseType,
    Constraint,
    Field,
    Property,
    ReturnType,
    Parameter,
}

text_enum!(UsageRole {
    BaseType => "base",
    Constraint => "constraint",
    Field => "field",
    Property => "property",
    ReturnType => "return",
    Parameter => "parameter",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUsage {
    pub id: TypeUsageId,
    pub owner: NamedTypeId,
    pub reference: TypeReferenceId,
    pub role: UsageRole,
    /// Member, parameter or constrained type parameter name
    pub member_name: Option<String>,
}
