//! Language-neutral description of one type written in source
//!
//! A descriptor tree mirrors the syntax: `Dictionary<string, List<int>>` is a
//! root with two children, the second of which has one child of its own. Tuple
//! descriptors hold one child per element.

use super::namespace::NamespaceContext;
use std::fmt;

pub use crate::parsing::csharp::ResolvedNameState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    is_predefined: bool,
    is_tuple: bool,
    rank: u32,
    name_state: ResolvedNameState,
    namespace_context: Option<Vec<NamespaceContext>>,
    arguments: Vec<TypeDescriptor>,
    /// Element name when this descriptor is a tuple element
    element_name: Option<String>,
}

impl TypeDescriptor {
    pub(crate) fn new(name: impl Into<String>, name_state: ResolvedNameState) -> Self {
        Self {
            name: name.into(),
            is_predefined: false,
            is_tuple: false,
            rank: 0,
            name_state,
            namespace_context: None,
            arguments: Vec::new(),
            element_name: None,
        }
    }

    pub(crate) fn predefined(keyword: impl Into<String>) -> Self {
        Self {
            is_predefined: true,
            ..Self::new(keyword, ResolvedNameState::FullyResolved)
        }
    }

    pub(crate) fn tuple(display_name: impl Into<String>) -> Self {
        Self {
            is_tuple: true,
            ..Self::new(display_name, ResolvedNameState::PartiallyResolved)
        }
    }

    pub(crate) fn with_context(mut self, contexts: Vec<NamespaceContext>) -> Self {
        self.namespace_context = Some(contexts);
        self
    }

    pub(crate) fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    pub(crate) fn with_argument(mut self, argument: TypeDescriptor) -> Self {
        self.arguments.push(argument);
        self
    }

    pub(crate) fn add_rank(&mut self, dimensions: u32) {
        self.rank += dimensions;
    }

    pub(crate) fn push_argument(&mut self, argument: TypeDescriptor) {
        self.arguments.push(argument);
    }

    pub(crate) fn set_element_name(&mut self, name: impl Into<String>) {
        self.element_name = Some(name.into());
    }

    /// Raw or partially qualified name; dotted for qualified names
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_predefined(&self) -> bool {
        self.is_predefined
    }

    pub fn is_tuple(&self) -> bool {
        self.is_tuple
    }

    /// Array rank; 0 for non-arrays
    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn name_state(&self) -> ResolvedNameState {
        self.name_state
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.name_state == ResolvedNameState::FullyResolved
    }

    /// Namespaces in scope, innermost first. `None` when the name is already
    /// fully qualified.
    pub fn namespace_context(&self) -> Option<&[NamespaceContext]> {
        self.namespace_context.as_deref()
    }

    /// Type arguments, or tuple elements for a tuple
    pub fn arguments(&self) -> &[TypeDescriptor] {
        &self.arguments
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn element_name(&self) -> Option<&str> {
        self.element_name.as_deref()
    }

    /// Namespace part of a dotted name and the simple name after it
    pub fn split_qualifier(&self) -> (Option<&str>, &str) {
        match self.name.rsplit_once('.') {
            Some((qualifier, simple)) if !self.is_tuple => (Some(qualifier), simple),
            _ => (None, &self.name),
        }
    }

    /// Number of descriptors in this tree, itself included
    pub fn node_count(&self) -> usize {
        1 + self
            .arguments
            .iter()
            .map(TypeDescriptor::node_count)
            .sum::<usize>()
    }
}

/// Name of the tuple element at `index` when the source gives none
pub fn default_element_name(index: usize) -> String {
    format!("Item{}", index + 1)
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tuple {
            f.write_str("(")?;
            for (i, element) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{element}")?;
                if let Some(name) = &element.element_name {
                    write!(f, " {name}")?;
                }
            }
            f.write_str(")")?;
        } else {
            f.write_str(&self.name)?;
            if !self.arguments.is_empty() {
                f.write_str("<")?;
                for (i, argument) in self.arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")?;
            }
        }
        for _ in 0..self.rank {
            f.write_str("[]")?;
        }
        Ok(())
    }
}
