// Gateway file to expose resolution tests from the resolution/ subdirectory
// Each test file in resolution/ needs to be included here

#[path = "resolution/common.rs"]
mod common;

#[path = "resolution/test_external_types.rs"]
mod test_external_types;

#[path = "resolution/test_reference_trees.rs"]
mod test_reference_trees;

#[path = "resolution/test_local_types.rs"]
mod test_local_types;

#[path = "resolution/test_tuple_types.rs"]
mod test_tuple_types;

#[path = "resolution/test_persistence.rs"]
mod test_persistence;

#[path = "resolution/test_scanning.rs"]
mod test_scanning;
