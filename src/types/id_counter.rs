//! Type-safe counter for generating catalog row IDs.
//!
//! One counter exists per catalog table. A counter restored from an existing
//! catalog resumes after the highest id already stored.

use std::marker::PhantomData;
use std::num::NonZeroU32;

/// Type-safe counter for generating unique row IDs of type `T`.
///
/// This type ensures that:
/// - IDs start at 1 (never 0)
/// - IDs are generated sequentially
/// - The counter cannot be misused as a regular integer
#[derive(Debug, Clone)]
pub struct IdCounter<T> {
    next_id: NonZeroU32,
    _marker: PhantomData<T>,
}

impl<T: From<NonZeroU32>> IdCounter<T> {
    /// Creates a new counter starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::after(0)
    }

    /// Creates a counter whose first id follows `last_used`.
    ///
    /// # Panics
    /// Panics if `last_used` is `u32::MAX`.
    #[must_use]
    pub fn after(last_used: u32) -> Self {
        Self {
            next_id: NonZeroU32::new(
                last_used
                    .checked_add(1)
                    .expect("Catalog id space exhausted"),
            )
            .expect("Incremented value is non-zero"),
            _marker: PhantomData,
        }
    }

    /// Generates the next id and increments the counter.
    ///
    /// # Panics
    /// Panics if the counter would overflow (after 4 billion rows).
    pub fn next_id(&mut self) -> T {
        let current = self.next_id;

        self.next_id = NonZeroU32::new(
            current
                .get()
                .checked_add(1)
                .expect("Catalog id counter overflow"),
        )
        .expect("Incremented value is non-zero");

        T::from(current)
    }

    /// Returns how many ids have been handed out, restored ones included.
    #[must_use]
    pub fn current_count(&self) -> u32 {
        self.next_id.get() - 1
    }
}

impl<T: From<NonZeroU32>> Default for IdCounter<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NamedTypeId, TypeReferenceId};

    #[test]
    fn test_counter_starts_at_one() {
        let mut counter: IdCounter<NamedTypeId> = IdCounter::new();
        let first_id = counter.next_id();
        assert_eq!(first_id.value(), 1);
    }

    #[test]
    fn test_counter_increments() {
        let mut counter: IdCounter<TypeReferenceId> = IdCounter::new();
        let id1 = counter.next_id();
        let id2 = counter.next_id();
        let id3 = counter.next_id();

        assert_eq!(id1.value(), 1);
        assert_eq!(id2.value(), 2);
        assert_eq!(id3.value(), 3);
        assert_eq!(counter.current_count(), 3);
    }

    #[test]
    fn test_counter_resumes_after_stored_rows() {
        let mut counter: IdCounter<NamedTypeId> = IdCounter::after(41);
        assert_eq!(counter.current_count(), 41);
        assert_eq!(counter.next_id().value(), 42);
    }

    #[test]
    fn test_default_impl() {
        let counter: IdCounter<NamedTypeId> = IdCounter::default();
        assert_eq!(counter.current_count(), 0);
    }
}
