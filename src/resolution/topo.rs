//! Topological ordering of items under "runs before" constraints
//!
//! Kahn's algorithm. Among items that are ready at the same time the input
//! order wins, so the result is deterministic.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// The constraints could not all be satisfied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle among {remaining:?}")]
pub struct CycleError<T: Debug> {
    /// Items left unordered, in input order
    pub remaining: Vec<T>,
}

/// Order `items` so that for every `(before, after)` pair, `before` comes first.
///
/// Constraints naming an item outside `items` are ignored.
pub fn topological_sort<T>(items: &[T], constraints: &[(T, T)]) -> Result<Vec<T>, CycleError<T>>
where
    T: Copy + Eq + Hash + Debug,
{
    let position: HashMap<T, usize> = items.iter().enumerate().map(|(i, t)| (*t, i)).collect();
    let mut in_degree = vec![0usize; items.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); items.len()];

    for (before, after) in constraints {
        let (Some(&from), Some(&to)) = (position.get(before), position.get(after)) else {
            continue;
        };
        successors[from].push(to);
        in_degree[to] += 1;
    }
    for list in &mut successors {
        list.sort_unstable();
    }

    let mut ready: VecDeque<usize> = (0..items.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered = Vec::with_capacity(items.len());

    while let Some(index) = ready.pop_front() {
        ordered.push(items[index]);
        for &next in &successors[index] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if ordered.len() < items.len() {
        let remaining = (0..items.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| items[i])
            .collect();
        return Err(CycleError { remaining });
    }
    Ok(ordered)
}
