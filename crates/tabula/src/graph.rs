//! Reverse dependency tracking
//!
//! The graph stores, for every cell, the set of cells whose current content
//! reads it (its "dependents"). Edges point from a precedent to its
//! dependents, which is the direction both cache invalidation and cycle
//! detection walk.
//!
//! When a referenced cell is removed from the sheet its dependents still read
//! that position, so their edges are parked on the position and moved onto
//! whichever cell is created there next.

use crate::arena::CellId;
use ahash::{AHashMap, AHashSet};
use std::ops::ControlFlow;
use tabula_core::Position;

/// Dependency graph for the cells of one sheet
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → cells that depend on it
    dependents: AHashMap<CellId, AHashSet<CellId>>,
    /// Absent position → cells that still reference it
    detached: AHashMap<Position, AHashSet<CellId>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent reads precedent
    pub fn add_dependency(&mut self, precedent: CellId, dependent: CellId) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
    }

    /// Remove a dependency; empty sets are dropped
    pub fn remove_dependency(&mut self, precedent: CellId, dependent: CellId) {
        remove_edge(&mut self.dependents, precedent, dependent);
    }

    /// Remove a dependency on a position that currently holds no cell
    pub fn remove_detached_dependency(&mut self, position: Position, dependent: CellId) {
        remove_edge(&mut self.detached, position, dependent);
    }

    /// Park the dependents of a cell that is leaving `position`
    pub fn detach(&mut self, cell: CellId, position: Position) {
        if let Some(dependents) = self.dependents.remove(&cell) {
            self.detached.insert(position, dependents);
        }
    }

    /// Hand parked dependents of `position` to the cell created there
    pub fn attach(&mut self, position: Position, cell: CellId) {
        if let Some(dependents) = self.detached.remove(&position) {
            self.dependents.entry(cell).or_default().extend(dependents);
        }
    }

    /// Get cells that depend on the given cell
    pub fn dependents(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that reference a position with no cell in it
    pub fn detached_dependents(&self, position: Position) -> impl Iterator<Item = CellId> + '_ {
        self.detached
            .get(&position)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Check whether any cell depends on the given cell
    pub fn has_dependents(&self, cell: CellId) -> bool {
        self.dependents.contains_key(&cell)
    }

    /// Depth-first walk over dependents
    ///
    /// Visits every cell reachable from `start` (the start cells included)
    /// exactly once, even when several paths lead to it. The walk stops as
    /// soon as `visit` breaks.
    pub fn walk<F>(&self, start: impl IntoIterator<Item = CellId>, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(CellId) -> ControlFlow<()>,
    {
        let mut stack: Vec<CellId> = start.into_iter().collect();
        let mut visited = AHashSet::new();

        while let Some(cell) = stack.pop() {
            if !visited.insert(cell) {
                continue;
            }

            if visit(cell).is_break() {
                return ControlFlow::Break(());
            }

            stack.extend(self.dependents(cell).filter(|dep| !visited.contains(dep)));
        }

        ControlFlow::Continue(())
    }

    /// Total number of edges, parked ones included
    pub fn edge_count(&self) -> usize {
        self.dependents.values().map(|set| set.len()).sum::<usize>()
            + self.detached.values().map(|set| set.len()).sum::<usize>()
    }
}

fn remove_edge<K>(map: &mut AHashMap<K, AHashSet<CellId>>, key: K, dependent: CellId)
where
    K: std::hash::Hash + Eq,
{
    if let Some(set) = map.get_mut(&key) {
        set.remove(&dependent);
        if set.is_empty() {
            map.remove(&key);
        }
    }
}
