//! The sheet: cell ownership, writes and reads
//!
//! A [`Sheet`] owns every cell in an arena and keeps a sparse index from
//! position to cell id. All reverse dependency edges live in the sheet's
//! [`DependencyGraph`], so removing a cell never leaves a dangling reference
//! behind.
//!
//! # Example
//!
//! ```rust
//! use tabula::{Position, Sheet, Value};
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell(Position::from_a1("A1"), "2").unwrap();
//! sheet.set_cell(Position::from_a1("B1"), "=A1*10").unwrap();
//!
//! let b1 = sheet.get_cell(Position::from_a1("B1")).unwrap().unwrap();
//! assert_eq!(b1.value(), Value::Number(20.0));
//! assert_eq!(b1.text(), "=A1*10");
//! ```

use crate::arena::{Arena, CellId};
use crate::cell::{Cell, CellContent, CellKind};
use crate::graph::DependencyGraph;
use ahash::AHashMap;
use std::fmt;
use std::ops::ControlFlow;
use tabula_core::{Error, Position, Result, Value};
use tabula_formula::EvaluationContext;

/// A sparse grid of cells
#[derive(Debug, Default)]
pub struct Sheet {
    cells: Arena<Cell>,
    index: AHashMap<Position, CellId>,
    graph: DependencyGraph,
}

/// Read access to one cell of a sheet
#[derive(Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Sheet,
    cell: &'a Cell,
}

impl fmt::Debug for CellView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellView")
            .field("position", &self.position())
            .field("content", self.cell.content())
            .finish()
    }
}

impl<'a> CellView<'a> {
    pub fn position(&self) -> Position {
        self.cell.position()
    }

    pub fn kind(&self) -> CellKind {
        self.cell.kind()
    }

    /// The cell's value, evaluating and memoizing a formula if needed
    ///
    /// Evaluation recurses once per uncached formula it reads through, so a
    /// long chain of never-read formulas needs stack in proportion to its
    /// length. Reading the chain from its head first keeps each step shallow.
    pub fn value(&self) -> Value {
        self.cell.value(self.sheet)
    }

    pub fn text(&self) -> &'a str {
        self.cell.text()
    }

    pub fn referenced_cells(&self) -> &'a [Position] {
        self.cell.referenced_cells()
    }

    /// Whether a formula value is currently memoized
    pub fn is_cached(&self) -> bool {
        self.cell.has_cached_value()
    }
}

impl Sheet {
    /// Create an empty sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content of a cell from its text
    ///
    /// The write is rejected with no change to the sheet when the position is
    /// outside the grid, the formula does not parse, or the formula would
    /// make a cell depend on itself.
    pub fn set_cell(&mut self, pos: Position, text: impl Into<String>) -> Result<()> {
        check_bounds(pos)?;

        let content = CellContent::parse(text.into())?;
        let references = content.referenced_cells().to_vec();
        self.check_cycle(pos, &references)?;

        let id = self.ensure_cell(pos);
        for &referenced in &references {
            self.ensure_cell(referenced);
        }

        let old = self
            .cells
            .get_mut(id)
            .map(|cell| cell.set(content))
            .unwrap_or_default();
        self.relink(id, old.referenced_cells(), &references);

        let cleared = self.invalidate_from(id);
        log::debug!(
            "set {} ({} -> {}), {} references, {} caches cleared",
            pos,
            old.kind().as_str(),
            self.cells.get(id).map_or("empty", |cell| cell.kind().as_str()),
            references.len(),
            cleared
        );
        Ok(())
    }

    /// Get a view of the cell at `pos`, or `None` if no cell exists there
    pub fn get_cell(&self, pos: Position) -> Result<Option<CellView<'_>>> {
        check_bounds(pos)?;
        Ok(self.view(pos))
    }

    /// Remove the cell at `pos`; a no-op when there is none
    ///
    /// Cells that still reference `pos` keep their edges, parked until a cell
    /// is created there again, and their memoized values are dropped.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        check_bounds(pos)?;

        let Some(id) = self.index.remove(&pos) else {
            return Ok(());
        };

        let cleared = self.invalidate_from(id);
        if let Some(mut cell) = self.cells.remove(id) {
            let old = cell.clear();
            self.relink(id, old.referenced_cells(), &[]);
        }
        self.graph.detach(id, pos);

        log::debug!("cleared {}, {} caches cleared", pos, cleared);
        Ok(())
    }

    /// Number of cells in the sheet, auto-created empty ones included
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in (row, col) order
    pub fn cells(&self) -> impl Iterator<Item = CellView<'_>> + '_ {
        let mut views: Vec<CellView<'_>> = self
            .cells
            .iter()
            .map(|(_, cell)| CellView { sheet: self, cell })
            .collect();
        views.sort_unstable_by_key(|view| view.position());
        views.into_iter()
    }

    /// Positions whose content currently references `pos`, sorted
    pub fn dependents(&self, pos: Position) -> Result<Vec<Position>> {
        check_bounds(pos)?;

        let ids: Vec<CellId> = match self.index.get(&pos) {
            Some(&id) => self.graph.dependents(id).collect(),
            None => self.graph.detached_dependents(pos).collect(),
        };
        let mut positions: Vec<Position> = ids
            .into_iter()
            .filter_map(|id| self.cells.get(id).map(Cell::position))
            .collect();
        positions.sort_unstable();
        Ok(positions)
    }

    /// The reverse dependency graph
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Populated positions, in no particular order
    pub(crate) fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.index.keys().copied()
    }

    pub(crate) fn view(&self, pos: Position) -> Option<CellView<'_>> {
        let id = self.index.get(&pos)?;
        self.cells.get(*id).map(|cell| CellView { sheet: self, cell })
    }

    /// Look up the cell at `pos`, creating an empty one if absent
    fn ensure_cell(&mut self, pos: Position) -> CellId {
        if let Some(&id) = self.index.get(&pos) {
            return id;
        }

        let id = self.cells.insert(Cell::new(pos));
        self.index.insert(pos, id);
        self.graph.attach(pos, id);
        log::trace!("created {} as {:?}", pos, id);
        id
    }

    /// Reject content at `pos` whose references would close a cycle
    ///
    /// Every cell that transitively depends on `pos` is walked; content is
    /// cyclic when it references `pos` itself or any of those cells.
    fn check_cycle(&self, pos: Position, references: &[Position]) -> Result<()> {
        if references.is_empty() {
            return Ok(());
        }

        let cyclic = references.binary_search(&pos).is_ok() || {
            let start: Vec<CellId> = match self.index.get(&pos) {
                Some(&id) => self.graph.dependents(id).collect(),
                None => self.graph.detached_dependents(pos).collect(),
            };
            self.graph
                .walk(start, |id| match self.cells.get(id) {
                    Some(cell) if references.binary_search(&cell.position()).is_ok() => {
                        ControlFlow::Break(())
                    }
                    _ => ControlFlow::Continue(()),
                })
                .is_break()
        };

        if cyclic {
            log::debug!("rejected write to {}: circular dependency", pos);
            return Err(Error::CircularDependency(pos));
        }
        Ok(())
    }

    /// Move the edges of `id` from its old references to its new ones
    ///
    /// Both lists are sorted, so membership is a binary search.
    fn relink(&mut self, id: CellId, old: &[Position], new: &[Position]) {
        for pos in old.iter().filter(|pos| new.binary_search(pos).is_err()) {
            match self.index.get(pos) {
                Some(&precedent) => self.graph.remove_dependency(precedent, id),
                None => self.graph.remove_detached_dependency(*pos, id),
            }
        }

        for pos in new.iter().filter(|pos| old.binary_search(pos).is_err()) {
            if let Some(&precedent) = self.index.get(pos) {
                self.graph.add_dependency(precedent, id);
            }
        }
    }

    /// Drop memoized values of `id` and everything depending on it
    fn invalidate_from(&mut self, id: CellId) -> usize {
        let cells = &mut self.cells;
        let mut cleared = 0;

        let _ = self.graph.walk([id], |visited| {
            if cells.get_mut(visited).is_some_and(Cell::invalidate_cache) {
                cleared += 1;
            }
            ControlFlow::Continue(())
        });

        log::trace!("invalidation from {:?} cleared {} caches", id, cleared);
        cleared
    }
}

impl EvaluationContext for Sheet {
    fn cell_value(&self, pos: Position) -> Option<Value> {
        self.view(pos).map(|view| view.value())
    }
}

fn check_bounds(pos: Position) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(Error::OutOfBounds(pos))
    }
}
