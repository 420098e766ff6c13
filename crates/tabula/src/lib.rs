//! # tabula
//!
//! An in-memory spreadsheet engine.
//!
//! A [`Sheet`] holds a sparse grid of cells, each empty, holding literal text,
//! or holding a formula over other cells. Formula values are computed lazily
//! and memoized; writing a cell drops the memoized values of everything that
//! transitively reads it. Writes that would make a cell depend on itself are
//! rejected before anything changes.
//!
//! ## Features
//!
//! - Lazy, memoized formula evaluation
//! - Cycle rejection before a write is committed
//! - Exact reverse dependency tracking, including across cleared cells
//! - Tab-separated rendering of values or texts
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell("A1".parse().unwrap(), "1").unwrap();
//! sheet.set_cell("B1".parse().unwrap(), "=A1+1").unwrap();
//!
//! // B1 reading itself would be a cycle
//! let err = sheet.set_cell("A1".parse().unwrap(), "=B1").unwrap_err();
//! assert!(matches!(err, Error::CircularDependency(_)));
//!
//! assert_eq!(sheet.printable_size(), Size::new(1, 2));
//! assert_eq!(sheet.values_to_string(), "1\t2\n");
//! ```

mod arena;
pub mod cell;
pub mod graph;
pub mod prelude;
mod render;
pub mod sheet;

pub use arena::CellId;
pub use cell::{Cell, CellContent, CellKind, FormulaContent};
pub use graph::DependencyGraph;
pub use sheet::{CellView, Sheet};

// Re-export core types
pub use tabula_core::{
    CellError, Error, Position, Result, Size, Value, ESCAPE_SIGN, FORMULA_SIGN, MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use tabula_formula::{parse_formula, EvaluationContext, Formula, FormulaError};
