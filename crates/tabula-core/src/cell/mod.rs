//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Position`] - A cell's location (e.g., "A1")
//! - [`Size`] - The extent of a printable area
//! - [`Value`] - What a cell reads as
//! - [`CellError`] - Formula errors carried as values

mod address;
mod value;

pub use address::{Position, Size};
pub use value::{CellError, Value};
