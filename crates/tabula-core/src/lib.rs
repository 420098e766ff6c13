//! # tabula-core
//!
//! Core value types for the tabula spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout tabula:
//! - [`Position`] and [`Size`] - Grid coordinates and extents
//! - [`Value`] and [`CellError`] - What reading a cell produces
//! - [`Error`] - Faults raised by sheet operations
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::Position;
//!
//! let pos: Position = "B3".parse().unwrap();
//! assert_eq!(pos, Position::new(2, 1));
//! assert_eq!(pos.to_string(), "B3");
//!
//! assert!(!Position::from_a1("ABCD1").is_valid());
//! ```

pub mod cell;
pub mod error;

// Re-exports for convenience
pub use cell::{CellError, Position, Size, Value};
pub use error::{Error, Result};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: i32 = 16_384;

/// Maximum number of columns in a sheet (fits in three letters)
pub const MAX_COLS: i32 = 16_384;

/// Marker that turns cell text into a formula
pub const FORMULA_SIGN: char = '=';

/// Leading character that forces text content; dropped from the value
pub const ESCAPE_SIGN: char = '\'';
