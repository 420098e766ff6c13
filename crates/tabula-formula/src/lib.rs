//! # tabula-formula
//!
//! Formula parser and evaluator for tabula.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Canonical printing (AST → text with minimal parentheses)
//! - Formula evaluation (AST → number or [`CellError`](tabula_core::CellError))
//! - The list of cells a formula reads
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{Position, Value};
//! use tabula_formula::{parse_formula, EvaluationContext};
//!
//! struct Constant;
//!
//! impl EvaluationContext for Constant {
//!     fn cell_value(&self, _pos: Position) -> Option<Value> {
//!         Some(Value::Number(2.0))
//!     }
//! }
//!
//! let formula = parse_formula("(A1 + B2) * 3").unwrap();
//! assert_eq!(formula.expression(), "(A1+B2)*3");
//! assert_eq!(formula.evaluate(&Constant), Ok(12.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, EvaluationContext};
pub use formula::{parse_formula, Formula};
pub use parser::parse_expression;
