//! Parsed formulas
//!
//! [`Formula`] is what a cell stores: the parsed expression together with the
//! positions it reads, computed once at parse time.

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::{evaluate, EvaluationContext};
use crate::parser::parse_expression;
use tabula_core::{CellError, Position};

/// A parsed formula
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: FormulaExpr,
    references: Vec<Position>,
}

/// Parse the expression part of a formula (the text after `=`)
///
/// # Example
/// ```rust
/// use tabula_core::Position;
/// use tabula_formula::parse_formula;
///
/// let formula = parse_formula("B1 + A1 * B1").unwrap();
/// assert_eq!(formula.referenced_cells(), &[Position::new(0, 0), Position::new(0, 1)]);
/// ```
pub fn parse_formula(expression: &str) -> FormulaResult<Formula> {
    parse_expression(expression).map(Formula::new)
}

impl Formula {
    /// Wrap an already parsed expression
    pub fn new(expr: FormulaExpr) -> Self {
        let mut references = Vec::new();
        expr.for_each_reference(&mut |pos| references.push(pos));
        references.sort_unstable();
        references.dedup();

        Self { expr, references }
    }

    /// Evaluate against the current state of a sheet
    pub fn evaluate(&self, ctx: &dyn EvaluationContext) -> Result<f64, CellError> {
        evaluate(&self.expr, ctx)
    }

    /// Canonical text of the expression, without the `=` marker
    pub fn expression(&self) -> String {
        self.expr.to_string()
    }

    /// Valid positions the formula reads, sorted and without duplicates
    pub fn referenced_cells(&self) -> &[Position] {
        &self.references
    }

    /// The parsed expression tree
    pub fn ast(&self) -> &FormulaExpr {
        &self.expr
    }
}
