//! Formula evaluator
//!
//! Evaluates formula ASTs to produce numbers or formula errors.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use tabula_core::{CellError, Position, Value};

/// Source of cell values for formula evaluation
///
/// Implemented by the sheet. Reading a formula cell through the context may
/// itself evaluate that formula.
pub trait EvaluationContext {
    /// The value of the cell at `pos`, or `None` when no cell exists there
    fn cell_value(&self, pos: Position) -> Option<Value>;
}

/// Evaluate a formula expression
///
/// Errors from referenced cells propagate unchanged; the left operand is
/// evaluated first, so its error wins.
pub fn evaluate(expr: &FormulaExpr, ctx: &dyn EvaluationContext) -> Result<f64, CellError> {
    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::CellRef(pos) => match ctx.cell_value(*pos) {
            Some(value) => value_to_number(&value),
            None => Ok(0.0),
        },

        FormulaExpr::InvalidRef(_) => Err(CellError::Ref),

        FormulaExpr::BinaryOp { op, left, right } => {
            let l = evaluate(left, ctx)?;
            let r = evaluate(right, ctx)?;
            evaluate_binary_op(*op, l, r)
        }

        FormulaExpr::UnaryOp { op, operand } => {
            let n = evaluate(operand, ctx)?;
            Ok(match op {
                UnaryOperator::Plus => n,
                UnaryOperator::Negate => -n,
            })
        }
    }
}

/// Coerce a referenced cell's value to a number
///
/// Empty text counts as zero; other text must be a complete number.
fn value_to_number(value: &Value) -> Result<f64, CellError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Error(e) => Err(*e),
        Value::Text(s) if s.is_empty() => Ok(0.0),
        Value::Text(s) => s
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or(CellError::Value),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(op: BinaryOperator, l: f64, r: f64) -> Result<f64, CellError> {
    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(CellError::Div0);
            }
            l / r
        }
    };

    if result.is_finite() {
        Ok(result)
    } else {
        Err(CellError::Div0)
    }
}
