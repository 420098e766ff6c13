//! Formula Abstract Syntax Tree types

use std::fmt;
use tabula_core::Position;

/// Formula expression AST
///
/// `Display` prints the canonical form of the expression: operands are
/// parenthesized only where dropping the parentheses would change the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal
    Number(f64),

    // === References ===
    /// Single cell reference
    CellRef(Position),
    /// Reference-shaped text that points outside the grid (e.g. `ZZZZ1`)
    InvalidRef(String),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Negate,
}

impl UnaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            UnaryOperator::Plus => '+',
            UnaryOperator::Negate => '-',
        }
    }
}

const UNARY_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 4;

impl FormulaExpr {
    fn precedence(&self) -> u8 {
        match self {
            FormulaExpr::BinaryOp { op, .. } => op.precedence(),
            FormulaExpr::UnaryOp { .. } => UNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    /// Visit every valid cell reference in evaluation order
    pub fn for_each_reference(&self, visit: &mut impl FnMut(Position)) {
        match self {
            FormulaExpr::CellRef(pos) => visit(*pos),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.for_each_reference(visit);
                right.for_each_reference(visit);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.for_each_reference(visit),
            FormulaExpr::Number(_) | FormulaExpr::InvalidRef(_) => {}
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Number(n) => write!(f, "{}", n),
            FormulaExpr::CellRef(pos) => write!(f, "{}", pos),
            FormulaExpr::InvalidRef(text) => write!(f, "{}", text),
            FormulaExpr::BinaryOp { op, left, right } => {
                let own = op.precedence();
                left.fmt_operand(f, left.precedence() < own)?;
                write!(f, "{}", op.symbol())?;

                // a-(b+c) and a/(b*c) keep their parentheses
                let right_prec = right.precedence();
                let non_associative =
                    matches!(op, BinaryOperator::Subtract | BinaryOperator::Divide);
                right.fmt_operand(f, right_prec < own || (non_associative && right_prec == own))
            }
            FormulaExpr::UnaryOp { op, operand } => {
                write!(f, "{}", op.symbol())?;
                operand.fmt_operand(f, operand.precedence() == 1)
            }
        }
    }
}
