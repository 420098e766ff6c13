//! Formula parser
//!
//! A recursive descent parser for arithmetic formulas with proper operator
//! precedence.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use tabula_core::Position;

/// Deepest run of parentheses and unary signs a formula may open
pub const MAX_NESTING: usize = 256;

/// Deepest expression tree a formula may build, operator chains included
pub const MAX_DEPTH: usize = 1024;

/// An expression and the depth of its tree
type Node = (FormulaExpr, usize);

/// Parse a formula expression (the text after the `=` marker) into an AST
///
/// # Example
/// ```rust
/// use tabula_formula::parse_expression;
///
/// let ast = parse_expression("1+2").unwrap();
/// let ast = parse_expression("(A1 + B2) / 2").unwrap();
/// assert!(parse_expression("1+").is_err());
/// ```
pub fn parse_expression(expression: &str) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(expression)?;
    let (expr, _) = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),

    // References
    CellRef(String), // Cell reference like A1

    // Operators
    Plus,
    Minus,
    Star,
    Slash,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    /// Open parentheses and unary signs around the current token
    nesting: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            nesting: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            _ if c.is_ascii_digit()
                || (c == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit())) =>
            {
                return self.scan_number();
            }
            _ if c.is_ascii_alphabetic() => return self.scan_reference(),
            _ => return Err(FormulaError::UnexpectedCharacter(c)),
        };

        self.advance();
        Ok(token)
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        self.skip_while(|c| c.is_ascii_digit());

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_while(|c| c.is_ascii_digit());
        }

        // Exponent part
        if self.peek_char().is_some_and(|c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            self.skip_while(|c| c.is_ascii_digit());
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse()
            .ok()
            .filter(|n: &f64| n.is_finite())
            .map(Token::Number)
            .ok_or_else(|| FormulaError::Parse(format!("Invalid number '{}'", num_str)))
    }

    fn scan_reference(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.skip_while(|c| c.is_ascii_alphanumeric());

        let text = &self.input[start..self.pos];
        if Self::is_cell_reference(text) {
            Ok(Token::CellRef(text.to_string()))
        } else {
            Err(FormulaError::UnknownIdentifier(text.to_string()))
        }
    }

    /// Cell reference pattern: uppercase letters followed by digits
    fn is_cell_reference(text: &str) -> bool {
        let letters = text.bytes().take_while(u8::is_ascii_uppercase).count();
        let digits = text[letters..].bytes().take_while(u8::is_ascii_digit).count();
        letters > 0 && digits > 0 && letters + digits == text.len()
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.skip_while(char::is_whitespace);
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: +, -
    // 4. Primary: numbers, references, parentheses
    //
    // Every rule returns the expression together with its tree depth.

    /// Step into a parenthesis or unary operand
    fn enter(&mut self) -> FormulaResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(FormulaError::Parse("formula nested too deeply".into()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn parse_expression(&mut self) -> FormulaResult<Node> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Node> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Node> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_unary()?;
            left = binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Node> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };

        self.consume()?;
        self.enter()?;
        let (operand, depth) = self.parse_unary()?;
        self.leave();

        let expr = FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        };
        Ok((expr, check_depth(depth + 1)?))
    }

    fn parse_primary(&mut self) -> FormulaResult<Node> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok((FormulaExpr::Number(n), 1))
            }

            Token::LeftParen => {
                self.consume()?;
                self.enter()?;
                let node = self.parse_expression()?;
                self.leave();
                self.expect(&Token::RightParen)?;
                Ok(node)
            }

            Token::CellRef(ref_str) => {
                self.consume()?;
                let pos = Position::from_a1(&ref_str);
                if pos.is_valid() {
                    Ok((FormulaExpr::CellRef(pos), 1))
                } else {
                    Ok((FormulaExpr::InvalidRef(ref_str), 1))
                }
            }

            token => Err(FormulaError::Parse(format!("Unexpected token: {:?}", token))),
        }
    }
}

fn binary(op: BinaryOperator, (left, l): Node, (right, r): Node) -> FormulaResult<Node> {
    let expr = FormulaExpr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    };
    Ok((expr, check_depth(l.max(r) + 1)?))
}

fn check_depth(depth: usize) -> FormulaResult<usize> {
    if depth > MAX_DEPTH {
        return Err(FormulaError::Parse("formula too long to evaluate".into()));
    }
    Ok(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_expression("42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_expression("3.25").unwrap(), FormulaExpr::Number(3.25));
        assert_eq!(parse_expression("1e3").unwrap(), FormulaExpr::Number(1000.0));
        assert_eq!(parse_expression(".5").unwrap(), FormulaExpr::Number(0.5));
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        // Should parse as 1+(2*3) due to precedence
        let ast = parse_expression("1+2*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, FormulaExpr::Number(1.0));
            assert!(matches!(
                *right,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_left_associative() {
        // 8-2-1 is (8-2)-1
        let ast = parse_expression("8-2-1").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Subtract);
            assert!(matches!(*left, FormulaExpr::BinaryOp { .. }));
            assert_eq!(*right, FormulaExpr::Number(1.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary() {
        let ast = parse_expression("-5").unwrap();
        assert!(matches!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                ..
            }
        ));

        let ast = parse_expression("+A1").unwrap();
        assert!(matches!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Plus,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_cell_reference() {
        assert_eq!(
            parse_expression("B2").unwrap(),
            FormulaExpr::CellRef(Position::new(1, 1))
        );
        assert_eq!(
            parse_expression(" AA10 ").unwrap(),
            FormulaExpr::CellRef(Position::new(9, 26))
        );
    }

    #[test]
    fn test_parse_out_of_grid_reference() {
        assert_eq!(
            parse_expression("ZZZZ1").unwrap(),
            FormulaExpr::InvalidRef("ZZZZ1".into())
        );
        assert_eq!(
            parse_expression("A99999").unwrap(),
            FormulaExpr::InvalidRef("A99999".into())
        );
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_expression("(1+2)*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
            assert_eq!(*right, FormulaExpr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("1+").is_err());
        assert!(parse_expression("(1+2").is_err());
        assert!(parse_expression("1+2)").is_err());
        assert!(parse_expression("1 2").is_err());
        assert!(parse_expression("*3").is_err());
        assert_eq!(
            parse_expression("1$"),
            Err(FormulaError::UnexpectedCharacter('$'))
        );
        assert_eq!(
            parse_expression("a1"),
            Err(FormulaError::UnknownIdentifier("a1".into()))
        );
        assert_eq!(
            parse_expression("SUM"),
            Err(FormulaError::UnknownIdentifier("SUM".into()))
        );
    }

    #[test]
    fn test_parse_nesting_limit() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(parse_expression(&nested(MAX_NESTING)).unwrap(), FormulaExpr::Number(1.0));
        assert!(matches!(
            parse_expression(&nested(MAX_NESTING + 1)),
            Err(FormulaError::Parse(_))
        ));

        // Far past the limit must fail cleanly rather than exhaust the stack
        assert!(parse_expression(&nested(20_000)).is_err());
        assert!(parse_expression(&"-".repeat(20_000)).is_err());
    }

    #[test]
    fn test_parse_depth_limit() {
        let chain = |n: usize| vec!["A1"; n].join("+");
        assert!(parse_expression(&chain(MAX_DEPTH)).is_ok());
        assert!(matches!(
            parse_expression(&chain(MAX_DEPTH + 1)),
            Err(FormulaError::Parse(_))
        ));
        assert!(parse_expression(&chain(50_000)).is_err());
    }
}
