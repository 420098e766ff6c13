//! Cells and their content
//!
//! A [`Cell`] holds exactly one [`CellContent`]. Formula content memoizes its
//! value on first read; the sheet clears the memo whenever something the
//! formula reads changes.

use std::cell::OnceCell;
use tabula_core::{Error, Position, Result, Value, ESCAPE_SIGN, FORMULA_SIGN};
use tabula_formula::{parse_formula, EvaluationContext, Formula};

/// Which kind of content a cell holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Empty,
    Text,
    Formula,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Empty => "empty",
            CellKind::Text => "text",
            CellKind::Formula => "formula",
        }
    }
}

/// The content of a cell
#[derive(Debug, Default)]
pub enum CellContent {
    /// No content
    #[default]
    Empty,

    /// Literal text, never empty
    Text(String),

    /// Formula with memoized result
    Formula(FormulaContent),
}

/// A formula together with its rendered text and memoized value
#[derive(Debug)]
pub struct FormulaContent {
    formula: Formula,
    /// `=` followed by the canonical expression
    text: String,
    cache: OnceCell<Value>,
}

impl FormulaContent {
    fn new(formula: Formula) -> Self {
        let text = format!("{}{}", FORMULA_SIGN, formula.expression());
        Self {
            formula,
            text,
            cache: OnceCell::new(),
        }
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// The memoized value, if the formula was read since its last invalidation
    pub fn cached_value(&self) -> Option<&Value> {
        self.cache.get()
    }

    fn value(&self, ctx: &dyn EvaluationContext) -> Value {
        self.cache
            .get_or_init(|| Value::from(self.formula.evaluate(ctx)))
            .clone()
    }
}

impl CellContent {
    /// Build content from cell text
    ///
    /// Empty text is [`CellContent::Empty`]; text starting with `=` and longer
    /// than the marker is a formula; anything else, including a lone `=`, is
    /// text.
    pub fn parse(text: String) -> Result<Self> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }

        match text.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => {
                let formula =
                    parse_formula(expression).map_err(|e| Error::FormulaParse(e.to_string()))?;
                Ok(CellContent::Formula(FormulaContent::new(formula)))
            }
            _ => Ok(CellContent::Text(text)),
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            CellContent::Empty => CellKind::Empty,
            CellContent::Text(_) => CellKind::Text,
            CellContent::Formula(_) => CellKind::Formula,
        }
    }

    /// Original textual form of the content
    pub fn text(&self) -> &str {
        match self {
            CellContent::Empty => "",
            CellContent::Text(text) => text,
            CellContent::Formula(formula) => &formula.text,
        }
    }

    /// Positions the content reads (empty unless a formula)
    pub fn referenced_cells(&self) -> &[Position] {
        match self {
            CellContent::Formula(formula) => formula.formula.referenced_cells(),
            CellContent::Empty | CellContent::Text(_) => &[],
        }
    }

    fn value(&self, ctx: &dyn EvaluationContext) -> Value {
        match self {
            CellContent::Empty => Value::empty(),
            CellContent::Text(text) => {
                let shown = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                Value::Text(shown.to_string())
            }
            CellContent::Formula(formula) => formula.value(ctx),
        }
    }

    /// Drop the memoized value; returns whether there was one
    fn invalidate_cache(&mut self) -> bool {
        match self {
            CellContent::Formula(formula) => formula.cache.take().is_some(),
            CellContent::Empty | CellContent::Text(_) => false,
        }
    }
}

/// A cell owned by a sheet
#[derive(Debug)]
pub struct Cell {
    position: Position,
    content: CellContent,
}

impl Cell {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            content: CellContent::Empty,
        }
    }

    /// Replace the content, returning the previous one
    pub(crate) fn set(&mut self, content: CellContent) -> CellContent {
        std::mem::replace(&mut self.content, content)
    }

    /// Reset to empty in place, returning the previous content
    pub(crate) fn clear(&mut self) -> CellContent {
        self.set(CellContent::Empty)
    }

    pub(crate) fn value(&self, ctx: &dyn EvaluationContext) -> Value {
        self.content.value(ctx)
    }

    pub(crate) fn invalidate_cache(&mut self) -> bool {
        self.content.invalidate_cache()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn kind(&self) -> CellKind {
        self.content.kind()
    }

    pub fn text(&self) -> &str {
        self.content.text()
    }

    pub fn referenced_cells(&self) -> &[Position] {
        self.content.referenced_cells()
    }

    /// Check whether a formula value is memoized
    pub fn has_cached_value(&self) -> bool {
        matches!(&self.content, CellContent::Formula(f) if f.cached_value().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::CellError;

    struct NoCells;

    impl EvaluationContext for NoCells {
        fn cell_value(&self, _pos: Position) -> Option<Value> {
            None
        }
    }

    fn content(text: &str) -> CellContent {
        CellContent::parse(text.to_string()).unwrap()
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(content("").kind(), CellKind::Empty);
        assert_eq!(content("hello").kind(), CellKind::Text);
        assert_eq!(content("=").kind(), CellKind::Text);
        assert_eq!(content("'=1+2").kind(), CellKind::Text);
        assert_eq!(content("=1+2").kind(), CellKind::Formula);
    }

    #[test]
    fn test_parse_error() {
        let err = CellContent::parse("=1+".to_string()).unwrap_err();
        assert!(matches!(err, Error::FormulaParse(_)));
    }

    #[test]
    fn test_text_and_value() {
        let text = content("hello");
        assert_eq!(text.text(), "hello");
        assert_eq!(text.value(&NoCells), Value::from("hello"));

        // The escape sign is kept in the text but not in the value
        let escaped = content("'=1+2");
        assert_eq!(escaped.text(), "'=1+2");
        assert_eq!(escaped.value(&NoCells), Value::from("=1+2"));

        let empty = content("");
        assert_eq!(empty.text(), "");
        assert_eq!(empty.value(&NoCells), Value::empty());
    }

    #[test]
    fn test_formula_text_is_canonical() {
        let formula = content("= ( 1 + 2 ) * B1");
        assert_eq!(formula.text(), "=(1+2)*B1");
        assert_eq!(formula.referenced_cells(), &[Position::new(0, 1)]);
    }

    #[test]
    fn test_formula_value_is_memoized() {
        let mut formula = content("=1/0");
        assert!(!formula.invalidate_cache());

        assert_eq!(formula.value(&NoCells), Value::Error(CellError::Div0));
        if let CellContent::Formula(f) = &formula {
            assert_eq!(f.cached_value(), Some(&Value::Error(CellError::Div0)));
        }

        assert!(formula.invalidate_cache());
        assert!(!formula.invalidate_cache());
    }

    #[test]
    fn test_cell_set_and_clear() {
        let mut cell = Cell::new(Position::new(2, 3));
        assert_eq!(cell.kind(), CellKind::Empty);

        let old = cell.set(content("=4*2"));
        assert_eq!(old.kind(), CellKind::Empty);
        assert_eq!(cell.value(&NoCells), Value::Number(8.0));
        assert!(cell.has_cached_value());

        let old = cell.clear();
        assert_eq!(old.text(), "=4*2");
        assert_eq!(cell.kind(), CellKind::Empty);
        assert_eq!(cell.position(), Position::new(2, 3));
    }
}
