//! Cell position and extent types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Maximum number of column letters in an A1-style address
const MAX_COLUMN_LETTERS: usize = 3;

const LETTERS: i32 = 26;

/// A cell position (e.g., "A1")
///
/// Rows and columns are 0-based internally; in A1 notation the column is
/// spelled with letters (A-XFD... capped at three letters) and the row is
/// 1-based. Positions order row-major: first by row, then by column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Row index (0-based internally, 1-based in display)
    pub row: i32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: i32,
}

impl Position {
    /// The invalid position, returned when decoding fails
    pub const NONE: Position = Position { row: -1, col: -1 };

    /// Create a new position
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Check whether the position lies inside the grid
    pub fn is_valid(&self) -> bool {
        self.row >= 0 && self.col >= 0 && self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Decode an A1-style address, returning [`Position::NONE`] on failure
    ///
    /// Only uppercase column letters are accepted and the row part must be
    /// all digits.
    ///
    /// # Examples
    /// ```
    /// use tabula_core::Position;
    ///
    /// assert_eq!(Position::from_a1("A1"), Position::new(0, 0));
    /// assert_eq!(Position::from_a1("AA10"), Position::new(9, 26));
    /// assert_eq!(Position::from_a1("a1"), Position::NONE);
    /// assert_eq!(Position::from_a1("A-1"), Position::NONE);
    /// ```
    pub fn from_a1(s: &str) -> Self {
        let split = s
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() || digits.is_empty() {
            return Self::NONE;
        }
        if letters.len() > MAX_COLUMN_LETTERS {
            return Self::NONE;
        }
        if !digits.starts_with(|c: char| c.is_ascii_digit()) {
            return Self::NONE;
        }

        let row: i32 = match digits.parse() {
            Ok(row) => row,
            Err(_) => return Self::NONE,
        };

        let col = letters
            .bytes()
            .fold(0, |acc, b| acc * LETTERS + i32::from(b - b'A') + 1);

        let pos = Self::new(row - 1, col - 1);
        if pos.is_valid() {
            pos
        } else {
            Self::NONE
        }
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: i32) -> String {
        let mut result = String::new();
        let mut n = col + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % LETTERS) as u8 + b'A') as char;
            result.insert(0, c);
            n /= LETTERS;
        }

        result
    }

    /// Format as A1-style string; empty for invalid positions
    pub fn to_a1_string(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let pos = Self::from_a1(s);
        if pos.is_valid() {
            Ok(pos)
        } else {
            Err(Error::InvalidAddress(s.to_string()))
        }
    }
}

/// The extent of a rectangular area, in rows and columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

impl Size {
    /// Create a new size
    pub const fn new(rows: i32, cols: i32) -> Self {
        Self { rows, cols }
    }

    /// Check if the area holds no cells
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
