//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellError,
    CellKind,
    CellView,
    // Error types
    Error,
    // Grid types
    Position,
    Result,
    // Main types
    Sheet,
    Size,
    Value,
};
