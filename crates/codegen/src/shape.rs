//! Storage shape of an Aseba value.

use std::fmt;

/// Every Aseba variable is a single word or a fixed-length array of words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Shape {
    Scalar,
    Array(usize),
}

impl Shape {
    /// Shape of a table entry that stores scalars as size 1.
    pub fn from_cells(cells: usize) -> Shape {
        if cells == 1 {
            Shape::Scalar
        } else {
            Shape::Array(cells)
        }
    }

    pub fn cells(self) -> usize {
        match self {
            Shape::Scalar => 1,
            Shape::Array(n) => n,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, Shape::Array(_))
    }

    /// Suffix of a `var` declaration.
    pub fn declaration_suffix(self) -> String {
        match self {
            Shape::Scalar => String::new(),
            Shape::Array(n) => format!("[{}]", n),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => f.write_str("scalar"),
            Shape::Array(n) => write!(f, "array[{}]", n),
        }
    }
}
