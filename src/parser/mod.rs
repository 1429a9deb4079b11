//! Parser for constraint expressions such as `b.left = a.right + 8 @ 500`

mod grammar;
pub mod lexer;

pub use grammar::{parse_constraint, parse_constraints};
