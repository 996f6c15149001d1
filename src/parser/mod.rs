//! The parser stage (§4.2): turns a `Token` stream into the concrete parse
//! tree `tree::Node`, leaving semantic resolution to the walker.

pub mod grammar;
pub mod tree;

pub use grammar::{parse_program, ParseError};
