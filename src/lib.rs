//! Evaluation of arithmetic expressions over named `f64` variables.
//!
//! Expressions contain numeric literals, alphabetic variable names, the binary
//! operators `+ - * /` and parentheses.

pub mod env;
pub mod error;
pub mod eval;
pub mod lex;

pub use env::Environment;
pub use error::EvalError;
pub use eval::evaluate;
pub use lex::Lexer;
