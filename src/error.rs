use std::num::ParseFloatError;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Everything that can go wrong while scanning or evaluating an expression.
///
/// Spans point into the expression text. The error does not own that text;
/// attach it with [`miette::Report::with_source_code`] to render the labels.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum EvalError {
    #[error("undefined variable `{name}`")]
    #[diagnostic(
        code(arith::undefined_variable),
        help("give `{name}` a value in the environment before evaluating")
    )]
    UndefinedVariable {
        name: String,
        #[label("not defined")]
        span: SourceSpan,
    },

    #[error("division by zero")]
    #[diagnostic(code(arith::division_by_zero))]
    DivisionByZero {
        #[label("right-hand side of this division is zero")]
        span: SourceSpan,
    },

    #[error("unknown operator '{operator}'")]
    #[diagnostic(
        code(arith::unknown_operator),
        help("supported operators are `+`, `-`, `*` and `/`")
    )]
    UnknownOperator {
        operator: char,
        #[label("this operator")]
        span: SourceSpan,
    },

    #[error("malformed expression: {reason}")]
    #[diagnostic(code(arith::malformed_expression))]
    MalformedExpression {
        reason: &'static str,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("malformed number `{literal}`")]
    #[diagnostic(
        code(arith::malformed_number),
        url("https://doc.rust-lang.org/std/num/struct.ParseFloatError.html")
    )]
    MalformedNumber {
        literal: String,
        #[source]
        source: ParseFloatError,
        #[label("this numeric literal")]
        span: SourceSpan,
    },
}

impl EvalError {
    pub fn span(&self) -> SourceSpan {
        match self {
            EvalError::UndefinedVariable { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::UnknownOperator { span, .. }
            | EvalError::MalformedExpression { span, .. }
            | EvalError::MalformedNumber { span, .. } => *span,
        }
    }
}
