use miette::SourceSpan;
use tracing::{debug, trace};

use crate::{
    Environment, EvalError, Lexer,
    lex::{Token, TokenKind},
};

/// Evaluates `expression` against `environment`.
///
/// Operators are resolved with an operand stack and an operator stack in a
/// single left-to-right pass. `*` and `/` bind tighter than `+` and `-`, and
/// operators of equal precedence associate to the left.
///
/// ```
/// use arith_eval::{Environment, evaluate};
///
/// let environment: Environment = [("x", 10.0), ("y", 5.0)].into_iter().collect();
/// assert_eq!(evaluate("(x + y) * 2", &environment), Ok(30.0));
/// ```
pub fn evaluate(expression: &str, environment: &Environment) -> Result<f64, EvalError> {
    debug!(expression, variables = environment.len(), "evaluating");
    let result = Evaluator::new(expression, environment).run();
    match &result {
        Ok(value) => debug!(value, "evaluated"),
        Err(error) => debug!(%error, "evaluation failed"),
    }
    result
}

struct Evaluator<'de, 'env> {
    lexer: Lexer<'de>,
    environment: &'env Environment,
    operands: Vec<f64>,
    operators: Vec<Token<'de>>,
}

impl<'de, 'env> Evaluator<'de, 'env> {
    fn new(expression: &'de str, environment: &'env Environment) -> Self {
        Self {
            lexer: Lexer::new(expression),
            environment,
            operands: Vec::new(),
            operators: Vec::new(),
        }
    }

    fn run(mut self) -> Result<f64, EvalError> {
        while let Some(token) = self.lexer.next() {
            let token = token?;
            trace!(%token, "token");

            match token.kind {
                TokenKind::Number(value) => self.operands.push(value),
                TokenKind::Ident => {
                    let Some(value) = self.environment.get(token.literal) else {
                        return Err(EvalError::UndefinedVariable {
                            name: token.literal.to_string(),
                            span: token.span().into(),
                        });
                    };
                    self.operands.push(value);
                }
                TokenKind::LeftParen => self.operators.push(token),
                // A `)` without a partner drains the stack and is otherwise ignored.
                TokenKind::RightParen => {
                    while let Some(top) = self.operators.pop() {
                        if top.kind == TokenKind::LeftParen {
                            break;
                        }
                        self.apply_operator(top)?;
                    }
                }
                TokenKind::Operator(_) => {
                    while let Some(&top) = self.operators.last() {
                        if top.kind == TokenKind::LeftParen
                            || precedence(token.kind) > precedence(top.kind)
                        {
                            break;
                        }
                        self.operators.pop();
                        self.apply_operator(top)?;
                    }
                    self.operators.push(token);
                }
            }
        }

        while let Some(top) = self.operators.pop() {
            self.apply_operator(top)?;
        }

        let whole = 0..self.lexer.whole().len();
        match self.operands.as_slice() {
            [value] => Ok(*value),
            [] => Err(EvalError::MalformedExpression {
                reason: "empty expression",
                span: whole.into(),
            }),
            _ => Err(EvalError::MalformedExpression {
                reason: "operands without an operator between them",
                span: whole.into(),
            }),
        }
    }

    fn apply_operator(&mut self, token: Token<'de>) -> Result<(), EvalError> {
        let span = SourceSpan::from(token.span());
        let TokenKind::Operator(operator) = token.kind else {
            return Err(EvalError::MalformedExpression {
                reason: "unclosed parenthesis",
                span,
            });
        };

        let b = self.pop_operand(span)?;
        let a = self.pop_operand(span)?;
        let value = apply(operator, a, b, span)?;
        trace!(a, %operator, b, value, "applied");
        self.operands.push(value);
        Ok(())
    }

    fn pop_operand(&mut self, span: SourceSpan) -> Result<f64, EvalError> {
        self.operands
            .pop()
            .ok_or(EvalError::MalformedExpression {
                reason: "operator is missing an operand",
                span,
            })
    }
}

fn precedence(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Operator('*' | '/') => 2,
        TokenKind::Operator('+' | '-') => 1,
        _ => 0,
    }
}

/// Computes `a operator b`. `span` locates the operator for error labels.
pub fn apply(operator: char, a: f64, b: f64, span: SourceSpan) -> Result<f64, EvalError> {
    match operator {
        '+' => Ok(a + b),
        '-' => Ok(a - b),
        '*' => Ok(a * b),
        '/' => {
            // Exact comparison; tiny non-zero divisors go through.
            if b == 0.0 {
                return Err(EvalError::DivisionByZero { span });
            }
            Ok(a / b)
        }
        operator => Err(EvalError::UnknownOperator { operator, span }),
    }
}
