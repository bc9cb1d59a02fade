//! # Expression Evaluator
//!
//! A small, safe arithmetic engine for the standard keypad. Input text goes
//! through three stages:
//!
//! 1. [`lexer::tokenize`] splits the text into numbers, operators and parentheses.
//! 2. [`parser::parse`] builds an [`Expr`] tree with the usual precedence:
//!    parentheses and postfix `%` bind tightest, then unary minus, then `*` `/`,
//!    then `+` `-`.
//! 3. [`Expr::eval`] walks the tree, rejecting division by zero and any
//!    non-finite intermediate value.
//!
//! The final value is passed through [`round_result`] so that binary floating
//! point noise never reaches the display.
//!
//! ```rust
//! use cloudcalc::evaluator::{evaluate, EvalError};
//!
//! assert_eq!(evaluate("(2 + 3) * 4"), Ok(20.0));
//! assert_eq!(evaluate("50% + 10"), Ok(10.5));
//! assert_eq!(evaluate("0.1 + 0.2"), Ok(0.3));
//! assert_eq!(evaluate("1 / 0"), Err(EvalError::DivisionByZero));
//! ```
//!
//! Nothing here is stateful: the same text always yields the same result.

pub mod lexer;
pub mod parser;

use std::error::Error;
use std::fmt;

pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse, BinaryOp, Expr, MAX_DEPTH};

/// Number of decimal places kept in a result.
pub const RESULT_DECIMALS: i32 = 8;

/// Magnitude above which a double has no digits left at the 1e-8 scale.
const ROUNDING_LIMIT: f64 = 1e15;

/// Why an expression could not be evaluated.
///
/// The calculator session shows every one of these the same way, but they stay
/// distinct so the evaluator can be checked on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A character outside `0-9 . + - * / % ( )` and whitespace.
    InvalidCharacter { character: char, position: usize },
    /// A numeric literal with more than one dot, or a lone dot.
    MalformedNumber { literal: String, position: usize },
    /// Dangling operator, unbalanced parenthesis, empty operand, trailing input
    /// or nesting deeper than [`MAX_DEPTH`].
    SyntaxError { position: usize, message: String },
    /// Right-hand side of `/` evaluated to zero.
    DivisionByZero,
    /// Overflow or a NaN-producing operation.
    NonFiniteResult,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::InvalidCharacter {
                character,
                position,
            } => write!(f, "Invalid character '{}' at position {}", character, position),
            EvalError::MalformedNumber { literal, position } => {
                write!(f, "Malformed number '{}' at position {}", literal, position)
            }
            EvalError::SyntaxError { position, message } => {
                write!(f, "Syntax error at position {}: {}", position, message)
            }
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::NonFiniteResult => write!(f, "Result is not a finite number"),
        }
    }
}

impl Error for EvalError {}

/// Result type for expression evaluation.
pub type EvalResult = Result<f64, EvalError>;

/// Evaluate an arithmetic expression.
///
/// # Errors
///
/// Returns the first problem found, in pipeline order: lexing errors
/// ([`EvalError::InvalidCharacter`], [`EvalError::MalformedNumber`]), then
/// [`EvalError::SyntaxError`], then evaluation errors
/// ([`EvalError::DivisionByZero`], [`EvalError::NonFiniteResult`]).
pub fn evaluate(text: &str) -> EvalResult {
    let tokens = tokenize(text)?;
    let tree = parse(&tokens, text.chars().count())?;
    let value = tree.eval()?;
    Ok(round_result(value))
}

/// Round a finite value to [`RESULT_DECIMALS`] places.
///
/// Ties round half away from zero (`f64::round`). Values at or beyond 1e15 are
/// returned as-is since scaling them would only risk overflow. Negative zero is
/// normalized to positive zero.
pub fn round_result(value: f64) -> f64 {
    let rounded = if value.abs() < ROUNDING_LIMIT {
        let scale = 10f64.powi(RESULT_DECIMALS);
        (value * scale).round() / scale
    } else {
        value
    };
    // -0.0 + 0.0 == +0.0
    rounded + 0.0
}

/// Shortest decimal string that round-trips to `value`, e.g. `0.3`, `4`, `-2.5`.
pub fn format_result(value: f64) -> String {
    format!("{}", value + 0.0)
}
