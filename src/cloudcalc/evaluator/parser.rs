//! Recursive-descent parser and tree evaluation.
//!
//! Grammar, from lowest to highest precedence:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | postfix
//! postfix := primary '%'?
//! primary := NUMBER | '(' expr ')'
//! ```
//!
//! Binary operators are left-associative. The tree is built once per
//! evaluation and dropped when the evaluation returns.
//!
//! Unary minus and parentheses may nest at most [`MAX_DEPTH`] levels. Operator
//! chains (`1+1+1+...`) have no length limit: their left spine is walked with
//! a loop on evaluation and on drop, so input size never exhausts the stack.

use std::mem;

use super::lexer::{Token, TokenKind};
use super::EvalError;

/// Deepest allowed nesting of unary minus and parentheses.
pub const MAX_DEPTH: usize = 256;

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Immutable expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryMinus(Box<Expr>),
    Percent(Box<Expr>),
}

impl Expr {
    /// Evaluate the tree.
    ///
    /// Every intermediate value must be finite, so an overflow hidden by a
    /// later operation (e.g. `x / inf`) is still reported.
    pub fn eval(&self) -> Result<f64, EvalError> {
        let mut spine = Vec::new();
        let mut node = self;
        let mut value = loop {
            match node {
                Expr::BinaryOp { op, left, right } => {
                    spine.push((*op, right.as_ref()));
                    node = left.as_ref();
                }
                Expr::Number(value) => break *value,
                Expr::UnaryMinus(operand) => break -operand.eval()?,
                Expr::Percent(operand) => break operand.eval()? / 100.0,
            }
        };
        value = finite(value)?;

        // Innermost operation first, so left-to-right order is kept.
        while let Some((op, right)) = spine.pop() {
            let rhs = right.eval()?;
            value = finite(op.apply(value, rhs)?)?;
        }
        Ok(value)
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        // Detach the left spine node by node instead of recursing into it.
        let mut detached = Vec::new();
        if let Expr::BinaryOp { left, .. } = self {
            detached.push(mem::replace(left, Box::new(Expr::Number(0.0))));
        }
        while let Some(mut node) = detached.pop() {
            if let Expr::BinaryOp { left, .. } = node.as_mut() {
                detached.push(mem::replace(left, Box::new(Expr::Number(0.0))));
            }
        }
    }
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        match self {
            BinaryOp::Add => Ok(lhs + rhs),
            BinaryOp::Subtract => Ok(lhs - rhs),
            BinaryOp::Multiply => Ok(lhs * rhs),
            BinaryOp::Divide if rhs == 0.0 => Err(EvalError::DivisionByZero),
            BinaryOp::Divide => Ok(lhs / rhs),
        }
    }
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFiniteResult)
    }
}

/// Parse a complete token stream into a single expression.
///
/// `end` is the character length of the source text and is used as the
/// position of "unexpected end of input" errors.
pub fn parse(tokens: &[Token], end: usize) -> Result<Expr, EvalError> {
    let mut parser = Parser {
        tokens,
        cursor: 0,
        depth: 0,
        end,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(EvalError::SyntaxError {
            position: token.position,
            message: format!("unexpected {}", describe(token.kind)),
        }),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
    depth: usize,
    end: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn descend(&mut self, position: usize) -> Result<(), EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::SyntaxError {
                position,
                message: "expression nested too deeply".to_string(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.term()?;
        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.cursor += 1;
            let right = self.term()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.unary()?;
        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.cursor += 1;
            let right = self.unary()?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        if let Some(Token {
            kind: TokenKind::Minus,
            position,
        }) = self.peek()
        {
            self.cursor += 1;
            self.descend(position)?;
            let operand = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::UnaryMinus(Box::new(operand)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let operand = self.primary()?;
        if let Some(Token {
            kind: TokenKind::Percent,
            ..
        }) = self.peek()
        {
            self.cursor += 1;
            return Ok(Expr::Percent(Box::new(operand)));
        }
        Ok(operand)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Number(value),
                ..
            }) => Ok(Expr::Number(value)),
            Some(Token {
                kind: TokenKind::LParen,
                position,
            }) => {
                self.descend(position)?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(token) => Err(EvalError::SyntaxError {
                        position: token.position,
                        message: format!("expected ')' but found {}", describe(token.kind)),
                    }),
                    None => Err(EvalError::SyntaxError {
                        position,
                        message: "unclosed '('".to_string(),
                    }),
                }
            }
            Some(token) => Err(EvalError::SyntaxError {
                position: token.position,
                message: format!("expected a number or '(' but found {}", describe(token.kind)),
            }),
            None => Err(EvalError::SyntaxError {
                position: self.end,
                message: "unexpected end of expression".to_string(),
            }),
        }
    }
}

fn describe(kind: TokenKind) -> String {
    match kind {
        TokenKind::Number(value) => format!("number {}", value),
        TokenKind::Plus => "'+'".to_string(),
        TokenKind::Minus => "'-'".to_string(),
        TokenKind::Star => "'*'".to_string(),
        TokenKind::Slash => "'/'".to_string(),
        TokenKind::Percent => "'%'".to_string(),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn tree(text: &str) -> Expr {
        let tokens = tokenize(text).unwrap();
        parse(&tokens, text.chars().count()).unwrap()
    }

    fn syntax_position(text: &str) -> usize {
        let tokens = tokenize(text).unwrap();
        match parse(&tokens, text.chars().count()) {
            Err(EvalError::SyntaxError { position, .. }) => position,
            other => panic!("expected a syntax error for {:?}, got {:?}", text, other),
        }
    }

    fn num(value: f64) -> Box<Expr> {
        Box::new(Expr::Number(value))
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        assert_eq!(
            tree("1+2*3"),
            Expr::BinaryOp {
                op: BinaryOp::Add,
                left: num(1.0),
                right: Box::new(Expr::BinaryOp {
                    op: BinaryOp::Multiply,
                    left: num(2.0),
                    right: num(3.0),
                }),
            }
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        assert_eq!(
            tree("8-3-1"),
            Expr::BinaryOp {
                op: BinaryOp::Subtract,
                left: Box::new(Expr::BinaryOp {
                    op: BinaryOp::Subtract,
                    left: num(8.0),
                    right: num(3.0),
                }),
                right: num(1.0),
            }
        );
    }

    #[test]
    fn test_percent_binds_tighter_than_unary_minus() {
        assert_eq!(
            tree("-5%"),
            Expr::UnaryMinus(Box::new(Expr::Percent(num(5.0))))
        );
    }

    #[test]
    fn test_percent_applies_to_groups() {
        assert_eq!(
            tree("(2+10)%"),
            Expr::Percent(Box::new(Expr::BinaryOp {
                op: BinaryOp::Add,
                left: num(2.0),
                right: num(10.0),
            }))
        );
    }

    #[test]
    fn test_syntax_error_positions() {
        assert_eq!(syntax_position("2+"), 2);
        assert_eq!(syntax_position(""), 0);
        assert_eq!(syntax_position("(1+2"), 0);
        assert_eq!(syntax_position("1+2)"), 3);
        assert_eq!(syntax_position("*3"), 0);
        assert_eq!(syntax_position("2(3)"), 1);
        assert_eq!(syntax_position("()"), 1);
        assert_eq!(syntax_position("5%%"), 2);
    }

    #[test]
    fn test_nesting_limit() {
        let allowed = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(tree(&allowed), Expr::Number(1.0));

        let too_deep = format!("{}1", "-".repeat(MAX_DEPTH + 1));
        assert_eq!(syntax_position(&too_deep), MAX_DEPTH);
    }

    #[test]
    fn test_division_by_zero_is_reported() {
        assert_eq!(tree("1/(2-2)").eval(), Err(EvalError::DivisionByZero));
    }
}
