//! Lexical analysis for calculator expressions.
//!
//! Turns raw keypad text into a flat list of [`Token`]s. Only the characters
//! `0-9 . + - * / % ( )` and whitespace are accepted; anything else is rejected
//! with [`EvalError::InvalidCharacter`]. A `%` is emitted as its own token and
//! interpreted by the parser as a postfix operator, never rewritten in the text.

use super::EvalError;

/// The kind of a lexical unit. `Number` carries its decoded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

/// A token together with the character offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Scan `text` left to right and produce its tokens.
///
/// Positions are character offsets (not byte offsets) so they stay meaningful
/// for any non-ASCII input that gets rejected.
pub fn tokenize(text: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let kind = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token {
                    kind: TokenKind::Number(parse_number(&literal, start)?),
                    position: start,
                });
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            other => {
                return Err(EvalError::InvalidCharacter {
                    character: other,
                    position: i,
                })
            }
        };
        tokens.push(Token { kind, position: i });
        i += 1;
    }

    Ok(tokens)
}

/// Decode a run of digits and dots. At most one dot and at least one digit.
fn parse_number(literal: &str, position: usize) -> Result<f64, EvalError> {
    let malformed = || EvalError::MalformedNumber {
        literal: literal.to_string(),
        position,
    };

    if literal.matches('.').count() > 1 || !literal.chars().any(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    literal.parse::<f64>().map_err(|_| malformed())
}
