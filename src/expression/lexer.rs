//! Tokenizer shared by the condition and formula grammars.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::ExpressionError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Ident(s) => f.write_str(s),
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Null => f.write_str("null"),
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
            Self::Not => f.write_str("NOT"),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::Slash => f.write_str("/"),
            Self::Percent => f.write_str("%"),
            Self::Eq => f.write_str("=="),
            Self::NotEq => f.write_str("!="),
            Self::Lt => f.write_str("<"),
            Self::LtEq => f.write_str("<="),
            Self::Gt => f.write_str(">"),
            Self::GtEq => f.write_str(">="),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
        }
    }
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let mut chars = input.char_indices().peekable();
    let mut out = Vec::new();

    while let Some(&(position, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match ch {
            '0'..='9' | '.' => lex_number(input, &mut chars)?,
            '"' | '\'' => lex_string(&mut chars, ch)?,
            '`' => Token::Ident(lex_quoted_ident(&mut chars)?),
            c if c.is_alphabetic() || c == '_' => lex_word(&mut chars),
            _ => lex_symbol(&mut chars)?,
        };
        out.push(Spanned { token, position });
    }

    Ok(out)
}

fn lex_number(
    input: &str,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<Token, ExpressionError> {
    let Some(&(start, first)) = chars.peek() else {
        return Err(ExpressionError::UnexpectedEnd);
    };
    let mut end = start;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut prev = first;

    while let Some(&(i, c)) = chars.peek() {
        let accept = match c {
            '0'..='9' => true,
            '.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            'e' | 'E' if !seen_exp && i > start => {
                seen_exp = true;
                true
            }
            '+' | '-' if matches!(prev, 'e' | 'E') => true,
            _ => false,
        };
        if !accept {
            break;
        }
        prev = c;
        end = i + c.len_utf8();
        chars.next();
    }

    let raw = &input[start..end];
    raw.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| ExpressionError::UnexpectedToken {
            token: raw.to_string(),
            position: start,
        })
}

fn lex_string(
    chars: &mut Peekable<CharIndices<'_>>,
    quote: char,
) -> Result<Token, ExpressionError> {
    let Some((start, _)) = chars.next() else {
        return Err(ExpressionError::UnexpectedEnd);
    };
    let mut out = String::new();

    loop {
        match chars.next() {
            None => return Err(ExpressionError::UnterminatedQuote { position: start }),
            Some((_, c)) if c == quote => return Ok(Token::Str(out)),
            Some((_, '\\')) => match chars.next() {
                None => return Err(ExpressionError::UnterminatedQuote { position: start }),
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, escaped)) => out.push(escaped),
            },
            Some((_, c)) => out.push(c),
        }
    }
}

fn lex_quoted_ident(chars: &mut Peekable<CharIndices<'_>>) -> Result<String, ExpressionError> {
    let Some((start, _)) = chars.next() else {
        return Err(ExpressionError::UnexpectedEnd);
    };
    let mut out = String::new();
    loop {
        match chars.next() {
            None => return Err(ExpressionError::UnterminatedQuote { position: start }),
            Some((_, '`')) => return Ok(out),
            Some((_, c)) => out.push(c),
        }
    }
}

fn lex_word(chars: &mut Peekable<CharIndices<'_>>) -> Token {
    let mut word = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }

    match word.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        _ => Token::Ident(word),
    }
}

fn lex_symbol(chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, ExpressionError> {
    let Some((position, c)) = chars.next() else {
        return Err(ExpressionError::UnexpectedEnd);
    };
    let mut next_is = |expected: char| {
        if chars.peek().map(|&(_, n)| n) == Some(expected) {
            chars.next();
            true
        } else {
            false
        }
    };

    let token = match c {
        '+' => Token::Plus,
        '-' => Token::Minus,
        '*' => Token::Star,
        '/' => Token::Slash,
        '%' => Token::Percent,
        '(' => Token::LParen,
        ')' => Token::RParen,
        '=' => {
            // `=`, `==` and `===` all mean equality.
            if next_is('=') {
                next_is('=');
            }
            Token::Eq
        }
        '!' => {
            if next_is('=') {
                next_is('=');
                Token::NotEq
            } else {
                Token::Not
            }
        }
        '<' => {
            if next_is('=') {
                Token::LtEq
            } else if next_is('>') {
                Token::NotEq
            } else {
                Token::Lt
            }
        }
        '>' => {
            if next_is('=') {
                Token::GtEq
            } else {
                Token::Gt
            }
        }
        '&' if next_is('&') => Token::And,
        '|' if next_is('|') => Token::Or,
        other => return Err(ExpressionError::UnexpectedCharacter { ch: other, position }),
    };
    Ok(token)
}
