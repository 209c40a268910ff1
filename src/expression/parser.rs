//! Recursive-descent parser for the condition and formula grammars.
//!
//! ```text
//! or      := and (("OR" | "||") and)*
//! and     := not (("AND" | "&&") not)*
//! not     := ("NOT" | "!") not | cmp
//! cmp     := add (("==" | "!=" | "<" | "<=" | ">" | ">=") add)?
//! add     := mul (("+" | "-") mul)*
//! mul     := unary (("*" | "/" | "%") unary)*
//! unary   := "-" unary | primary
//! primary := number | string | true | false | null | ident | "(" or ")"
//! ```
//!
//! The formula grammar starts at `add` and only admits numbers, identifiers, arithmetic and
//! parentheses; every other token is rejected before parsing begins.

use crate::error::ExpressionError;
use crate::types::Value;

use super::ast::{BinaryOperator, Expression, UnaryOperator};
use super::lexer::{tokenize, Spanned, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grammar {
    Condition,
    Formula,
}

pub(crate) fn parse(input: &str, grammar: Grammar) -> Result<Expression, ExpressionError> {
    let tokens = tokenize(input)?;

    if grammar == Grammar::Formula {
        if let Some(bad) = tokens.iter().find(|t| !allowed_in_formula(&t.token)) {
            return Err(ExpressionError::NotAllowed {
                token: bad.token.to_string(),
                position: bad.position,
            });
        }
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        nesting: 0,
    };
    let node = match grammar {
        Grammar::Condition => parser.parse_or()?,
        Grammar::Formula => parser.parse_additive()?,
    };

    match parser.peek() {
        None => Ok(node.expr),
        Some(extra) => Err(unexpected(extra)),
    }
}

fn allowed_in_formula(token: &Token) -> bool {
    matches!(
        token,
        Token::Number(_)
            | Token::Ident(_)
            | Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::Percent
            | Token::LParen
            | Token::RParen
    )
}

fn unexpected(spanned: &Spanned) -> ExpressionError {
    ExpressionError::UnexpectedToken {
        token: spanned.token.to_string(),
        position: spanned.position,
    }
}

/// Bound on both parser recursion and the height of the resulting tree, so that parsing,
/// evaluating and dropping an expression all stay within a fixed stack budget.
pub(crate) const MAX_DEPTH: usize = 128;

/// A parsed subtree together with its height.
struct Node {
    expr: Expression,
    height: usize,
}

impl Node {
    fn leaf(expr: Expression) -> Self {
        Self { expr, height: 1 }
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Spanned> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().is_some_and(|t| &t.token == expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn too_deep(&self) -> ExpressionError {
        let position = self
            .peek()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.position);
        ExpressionError::TooDeep { position }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<F>(&mut self, parse: F) -> Result<Node, ExpressionError>
    where
        F: FnOnce(&mut Self) -> Result<Node, ExpressionError>,
    {
        if self.nesting >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.nesting += 1;
        let node = parse(self);
        self.nesting -= 1;
        node
    }

    fn unary(&self, operator: UnaryOperator, operand: Node) -> Result<Node, ExpressionError> {
        let height = operand.height + 1;
        if height > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(Node {
            expr: Expression::unary(operator, operand.expr),
            height,
        })
    }

    fn binary(
        &self,
        left: Node,
        operator: BinaryOperator,
        right: Node,
    ) -> Result<Node, ExpressionError> {
        let height = left.height.max(right.height) + 1;
        if height > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(Node {
            expr: Expression::binary(left.expr, operator, right.expr),
            height,
        })
    }

    fn parse_or(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and()?;
            left = self.binary(left, BinaryOperator::Or, right)?;
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.parse_not()?;
        while self.eat(&Token::And) {
            let right = self.parse_not()?;
            left = self.binary(left, BinaryOperator::And, right)?;
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Node, ExpressionError> {
        if self.eat(&Token::Not) {
            let operand = self.nested(Self::parse_not)?;
            return self.unary(UnaryOperator::Not, operand);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Node, ExpressionError> {
        let left = self.parse_additive()?;
        let operator = match self.peek().map(|t| &t.token) {
            Some(Token::Eq) => BinaryOperator::Equal,
            Some(Token::NotEq) => BinaryOperator::NotEqual,
            Some(Token::Lt) => BinaryOperator::LessThan,
            Some(Token::LtEq) => BinaryOperator::LessThanOrEqual,
            Some(Token::Gt) => BinaryOperator::GreaterThan,
            Some(Token::GtEq) => BinaryOperator::GreaterThanOrEqual,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.parse_additive()?;
        self.binary(left, operator, right)
    }

    fn parse_additive(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let operator = match self.peek().map(|t| &t.token) {
                Some(Token::Plus) => BinaryOperator::Add,
                Some(Token::Minus) => BinaryOperator::Subtract,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = self.binary(left, operator, right)?;
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.parse_unary()?;
        loop {
            let operator = match self.peek().map(|t| &t.token) {
                Some(Token::Star) => BinaryOperator::Multiply,
                Some(Token::Slash) => BinaryOperator::Divide,
                Some(Token::Percent) => BinaryOperator::Remainder,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = self.binary(left, operator, right)?;
        }
    }

    fn parse_unary(&mut self) -> Result<Node, ExpressionError> {
        if self.eat(&Token::Minus) {
            let operand = self.nested(Self::parse_unary)?;
            return self.unary(UnaryOperator::Negate, operand);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node, ExpressionError> {
        let spanned = self.advance().ok_or(ExpressionError::UnexpectedEnd)?;
        match &spanned.token {
            Token::Number(n) => Ok(Node::leaf(Expression::Literal(Value::Number(*n)))),
            Token::Str(s) => Ok(Node::leaf(Expression::Literal(Value::Utf8(s.clone())))),
            Token::True => Ok(Node::leaf(Expression::Literal(Value::Bool(true)))),
            Token::False => Ok(Node::leaf(Expression::Literal(Value::Bool(false)))),
            Token::Null => Ok(Node::leaf(Expression::Literal(Value::Null))),
            Token::Ident(name) => Ok(Node::leaf(Expression::Column(name.clone()))),
            Token::LParen => {
                // Formula tokens never include logic, so `or` degrades to `add` there.
                let inner = self.nested(Self::parse_or)?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(unexpected(other)),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            _ => Err(unexpected(spanned)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, Grammar, MAX_DEPTH};
    use crate::error::ExpressionError;
    use crate::expression::ast::{BinaryOperator, Expression};
    use crate::types::Value;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("a + b * 2", Grammar::Formula).unwrap();
        match expr {
            Expression::Binary {
                operator: BinaryOperator::Add,
                right,
                ..
            } => assert!(matches!(
                *right,
                Expression::Binary {
                    operator: BinaryOperator::Multiply,
                    ..
                }
            )),
            other => panic!("expected addition at the root, got {other:?}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("a == 1 OR b == 2 AND c == 3", Grammar::Condition).unwrap();
        assert!(matches!(
            expr,
            Expression::Binary {
                operator: BinaryOperator::Or,
                ..
            }
        ));
    }

    #[test]
    fn parenthesized_literal() {
        assert_eq!(
            parse("(1)", Grammar::Condition).unwrap(),
            Expression::Literal(Value::Number(1.0))
        );
    }

    #[test]
    fn formula_rejects_non_arithmetic_tokens_before_parsing() {
        assert!(matches!(
            parse("price * 2 > 3", Grammar::Formula).unwrap_err(),
            ExpressionError::NotAllowed { .. }
        ));
        assert!(matches!(
            parse("name + 'x'", Grammar::Formula).unwrap_err(),
            ExpressionError::NotAllowed { .. }
        ));
    }

    #[test]
    fn trailing_and_missing_tokens_are_errors() {
        assert!(matches!(
            parse("a == 1 2", Grammar::Condition).unwrap_err(),
            ExpressionError::UnexpectedToken { .. }
        ));
        assert_eq!(
            parse("(a == 1", Grammar::Condition).unwrap_err(),
            ExpressionError::UnexpectedEnd
        );
        assert_eq!(parse("", Grammar::Condition).unwrap_err(), ExpressionError::UnexpectedEnd);
        assert!(parse("a < b < c", Grammar::Condition).is_err());
    }

    #[test]
    fn nesting_past_the_limit_is_rejected() {
        let parens = format!("{}x > 0{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(
            parse(&parens, Grammar::Condition).unwrap_err(),
            ExpressionError::TooDeep { .. }
        ));

        let negations = format!("{}x", "-".repeat(10_000));
        assert!(matches!(
            parse(&negations, Grammar::Formula).unwrap_err(),
            ExpressionError::TooDeep { .. }
        ));

        let nots = format!("{}x", "NOT ".repeat(10_000));
        assert!(matches!(
            parse(&nots, Grammar::Condition).unwrap_err(),
            ExpressionError::TooDeep { .. }
        ));
    }

    #[test]
    fn long_operator_chains_are_bounded_too() {
        let chain = vec!["x"; 10_000].join(" + ");
        assert!(matches!(
            parse(&chain, Grammar::Formula).unwrap_err(),
            ExpressionError::TooDeep { .. }
        ));
    }

    #[test]
    fn nesting_within_the_limit_parses() {
        let depth = MAX_DEPTH / 2;
        let parens = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            parse(&parens, Grammar::Formula).unwrap(),
            Expression::Column("x".to_string())
        );
        assert!(parse(&vec!["x"; 100].join(" * "), Grammar::Formula).is_ok());
    }
}
