//! # Expression Parser
//!
//! Recursive descent over the token stream, one function per precedence
//! level (tightest first):
//!
//! ```text
//! unary > multiplicative > additive > relational > equality > && > ||
//! ```
//!
//! Binary levels are left-associative: each level parses its operand level
//! once, then folds `(operator, operand)` repetitions into a left-leaning
//! tree. Every function takes the token slice plus a cursor and returns the
//! advanced cursor with the parsed node.

use thiserror::Error;

use crate::ast::{self, BinaryOperator, Expression, UnaryOperator};
use crate::tokenizer::literal::Literal;
use crate::tokenizer::symbol::{Delimiter, Operator};
use crate::tokenizer::token::{Span, Token, TokenSpan};

pub type ParseResult<O> = Result<(usize, O), ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected token {found} at {span}")]
    UnexpectedToken { found: String, span: Span },
    #[error("unexpected end of expression")]
    UnexpectedEof,
    #[error("expected {expected}, found {found} at {span}")]
    Expected {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("trailing input {found} at {span}")]
    TrailingInput { found: String, span: Span },
}

/// Parses a full expression; the whole token stream must be consumed.
#[tracing::instrument(level = "debug", skip(tokens))]
pub fn parse(tokens: &[TokenSpan]) -> Result<Expression, ParseError> {
    let significant: Vec<TokenSpan> = tokens
        .iter()
        .filter(|t| !matches!(t.token, Token::Whitespace(_)))
        .cloned()
        .collect();

    let (pos, expression) = parse_logical_or(&significant, 0)?;
    match significant.get(pos) {
        None => Ok(expression),
        Some(extra) => Err(ParseError::TrailingInput {
            found: extra.token.to_string(),
            span: extra.span.clone(),
        }),
    }
}

fn parse_logical_or(tokens: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
    let (mut pos, mut left) = parse_logical_and(tokens, pos)?;
    while let Some(op) = binary_operator_at(tokens, pos, &[(Operator::Or, BinaryOperator::Or)]) {
        let (next, right) = parse_logical_and(tokens, pos + 1)?;
        left = fold(op, left, right);
        pos = next;
    }
    Ok((pos, left))
}

fn parse_logical_and(tokens: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
    let (mut pos, mut left) = parse_equality(tokens, pos)?;
    while let Some(op) = binary_operator_at(tokens, pos, &[(Operator::And, BinaryOperator::And)]) {
        let (next, right) = parse_equality(tokens, pos + 1)?;
        left = fold(op, left, right);
        pos = next;
    }
    Ok((pos, left))
}

fn parse_equality(tokens: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
    const OPS: &[(Operator, BinaryOperator)] = &[
        (Operator::EqualEqual, BinaryOperator::Equal),
        (Operator::NotEqual, BinaryOperator::NotEqual),
    ];
    let (mut pos, mut left) = parse_relational(tokens, pos)?;
    while let Some(op) = binary_operator_at(tokens, pos, OPS) {
        let (next, right) = parse_relational(tokens, pos + 1)?;
        left = fold(op, left, right);
        pos = next;
    }
    Ok((pos, left))
}

fn parse_relational(tokens: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
    const OPS: &[(Operator, BinaryOperator)] = &[
        (Operator::Less, BinaryOperator::LessThan),
        (Operator::LessEqual, BinaryOperator::LessThanEqual),
        (Operator::Greater, BinaryOperator::GreaterThan),
        (Operator::GreaterEqual, BinaryOperator::GreaterThanEqual),
    ];
    let (mut pos, mut left) = parse_additive(tokens, pos)?;
    while let Some(op) = binary_operator_at(tokens, pos, OPS) {
        let (next, right) = parse_additive(tokens, pos + 1)?;
        left = fold(op, left, right);
        pos = next;
    }
    Ok((pos, left))
}

fn parse_additive(tokens: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
    const OPS: &[(Operator, BinaryOperator)] = &[
        (Operator::Plus, BinaryOperator::Add),
        (Operator::Minus, BinaryOperator::Subtract),
    ];
    let (mut pos, mut left) = parse_multiplicative(tokens, pos)?;
    while let Some(op) = binary_operator_at(tokens, pos, OPS) {
        let (next, right) = parse_multiplicative(tokens, pos + 1)?;
        left = fold(op, left, right);
        pos = next;
    }
    Ok((pos, left))
}

fn parse_multiplicative(tokens: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
    const OPS: &[(Operator, BinaryOperator)] = &[
        (Operator::Multiply, BinaryOperator::Multiply),
        (Operator::Divide, BinaryOperator::Divide),
    ];
    let (mut pos, mut left) = parse_unary(tokens, pos)?;
    while let Some(op) = binary_operator_at(tokens, pos, OPS) {
        let (next, right) = parse_unary(tokens, pos + 1)?;
        left = fold(op, left, right);
        pos = next;
    }
    Ok((pos, left))
}

fn parse_unary(tokens: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
    match tokens.get(pos).map(|t| &t.token) {
        Some(Token::Operator(Operator::Not)) => {
            let (next, expr) = parse_unary(tokens, pos + 1)?;
            Ok((
                next,
                Expression::UnaryOp {
                    op: UnaryOperator::Not,
                    expr: Box::new(expr),
                },
            ))
        }
        Some(Token::Operator(Operator::Minus)) => {
            let (next, expr) = parse_unary(tokens, pos + 1)?;
            Ok((
                next,
                Expression::UnaryOp {
                    op: UnaryOperator::Negate,
                    expr: Box::new(expr),
                },
            ))
        }
        _ => parse_primary(tokens, pos),
    }
}

fn parse_primary(tokens: &[TokenSpan], pos: usize) -> ParseResult<Expression> {
    let current = tokens.get(pos).ok_or(ParseError::UnexpectedEof)?;
    match &current.token {
        Token::Literal(literal) => Ok((pos + 1, Expression::Literal(convert_literal(literal)))),
        Token::Delimiter(Delimiter::OpenParen) => {
            let (pos, inner) = parse_logical_or(tokens, pos + 1)?;
            let pos = expect_delimiter(tokens, pos, Delimiter::CloseParen)?;
            Ok((pos, inner))
        }
        Token::Identifier(set) => {
            let pos = expect_operator(tokens, pos + 1, Operator::Dot)?;
            let current = tokens.get(pos).ok_or(ParseError::UnexpectedEof)?;
            match &current.token {
                Token::Identifier(name) => Ok((
                    pos + 1,
                    Expression::Variable {
                        set: set.clone(),
                        name: name.clone(),
                    },
                )),
                other => Err(ParseError::Expected {
                    expected: "identifier".to_string(),
                    found: other.to_string(),
                    span: current.span.clone(),
                }),
            }
        }
        other => Err(ParseError::UnexpectedToken {
            found: other.to_string(),
            span: current.span.clone(),
        }),
    }
}

fn binary_operator_at(
    tokens: &[TokenSpan],
    pos: usize,
    table: &[(Operator, BinaryOperator)],
) -> Option<BinaryOperator> {
    match tokens.get(pos).map(|t| &t.token) {
        Some(Token::Operator(op)) => table
            .iter()
            .find(|(symbol, _)| symbol == op)
            .map(|(_, mapped)| *mapped),
        _ => None,
    }
}

fn fold(op: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn expect_operator(tokens: &[TokenSpan], pos: usize, expected: Operator) -> Result<usize, ParseError> {
    let current = tokens.get(pos).ok_or(ParseError::UnexpectedEof)?;
    match &current.token {
        Token::Operator(op) if *op == expected => Ok(pos + 1),
        other => Err(ParseError::Expected {
            expected: format!("'{}'", expected),
            found: other.to_string(),
            span: current.span.clone(),
        }),
    }
}

fn expect_delimiter(
    tokens: &[TokenSpan],
    pos: usize,
    expected: Delimiter,
) -> Result<usize, ParseError> {
    let current = tokens.get(pos).ok_or(ParseError::UnexpectedEof)?;
    match &current.token {
        Token::Delimiter(d) if *d == expected => Ok(pos + 1),
        other => Err(ParseError::Expected {
            expected: format!("'{}'", expected),
            found: other.to_string(),
            span: current.span.clone(),
        }),
    }
}

fn convert_literal(literal: &Literal) -> ast::Literal {
    match literal {
        Literal::Number(n) => ast::Literal::Number(*n),
        Literal::String(s) => ast::Literal::String(s.clone()),
        Literal::Boolean(b) => ast::Literal::Boolean(*b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use pretty_assertions::assert_eq;

    fn parse_source(source: &str) -> Result<Expression, ParseError> {
        let tokens = Tokenizer::new().tokenize(source).expect("tokenize");
        parse(&tokens)
    }

    fn number(n: f64) -> Expression {
        Expression::Literal(ast::Literal::Number(n))
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_source("42").unwrap(), number(42.0));
        assert_eq!(
            parse_source("'abc'").unwrap(),
            Expression::Literal(ast::Literal::String("abc".into()))
        );
        assert_eq!(
            parse_source("true").unwrap(),
            Expression::Literal(ast::Literal::Boolean(true))
        );
    }

    #[test]
    fn test_variable_reference() {
        assert_eq!(
            parse_source("state.isUnderground").unwrap(),
            Expression::Variable {
                set: "state".into(),
                name: "isUnderground".into(),
            }
        );
    }

    #[test]
    fn test_bare_identifier_rejected() {
        assert!(matches!(
            parse_source("isUnderground"),
            Err(ParseError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_precedence_mul_over_add() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        assert_eq!(
            parse_source("1 + 2 * 3").unwrap(),
            Expression::BinaryOp {
                op: BinaryOperator::Add,
                left: Box::new(number(1.0)),
                right: Box::new(Expression::BinaryOp {
                    op: BinaryOperator::Multiply,
                    left: Box::new(number(2.0)),
                    right: Box::new(number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn test_relational_binds_tighter_than_equality() {
        // a.b == 1 < 2 parses as a.b == (1 < 2)
        let parsed = parse_source("a.b == 1 < 2").unwrap();
        match parsed {
            Expression::BinaryOp { op, right, .. } => {
                assert_eq!(op, BinaryOperator::Equal);
                assert!(matches!(
                    *right,
                    Expression::BinaryOp {
                        op: BinaryOperator::LessThan,
                        ..
                    }
                ));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        // 1 - 2 - 3 parses as (1 - 2) - 3
        assert_eq!(
            parse_source("1 - 2 - 3").unwrap(),
            Expression::BinaryOp {
                op: BinaryOperator::Subtract,
                left: Box::new(Expression::BinaryOp {
                    op: BinaryOperator::Subtract,
                    left: Box::new(number(1.0)),
                    right: Box::new(number(2.0)),
                }),
                right: Box::new(number(3.0)),
            }
        );
    }

    #[test]
    fn test_logical_precedence() {
        // a.x || b.y && c.z parses as a.x || (b.y && c.z)
        let parsed = parse_source("a.x || b.y && c.z").unwrap();
        match parsed {
            Expression::BinaryOp { op, right, .. } => {
                assert_eq!(op, BinaryOperator::Or);
                assert!(matches!(
                    *right,
                    Expression::BinaryOp {
                        op: BinaryOperator::And,
                        ..
                    }
                ));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_unary() {
        assert_eq!(
            parse_source("!true").unwrap(),
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                expr: Box::new(Expression::Literal(ast::Literal::Boolean(true))),
            }
        );
        assert_eq!(
            parse_source("--1").unwrap(),
            Expression::UnaryOp {
                op: UnaryOperator::Negate,
                expr: Box::new(Expression::UnaryOp {
                    op: UnaryOperator::Negate,
                    expr: Box::new(number(1.0)),
                }),
            }
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(
            parse_source("(1 + 2) * 3").unwrap(),
            Expression::BinaryOp {
                op: BinaryOperator::Multiply,
                left: Box::new(Expression::BinaryOp {
                    op: BinaryOperator::Add,
                    left: Box::new(number(1.0)),
                    right: Box::new(number(2.0)),
                }),
                right: Box::new(number(3.0)),
            }
        );
    }

    #[test]
    fn test_unbalanced_paren() {
        assert!(matches!(
            parse_source("(1 + 2"),
            Err(ParseError::UnexpectedEof)
        ));
        assert!(matches!(
            parse_source("1 + 2)"),
            Err(ParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_error_carries_position() {
        let err = parse_source("1 + * 2").unwrap_err();
        match err {
            ParseError::UnexpectedToken { found, span } => {
                assert_eq!(found, "*");
                assert_eq!(span.column, 5);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_realistic_condition() {
        let parsed =
            parse_source("state.isUnderground && (weather.isRaining || season.isWinter)");
        assert!(parsed.is_ok());
    }
}
