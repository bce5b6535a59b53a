//! # Symbol Token Handling
//!
//! Operators and delimiters of the expression language. Symbols are parsed
//! with a longest-match ordering so that multi-character operators like `>=`
//! or `&&` win over their single-character prefixes.
//!
//! Operator precedence is the parser's concern; this module only recognizes
//! the symbols.

use strum_macros::{AsRefStr, Display, EnumString};

use nom::{branch::alt, bytes::complete::tag, combinator::value, error::context};

use super::token::{ParserResult, Token};

/// Operators recognized by the tokenizer.
#[derive(Debug, Clone, PartialEq, EnumString, Display, AsRefStr)]
pub enum Operator {
    /// Namespace access operator (`.`)
    #[strum(serialize = ".")]
    Dot,

    /// Equality comparison operator (`==`)
    #[strum(serialize = "==")]
    EqualEqual,
    /// Inequality comparison operator (`!=`)
    #[strum(serialize = "!=")]
    NotEqual,
    /// Greater than comparison operator (`>`)
    #[strum(serialize = ">")]
    Greater,
    /// Greater than or equal comparison operator (`>=`)
    #[strum(serialize = ">=")]
    GreaterEqual,
    /// Less than comparison operator (`<`)
    #[strum(serialize = "<")]
    Less,
    /// Less than or equal comparison operator (`<=`)
    #[strum(serialize = "<=")]
    LessEqual,

    /// Addition / concatenation operator (`+`)
    #[strum(serialize = "+")]
    Plus,
    /// Subtraction / negation operator (`-`)
    #[strum(serialize = "-")]
    Minus,
    /// Multiplication operator (`*`)
    #[strum(serialize = "*")]
    Multiply,
    /// Division operator (`/`)
    #[strum(serialize = "/")]
    Divide,

    /// Logical AND operator (`&&`)
    #[strum(serialize = "&&")]
    And,
    /// Logical OR operator (`||`)
    #[strum(serialize = "||")]
    Or,
    /// Logical NOT operator (`!`)
    #[strum(serialize = "!")]
    Not,
}

/// Delimiters recognized by the tokenizer.
#[derive(Debug, Clone, PartialEq, EnumString, Display, AsRefStr)]
pub enum Delimiter {
    /// Opening parenthesis (`(`) for grouping
    #[strum(serialize = "(")]
    OpenParen,
    /// Closing parenthesis (`)`) for grouping
    #[strum(serialize = ")")]
    CloseParen,
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_operator(input: &str) -> ParserResult<Token> {
    // Two-character operators first.
    context(
        "operator",
        nom::combinator::map(
            alt((
                value(Operator::EqualEqual, tag("==")),
                value(Operator::NotEqual, tag("!=")),
                value(Operator::GreaterEqual, tag(">=")),
                value(Operator::LessEqual, tag("<=")),
                value(Operator::And, tag("&&")),
                value(Operator::Or, tag("||")),
                value(Operator::Greater, tag(">")),
                value(Operator::Less, tag("<")),
                value(Operator::Plus, tag("+")),
                value(Operator::Minus, tag("-")),
                value(Operator::Multiply, tag("*")),
                value(Operator::Divide, tag("/")),
                value(Operator::Not, tag("!")),
                value(Operator::Dot, tag(".")),
            )),
            Token::Operator,
        ),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_delimiter(input: &str) -> ParserResult<Token> {
    context(
        "delimiter",
        nom::combinator::map(
            alt((
                value(Delimiter::OpenParen, tag("(")),
                value(Delimiter::CloseParen, tag(")")),
            )),
            Token::Delimiter,
        ),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match() {
        let (rest, token) = parse_operator(">=1").unwrap();
        assert_eq!(token, Token::Operator(Operator::GreaterEqual));
        assert_eq!(rest, "1");

        let (rest, token) = parse_operator("!x").unwrap();
        assert_eq!(token, Token::Operator(Operator::Not));
        assert_eq!(rest, "x");

        let (rest, token) = parse_operator("!=x").unwrap();
        assert_eq!(token, Token::Operator(Operator::NotEqual));
        assert_eq!(rest, "x");
    }

    #[test]
    fn test_display_roundtrip() {
        assert_eq!(Operator::And.to_string(), "&&");
        assert_eq!(Operator::Dot.to_string(), ".");
        assert_eq!(Delimiter::OpenParen.to_string(), "(");
    }
}
