use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit1},
    combinator::{map, map_res, opt, recognize},
    error::context,
    sequence::{delimited, pair, preceded},
};

use super::token::{ParserResult, Token};

/// Literal values produced by the tokenizer.
///
/// Booleans are recognized by the identifier parser (`true`/`false` are the
/// only keywords of the language); this module handles numbers and quoted
/// strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_number_literal(input: &str) -> ParserResult<Literal> {
    // No leading sign: negation is a unary operator in the parser.
    context(
        "number literal",
        map_res(
            recognize(pair(digit1, opt(preceded(char('.'), digit1)))),
            |s: &str| s.parse::<f64>().map(Literal::Number),
        ),
    )(input)
}

fn quoted(quote: char) -> impl Fn(&str) -> ParserResult<Literal> {
    move |input: &str| {
        map(
            delimited(
                char(quote),
                take_while(move |c: char| c != quote && c != '\n' && c != '\r'),
                char(quote),
            ),
            |content: &str| Literal::String(content.to_string()),
        )(input)
    }
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_string_literal(input: &str) -> ParserResult<Literal> {
    // Condition strings are authored inside JSON, so single quotes are the
    // common form; double quotes are accepted as well. No escape sequences.
    context("string literal", alt((quoted('\''), quoted('"'))))(input)
}

#[tracing::instrument(level = "debug", skip(input))]
pub fn parse_literal(input: &str) -> ParserResult<Token> {
    context(
        "literal",
        map(
            alt((parse_string_literal, parse_number_literal)),
            Token::Literal,
        ),
    )(input)
}
