use nom::{bytes::complete::take_while1, combinator::map, error::context};

use super::token::{ParserResult, Token};

/// Consumes a run of whitespace (spaces, tabs, newlines) as a single token.
/// The parser filters these out; they exist so the tokenizer covers every
/// input byte and spans stay accurate.
pub fn parse_whitespace(input: &str) -> ParserResult<Token> {
    context(
        "whitespace",
        map(take_while1(char::is_whitespace), |ws: &str| {
            Token::Whitespace(ws.to_string())
        }),
    )(input)
}
