use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    combinator::recognize,
    error::{context, VerboseError},
    sequence::pair,
    IResult,
};
use thiserror::Error;

use super::{
    literal::{parse_literal, Literal},
    symbol::{parse_delimiter, parse_operator, Delimiter, Operator},
    whitespace::parse_whitespace,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    Operator(Operator),
    Delimiter(Delimiter),
    Literal(Literal),
    Whitespace(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Delimiter(d) => write!(f, "{}", d),
            Token::Literal(Literal::Number(n)) => write!(f, "{}", n),
            Token::Literal(Literal::String(s)) => write!(f, "'{}'", s),
            Token::Literal(Literal::Boolean(b)) => write!(f, "{}", b),
            Token::Whitespace(_) => write!(f, "<whitespace>"),
        }
    }
}

/// Splits expression source text into [`TokenSpan`]s, tracking byte offset,
/// line and column for diagnostics.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    current_position: usize,
    current_line: usize,
    current_column: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            current_position: 0,
            current_line: 1,   // 1-based
            current_column: 1, // 1-based
        }
    }

    #[tracing::instrument(level = "debug", skip(input))]
    pub fn tokenize(&mut self, input: &str) -> TokenizerResult<Vec<TokenSpan>> {
        let mut tokens = Vec::new();
        let mut remaining = input;

        while !remaining.is_empty() {
            let start_position = self.current_position;
            let start_line = self.current_line;
            let start_column = self.current_column;

            let result = alt((
                parse_whitespace,
                parse_literal,
                parse_operator,
                parse_delimiter,
                parse_identifier,
            ))(remaining);

            match result {
                Ok((new_remaining, token)) => {
                    let consumed = &remaining[..(remaining.len() - new_remaining.len())];
                    self.update_position(consumed);

                    tokens.push(TokenSpan {
                        token,
                        span: Span {
                            start: start_position,
                            end: self.current_position,
                            line: start_line,
                            column: start_column,
                        },
                    });

                    remaining = new_remaining;
                }
                Err(e) => {
                    let found = remaining.chars().take(20).collect::<String>();
                    let span = Span {
                        start: self.current_position,
                        end: self.current_position + 1,
                        line: self.current_line,
                        column: self.current_column,
                    };
                    let error = match e {
                        nom::Err::Incomplete(e) => TokenizerError::ParseError {
                            message: format!("Incomplete input, {:?}", e),
                            found,
                            span,
                        },
                        nom::Err::Error(e) | nom::Err::Failure(e) => TokenizerError::ParseError {
                            message: nom::error::convert_error(remaining, e),
                            found,
                            span,
                        },
                    };
                    tracing::debug!("{}", error);
                    return Err(error);
                }
            }
        }

        Ok(tokens)
    }

    fn update_position(&mut self, text: &str) {
        for c in text.chars() {
            self.current_position += c.len_utf8();
            if c == '\n' {
                self.current_line += 1;
                self.current_column = 1;
            } else {
                self.current_column += 1;
            }
        }
    }
}

/// A token plus where it came from in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub span: Span,
}

/// Byte offsets plus 1-based line/column of a source region.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (offset {}..{})",
            self.line, self.column, self.start, self.end
        )
    }
}

fn parse_identifier(input: &str) -> ParserResult<Token> {
    let (input, id) = context(
        "identifier",
        recognize(pair(
            take_while1(|c: char| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
    )(input)?;

    // The boolean literals are the language's only keywords.
    let token = match id {
        "true" => Token::Literal(Literal::Boolean(true)),
        "false" => Token::Literal(Literal::Boolean(false)),
        _ => Token::Identifier(id.to_string()),
    };
    Ok((input, token))
}

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub type TokenizerResult<T> = Result<T, TokenizerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizerError {
    #[error("tokenize error: {message} at {span}")]
    ParseError {
        message: String,
        found: String,
        span: Span,
    },
}
