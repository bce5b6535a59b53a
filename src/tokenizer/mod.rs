//! # Tokenizer
//!
//! Lexical analysis for expression source text. [`token::Tokenizer`] turns a
//! source string into a stream of spanned tokens; whitespace is emitted as a
//! token (and filtered by the parser) so that spans cover every input byte.

pub mod literal;
pub mod symbol;
pub mod token;
pub mod whitespace;

pub use token::{Token, TokenSpan, Tokenizer, TokenizerError};
