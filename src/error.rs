use thiserror::Error;

use crate::context::ContextError;
use crate::eval::EvalError;
use crate::parser::ParseError;
use crate::tokenizer::TokenizerError;

/// Any failure the crate can produce, one variant per pipeline stage.
///
/// `Clone` because the execution context caches failed compiles and hands the
/// same error back on repeat compiles of known-bad source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Tokenize error: {0}")]
    Tokenize(#[from] TokenizerError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Eval error: {0}")]
    Eval(#[from] EvalError),
    #[error("Context error: {0}")]
    Context(#[from] ContextError),
}

pub type ScriptResult<T> = Result<T, Error>;
