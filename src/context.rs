//! # Execution Context
//!
//! Owns the variable registry and the compiled-expression cache, and exposes
//! the `tick`/`eval`/`check` contract the host drives:
//!
//! * [`ExecutionContext::tick`] once per simulation step, before that step's
//!   evaluations — marks every dynamic variable stale.
//! * [`ExecutionContext::eval`] compiles-or-fetches and evaluates. It never
//!   propagates errors: any failure yields the [`ERROR_SENTINEL`] string
//!   Variant, which reads as false in boolean position.
//! * [`ExecutionContext::check`] is the boolean convenience the condition
//!   façade consumes.
//!
//! Expressions are cached by exact source text and never evicted; the
//! authored condition set is small and bounded.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::Expression;
use crate::error::{Error, ScriptResult};
use crate::eval::ExpressionEvaluator;
use crate::parser;
use crate::tokenizer::Tokenizer;
use crate::value::Variant;
use crate::variable::{VariableRegistry, VariableSet};

/// Failure stand-in returned by `eval`. Deliberately not `TRUE` under the
/// string-truthiness rule, so misauthored conditions read as false instead of
/// crashing or firing.
pub const ERROR_SENTINEL: &str = "<ERROR>";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Context name used to scope log lines when a host runs several
    /// evaluators (e.g. one per logical domain).
    #[serde(default = "default_name")]
    pub name: String,

    /// Expected number of distinct authored expressions; pre-sizes the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Log each swallowed evaluation error only once per distinct source
    /// string. A bad condition is evaluated every tick; without this the log
    /// fills with the same line.
    #[serde(default = "default_log_once")]
    pub log_once_per_source: bool,
}

fn default_name() -> String {
    "conditions".to_string()
}

fn default_cache_capacity() -> usize {
    64
}

fn default_log_once() -> bool {
    true
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            cache_capacity: default_cache_capacity(),
            log_once_per_source: default_log_once(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("variable set '{0}' already defined")]
    DuplicateSet(String),
}

/// A cached compile outcome. Syntax errors are deterministic for a given
/// source string, so failed compiles are cached too and never re-parsed.
#[derive(Clone)]
enum CacheEntry {
    Compiled(Arc<Expression>),
    Failed(Error),
}

pub struct ExecutionContext {
    config: ContextConfig,
    registry: VariableRegistry,
    evaluator: ExpressionEvaluator,
    compiled: DashMap<String, CacheEntry>,
    reported: DashSet<String>,
}

impl ExecutionContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(ContextConfig {
            name: name.into(),
            ..ContextConfig::default()
        })
    }

    pub fn with_config(config: ContextConfig) -> Self {
        let compiled = DashMap::with_capacity(config.cache_capacity);
        Self {
            config,
            registry: VariableRegistry::new(),
            evaluator: ExpressionEvaluator::new(),
            compiled,
            reported: DashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Registers a variable set. The namespace must be unique within this
    /// context; sets cannot be replaced once registered.
    pub fn add(&mut self, set: VariableSet) -> Result<(), ContextError> {
        if self.registry.contains(set.name()) {
            return Err(ContextError::DuplicateSet(set.name().to_string()));
        }
        tracing::debug!(context = %self.config.name, set = set.name(), "variable set registered");
        self.registry.add(set);
        Ok(())
    }

    /// Marks every dynamic variable stale. Call exactly once per simulation
    /// step, before any `eval`/`check` for that step.
    pub fn tick(&self) {
        self.registry.update();
    }

    /// Compiles `source`, caching the result (success or failure) by exact
    /// source text. Propagates syntax errors: this is the authoring-time
    /// validation surface for configuration loaders.
    pub fn compile(&self, source: &str) -> ScriptResult<Arc<Expression>> {
        if let Some(entry) = self.compiled.get(source) {
            return match entry.value() {
                CacheEntry::Compiled(expr) => Ok(expr.clone()),
                CacheEntry::Failed(err) => Err(err.clone()),
            };
        }

        let entry = match self.compile_uncached(source) {
            Ok(expr) => CacheEntry::Compiled(Arc::new(expr)),
            Err(err) => CacheEntry::Failed(err),
        };
        self.compiled.insert(source.to_string(), entry.clone());
        match entry {
            CacheEntry::Compiled(expr) => Ok(expr),
            CacheEntry::Failed(err) => Err(err),
        }
    }

    fn compile_uncached(&self, source: &str) -> ScriptResult<Expression> {
        let tokens = Tokenizer::new().tokenize(source)?;
        let expression = parser::parse(&tokens)?;
        Ok(expression)
    }

    /// Evaluates `source` against the current variable values.
    ///
    /// Empty or all-whitespace source is the literal `true`. Failures of any
    /// kind (syntax, unresolved identifier, coercion) are logged and yield
    /// the sentinel Variant instead of propagating.
    pub fn eval(&self, source: &str) -> Variant {
        if source.trim().is_empty() {
            return Variant::Boolean(true);
        }

        let expression = match self.compile(source) {
            Ok(expression) => expression,
            Err(err) => {
                self.report(source, &err);
                return self.failure();
            }
        };

        match self.evaluator.eval_expression(&expression, &self.registry) {
            Ok(value) => value,
            Err(err) => {
                self.report(source, &Error::from(err));
                self.failure()
            }
        }
    }

    /// True only if `source` evaluates to the Boolean `true` Variant; any
    /// other kind, including the failure sentinel, is false.
    pub fn check(&self, source: &str) -> bool {
        matches!(self.eval(source), Variant::Boolean(true))
    }

    fn failure(&self) -> Variant {
        Variant::String(ERROR_SENTINEL.to_string())
    }

    fn report(&self, source: &str, err: &Error) {
        if self.config.log_once_per_source && !self.reported.insert(source.to_string()) {
            return;
        }
        tracing::error!(context = %self.config.name, source, "expression failed: {}", err);
    }
}
