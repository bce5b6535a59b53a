//! # tickscript
//!
//! An embeddable condition-expression evaluator for tick-driven hosts.
//! Short, human-authored expressions like
//!
//! ```text
//! state.isUnderground && season.current == 'winter'
//! ```
//!
//! are compiled once, cached by source text, and evaluated every simulation
//! tick against live external state exposed through named variable sets.
//!
//! ## Pipeline
//!
//! ```text
//! Source text -> Tokenizer -> Parser -> Expression tree -> Evaluator
//! ```
//!
//! * [`tokenizer`]: lexical analysis with spans for diagnostics
//! * [`parser`]: precedence-climbing recursive descent
//! * [`value`]: the [`Variant`] value model and its coercion rules
//! * [`variable`]: variable sets and tick-cached dynamic variables
//! * [`eval`]: the tree-walking evaluator
//! * [`context`]: the [`ExecutionContext`] owning registry and cache
//!
//! ## Usage
//!
//! ```
//! use tickscript::{ExecutionContext, VariableSet, Variant};
//!
//! let mut context = ExecutionContext::new("conditions");
//! context
//!     .add(VariableSet::new("weather").with_boolean("isRaining", || true))
//!     .unwrap();
//!
//! context.tick(); // once per simulation step
//! assert!(context.check("weather.isRaining"));
//! assert_eq!(context.eval(""), Variant::Boolean(true));
//! ```
//!
//! Evaluation is fail-soft: a bad expression never panics or returns an error
//! from [`ExecutionContext::eval`] — it yields the
//! [`context::ERROR_SENTINEL`] string, which is false in boolean position.

pub mod ast;
pub mod context;
pub mod error;
pub mod eval;
pub mod parser;
pub mod tokenizer;
pub mod value;
pub mod variable;

// Re-exports
pub use context::{ContextConfig, ExecutionContext, ERROR_SENTINEL};
pub use error::{Error, ScriptResult};
pub use value::Variant;
pub use variable::{DynamicVariable, VariableSet};
