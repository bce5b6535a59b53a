//! # Expression Evaluator
//!
//! Walks a compiled [`Expression`] tree against a [`VariableRegistry`],
//! producing a [`Variant`]. Identifiers resolve at evaluation time, so one
//! compiled tree tracks changing variable values across ticks.

use std::cmp::Ordering;

use thiserror::Error;

use crate::ast::{BinaryOperator, Expression, Literal, UnaryOperator};
use crate::value::{CoercionError, Variant};
use crate::variable::VariableRegistry;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unknown variable '{name}'")]
    UnresolvedIdentifier { name: String },
    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

#[derive(Debug, Default)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn eval_expression(
        &self,
        expr: &Expression,
        registry: &VariableRegistry,
    ) -> EvalResult<Variant> {
        match expr {
            Expression::Literal(literal) => Ok(Self::eval_literal(literal)),
            Expression::Variable { set, name } => {
                registry
                    .resolve(set, name)
                    .ok_or_else(|| EvalError::UnresolvedIdentifier {
                        name: format!("{}.{}", set, name),
                    })
            }
            Expression::UnaryOp { op, expr } => self.eval_unary_op(*op, expr, registry),
            Expression::BinaryOp { op, left, right } => {
                self.eval_binary_op(*op, left, right, registry)
            }
        }
    }

    fn eval_literal(literal: &Literal) -> Variant {
        match literal {
            Literal::Number(n) => Variant::Number(*n),
            Literal::String(s) => Variant::String(s.clone()),
            Literal::Boolean(b) => Variant::Boolean(*b),
        }
    }

    fn eval_unary_op(
        &self,
        op: UnaryOperator,
        expr: &Expression,
        registry: &VariableRegistry,
    ) -> EvalResult<Variant> {
        let value = self.eval_expression(expr, registry)?;
        match op {
            UnaryOperator::Not => Ok(Variant::Boolean(!value.as_boolean())),
            UnaryOperator::Negate => Ok(Variant::Number(-value.as_number()?)),
        }
    }

    fn eval_binary_op(
        &self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
        registry: &VariableRegistry,
    ) -> EvalResult<Variant> {
        // && and || short-circuit on the left operand's truthiness.
        match op {
            BinaryOperator::And => {
                let left_val = self.eval_expression(left, registry)?;
                if !left_val.as_boolean() {
                    return Ok(Variant::Boolean(false));
                }
                let right_val = self.eval_expression(right, registry)?;
                return Ok(Variant::Boolean(right_val.as_boolean()));
            }
            BinaryOperator::Or => {
                let left_val = self.eval_expression(left, registry)?;
                if left_val.as_boolean() {
                    return Ok(Variant::Boolean(true));
                }
                let right_val = self.eval_expression(right, registry)?;
                return Ok(Variant::Boolean(right_val.as_boolean()));
            }
            _ => {}
        }

        let left_val = self.eval_expression(left, registry)?;
        let right_val = self.eval_expression(right, registry)?;

        match op {
            BinaryOperator::Add => Ok(left_val.add(&right_val)),
            BinaryOperator::Subtract => self.eval_numeric(&left_val, &right_val, |a, b| a - b),
            BinaryOperator::Multiply => self.eval_numeric(&left_val, &right_val, |a, b| a * b),
            BinaryOperator::Divide => self.eval_numeric(&left_val, &right_val, |a, b| a / b),
            BinaryOperator::Equal => self.eval_comparison(&left_val, &right_val, Ordering::is_eq),
            BinaryOperator::NotEqual => {
                self.eval_comparison(&left_val, &right_val, Ordering::is_ne)
            }
            BinaryOperator::LessThan => {
                self.eval_comparison(&left_val, &right_val, Ordering::is_lt)
            }
            BinaryOperator::LessThanEqual => {
                self.eval_comparison(&left_val, &right_val, Ordering::is_le)
            }
            BinaryOperator::GreaterThan => {
                self.eval_comparison(&left_val, &right_val, Ordering::is_gt)
            }
            BinaryOperator::GreaterThanEqual => {
                self.eval_comparison(&left_val, &right_val, Ordering::is_ge)
            }
            BinaryOperator::And | BinaryOperator::Or => unreachable!("handled above"),
        }
    }

    fn eval_numeric(
        &self,
        left: &Variant,
        right: &Variant,
        apply: impl Fn(f64, f64) -> f64,
    ) -> EvalResult<Variant> {
        Ok(Variant::Number(apply(left.as_number()?, right.as_number()?)))
    }

    /// Comparison through the receiver-kind coercion of [`Variant::compare`].
    fn eval_comparison(
        &self,
        left: &Variant,
        right: &Variant,
        accept: impl Fn(Ordering) -> bool,
    ) -> EvalResult<Variant> {
        Ok(Variant::Boolean(accept(left.compare(right)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::tokenizer::Tokenizer;
    use crate::variable::VariableSet;
    use pretty_assertions::assert_eq;

    fn eval(source: &str, registry: &VariableRegistry) -> EvalResult<Variant> {
        let tokens = Tokenizer::new().tokenize(source).expect("tokenize");
        let expr = parser::parse(&tokens).expect("parse");
        ExpressionEvaluator::new().eval_expression(&expr, registry)
    }

    fn empty() -> VariableRegistry {
        VariableRegistry::new()
    }

    #[test]
    fn test_arithmetic() {
        let registry = empty();
        assert_eq!(eval("1 + 2 * 3", &registry), Ok(Variant::Number(7.0)));
        assert_eq!(eval("(1 + 2) * 3", &registry), Ok(Variant::Number(9.0)));
        assert_eq!(eval("10 / 4", &registry), Ok(Variant::Number(2.5)));
        assert_eq!(eval("-2 + 5", &registry), Ok(Variant::Number(3.0)));
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        let registry = empty();
        assert_eq!(
            eval("1 / 0", &registry),
            Ok(Variant::Number(f64::INFINITY))
        );
    }

    #[test]
    fn test_string_concat() {
        let registry = empty();
        assert_eq!(
            eval("'a' + 'b'", &registry),
            Ok(Variant::String("ab".into()))
        );
        assert_eq!(
            eval("'n=' + 4", &registry),
            Ok(Variant::String("n=4".into()))
        );
    }

    #[test]
    fn test_comparisons() {
        let registry = empty();
        assert_eq!(eval("1 + 2 == 3", &registry), Ok(Variant::Boolean(true)));
        assert_eq!(eval("1 + 2 * 3 == 7", &registry), Ok(Variant::Boolean(true)));
        assert_eq!(eval("2 < 1", &registry), Ok(Variant::Boolean(false)));
        assert_eq!(eval("2 >= 2", &registry), Ok(Variant::Boolean(true)));
        assert_eq!(eval("'abc' != 'abd'", &registry), Ok(Variant::Boolean(true)));
    }

    #[test]
    fn test_receiver_kind_comparison() {
        let registry = empty();
        // Left side String -> right side compared as text "10".
        assert_eq!(eval("'5' < 10", &registry), Ok(Variant::Boolean(false)));
        // Left side Number -> right side parsed as number.
        assert_eq!(eval("5 < '10'", &registry), Ok(Variant::Boolean(true)));
    }

    #[test]
    fn test_logic() {
        let registry = empty();
        assert_eq!(eval("!false && true", &registry), Ok(Variant::Boolean(true)));
        assert_eq!(eval("false || true", &registry), Ok(Variant::Boolean(true)));
        assert_eq!(eval("1 && 'TRUE'", &registry), Ok(Variant::Boolean(true)));
        assert_eq!(eval("0 || 'no'", &registry), Ok(Variant::Boolean(false)));
    }

    #[test]
    fn test_short_circuit_skips_right_side() {
        // The right side would fail with an unresolved identifier if reached.
        let registry = empty();
        assert_eq!(
            eval("false && ghost.var", &registry),
            Ok(Variant::Boolean(false))
        );
        assert_eq!(
            eval("true || ghost.var", &registry),
            Ok(Variant::Boolean(true))
        );
        assert!(eval("true && ghost.var", &registry).is_err());
    }

    #[test]
    fn test_variable_resolution() {
        let mut registry = VariableRegistry::new();
        registry.add(
            VariableSet::new("state")
                .with_boolean("isUnderground", || true)
                .with_number("lightLevel", || 4.0),
        );

        assert_eq!(
            eval("state.isUnderground", &registry),
            Ok(Variant::Boolean(true))
        );
        assert_eq!(
            eval("state.lightLevel < 7", &registry),
            Ok(Variant::Boolean(true))
        );
        assert_eq!(
            eval("state.missing", &registry),
            Err(EvalError::UnresolvedIdentifier {
                name: "state.missing".into()
            })
        );
    }

    #[test]
    fn test_coercion_failure() {
        let registry = empty();
        assert!(matches!(
            eval("'pony' * 2", &registry),
            Err(EvalError::Coercion(_))
        ));
        assert!(matches!(
            eval("-'x'", &registry),
            Err(EvalError::Coercion(_))
        ));
    }
}
