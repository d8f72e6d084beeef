//! Tree-walking evaluator over `serde_json::Value` operands.

use serde_json::{Number, Value};
use thiserror::Error;

use super::{BinaryOp, Expr, UnaryOp};

/// Evaluation failure: unknown name, or a type/arithmetic error. These are
/// propagated to the caller, never swallowed.
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("'{0}' is not defined")]
    Undefined(String),
    #[error("unsupported operand types for '{op}': {lhs} and {rhs}")]
    BinaryType {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("unsupported operand type for '{op}': {operand}")]
    UnaryType {
        op: &'static str,
        operand: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("string repetition count must be non-negative")]
    NegativeRepeat,
}

/// JSON type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

enum Num {
    Int(i64),
    Float(f64),
}

fn as_num(value: &Value) -> Option<Num> {
    let number = value.as_number()?;
    if let Some(i) = number.as_i64() {
        Some(Num::Int(i))
    } else {
        number.as_f64().map(Num::Float)
    }
}

fn float_value(v: f64) -> Result<Value, EvalError> {
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or(EvalError::NonFinite)
}

/// Evaluate `expr`, resolving free variables through `lookup`.
pub fn evaluate<F>(expr: &Expr, lookup: &F) -> Result<Value, EvalError>
where
    F: Fn(&str) -> Option<Value>,
{
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Var(name) => lookup(name).ok_or_else(|| EvalError::Undefined(name.clone())),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, lookup)?;
            apply_unary(*op, &value)
        }
        Expr::Binary { op, lhs, rhs } => apply_binary(*op, lhs, rhs, lookup),
    }
}

fn apply_unary(op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => match as_num(value) {
            Some(Num::Int(i)) => i
                .checked_neg()
                .map(|n| Value::Number(Number::from(n)))
                .ok_or(EvalError::Overflow),
            Some(Num::Float(f)) => float_value(-f),
            None => Err(EvalError::UnaryType {
                op: "-",
                operand: type_name(value),
            }),
        },
        UnaryOp::Not => match value {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(EvalError::UnaryType {
                op: "not",
                operand: type_name(other),
            }),
        },
    }
}

fn apply_binary<F>(op: BinaryOp, lhs: &Expr, rhs: &Expr, lookup: &F) -> Result<Value, EvalError>
where
    F: Fn(&str) -> Option<Value>,
{
    // Boolean operators short-circuit; the right operand is not evaluated
    // when the left already decides the result.
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        let left = evaluate(lhs, lookup)?;
        let Value::Bool(l) = left else {
            return Err(EvalError::BinaryType {
                op: op.symbol(),
                lhs: type_name(&left),
                rhs: "?",
            });
        };
        match (op, l) {
            (BinaryOp::And, false) => return Ok(Value::Bool(false)),
            (BinaryOp::Or, true) => return Ok(Value::Bool(true)),
            _ => {}
        }
        let right = evaluate(rhs, lookup)?;
        return match right {
            Value::Bool(r) => Ok(Value::Bool(r)),
            other => Err(EvalError::BinaryType {
                op: op.symbol(),
                lhs: "boolean",
                rhs: type_name(&other),
            }),
        };
    }

    let left = evaluate(lhs, lookup)?;
    let right = evaluate(rhs, lookup)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(&left, &right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(op, &left, &right)?;
            Ok(Value::Bool(ordering))
        }
        BinaryOp::Add => add(&left, &right),
        BinaryOp::Sub => arith(op, &left, &right, i64::checked_sub, |a, b| a - b),
        BinaryOp::Mul => mul(&left, &right),
        BinaryOp::Div => div(&left, &right),
        BinaryOp::Mod => rem(&left, &right),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

/// Numeric equality crosses the int/float representation split; everything
/// else falls back to structural equality.
fn values_equal(left: &Value, right: &Value) -> bool {
    if let (Some(l), Some(r)) = (as_num(left), as_num(right)) {
        return match (l, r) {
            (Num::Int(a), Num::Int(b)) => a == b,
            (Num::Int(a), Num::Float(b)) | (Num::Float(b), Num::Int(a)) => a as f64 == b,
            (Num::Float(a), Num::Float(b)) => a == b,
        };
    }
    left == right
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => a.partial_cmp(b),
        _ => match (as_num(left), as_num(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => a.partial_cmp(&b),
            (Some(l), Some(r)) => {
                let a = match l {
                    Num::Int(i) => i as f64,
                    Num::Float(f) => f,
                };
                let b = match r {
                    Num::Int(i) => i as f64,
                    Num::Float(f) => f,
                };
                a.partial_cmp(&b)
            }
            _ => None,
        },
    };
    let Some(ordering) = ordering else {
        return Err(EvalError::BinaryType {
            op: op.symbol(),
            lhs: type_name(left),
            rhs: type_name(right),
        });
    };
    Ok(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => unreachable!("compare only handles ordering operators"),
    })
}

fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        let mut s = a.clone();
        s.push_str(b);
        return Ok(Value::String(s));
    }
    arith(BinaryOp::Add, left, right, i64::checked_add, |a, b| a + b)
}

fn mul(left: &Value, right: &Value) -> Result<Value, EvalError> {
    // String repetition, either operand order
    match (left, right) {
        (Value::String(s), n @ Value::Number(_)) | (n @ Value::Number(_), Value::String(s)) => {
            match as_num(n) {
                Some(Num::Int(count)) if count >= 0 => Ok(Value::String(s.repeat(count as usize))),
                Some(Num::Int(_)) => Err(EvalError::NegativeRepeat),
                _ => Err(EvalError::BinaryType {
                    op: "*",
                    lhs: type_name(left),
                    rhs: type_name(right),
                }),
            }
        }
        _ => arith(BinaryOp::Mul, left, right, i64::checked_mul, |a, b| a * b),
    }
}

fn div(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (as_num(left), as_num(right)) {
        (Some(l), Some(r)) => {
            let a = match l {
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
            };
            let b = match r {
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
            };
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            // Division always yields a float, even for evenly divisible ints
            float_value(a / b)
        }
        _ => Err(EvalError::BinaryType {
            op: "/",
            lhs: type_name(left),
            rhs: type_name(right),
        }),
    }
}

fn rem(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (as_num(left), as_num(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_rem(b)
                .map(|n| Value::Number(Number::from(n)))
                .ok_or(EvalError::Overflow)
        }
        (Some(l), Some(r)) => {
            let a = match l {
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
            };
            let b = match r {
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
            };
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            float_value(a % b)
        }
        _ => Err(EvalError::BinaryType {
            op: "%",
            lhs: type_name(left),
            rhs: type_name(right),
        }),
    }
}

fn arith(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match (as_num(left), as_num(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => int_op(a, b)
            .map(|n| Value::Number(Number::from(n)))
            .ok_or(EvalError::Overflow),
        (Some(l), Some(r)) => {
            let a = match l {
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
            };
            let b = match r {
                Num::Int(i) => i as f64,
                Num::Float(f) => f,
            };
            float_value(float_op(a, b))
        }
        _ => Err(EvalError::BinaryType {
            op: op.symbol(),
            lhs: type_name(left),
            rhs: type_name(right),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use serde_json::json;

    fn eval(source: &str) -> Result<Value, EvalError> {
        evaluate(&parse(source).unwrap(), &|_| None)
    }

    fn eval_with(source: &str, vars: &[(&str, Value)]) -> Result<Value, EvalError> {
        evaluate(&parse(source).unwrap(), &|name| {
            vars.iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(eval("2 + 3 * 4").unwrap(), json!(14));
        assert_eq!(eval("7 % 4").unwrap(), json!(3));
    }

    #[test]
    fn division_always_yields_float() {
        assert_eq!(eval("6 / 3").unwrap(), json!(2.0));
        assert_eq!(eval("3 / 2").unwrap(), json!(1.5));
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(eval("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("1 % 0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        assert_eq!(eval("1 + 0.5").unwrap(), json!(1.5));
    }

    #[test]
    fn string_concat_and_repeat() {
        assert_eq!(eval("'ab' + 'cd'").unwrap(), json!("abcd"));
        assert_eq!(eval("'a' * 3").unwrap(), json!("aaa"));
        assert_eq!(eval("3 * 'a'").unwrap(), json!("aaa"));
        assert_eq!(eval("'a' * -1"), Err(EvalError::NegativeRepeat));
    }

    #[test]
    fn string_plus_number_is_a_type_error() {
        assert_eq!(
            eval("'a' + 1"),
            Err(EvalError::BinaryType {
                op: "+",
                lhs: "string",
                rhs: "number",
            })
        );
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("1 < 2").unwrap(), json!(true));
        assert_eq!(eval("2.5 >= 2").unwrap(), json!(true));
        assert_eq!(eval("'abc' < 'abd'").unwrap(), json!(true));
        assert!(eval("'a' < 1").is_err());
    }

    #[test]
    fn numeric_equality_crosses_int_and_float() {
        assert_eq!(eval("1 == 1.0").unwrap(), json!(true));
        assert_eq!(eval("1 != 2").unwrap(), json!(true));
    }

    #[test]
    fn boolean_operators_short_circuit() {
        assert_eq!(eval("false and 1 / 0 == 0").unwrap(), json!(false));
        assert_eq!(eval("true or 1 / 0 == 0").unwrap(), json!(true));
        assert_eq!(eval("not false").unwrap(), json!(true));
        assert!(eval("1 and true").is_err());
    }

    #[test]
    fn variables_resolve_through_lookup() {
        assert_eq!(
            eval_with("a * 2 + b", &[("a", json!(3)), ("b", json!(1))]).unwrap(),
            json!(7)
        );
        assert_eq!(
            eval_with("a", &[]),
            Err(EvalError::Undefined("a".to_string()))
        );
    }

    #[test]
    fn unary_minus() {
        assert_eq!(eval("-3 + 5").unwrap(), json!(2));
        assert_eq!(eval("-(2.5)").unwrap(), json!(-2.5));
        assert!(eval("-'a'").is_err());
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            eval("9223372036854775807 + 1"),
            Err(EvalError::Overflow)
        );
    }
}
