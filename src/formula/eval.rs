use std::collections::HashMap;

use super::parser::{BinaryOp, Expr, Function};
use crate::errors::{NotaDezError, Result};

/// 四舍五入到两位小数（远离零）
///
/// 先在 1e-6 精度上消除二进制表示误差，避免 `2.675` 被舍成 `2.67`。
pub fn round2(value: f64) -> f64 {
    let scaled = ((value * 100.0) * 1e6).round() / 1e6;
    let rounded = scaled.round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// 求值表达式
///
/// `values` 中存在但为 `None` 的缩写表示尚未录入成绩，整体结果为 `None`；
/// 不存在的缩写视为未知标识符。
pub fn evaluate(expr: &Expr, values: &HashMap<String, Option<f64>>) -> Result<Option<f64>> {
    let result = match expr {
        Expr::Number(n) => Some(*n),
        Expr::Component(name) => match values.get(name) {
            Some(value) => *value,
            None => {
                return Err(NotaDezError::formula(format!(
                    "Unknown abbreviation '{name}'"
                )));
            }
        },
        Expr::Neg(inner) => evaluate(inner, values)?.map(|v| -v),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = evaluate(lhs, values)?;
            let rhs = evaluate(rhs, values)?;
            match (lhs, rhs) {
                (Some(a), Some(b)) => Some(apply(*op, a, b)?),
                _ => None,
            }
        }
        Expr::Call { func, args } => {
            let mut operands = Vec::with_capacity(args.len());
            let mut pending = false;
            for arg in args {
                match evaluate(arg, values)? {
                    Some(v) => operands.push(v),
                    None => pending = true,
                }
            }
            if pending {
                None
            } else {
                Some(call(*func, &operands))
            }
        }
    };

    match result {
        Some(v) if !v.is_finite() => Err(NotaDezError::formula(
            "Formula produced a non-finite result",
        )),
        other => Ok(other),
    }
}

fn apply(op: BinaryOp, a: f64, b: f64) -> Result<f64> {
    Ok(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(NotaDezError::formula("Division by zero"));
            }
            a / b
        }
    })
}

fn call(func: Function, operands: &[f64]) -> f64 {
    match func {
        Function::Min => operands.iter().copied().fold(f64::INFINITY, f64::min),
        Function::Max => operands.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Function::Sum => operands.iter().sum(),
        Function::Avg => operands.iter().sum::<f64>() / operands.len() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parser::parse;

    fn values(pairs: &[(&str, Option<f64>)]) -> HashMap<String, Option<f64>> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(-1.005), -1.01);
        assert_eq!(round2(7.333333), 7.33);
        assert_eq!(round2(-0.001), 0.0);
    }

    #[test]
    fn test_evaluate_weighted_formula() {
        let expr = parse("(P1 * 0.4) + (P2 * 0.6)").unwrap();
        let result = evaluate(&expr, &values(&[("P1", Some(7.0)), ("P2", Some(8.0))])).unwrap();
        assert!((result.unwrap() - 7.6).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_functions() {
        let expr = parse("MAX(P1, P2) + min(T1, T2) / 2").unwrap();
        let vals = values(&[
            ("P1", Some(5.0)),
            ("P2", Some(9.0)),
            ("T1", Some(4.0)),
            ("T2", Some(2.0)),
        ]);
        assert_eq!(evaluate(&expr, &vals).unwrap(), Some(10.0));

        let expr = parse("AVG(P1, P2, 6)").unwrap();
        assert_eq!(evaluate(&expr, &vals).unwrap(), Some(20.0 / 3.0));
    }

    #[test]
    fn test_missing_grade_yields_none() {
        let expr = parse("P1 + P2").unwrap();
        let result = evaluate(&expr, &values(&[("P1", Some(7.0)), ("P2", None)])).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_unknown_identifier_is_error() {
        let expr = parse("P1 + X").unwrap();
        let err = evaluate(&expr, &values(&[("P1", Some(7.0))])).unwrap_err();
        assert!(err.message().contains("'X'"));
    }

    #[test]
    fn test_whole_identifier_substitution() {
        let expr = parse("P10 - P1").unwrap();
        let result = evaluate(&expr, &values(&[("P1", Some(1.0)), ("P10", Some(10.0))])).unwrap();
        assert_eq!(result, Some(9.0));
    }

    #[test]
    fn test_division_by_zero() {
        let expr = parse("P1 / (P2 - P2)").unwrap();
        let err = evaluate(&expr, &values(&[("P1", Some(1.0)), ("P2", Some(3.0))])).unwrap_err();
        assert_eq!(err.message(), "Division by zero");
    }

    #[test]
    fn test_unary_minus() {
        let expr = parse("-P1 + 10").unwrap();
        assert_eq!(
            evaluate(&expr, &values(&[("P1", Some(3.5))])).unwrap(),
            Some(6.5)
        );
    }
}
