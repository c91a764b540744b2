//! 最终成绩公式
//!
//! 公式是一个算术表达式，其中的标识符为科目下成绩组成项的缩写，例如
//! `(P1 * 0.4) + (P2 * 0.6)` 或 `MAX(P1, REC)`。
//!
//! 科目未设置公式时，最终成绩为各组成项的加权平均。

mod eval;
mod lexer;
mod parser;

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

pub use eval::round2;
pub use parser::{BinaryOp, Expr, Function};

use crate::errors::{NotaDezError, Result};

/// 是否为内置函数名（大小写不敏感），组成项缩写不允许使用
pub fn is_function_name(name: &str) -> bool {
    Function::from_name(name).is_some()
}

/// 已解析的公式
#[derive(Debug, Clone)]
pub struct Formula {
    expr: Expr,
    references: BTreeSet<String>,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self> {
        let expr = parser::parse(source)?;
        let mut references = BTreeSet::new();
        expr.collect_references(&mut references);
        Ok(Self { expr, references })
    }

    /// 公式中引用的缩写（去重，有序）
    pub fn references(&self) -> &BTreeSet<String> {
        &self.references
    }

    pub fn references_abbreviation(&self, abbreviation: &str) -> bool {
        self.references.contains(abbreviation)
    }

    /// 代入成绩求值，结果保留两位小数
    pub fn evaluate(&self, values: &HashMap<String, Option<f64>>) -> Result<Option<f64>> {
        Ok(eval::evaluate(&self.expr, values)?.map(round2))
    }

    /// 与科目的组成项缩写比对
    pub fn check<S: AsRef<str>>(&self, abbreviations: &[S]) -> FormulaCheck {
        let defined: BTreeSet<&str> = abbreviations.iter().map(|a| a.as_ref()).collect();

        let missing = defined
            .iter()
            .filter(|a| !self.references.contains(**a))
            .map(|a| a.to_string())
            .collect();
        let unknown = self
            .references
            .iter()
            .filter(|r| !defined.contains(r.as_str()))
            .cloned()
            .collect();

        FormulaCheck { missing, unknown }
    }
}

/// 公式与组成项比对结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormulaCheck {
    /// 已定义但公式未使用的缩写
    pub missing: Vec<String>,
    /// 公式使用但未定义的缩写
    pub unknown: Vec<String>,
}

impl FormulaCheck {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.unknown.is_empty()
    }

    pub fn message(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.unknown.is_empty() {
            parts.push(format!(
                "Formula references unknown abbreviations: {}",
                self.unknown.join(", ")
            ));
        }
        if !self.missing.is_empty() {
            parts.push(format!(
                "Formula is missing component abbreviations: {}",
                self.missing.join(", ")
            ));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// 保存公式前的完整校验
///
/// 语法错误返回 `Formula`，缩写不匹配返回 `Validation`。
pub fn validate_formula<S: AsRef<str>>(source: &str, abbreviations: &[S]) -> Result<Formula> {
    let formula = Formula::parse(source)?;
    let check = formula.check(abbreviations);
    match check.message() {
        Some(message) => Err(NotaDezError::validation(message)),
        None => Ok(formula),
    }
}

/// 单个组成项的成绩输入
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentGrade<'a> {
    pub abbreviation: &'a str,
    pub weight: f64,
    pub value: Option<f64>,
}

/// 加权平均；任一成绩缺失或权重和为 0 时返回 `None`
pub fn weighted_mean(grades: &[ComponentGrade<'_>]) -> Option<f64> {
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    for grade in grades {
        let value = grade.value?;
        total_weight += grade.weight;
        weighted_sum += grade.weight * value;
    }
    if total_weight == 0.0 {
        return None;
    }
    Some(round2(weighted_sum / total_weight))
}

/// 计算最终成绩
///
/// 有公式时按公式求值，否则取加权平均。
/// 公式与组成项不匹配（如公式保存后新增了组成项）时返回 `Validation` 错误。
pub fn final_grade(formula: Option<&str>, grades: &[ComponentGrade<'_>]) -> Result<Option<f64>> {
    match formula.map(str::trim).filter(|f| !f.is_empty()) {
        Some(source) => {
            let formula = Formula::parse(source)?;
            let abbreviations: Vec<&str> = grades.iter().map(|g| g.abbreviation).collect();
            if let Some(message) = formula.check(&abbreviations).message() {
                return Err(NotaDezError::validation(message));
            }
            let values = grades
                .iter()
                .map(|g| (g.abbreviation.to_string(), g.value))
                .collect();
            formula.evaluate(&values)
        }
        None => Ok(weighted_mean(grades)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NotaDezError;

    fn grade(abbreviation: &str, weight: f64, value: Option<f64>) -> ComponentGrade<'_> {
        ComponentGrade {
            abbreviation,
            weight,
            value,
        }
    }

    #[test]
    fn test_validate_reports_missing_abbreviations() {
        let err = validate_formula("P1 * 0.5", &["P1", "P2", "P3"]).unwrap_err();
        assert!(matches!(err, NotaDezError::Validation(_)));
        assert_eq!(
            err.message(),
            "Formula is missing component abbreviations: P2, P3"
        );
    }

    #[test]
    fn test_validate_reports_unknown_abbreviations() {
        let err = validate_formula("P1 + T9", &["P1"]).unwrap_err();
        assert_eq!(
            err.message(),
            "Formula references unknown abbreviations: T9"
        );
    }

    #[test]
    fn test_validate_syntax_error_is_formula_error() {
        let err = validate_formula("P1 +* P2", &["P1", "P2"]).unwrap_err();
        assert!(matches!(err, NotaDezError::Formula(_)));
    }

    #[test]
    fn test_validate_accepts_complete_formula() {
        let formula = validate_formula("(P1 + P2) / 2", &["P1", "P2"]).unwrap();
        assert!(formula.references_abbreviation("P1"));
        assert!(!formula.references_abbreviation("P"));
    }

    #[test]
    fn test_check_result() {
        let formula = Formula::parse("P1 + X").unwrap();
        let check = formula.check(&["P1", "P2"]);
        assert!(!check.is_valid());
        assert_eq!(check.missing, vec!["P2"]);
        assert_eq!(check.unknown, vec!["X"]);
    }

    #[test]
    fn test_final_grade_uses_formula_and_rounds() {
        let grades = [grade("P1", 1.0, Some(7.0)), grade("P2", 1.0, Some(6.0))];
        let result = final_grade(Some("(P1 + P2 * 2) / 3"), &grades).unwrap();
        assert_eq!(result, Some(6.33));
    }

    #[test]
    fn test_final_grade_pending_until_complete() {
        let grades = [grade("P1", 1.0, Some(7.0)), grade("P2", 1.0, None)];
        assert_eq!(final_grade(Some("P1 + P2"), &grades).unwrap(), None);
        assert_eq!(final_grade(None, &grades).unwrap(), None);
    }

    #[test]
    fn test_final_grade_rejects_formula_missing_a_component() {
        let grades = [
            grade("P1", 1.0, Some(8.0)),
            grade("P2", 1.0, Some(6.0)),
            grade("P3", 1.0, Some(9.0)),
        ];
        let err = final_grade(Some("(P1 + P2) / 2"), &grades).unwrap_err();
        assert!(matches!(err, NotaDezError::Validation(_)));
        assert_eq!(
            err.message(),
            "Formula is missing component abbreviations: P3"
        );
    }

    #[test]
    fn test_final_grade_weighted_fallback() {
        let grades = [grade("P1", 2.0, Some(8.0)), grade("T1", 1.0, Some(5.0))];
        assert_eq!(final_grade(None, &grades).unwrap(), Some(7.0));
        assert_eq!(final_grade(Some("   "), &grades).unwrap(), Some(7.0));
    }

    #[test]
    fn test_weighted_mean_zero_weight() {
        let grades = [grade("P1", 0.0, Some(8.0))];
        assert_eq!(weighted_mean(&grades), None);
        assert_eq!(weighted_mean(&[]), None);
    }

    #[test]
    fn test_function_names_are_reserved() {
        assert!(is_function_name("max"));
        assert!(is_function_name("Avg"));
        assert!(!is_function_name("P1"));
    }
}
