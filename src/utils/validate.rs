use once_cell::sync::Lazy;
use regex::Regex;

use crate::formula::is_function_name;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static ABBREVIATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,15}$").expect("Invalid abbreviation regex")
});

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_GRADE: f64 = 10.0;

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 6 characters long");
    }
    Ok(())
}

/// 成绩组成项缩写：公式中的标识符，且不能与函数名冲突
pub fn validate_abbreviation(abbreviation: &str) -> Result<(), &'static str> {
    if !ABBREVIATION_RE.is_match(abbreviation) {
        return Err(
            "Abbreviation must start with a letter or underscore and contain at most 16 letters, digits or underscores",
        );
    }
    if is_function_name(abbreviation) {
        return Err("Abbreviation cannot be a formula function name");
    }
    Ok(())
}

pub fn validate_grade_value(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() || !(0.0..=MAX_GRADE).contains(&value) {
        return Err("Grade must be a number between 0 and 10");
    }
    Ok(())
}

pub fn validate_weight(weight: f64) -> Result<(), &'static str> {
    if !weight.is_finite() || weight < 0.0 {
        return Err("Weight must be a non-negative number");
    }
    Ok(())
}

/// 必填文本字段
pub fn require_text(value: &str, field: &'static str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("Field '{field}' is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email(" prof.silva@ifsp.edu.br ").is_ok());
        assert!(validate_email("ana@").is_err());
        assert!(validate_email("not an email").is_err());
    }

    #[test]
    fn test_password_length_counts_chars() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("ação12").is_ok());
    }

    #[test]
    fn test_abbreviation() {
        assert!(validate_abbreviation("P1").is_ok());
        assert!(validate_abbreviation("_trab2").is_ok());
        assert!(validate_abbreviation("A234567890123456").is_ok());
        assert!(validate_abbreviation("A2345678901234567").is_err());
        assert!(validate_abbreviation("1P").is_err());
        assert!(validate_abbreviation("P 1").is_err());
        assert!(validate_abbreviation("").is_err());
        assert_eq!(
            validate_abbreviation("max"),
            Err("Abbreviation cannot be a formula function name")
        );
    }

    #[test]
    fn test_grade_value_bounds() {
        assert!(validate_grade_value(0.0).is_ok());
        assert!(validate_grade_value(10.0).is_ok());
        assert!(validate_grade_value(10.01).is_err());
        assert!(validate_grade_value(-0.5).is_err());
        assert!(validate_grade_value(f64::NAN).is_err());
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("Turma A", "name").is_ok());
        assert_eq!(
            require_text("   ", "name").unwrap_err(),
            "Field 'name' is required"
        );
    }
}
