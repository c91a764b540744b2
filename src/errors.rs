//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称和 HTTP 状态码。

use actix_web::http::StatusCode;
use sea_orm::{DbErr, SqlErr};
use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_notadez_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum NotaDezError {
            $($variant(String),)*
        }

        impl NotaDezError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(NotaDezError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(NotaDezError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(NotaDezError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl NotaDezError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        NotaDezError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_notadez_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    UniqueViolation("E004", "Unique Constraint Violation"),
    ForeignKeyViolation("E005", "Foreign Key Constraint Violation"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Formula("E012", "Formula Error"),
    Email("E013", "Email Delivery Error"),
}

impl NotaDezError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 对应的 HTTP 状态码
    ///
    /// 外键错误统一视为父资源不存在；请求体里的父 id 由服务层另行映射为 400。
    pub fn http_status(&self) -> StatusCode {
        match self {
            NotaDezError::UniqueViolation(_) => StatusCode::CONFLICT,
            NotaDezError::ForeignKeyViolation(_) | NotaDezError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            NotaDezError::Validation(_) | NotaDezError::Formula(_) => StatusCode::BAD_REQUEST,
            NotaDezError::Authentication(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 按约束类型归类数据库错误
    pub fn from_db(context: &str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                NotaDezError::UniqueViolation(format!("{context}: {detail}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                NotaDezError::ForeignKeyViolation(format!("{context}: {detail}"))
            }
            _ => NotaDezError::DatabaseOperation(format!("{context}: {err}")),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, NotaDezError::UniqueViolation(_))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, NotaDezError::ForeignKeyViolation(_))
    }
}

impl fmt::Display for NotaDezError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for NotaDezError {}

// 为常见的错误类型实现 From trait
impl From<DbErr> for NotaDezError {
    fn from(err: DbErr) -> Self {
        NotaDezError::from_db("Database error", err)
    }
}

impl From<std::io::Error> for NotaDezError {
    fn from(err: std::io::Error) -> Self {
        NotaDezError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for NotaDezError {
    fn from(err: serde_json::Error) -> Self {
        NotaDezError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for NotaDezError {
    fn from(err: csv::Error) -> Self {
        NotaDezError::Serialization(format!("CSV error: {err}"))
    }
}

impl From<chrono::ParseError> for NotaDezError {
    fn from(err: chrono::ParseError) -> Self {
        NotaDezError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NotaDezError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(NotaDezError::database_config("test").code(), "E001");
        assert_eq!(NotaDezError::unique_violation("test").code(), "E004");
        assert_eq!(NotaDezError::validation("test").code(), "E007");
        assert_eq!(NotaDezError::formula("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            NotaDezError::foreign_key_violation("test").error_type(),
            "Foreign Key Constraint Violation"
        );
        assert_eq!(
            NotaDezError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = NotaDezError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = NotaDezError::not_found("Student 42");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Not Found"));
        assert!(formatted.contains("Student 42"));
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            NotaDezError::unique_violation("dup").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            NotaDezError::foreign_key_violation("fk").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            NotaDezError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            NotaDezError::database_operation("boom").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_plain_db_error_is_operation_error() {
        let err = NotaDezError::from_db("Query failed", DbErr::Custom("oops".into()));
        assert!(matches!(err, NotaDezError::DatabaseOperation(_)));
        assert!(err.message().starts_with("Query failed"));
    }
}
