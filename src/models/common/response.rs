use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::NotaDezError;
use crate::models::ErrorCode;

/// 统一的 API 响应信封
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    fn build(code: ErrorCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, Some(data), message)
    }

    /// 带数据的错误响应（如导入时逐行错误）
    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self::build(code, Some(data), message)
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success as i32
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, None, message)
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(code, None, message)
    }

    /// 直接透出底层错误信息
    pub fn from_error(code: ErrorCode, err: &NotaDezError) -> Self {
        Self::build(code, None, err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let resp = ApiResponse::success(42_i32, "ok");
        assert!(resp.is_success());
        assert_eq!(resp.data, Some(42));

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "ok");
    }

    #[test]
    fn test_empty_error_omits_data() {
        let resp = ApiResponse::error_empty(ErrorCode::StudentNotFound, "Student not found");
        assert!(!resp.is_success());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], ErrorCode::StudentNotFound as i32);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_from_error_uses_message() {
        let err = NotaDezError::unique_violation("registration already used");
        let resp = ApiResponse::from_error(ErrorCode::StudentAlreadyExists, &err);
        assert_eq!(resp.message, "registration already used");
    }
}
