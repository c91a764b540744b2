pub mod access;
pub mod auth;
pub mod classes;
pub mod components;
pub mod courses;
pub mod grades;
pub mod institutions;
pub mod onboarding;
pub mod students;
pub mod subjects;

pub use auth::AuthService;
pub use classes::ClassService;
pub use components::ComponentService;
pub use courses::CourseService;
pub use grades::GradeService;
pub use institutions::InstitutionService;
pub use onboarding::OnboardingService;
pub use students::StudentService;
pub use subjects::SubjectService;

use actix_web::HttpResponse;
use tracing::error;

use crate::errors::NotaDezError;
use crate::models::{ApiResponse, ErrorCode};

/// 生成带懒加载存储的服务结构体
macro_rules! lazy_service {
    ($name:ident) => {
        pub struct $name {
            storage: Option<std::sync::Arc<dyn $crate::storage::Storage>>,
        }

        impl $name {
            pub fn new_lazy() -> Self {
                Self { storage: None }
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> std::sync::Arc<dyn $crate::storage::Storage> {
                if let Some(storage) = &self.storage {
                    storage.clone()
                } else {
                    request
                        .app_data::<actix_web::web::Data<std::sync::Arc<dyn $crate::storage::Storage>>>()
                        .expect("Storage not found in app data")
                        .get_ref()
                        .clone()
                }
            }
        }
    };
}

pub(crate) use lazy_service;

/// 存储层错误转为响应
///
/// 唯一约束冲突使用调用方给出的业务码，其余按错误类型选择通用业务码。
pub(crate) fn error_response(err: &NotaDezError, conflict_code: ErrorCode) -> HttpResponse {
    let status = err.http_status();
    let code = match err {
        NotaDezError::UniqueViolation(_) => conflict_code,
        NotaDezError::ForeignKeyViolation(_) | NotaDezError::NotFound(_) => ErrorCode::NotFound,
        NotaDezError::Validation(_) => ErrorCode::BadRequest,
        NotaDezError::Formula(_) => ErrorCode::FormulaInvalid,
        NotaDezError::Authentication(_) => ErrorCode::Unauthorized,
        _ => ErrorCode::InternalServerError,
    };

    if status.is_server_error() {
        error!("{}", err);
    }

    HttpResponse::build(status).json(ApiResponse::from_error(code, err))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn conflict(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_response_status_and_code() {
        let resp = error_response(
            &NotaDezError::unique_violation("duplicate"),
            ErrorCode::StudentAlreadyExists,
        );
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = error_response(
            &NotaDezError::foreign_key_violation("missing parent"),
            ErrorCode::StudentAlreadyExists,
        );
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = error_response(
            &NotaDezError::validation("Formula is missing component abbreviations: P2"),
            ErrorCode::Conflict,
        );
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = error_response(
            &NotaDezError::database_operation("disk full"),
            ErrorCode::Conflict,
        );
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
