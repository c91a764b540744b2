//! 当前用户与资源归属校验
//!
//! 资源归属沿 用户 → 机构 → 课程 → 学科/班级 → 组成项 链条判断；
//! 不存在与不属于当前用户一律返回 404，避免泄露其他用户的数据。

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;

use super::{error_response, not_found};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::{OwnedResource, Storage};

pub(crate) fn current_user_id(request: &HttpRequest) -> Result<i64, HttpResponse> {
    RequireJWT::extract_user_id(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user id",
        ))
    })
}

fn not_found_response(resource: OwnedResource) -> HttpResponse {
    let (code, message) = match resource {
        OwnedResource::Institution => (ErrorCode::InstitutionNotFound, "Institution not found"),
        OwnedResource::Course => (ErrorCode::CourseNotFound, "Course not found"),
        OwnedResource::Subject => (ErrorCode::SubjectNotFound, "Subject not found"),
        OwnedResource::Class => (ErrorCode::ClassNotFound, "Class not found"),
        OwnedResource::Component => (ErrorCode::ComponentNotFound, "Grade component not found"),
    };
    not_found(code, message)
}

/// 校验资源属于当前用户
pub(crate) async fn ensure_owner(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    resource: OwnedResource,
    id: i64,
) -> Result<(), HttpResponse> {
    match storage.resolve_owner(resource, id).await {
        Ok(Some(owner)) if owner == user_id => Ok(()),
        Ok(_) => Err(not_found_response(resource)),
        Err(e) => Err(error_response(&e, ErrorCode::Conflict)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    #[test]
    fn test_missing_user_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let resp = current_user_id(&req).unwrap_err();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_not_found_response() {
        let resp = not_found_response(OwnedResource::Component);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
