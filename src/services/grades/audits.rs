use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::grades::requests::GradeAuditListParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response};
use crate::storage::OwnedResource;

/// 成绩审计日志（按班级查询，最新的在前）
pub async fn list_audits(
    service: &GradeService,
    request: &HttpRequest,
    query: GradeAuditListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let Some(class_id) = query.class_id else {
        return Ok(bad_request(ErrorCode::BadRequest, "class_id is required"));
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Class, class_id).await {
        return Ok(resp);
    }

    match storage.list_grade_audits_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grade audits retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
