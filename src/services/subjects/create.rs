use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubjectService;
use super::formula::{check_syntax, normalize_formula};
use crate::models::{ApiResponse, ErrorCode, subjects::requests::CreateSubjectRequest};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response};
use crate::storage::OwnedResource;
use crate::utils::validate::require_text;

pub async fn create_subject(
    service: &SubjectService,
    request: &HttpRequest,
    data: CreateSubjectRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = require_text(&data.name, "name") {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    if let Err(resp) =
        ensure_owner(&storage, user_id, OwnedResource::Course, data.course_id).await
    {
        return Ok(resp);
    }

    // 新学科还没有成绩组成项，只能检查语法
    if let Some(source) = normalize_formula(data.final_grade_formula.as_deref())
        && let Err(resp) = check_syntax(source)
    {
        return Ok(resp);
    }

    match storage.create_subject(data).await {
        Ok(subject) => {
            info!("Subject {} created in course {}", subject.id, subject.course_id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(subject, "Subject created successfully")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
