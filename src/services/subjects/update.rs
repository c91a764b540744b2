use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubjectService;
use super::formula::{check_against_components, normalize_formula};
use crate::models::{ApiResponse, ErrorCode, subjects::requests::UpdateSubjectRequest};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::OwnedResource;
use crate::utils::validate::require_text;

pub async fn update_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    update: UpdateSubjectRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Subject, subject_id).await {
        return Ok(resp);
    }

    if let Some(ref name) = update.name
        && let Err(msg) = require_text(name, "name")
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let current = match storage.get_subject_by_id(subject_id).await {
        Ok(Some(subject)) => subject,
        Ok(None) => return Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };

    // 公式有变化时做完整校验
    if let Some(source) = normalize_formula(update.final_grade_formula.as_deref())
        && Some(source) != normalize_formula(current.final_grade_formula.as_deref())
        && let Err(resp) = check_against_components(&storage, subject_id, source).await
    {
        return Ok(resp);
    }

    match storage.update_subject(subject_id, update).await {
        Ok(Some(subject)) => {
            info!("Subject {} updated", subject_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(subject, "Subject updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
