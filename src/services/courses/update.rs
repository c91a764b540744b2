use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::{ApiResponse, ErrorCode, courses::requests::UpdateCourseRequest};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::OwnedResource;
use crate::utils::validate::require_text;

pub async fn update_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
    update: UpdateCourseRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Course, course_id).await {
        return Ok(resp);
    }

    if let Some(ref name) = update.name
        && let Err(msg) = require_text(name, "name")
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match storage.update_course(course_id, update).await {
        Ok(Some(course)) => {
            info!("Course {} updated", course_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(course, "Course updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::CourseAlreadyExists)),
    }
}
