use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::{ApiResponse, ErrorCode, courses::requests::CreateCourseRequest};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response};
use crate::storage::OwnedResource;
use crate::utils::validate::require_text;

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    data: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = require_text(&data.name, "name") {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    // 机构必须属于当前用户
    if let Err(resp) = ensure_owner(
        &storage,
        user_id,
        OwnedResource::Institution,
        data.institution_id,
    )
    .await
    {
        return Ok(resp);
    }

    match storage.create_course(data).await {
        Ok(course) => {
            info!(
                "Course {} created in institution {}",
                course.id, course.institution_id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(course, "Course created successfully")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::CourseAlreadyExists)),
    }
}
