use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::models::{ApiResponse, ErrorCode, students::requests::UpdateStudentRequest};
use crate::services::{bad_request, error_response, not_found};
use crate::utils::validate::require_text;

pub async fn update_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    update: UpdateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Some(ref registration) = update.registration
        && let Err(msg) = require_text(registration, "registration")
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Some(ref name) = update.name
        && let Err(msg) = require_text(name, "name")
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match storage.update_student(student_id, update).await {
        Ok(Some(student)) => {
            info!("Student {} updated", student_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(student, "Student updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::StudentAlreadyExists)),
    }
}
