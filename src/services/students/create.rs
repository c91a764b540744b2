use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::models::{ApiResponse, ErrorCode, students::requests::CreateStudentRequest};
use crate::services::{bad_request, conflict, error_response};
use crate::utils::validate::require_text;

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    data: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(msg) =
        require_text(&data.registration, "registration").and(require_text(&data.name, "name"))
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    // 学号已存在
    match storage.get_student_by_registration(&data.registration).await {
        Ok(Some(_)) => {
            return Ok(conflict(
                ErrorCode::StudentAlreadyExists,
                format!("Registration '{}' already exists", data.registration.trim()),
            ));
        }
        Ok(None) => {}
        Err(e) => return Ok(error_response(&e, ErrorCode::StudentAlreadyExists)),
    }

    match storage.create_student(data).await {
        Ok(student) => {
            info!("Student {} ({}) created", student.id, student.registration);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(student, "Student created successfully")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::StudentAlreadyExists)),
    }
}
