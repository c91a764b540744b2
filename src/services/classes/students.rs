//! 班级学生（选课）

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::errors::NotaDezError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{conflict, error_response, not_found};
use crate::storage::OwnedResource;

pub async fn list_students(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Class, class_id).await {
        return Ok(resp);
    }

    match storage.list_class_students(class_id).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            students,
            "Class students retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}

pub async fn enroll_student(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Class, class_id).await {
        return Ok(resp);
    }

    match storage.get_student_by_id(student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    }

    match storage.enroll_student(class_id, student_id).await {
        Ok(()) => {
            info!("Student {} enrolled in class {}", student_id, class_id);
            Ok(HttpResponse::Created().json(ApiResponse::success_empty(
                "Student enrolled successfully",
            )))
        }
        Err(NotaDezError::UniqueViolation(_)) => Ok(conflict(
            ErrorCode::StudentAlreadyEnrolled,
            "Student is already enrolled in this class",
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::StudentAlreadyEnrolled)),
    }
}

pub async fn unenroll_student(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Class, class_id).await {
        return Ok(resp);
    }

    match storage.unenroll_student(class_id, student_id).await {
        Ok(true) => {
            info!("Student {} removed from class {}", student_id, class_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Student removed from class successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::StudentNotEnrolled,
            "Student is not enrolled in this class",
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
