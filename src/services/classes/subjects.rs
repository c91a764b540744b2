//! 班级与学科的关联

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use super::ClassService;
use crate::errors::NotaDezError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, conflict, error_response, not_found};
use crate::storage::{OwnedResource, Storage};

/// 关联学科失败的原因
#[derive(Debug)]
pub(crate) enum LinkError {
    SubjectNotFound,
    NotInCourse,
    AlreadyLinked,
    Storage(NotaDezError),
}

impl LinkError {
    pub(crate) fn message(&self, subject_id: i64) -> String {
        match self {
            LinkError::SubjectNotFound => format!("Subject {subject_id} not found"),
            LinkError::NotInCourse => {
                format!("Subject {subject_id} does not belong to the class's course")
            }
            LinkError::AlreadyLinked => format!("Subject {subject_id} is already linked"),
            LinkError::Storage(e) => format!("Subject {subject_id}: {e}"),
        }
    }

    fn into_response(self, subject_id: i64) -> HttpResponse {
        let message = self.message(subject_id);
        match self {
            LinkError::SubjectNotFound => not_found(ErrorCode::SubjectNotFound, message),
            LinkError::NotInCourse => bad_request(ErrorCode::SubjectNotInCourse, message),
            LinkError::AlreadyLinked => conflict(ErrorCode::Conflict, message),
            LinkError::Storage(e) => error_response(&e, ErrorCode::Conflict),
        }
    }
}

/// 学科必须属于班级所在的课程
pub(crate) async fn link_checked(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    course_id: i64,
    subject_id: i64,
) -> Result<(), LinkError> {
    match storage.get_subject_by_id(subject_id).await {
        Ok(Some(subject)) if subject.course_id == course_id => {}
        Ok(Some(_)) => return Err(LinkError::NotInCourse),
        Ok(None) => return Err(LinkError::SubjectNotFound),
        Err(e) => return Err(LinkError::Storage(e)),
    }

    match storage.link_class_subject(class_id, subject_id).await {
        Ok(()) => Ok(()),
        Err(NotaDezError::UniqueViolation(_)) => Err(LinkError::AlreadyLinked),
        Err(e) => Err(LinkError::Storage(e)),
    }
}

pub async fn list_subjects(
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

    match storage.list_class_subjects(class_id).await {
        Ok(subjects) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subjects,
            "Class subjects retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}

pub async fn link_subject(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Class, class_id).await {
        return Ok(resp);
    }

    let class = match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => class,
        Ok(None) => return Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };

    match link_checked(&storage, class_id, class.course_id, subject_id).await {
        Ok(()) => {
            info!("Subject {} linked to class {}", subject_id, class_id);
            Ok(HttpResponse::Created().json(ApiResponse::success_empty(
                "Subject linked successfully",
            )))
        }
        Err(e) => Ok(e.into_response(subject_id)),
    }
}

pub async fn unlink_subject(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Class, class_id).await {
        return Ok(resp);
    }

    match storage.unlink_class_subject(class_id, subject_id).await {
        Ok(true) => {
            info!("Subject {} unlinked from class {}", subject_id, class_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Subject unlinked successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::ClassSubjectNotLinked,
            "Subject is not linked to this class",
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_link_error_responses() {
        assert_eq!(
            LinkError::NotInCourse.into_response(3).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LinkError::SubjectNotFound.into_response(3).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LinkError::AlreadyLinked.into_response(3).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            LinkError::NotInCourse.message(7),
            "Subject 7 does not belong to the class's course"
        );
    }
}
