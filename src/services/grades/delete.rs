use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, check_class_subject, check_component};
use crate::models::grades::requests::DeleteGradeRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{error_response, not_found};
use crate::storage::OwnedResource;

pub async fn delete_grade(
    service: &GradeService,
    request: &HttpRequest,
    mut data: DeleteGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    // 未指定学科时使用组成项所属学科
    let subject_id = match data.subject_id {
        Some(id) => id,
        None => {
            if let Err(resp) =
                ensure_owner(&storage, user_id, OwnedResource::Component, data.component_id).await
            {
                return Ok(resp);
            }
            match storage.get_component_by_id(data.component_id).await {
                Ok(Some(component)) => component.subject_id,
                Ok(None) => {
                    return Ok(not_found(
                        ErrorCode::ComponentNotFound,
                        "Grade component not found",
                    ));
                }
                Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
            }
        }
    };
    data.subject_id = Some(subject_id);

    if let Err(resp) = check_class_subject(&storage, user_id, data.class_id, subject_id).await {
        return Ok(resp);
    }
    if let Err(resp) = check_component(&storage, user_id, subject_id, data.component_id).await {
        return Ok(resp);
    }

    let (class_id, student_id, component_id) = (data.class_id, data.student_id, data.component_id);
    match storage.delete_grade(data, user_id).await {
        Ok(Some(previous)) => {
            info!(
                "Grade of component {} for student {} in class {} removed (was {:.2})",
                component_id, student_id, class_id, previous
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Grade deleted successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::GradeNotFound, "Grade not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
