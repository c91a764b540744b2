use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, check_class_subject, check_component, check_student};
use crate::models::grades::{requests::SaveGradeRequest, responses::SaveGradeResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::current_user_id;
use crate::services::{bad_request, error_response};
use crate::utils::validate::validate_grade_value;

pub async fn save_grade(
    service: &GradeService,
    request: &HttpRequest,
    data: SaveGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = validate_grade_value(data.value) {
        return Ok(bad_request(ErrorCode::GradeValueInvalid, msg));
    }

    if let Err(resp) = check_class_subject(&storage, user_id, data.class_id, data.subject_id).await
    {
        return Ok(resp);
    }
    if let Err(resp) = check_student(&storage, data.class_id, data.student_id).await {
        return Ok(resp);
    }
    let component =
        match check_component(&storage, user_id, data.subject_id, data.component_id).await {
            Ok(component) => component,
            Err(resp) => return Ok(resp),
        };

    match storage.save_grade(data, user_id).await {
        Ok(outcome) => {
            info!(
                "Grade {} for student {} in class {} set to {:.2}",
                component.abbreviation,
                outcome.record.student_id,
                outcome.record.class_id,
                outcome.record.value
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SaveGradeResponse {
                    record: outcome.record,
                    previous_value: outcome.previous_value,
                    final_grade: outcome.final_grade,
                },
                "Grade saved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
