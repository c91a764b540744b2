use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, check_class_subject, check_student};
use crate::models::grades::requests::AdjustFinalGradeRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::current_user_id;
use crate::services::{bad_request, error_response};
use crate::utils::validate::validate_grade_value;

/// 设置或取消最终成绩的人工调整
pub async fn adjust_final_grade(
    service: &GradeService,
    request: &HttpRequest,
    data: AdjustFinalGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Some(value) = data.adjusted_value
        && let Err(msg) = validate_grade_value(value)
    {
        return Ok(bad_request(ErrorCode::GradeValueInvalid, msg));
    }
    if data.use_adjusted && data.adjusted_value.is_none() {
        return Ok(bad_request(
            ErrorCode::GradeValueInvalid,
            "adjusted_value is required when use_adjusted is true",
        ));
    }

    if let Err(resp) = check_class_subject(&storage, user_id, data.class_id, data.subject_id).await
    {
        return Ok(resp);
    }
    if let Err(resp) = check_student(&storage, data.class_id, data.student_id).await {
        return Ok(resp);
    }

    match storage.adjust_final_grade(data, user_id).await {
        Ok(final_grade) => {
            info!(
                "Final grade of student {} in class {} subject {} adjusted (use_adjusted: {})",
                final_grade.student_id,
                final_grade.class_id,
                final_grade.subject_id,
                final_grade.use_adjusted
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                final_grade,
                "Final grade updated successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
