use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode};
use tracing::{info, warn};

use super::ClassService;
use super::subjects::link_checked;
use crate::models::{
    ApiResponse, ErrorCode,
    classes::{requests::CreateClassRequest, responses::ClassCreatedResponse},
};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response};
use crate::storage::OwnedResource;
use crate::utils::validate::require_text;

/// 创建班级并关联学科
///
/// 班级创建成功后逐个关联学科；有关联失败时返回 207 并附带警告。
pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = require_text(&class_data.name, "name") {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    if let Err(resp) =
        ensure_owner(&storage, user_id, OwnedResource::Course, class_data.course_id).await
    {
        return Ok(resp);
    }

    let mut subject_ids = class_data.subject_ids.clone();
    subject_ids.sort_unstable();
    subject_ids.dedup();

    let class = match storage.create_class(class_data).await {
        Ok(class) => class,
        Err(e) => return Ok(error_response(&e, ErrorCode::ClassAlreadyExists)),
    };
    info!("Class {} created in course {}", class.id, class.course_id);

    let mut linked_subject_ids = Vec::new();
    let mut warnings = Vec::new();
    for subject_id in subject_ids {
        match link_checked(&storage, class.id, class.course_id, subject_id).await {
            Ok(()) => linked_subject_ids.push(subject_id),
            Err(e) => {
                let message = e.message(subject_id);
                warn!("Class {}: {}", class.id, message);
                warnings.push(message);
            }
        }
    }

    let status = if warnings.is_empty() {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    let message = if warnings.is_empty() {
        "Class created successfully"
    } else {
        "Class created, some subjects could not be linked"
    };

    Ok(HttpResponse::build(status).json(ApiResponse::success(
        ClassCreatedResponse {
            class,
            linked_subject_ids,
            warnings,
        },
        message,
    )))
}
