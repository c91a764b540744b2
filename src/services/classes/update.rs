use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode, classes::requests::UpdateClassRequest};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::OwnedResource;
use crate::utils::validate::require_text;

pub async fn update_class(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
    update_data: UpdateClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Class, class_id).await {
        return Ok(resp);
    }

    if let Some(ref name) = update_data.name
        && let Err(msg) = require_text(name, "name")
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => {
            info!("Class {} updated", class_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(class, "Class updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::ClassAlreadyExists)),
    }
}
