use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{error_response, not_found};
use crate::storage::OwnedResource;

pub async fn delete_class(
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

    match storage.delete_class(class_id).await {
        Ok(true) => {
            info!("Class {} deleted by user {}", class_id, user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Class deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
