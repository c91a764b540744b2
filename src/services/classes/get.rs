use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{error_response, not_found};
use crate::storage::OwnedResource;

pub async fn get_class(
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

    match storage.get_class_by_id(class_id).await {
        Ok(Some(class)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(class, "Class retrieved successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::ClassNotFound, "Class not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
