use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ComponentService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{error_response, not_found};
use crate::storage::OwnedResource;

pub async fn get_component(
    service: &ComponentService,
    request: &HttpRequest,
    component_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) =
        ensure_owner(&storage, user_id, OwnedResource::Component, component_id).await
    {
        return Ok(resp);
    }

    match storage.get_component_by_id(component_id).await {
        Ok(Some(component)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            component,
            "Grade component retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::ComponentNotFound,
            "Grade component not found",
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
