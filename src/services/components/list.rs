use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ComponentService;
use crate::models::{ApiResponse, ErrorCode, components::requests::ComponentListParams};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::error_response;
use crate::storage::OwnedResource;

pub async fn list_components(
    service: &ComponentService,
    request: &HttpRequest,
    query: ComponentListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) =
        ensure_owner(&storage, user_id, OwnedResource::Subject, query.subject_id).await
    {
        return Ok(resp);
    }

    match storage.list_components(query.subject_id).await {
        Ok(components) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            components,
            "Grade components retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
