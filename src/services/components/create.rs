use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ComponentService;
use crate::models::{ApiResponse, ErrorCode, components::requests::CreateComponentRequest};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response};
use crate::storage::OwnedResource;
use crate::utils::validate::{require_text, validate_abbreviation, validate_weight};

pub async fn create_component(
    service: &ComponentService,
    request: &HttpRequest,
    data: CreateComponentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = require_text(&data.name, "name") {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Err(msg) = validate_abbreviation(data.abbreviation.trim()) {
        return Ok(bad_request(ErrorCode::ComponentAbbreviationInvalid, msg));
    }
    if let Some(weight) = data.weight
        && let Err(msg) = validate_weight(weight)
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    if let Err(resp) =
        ensure_owner(&storage, user_id, OwnedResource::Subject, data.subject_id).await
    {
        return Ok(resp);
    }

    match storage.create_component(data).await {
        Ok(component) => {
            info!(
                "Grade component {} ({}) created in subject {}",
                component.id, component.abbreviation, component.subject_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                component,
                "Grade component created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::ComponentAlreadyExists)),
    }
}
