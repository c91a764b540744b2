use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ComponentService, referenced_by_formula};
use crate::models::{ApiResponse, ErrorCode, components::requests::UpdateComponentRequest};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, conflict, error_response, not_found};
use crate::storage::OwnedResource;
use crate::utils::validate::{require_text, validate_abbreviation, validate_weight};

pub async fn update_component(
    service: &ComponentService,
    request: &HttpRequest,
    component_id: i64,
    update: UpdateComponentRequest,
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

    if let Some(ref name) = update.name
        && let Err(msg) = require_text(name, "name")
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }
    if let Some(ref abbreviation) = update.abbreviation
        && let Err(msg) = validate_abbreviation(abbreviation.trim())
    {
        return Ok(bad_request(ErrorCode::ComponentAbbreviationInvalid, msg));
    }
    if let Some(weight) = update.weight
        && let Err(msg) = validate_weight(weight)
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    let current = match storage.get_component_by_id(component_id).await {
        Ok(Some(component)) => component,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::ComponentNotFound,
                "Grade component not found",
            ));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };

    // 公式引用的缩写不能改名
    let renamed = update
        .abbreviation
        .as_deref()
        .map(str::trim)
        .is_some_and(|a| a != current.abbreviation);
    if renamed {
        match referenced_by_formula(&storage, &current).await {
            Ok(true) => {
                return Ok(conflict(
                    ErrorCode::ComponentInUse,
                    format!(
                        "Abbreviation {} is used by the subject's final grade formula",
                        current.abbreviation
                    ),
                ));
            }
            Ok(false) => {}
            Err(resp) => return Ok(resp),
        }
    }

    match storage.update_component(component_id, update).await {
        Ok(Some(component)) => {
            info!("Grade component {} updated", component_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                component,
                "Grade component updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::ComponentNotFound,
            "Grade component not found",
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::ComponentAlreadyExists)),
    }
}
