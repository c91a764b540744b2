use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::InstitutionService;
use crate::models::{ApiResponse, ErrorCode, institutions::requests::UpdateInstitutionRequest};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::OwnedResource;
use crate::utils::validate::require_text;

pub async fn update_institution(
    service: &InstitutionService,
    request: &HttpRequest,
    institution_id: i64,
    update: UpdateInstitutionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) =
        ensure_owner(&storage, user_id, OwnedResource::Institution, institution_id).await
    {
        return Ok(resp);
    }

    if let Some(ref name) = update.name
        && let Err(msg) = require_text(name, "name")
    {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match storage.update_institution(institution_id, update).await {
        Ok(Some(institution)) => {
            info!("Institution {} updated", institution_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                institution,
                "Institution updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::InstitutionNotFound,
            "Institution not found",
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::InstitutionAlreadyExists)),
    }
}
