use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::InstitutionService;
use crate::models::{ApiResponse, ErrorCode, institutions::requests::CreateInstitutionRequest};
use crate::services::access::current_user_id;
use crate::services::{bad_request, error_response};
use crate::utils::validate::require_text;

pub async fn create_institution(
    service: &InstitutionService,
    request: &HttpRequest,
    data: CreateInstitutionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    if let Err(msg) = require_text(&data.name, "name") {
        return Ok(bad_request(ErrorCode::BadRequest, msg));
    }

    match storage.create_institution(user_id, data).await {
        Ok(institution) => {
            info!("Institution {} created by user {}", institution.id, user_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                institution,
                "Institution created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InstitutionAlreadyExists)),
    }
}
