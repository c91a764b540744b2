use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::InstitutionService;
use crate::models::{ApiResponse, ErrorCode, institutions::requests::InstitutionListParams};
use crate::services::access::current_user_id;
use crate::services::error_response;

pub async fn list_institutions(
    service: &InstitutionService,
    request: &HttpRequest,
    query: InstitutionListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match storage.list_institutions_with_pagination(user_id, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Institutions retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
