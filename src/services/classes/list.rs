use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ClassService;
use crate::models::{ApiResponse, ErrorCode, classes::requests::ClassListParams};
use crate::services::access::current_user_id;
use crate::services::error_response;

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    query: ClassListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match storage.list_classes_with_pagination(user_id, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Classes retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
