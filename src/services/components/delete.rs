use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ComponentService, referenced_by_formula};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{conflict, error_response, not_found};
use crate::storage::OwnedResource;

/// 删除组成项（级联删除已录入的成绩）
pub async fn delete_component(
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

    let component = match storage.get_component_by_id(component_id).await {
        Ok(Some(component)) => component,
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::ComponentNotFound,
                "Grade component not found",
            ));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };

    match referenced_by_formula(&storage, &component).await {
        Ok(true) => {
            return Ok(conflict(
                ErrorCode::ComponentInUse,
                format!(
                    "Abbreviation {} is used by the subject's final grade formula",
                    component.abbreviation
                ),
            ));
        }
        Ok(false) => {}
        Err(resp) => return Ok(resp),
    }

    match storage.delete_component(component_id).await {
        Ok(true) => {
            info!(
                "Grade component {} ({}) deleted",
                component_id, component.abbreviation
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Grade component deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::ComponentNotFound,
            "Grade component not found",
        )),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}
