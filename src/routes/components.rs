use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::components::requests::{
    ComponentListParams, CreateComponentRequest, UpdateComponentRequest,
};
use crate::services::ComponentService;
use crate::utils::SafeIDI64;

static COMPONENT_SERVICE: Lazy<ComponentService> = Lazy::new(ComponentService::new_lazy);

pub async fn list_components(
    req: HttpRequest,
    query: web::Query<ComponentListParams>,
) -> ActixResult<HttpResponse> {
    COMPONENT_SERVICE
        .list_components(&req, query.into_inner())
        .await
}

pub async fn create_component(
    req: HttpRequest,
    data: web::Json<CreateComponentRequest>,
) -> ActixResult<HttpResponse> {
    COMPONENT_SERVICE
        .create_component(&req, data.into_inner())
        .await
}

pub async fn get_component(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    COMPONENT_SERVICE.get_component(&req, id.0).await
}

pub async fn update_component(
    req: HttpRequest,
    id: SafeIDI64,
    data: web::Json<UpdateComponentRequest>,
) -> ActixResult<HttpResponse> {
    COMPONENT_SERVICE
        .update_component(&req, id.0, data.into_inner())
        .await
}

pub async fn delete_component(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    COMPONENT_SERVICE.delete_component(&req, id.0).await
}

pub fn configure_components_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/components")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_components))
                    .route(web::post().to(create_component)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_component))
                    .route(web::put().to(update_component))
                    .route(web::delete().to(delete_component)),
            ),
    );
}
