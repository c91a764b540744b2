use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::institutions::requests::{
    CreateInstitutionRequest, InstitutionListParams, UpdateInstitutionRequest,
};
use crate::services::InstitutionService;
use crate::utils::SafeIDI64;

static INSTITUTION_SERVICE: Lazy<InstitutionService> = Lazy::new(InstitutionService::new_lazy);

pub async fn list_institutions(
    req: HttpRequest,
    query: web::Query<InstitutionListParams>,
) -> ActixResult<HttpResponse> {
    INSTITUTION_SERVICE
        .list_institutions(&req, query.into_inner())
        .await
}

pub async fn create_institution(
    req: HttpRequest,
    data: web::Json<CreateInstitutionRequest>,
) -> ActixResult<HttpResponse> {
    INSTITUTION_SERVICE
        .create_institution(&req, data.into_inner())
        .await
}

pub async fn get_institution(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    INSTITUTION_SERVICE.get_institution(&req, id.0).await
}

pub async fn update_institution(
    req: HttpRequest,
    id: SafeIDI64,
    data: web::Json<UpdateInstitutionRequest>,
) -> ActixResult<HttpResponse> {
    INSTITUTION_SERVICE
        .update_institution(&req, id.0, data.into_inner())
        .await
}

pub async fn delete_institution(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    INSTITUTION_SERVICE.delete_institution(&req, id.0).await
}

pub fn configure_institutions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/institutions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_institutions))
                    .route(web::post().to(create_institution)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_institution))
                    .route(web::put().to(update_institution))
                    .route(web::delete().to(delete_institution)),
            ),
    );
}
