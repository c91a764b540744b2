use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::institutions::requests::OnboardingRequest;
use crate::services::OnboardingService;

static ONBOARDING_SERVICE: Lazy<OnboardingService> = Lazy::new(OnboardingService::new_lazy);

pub async fn onboard(
    req: HttpRequest,
    data: web::Json<OnboardingRequest>,
) -> ActixResult<HttpResponse> {
    ONBOARDING_SERVICE.onboard(&req, data.into_inner()).await
}

pub fn configure_onboarding_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/onboarding")
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(onboard)),
    );
}
