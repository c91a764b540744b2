use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grades::requests::{
    AdjustFinalGradeRequest, DeleteGradeRequest, GradeAuditListParams, GradeBoardParams,
    SaveGradeRequest,
};
use crate::services::GradeService;

static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn save_grade(
    req: HttpRequest,
    data: web::Json<SaveGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.save_grade(&req, data.into_inner()).await
}

pub async fn delete_grade(
    req: HttpRequest,
    data: web::Json<DeleteGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.delete_grade(&req, data.into_inner()).await
}

pub async fn get_board(
    req: HttpRequest,
    query: web::Query<GradeBoardParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.get_board(&req, query.into_inner()).await
}

pub async fn adjust_final_grade(
    req: HttpRequest,
    data: web::Json<AdjustFinalGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .adjust_final_grade(&req, data.into_inner())
        .await
}

pub async fn export_grades(
    req: HttpRequest,
    query: web::Query<GradeBoardParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.export_grades(&req, query.into_inner()).await
}

pub async fn list_audits(
    req: HttpRequest,
    query: web::Query<GradeAuditListParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_audits(&req, query.into_inner()).await
}

pub fn configure_grades_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(save_grade))
                    .route(web::delete().to(delete_grade)),
            )
            .route("/board", web::get().to(get_board))
            .route("/final", web::put().to(adjust_final_grade))
            .route("/export", web::get().to(export_grades))
            .route("/audits", web::get().to(list_audits)),
    );
}
