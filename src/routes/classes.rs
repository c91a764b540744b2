use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::classes::requests::{
    ClassListParams, CreateClassRequest, EnrollStudentRequest, LinkSubjectRequest,
    UpdateClassRequest,
};
use crate::services::ClassService;
use crate::utils::{SafeIDI64, SafeStudentIdI64, SafeSubjectIdI64};

// 懒加载的全局 CLASS_SERVICE 实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);

// HTTP处理程序
pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<ClassListParams>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_classes(&req, query.into_inner()).await
}

pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn get_class(req: HttpRequest, class_id: SafeIDI64) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_class(&req, class_id.0).await
}

pub async fn update_class(
    req: HttpRequest,
    class_id: SafeIDI64,
    update_data: web::Json<UpdateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .update_class(&req, class_id.0, update_data.into_inner())
        .await
}

pub async fn delete_class(req: HttpRequest, class_id: SafeIDI64) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.delete_class(&req, class_id.0).await
}

pub async fn list_class_subjects(
    req: HttpRequest,
    class_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_subjects(&req, class_id.0).await
}

pub async fn link_subject(
    req: HttpRequest,
    class_id: SafeIDI64,
    data: web::Json<LinkSubjectRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .link_subject(&req, class_id.0, data.into_inner())
        .await
}

pub async fn unlink_subject(
    req: HttpRequest,
    class_id: SafeIDI64,
    subject_id: SafeSubjectIdI64,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .unlink_subject(&req, class_id.0, subject_id.0)
        .await
}

pub async fn list_class_students(
    req: HttpRequest,
    class_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_students(&req, class_id.0).await
}

pub async fn enroll_student(
    req: HttpRequest,
    class_id: SafeIDI64,
    data: web::Json<EnrollStudentRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .enroll_student(&req, class_id.0, data.into_inner())
        .await
}

pub async fn unenroll_student(
    req: HttpRequest,
    class_id: SafeIDI64,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .unenroll_student(&req, class_id.0, student_id.0)
        .await
}

// 配置路由
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_classes))
                    .route(web::post().to(create_class)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_class))
                    .route(web::put().to(update_class))
                    .route(web::delete().to(delete_class)),
            )
            .service(
                web::resource("/{id}/subjects")
                    .route(web::get().to(list_class_subjects))
                    .route(web::post().to(link_subject)),
            )
            .route(
                "/{id}/subjects/{subject_id}",
                web::delete().to(unlink_subject),
            )
            .service(
                web::resource("/{id}/students")
                    .route(web::get().to(list_class_students))
                    .route(web::post().to(enroll_student)),
            )
            .route(
                "/{id}/students/{student_id}",
                web::delete().to(unenroll_student),
            ),
    );
}
