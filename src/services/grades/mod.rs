pub mod audits;
pub mod board;
pub mod delete;
pub mod export;
pub mod final_grade;
pub mod save;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::components::entities::GradeComponent;
use crate::models::grades::requests::{
    AdjustFinalGradeRequest, DeleteGradeRequest, GradeAuditListParams, GradeBoardParams,
    SaveGradeRequest,
};
use crate::services::access::ensure_owner;
use crate::services::{bad_request, error_response, not_found};
use crate::storage::{OwnedResource, Storage};

crate::services::lazy_service!(GradeService);

impl GradeService {
    // 录入或修改单项成绩
    pub async fn save_grade(
        &self,
        request: &HttpRequest,
        data: SaveGradeRequest,
    ) -> ActixResult<HttpResponse> {
        save::save_grade(self, request, data).await
    }

    pub async fn delete_grade(
        &self,
        request: &HttpRequest,
        data: DeleteGradeRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_grade(self, request, data).await
    }

    // 班级 × 学科成绩表
    pub async fn get_board(
        &self,
        request: &HttpRequest,
        query: GradeBoardParams,
    ) -> ActixResult<HttpResponse> {
        board::get_board(self, request, query).await
    }

    // 人工调整最终成绩
    pub async fn adjust_final_grade(
        &self,
        request: &HttpRequest,
        data: AdjustFinalGradeRequest,
    ) -> ActixResult<HttpResponse> {
        final_grade::adjust_final_grade(self, request, data).await
    }

    pub async fn export_grades(
        &self,
        request: &HttpRequest,
        query: GradeBoardParams,
    ) -> ActixResult<HttpResponse> {
        export::export_grades(self, request, query).await
    }

    pub async fn list_audits(
        &self,
        request: &HttpRequest,
        query: GradeAuditListParams,
    ) -> ActixResult<HttpResponse> {
        audits::list_audits(self, request, query).await
    }
}

/// 校验 班级/学科 归属当前用户，且学科已关联到班级
pub(crate) async fn check_class_subject(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    class_id: i64,
    subject_id: i64,
) -> Result<(), HttpResponse> {
    ensure_owner(storage, user_id, OwnedResource::Class, class_id).await?;
    ensure_owner(storage, user_id, OwnedResource::Subject, subject_id).await?;

    match storage.is_subject_linked(class_id, subject_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(bad_request(
            ErrorCode::ClassSubjectNotLinked,
            "Subject is not linked to this class",
        )),
        Err(e) => Err(error_response(&e, ErrorCode::Conflict)),
    }
}

/// 校验学生存在且在班级中
pub(crate) async fn check_student(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    student_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_student_by_id(student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Err(error_response(&e, ErrorCode::Conflict)),
    }

    match storage.is_student_enrolled(class_id, student_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(bad_request(
            ErrorCode::StudentNotEnrolled,
            "Student is not enrolled in this class",
        )),
        Err(e) => Err(error_response(&e, ErrorCode::Conflict)),
    }
}

/// 校验组成项存在、归属当前用户且属于该学科
pub(crate) async fn check_component(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    subject_id: i64,
    component_id: i64,
) -> Result<GradeComponent, HttpResponse> {
    ensure_owner(storage, user_id, OwnedResource::Component, component_id).await?;

    let component = match storage.get_component_by_id(component_id).await {
        Ok(Some(component)) => component,
        Ok(None) => {
            return Err(not_found(
                ErrorCode::ComponentNotFound,
                "Grade component not found",
            ));
        }
        Err(e) => return Err(error_response(&e, ErrorCode::Conflict)),
    };

    if component.subject_id != subject_id {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "Grade component does not belong to this subject",
        ));
    }
    Ok(component)
}
