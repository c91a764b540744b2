pub mod create;
pub mod delete;
pub mod formula;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::subjects::requests::{
    CreateSubjectRequest, SubjectListParams, UpdateFormulaRequest, UpdateSubjectRequest,
};

crate::services::lazy_service!(SubjectService);

impl SubjectService {
    pub async fn list_subjects(
        &self,
        request: &HttpRequest,
        query: SubjectListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_subjects(self, request, query).await
    }

    pub async fn create_subject(
        &self,
        request: &HttpRequest,
        data: CreateSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_subject(self, request, data).await
    }

    pub async fn get_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_subject(self, request, subject_id).await
    }

    pub async fn update_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        update: UpdateSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_subject(self, request, subject_id, update).await
    }

    pub async fn delete_subject(
        &self,
        request: &HttpRequest,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_subject(self, request, subject_id).await
    }

    // 保存或清除最终成绩公式
    pub async fn update_formula(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        data: UpdateFormulaRequest,
    ) -> ActixResult<HttpResponse> {
        formula::update_formula(self, request, subject_id, data).await
    }

    // 仅校验，不保存
    pub async fn validate_formula(
        &self,
        request: &HttpRequest,
        subject_id: i64,
        data: UpdateFormulaRequest,
    ) -> ActixResult<HttpResponse> {
        formula::validate_formula(self, request, subject_id, data).await
    }
}
