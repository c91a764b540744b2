pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::institutions::requests::{
    CreateInstitutionRequest, InstitutionListParams, UpdateInstitutionRequest,
};

crate::services::lazy_service!(InstitutionService);

impl InstitutionService {
    // 当前用户的机构列表
    pub async fn list_institutions(
        &self,
        request: &HttpRequest,
        query: InstitutionListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_institutions(self, request, query).await
    }

    pub async fn create_institution(
        &self,
        request: &HttpRequest,
        data: CreateInstitutionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_institution(self, request, data).await
    }

    pub async fn get_institution(
        &self,
        request: &HttpRequest,
        institution_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_institution(self, request, institution_id).await
    }

    pub async fn update_institution(
        &self,
        request: &HttpRequest,
        institution_id: i64,
        update: UpdateInstitutionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_institution(self, request, institution_id, update).await
    }

    // 删除机构（级联删除课程、学科、班级）
    pub async fn delete_institution(
        &self,
        request: &HttpRequest,
        institution_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_institution(self, request, institution_id).await
    }
}
