pub mod create;
pub mod delete;
pub mod get;
pub mod import;
pub mod list;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::students::requests::{
    CreateStudentRequest, ImportStudentsRequest, StudentListParams, UpdateStudentRequest,
};

crate::services::lazy_service!(StudentService);

impl StudentService {
    pub async fn list_students(
        &self,
        request: &HttpRequest,
        query: StudentListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_students(self, request, query).await
    }

    pub async fn create_student(
        &self,
        request: &HttpRequest,
        data: CreateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_student(self, request, data).await
    }

    pub async fn get_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_student(self, request, student_id).await
    }

    pub async fn update_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
        update: UpdateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_student(self, request, student_id, update).await
    }

    pub async fn delete_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_student(self, request, student_id).await
    }

    // JSON 批量导入
    pub async fn import_students(
        &self,
        request: &HttpRequest,
        data: ImportStudentsRequest,
    ) -> ActixResult<HttpResponse> {
        import::import_students_json(self, request, data).await
    }

    // CSV 文件导入
    pub async fn import_students_csv(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        import::import_students_csv(self, request, payload).await
    }
}
