pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod students;
pub mod subjects;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::classes::requests::{
    ClassListParams, CreateClassRequest, EnrollStudentRequest, LinkSubjectRequest,
    UpdateClassRequest,
};

crate::services::lazy_service!(ClassService);

impl ClassService {
    // 获取班级列表
    pub async fn list_classes(
        &self,
        request: &HttpRequest,
        query: ClassListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_classes(self, request, query).await
    }

    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_class(self, request, class_data).await
    }

    pub async fn get_class(&self, request: &HttpRequest, class_id: i64) -> ActixResult<HttpResponse> {
        get::get_class(self, request, class_id).await
    }

    pub async fn update_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
        update_data: UpdateClassRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_class(self, request, class_id, update_data).await
    }

    pub async fn delete_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_class(self, request, class_id).await
    }

    // 班级关联的学科
    pub async fn list_subjects(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        subjects::list_subjects(self, request, class_id).await
    }

    pub async fn link_subject(
        &self,
        request: &HttpRequest,
        class_id: i64,
        data: LinkSubjectRequest,
    ) -> ActixResult<HttpResponse> {
        subjects::link_subject(self, request, class_id, data.subject_id).await
    }

    pub async fn unlink_subject(
        &self,
        request: &HttpRequest,
        class_id: i64,
        subject_id: i64,
    ) -> ActixResult<HttpResponse> {
        subjects::unlink_subject(self, request, class_id, subject_id).await
    }

    // 班级学生
    pub async fn list_students(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        students::list_students(self, request, class_id).await
    }

    pub async fn enroll_student(
        &self,
        request: &HttpRequest,
        class_id: i64,
        data: EnrollStudentRequest,
    ) -> ActixResult<HttpResponse> {
        students::enroll_student(self, request, class_id, data.student_id).await
    }

    pub async fn unenroll_student(
        &self,
        request: &HttpRequest,
        class_id: i64,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        students::unenroll_student(self, request, class_id, student_id).await
    }
}
