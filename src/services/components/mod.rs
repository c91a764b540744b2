pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::warn;

use crate::formula::Formula;
use crate::models::ErrorCode;
use crate::models::components::entities::GradeComponent;
use crate::models::components::requests::{
    ComponentListParams, CreateComponentRequest, UpdateComponentRequest,
};
use crate::services::error_response;
use crate::storage::Storage;

crate::services::lazy_service!(ComponentService);

impl ComponentService {
    // 学科的成绩组成项，按缩写排序
    pub async fn list_components(
        &self,
        request: &HttpRequest,
        query: ComponentListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_components(self, request, query).await
    }

    pub async fn create_component(
        &self,
        request: &HttpRequest,
        data: CreateComponentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_component(self, request, data).await
    }

    pub async fn get_component(
        &self,
        request: &HttpRequest,
        component_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_component(self, request, component_id).await
    }

    pub async fn update_component(
        &self,
        request: &HttpRequest,
        component_id: i64,
        update: UpdateComponentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_component(self, request, component_id, update).await
    }

    pub async fn delete_component(
        &self,
        request: &HttpRequest,
        component_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_component(self, request, component_id).await
    }
}

/// 学科公式是否引用了该组成项的缩写
pub(crate) async fn referenced_by_formula(
    storage: &Arc<dyn Storage>,
    component: &GradeComponent,
) -> Result<bool, HttpResponse> {
    let subject = storage
        .get_subject_by_id(component.subject_id)
        .await
        .map_err(|e| error_response(&e, ErrorCode::Conflict))?;

    let Some(source) = subject.and_then(|s| s.final_grade_formula) else {
        return Ok(false);
    };

    match Formula::parse(&source) {
        Ok(formula) => Ok(formula.references_abbreviation(&component.abbreviation)),
        Err(e) => {
            warn!(
                "Stored formula of subject {} does not parse: {}",
                component.subject_id, e
            );
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::models::institutions::requests::CreateInstitutionRequest;
    use crate::models::subjects::requests::CreateSubjectRequest;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::{HttpMessage, web};
    use sea_orm::{ConnectOptions, Database};

    /// 公式 `(P1 + P2) / 2` 的学科，另有一个未被引用的 T1
    struct Setup {
        storage: Arc<dyn Storage>,
        request: HttpRequest,
        p1: GradeComponent,
        t1: GradeComponent,
    }

    async fn setup() -> Setup {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::with_connection(db).await.unwrap());

        let user = storage
            .create_user(CreateUserRequest {
                name: "Ana Souza".into(),
                email: "ana@example.com".into(),
                phone: None,
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        let institution = storage
            .create_institution(user.id, CreateInstitutionRequest { name: "IFSP".into() })
            .await
            .unwrap();
        let course = storage
            .create_course(CreateCourseRequest {
                institution_id: institution.id,
                name: "Informática".into(),
            })
            .await
            .unwrap();
        let subject = storage
            .create_subject(CreateSubjectRequest {
                course_id: course.id,
                name: "Algoritmos".into(),
                abbreviation: None,
                code: None,
                period: None,
                final_grade_formula: Some("(P1 + P2) / 2".into()),
            })
            .await
            .unwrap();

        let mut components = Vec::new();
        for abbreviation in ["P1", "P2", "T1"] {
            let component = storage
                .create_component(CreateComponentRequest {
                    subject_id: subject.id,
                    name: format!("Avaliação {abbreviation}"),
                    abbreviation: abbreviation.into(),
                    description: None,
                    weight: None,
                })
                .await
                .unwrap();
            components.push(component);
        }

        let request = TestRequest::default()
            .app_data(web::Data::new(storage.clone()))
            .to_http_request();
        request.extensions_mut().insert(user);

        let t1 = components.pop().unwrap();
        let p1 = components.remove(0);
        Setup {
            storage,
            request,
            p1,
            t1,
        }
    }

    fn rename(abbreviation: &str) -> UpdateComponentRequest {
        UpdateComponentRequest {
            abbreviation: Some(abbreviation.into()),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn test_referenced_by_formula() {
        let s = setup().await;
        assert!(matches!(
            referenced_by_formula(&s.storage, &s.p1).await,
            Ok(true)
        ));
        assert!(matches!(
            referenced_by_formula(&s.storage, &s.t1).await,
            Ok(false)
        ));
    }

    #[actix_web::test]
    async fn test_delete_referenced_component_is_conflict() {
        let s = setup().await;
        let service = ComponentService::new_lazy();

        let resp = service.delete_component(&s.request, s.p1.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(s.storage.get_component_by_id(s.p1.id).await.unwrap().is_some());

        let resp = service.delete_component(&s.request, s.t1.id).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(s.storage.get_component_by_id(s.t1.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_rename_referenced_abbreviation_is_conflict() {
        let s = setup().await;
        let service = ComponentService::new_lazy();

        let resp = service
            .update_component(&s.request, s.p1.id, rename("P9"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let p1 = s.storage.get_component_by_id(s.p1.id).await.unwrap().unwrap();
        assert_eq!(p1.abbreviation, "P1");

        // 同名或只改权重不算改名
        let resp = service
            .update_component(
                &s.request,
                s.p1.id,
                UpdateComponentRequest {
                    abbreviation: Some(" P1 ".into()),
                    weight: Some(2.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_rename_unreferenced_abbreviation_succeeds() {
        let s = setup().await;
        let service = ComponentService::new_lazy();

        let resp = service
            .update_component(&s.request, s.t1.id, rename("T2"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let t1 = s.storage.get_component_by_id(s.t1.id).await.unwrap().unwrap();
        assert_eq!(t1.abbreviation, "T2");
    }
}
