use super::SeaOrmStorage;
use crate::models::{
    PaginationQuery,
    classes::requests::CreateClassRequest,
    components::requests::{CreateComponentRequest, UpdateComponentRequest},
    courses::requests::{CourseListParams, CreateCourseRequest},
    grades::requests::{
        AdjustFinalGradeRequest, DeleteGradeRequest, GradeAuditListParams, SaveGradeRequest,
    },
    institutions::requests::{
        CreateInstitutionRequest, InstitutionListParams, OnboardingRequest,
        UpdateInstitutionRequest,
    },
    students::requests::{CreateStudentRequest, ImportStudentRow, StudentListParams},
    subjects::requests::CreateSubjectRequest,
    users::requests::CreateUserRequest,
};
use crate::errors::NotaDezError;
use crate::storage::{OwnedResource, Storage};
use sea_orm::{ConnectOptions, Database};

async fn setup() -> SeaOrmStorage {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    SeaOrmStorage::with_connection(db).await.unwrap()
}

async fn create_user(storage: &SeaOrmStorage, email: &str) -> i64 {
    storage
        .create_user(CreateUserRequest {
            name: "Ana Souza".into(),
            email: email.into(),
            phone: None,
            password_hash: "hash".into(),
        })
        .await
        .unwrap()
        .id
}

/// 用户 -> 机构 -> 课程 -> 学科 -> 班级，学科有 P1/P2 两个组成项，班级有一名学生
struct Fixture {
    user_id: i64,
    institution_id: i64,
    course_id: i64,
    subject_id: i64,
    class_id: i64,
    p1: i64,
    p2: i64,
    student_id: i64,
}

async fn fixture(storage: &SeaOrmStorage, formula: Option<&str>) -> Fixture {
    let user_id = create_user(storage, "ana@example.com").await;
    let institution_id = storage
        .create_institution(user_id, CreateInstitutionRequest { name: "IFSP".into() })
        .await
        .unwrap()
        .id;
    let course_id = storage
        .create_course(CreateCourseRequest {
            institution_id,
            name: "Informática".into(),
        })
        .await
        .unwrap()
        .id;
    let subject_id = storage
        .create_subject(CreateSubjectRequest {
            course_id,
            name: "Algoritmos".into(),
            abbreviation: Some("ALG".into()),
            code: None,
            period: Some("2025/1".into()),
            final_grade_formula: formula.map(str::to_string),
        })
        .await
        .unwrap()
        .id;
    let class_id = storage
        .create_class(CreateClassRequest {
            course_id,
            name: "Turma A".into(),
            subject_ids: vec![],
        })
        .await
        .unwrap()
        .id;
    storage.link_class_subject(class_id, subject_id).await.unwrap();

    let mut component_ids = Vec::new();
    for (abbreviation, weight) in [("P1", 2.0), ("P2", 1.0)] {
        let component = storage
            .create_component(CreateComponentRequest {
                subject_id,
                name: format!("Prova {abbreviation}"),
                abbreviation: abbreviation.into(),
                description: None,
                weight: Some(weight),
            })
            .await
            .unwrap();
        component_ids.push(component.id);
    }

    let student_id = storage
        .create_student(CreateStudentRequest {
            registration: "2025001".into(),
            name: "Bruno Lima".into(),
        })
        .await
        .unwrap()
        .id;
    storage.enroll_student(class_id, student_id).await.unwrap();

    Fixture {
        user_id,
        institution_id,
        course_id,
        subject_id,
        class_id,
        p1: component_ids[0],
        p2: component_ids[1],
        student_id,
    }
}

fn save_request(f: &Fixture, component_id: i64, value: f64) -> SaveGradeRequest {
    SaveGradeRequest {
        class_id: f.class_id,
        subject_id: f.subject_id,
        student_id: f.student_id,
        component_id,
        value,
    }
}

#[tokio::test]
async fn test_user_email_lookup_and_uniqueness() {
    let storage = setup().await;
    let id = create_user(&storage, "prof@example.com").await;

    let found = storage
        .get_user_by_email(" PROF@example.com ")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);
    assert!(storage.update_last_login(id).await.unwrap());

    let err = storage
        .create_user(CreateUserRequest {
            name: "Outro".into(),
            email: "prof@example.com".into(),
            phone: None,
            password_hash: "hash".into(),
        })
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn test_institutions_are_scoped_to_owner() {
    let storage = setup().await;
    let alice = create_user(&storage, "alice@example.com").await;
    let bob = create_user(&storage, "bob@example.com").await;

    for name in ["Escola Norte", "Escola Sul"] {
        storage
            .create_institution(alice, CreateInstitutionRequest { name: name.into() })
            .await
            .unwrap();
    }
    storage
        .create_institution(bob, CreateInstitutionRequest { name: "Escola Norte".into() })
        .await
        .unwrap();

    let page = storage
        .list_institutions_with_pagination(
            alice,
            InstitutionListParams {
                pagination: PaginationQuery { page: 1, size: 10 },
                search: Some("sul".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.items[0].name, "Escola Sul");

    let err = storage
        .create_institution(alice, CreateInstitutionRequest { name: "Escola Norte".into() })
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn test_update_and_delete_institution() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    let updated = storage
        .update_institution(
            f.institution_id,
            UpdateInstitutionRequest {
                name: Some("  IF São Paulo ".into()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "IF São Paulo");

    assert!(storage
        .update_institution(9999, UpdateInstitutionRequest { name: None })
        .await
        .unwrap()
        .is_none());

    // 级联删除
    assert!(storage.delete_institution(f.institution_id).await.unwrap());
    assert!(storage.get_course_by_id(f.course_id).await.unwrap().is_none());
    assert!(storage.get_subject_by_id(f.subject_id).await.unwrap().is_none());
    assert!(storage.get_class_by_id(f.class_id).await.unwrap().is_none());
    assert!(storage.get_component_by_id(f.p1).await.unwrap().is_none());
    // 学生是全局的，不随机构删除
    assert!(storage.get_student_by_id(f.student_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_resolve_owner_follows_the_chain() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    for (resource, id) in [
        (OwnedResource::Institution, f.institution_id),
        (OwnedResource::Course, f.course_id),
        (OwnedResource::Subject, f.subject_id),
        (OwnedResource::Class, f.class_id),
        (OwnedResource::Component, f.p2),
    ] {
        assert_eq!(
            storage.resolve_owner(resource, id).await.unwrap(),
            Some(f.user_id),
            "{resource:?}"
        );
    }
    assert_eq!(
        storage
            .resolve_owner(OwnedResource::Class, 424242)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_onboarding_reuses_institution_by_name() {
    let storage = setup().await;
    let user = create_user(&storage, "onboard@example.com").await;

    let first = storage
        .onboard(
            user,
            OnboardingRequest {
                institution_name: "Colégio Central".into(),
                course_name: "Ensino Médio".into(),
            },
        )
        .await
        .unwrap();
    assert!(first.institution_created);
    assert_eq!(first.course.institution_name.as_deref(), Some("Colégio Central"));

    let second = storage
        .onboard(
            user,
            OnboardingRequest {
                institution_name: "Colégio Central".into(),
                course_name: "Técnico".into(),
            },
        )
        .await
        .unwrap();
    assert!(!second.institution_created);
    assert_eq!(second.institution.id, first.institution.id);

    let courses = storage
        .list_courses_with_pagination(
            user,
            CourseListParams {
                pagination: PaginationQuery::default(),
                institution_id: Some(first.institution.id),
                search: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(courses.pagination.total, 2);
    assert!(courses
        .items
        .iter()
        .all(|c| c.institution_name.as_deref() == Some("Colégio Central")));
}

#[tokio::test]
async fn test_onboarding_rolls_back_on_duplicate_course() {
    let storage = setup().await;
    let user = create_user(&storage, "rollback@example.com").await;
    let institution = storage
        .create_institution(user, CreateInstitutionRequest { name: "Escola".into() })
        .await
        .unwrap();
    storage
        .create_course(CreateCourseRequest {
            institution_id: institution.id,
            name: "Curso".into(),
        })
        .await
        .unwrap();

    let err = storage
        .onboard(
            user,
            OnboardingRequest {
                institution_name: "Escola".into(),
                course_name: "Curso".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn test_class_links_and_enrollments() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    assert!(storage.is_subject_linked(f.class_id, f.subject_id).await.unwrap());
    let err = storage
        .link_class_subject(f.class_id, f.subject_id)
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let err = storage
        .enroll_student(f.class_id, f.student_id)
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let err = storage.enroll_student(f.class_id, 777).await.unwrap_err();
    assert!(err.is_foreign_key_violation());

    let subjects = storage.list_class_subjects(f.class_id).await.unwrap();
    assert_eq!(subjects.len(), 1);

    assert!(storage.unenroll_student(f.class_id, f.student_id).await.unwrap());
    assert!(!storage.is_student_enrolled(f.class_id, f.student_id).await.unwrap());
    assert!(storage.unlink_class_subject(f.class_id, f.subject_id).await.unwrap());
    assert!(!storage.unlink_class_subject(f.class_id, f.subject_id).await.unwrap());
}

#[tokio::test]
async fn test_import_upserts_and_enrolls() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    let rows = vec![
        ImportStudentRow {
            registration: "2025001".into(),
            name: "Bruno Lima Filho".into(),
        },
        ImportStudentRow {
            registration: "2025002".into(),
            name: "Carla Dias".into(),
        },
    ];
    let summary = storage.import_students(rows, Some(f.class_id)).await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.updated, 1);
    // 2025001 已在班级中
    assert_eq!(summary.enrolled, 1);

    let renamed = storage.get_student_by_id(f.student_id).await.unwrap().unwrap();
    assert_eq!(renamed.name, "Bruno Lima Filho");

    let students = storage.list_class_students(f.class_id).await.unwrap();
    let names: Vec<_> = students.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Bruno Lima Filho", "Carla Dias"]);

    let page = storage
        .list_students_with_pagination(StudentListParams {
            pagination: PaginationQuery::default(),
            search: Some("2025002".into()),
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_import_into_missing_class_rolls_back() {
    let storage = setup().await;
    let rows = vec![ImportStudentRow {
        registration: "X1".into(),
        name: "Ninguém".into(),
    }];

    let err = storage.import_students(rows, Some(999)).await.unwrap_err();
    assert!(err.is_foreign_key_violation());
    assert!(storage
        .get_student_by_registration("X1")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_save_grade_audits_and_computes_final() {
    let storage = setup().await;
    let f = fixture(&storage, Some("(P1 + P2) / 2")).await;

    let first = storage
        .save_grade(save_request(&f, f.p1, 7.456), f.user_id)
        .await
        .unwrap();
    assert_eq!(first.record.value, 7.46);
    assert_eq!(first.previous_value, None);
    assert_eq!(first.final_grade, None);

    let second = storage
        .save_grade(save_request(&f, f.p2, 9.0), f.user_id)
        .await
        .unwrap();
    assert_eq!(second.final_grade, Some(8.23));

    let third = storage
        .save_grade(save_request(&f, f.p1, 8.0), f.user_id)
        .await
        .unwrap();
    assert_eq!(third.previous_value, Some(7.46));
    assert_eq!(third.final_grade, Some(8.5));

    // 相同的值不产生审计
    storage
        .save_grade(save_request(&f, f.p1, 8.0), f.user_id)
        .await
        .unwrap();

    let audits = storage
        .list_grade_audits_with_pagination(GradeAuditListParams {
            class_id: Some(f.class_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(audits.pagination.total, 3);
    assert_eq!(audits.items[0].message, "Grade P1 changed from 7.46 to 8.00");
    assert_eq!(audits.items[0].old_value, Some(7.46));

    let finals = storage
        .list_final_grades(f.class_id, f.subject_id)
        .await
        .unwrap();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].computed_value, Some(8.5));
}

#[tokio::test]
async fn test_weighted_mean_without_formula() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    storage
        .save_grade(save_request(&f, f.p1, 8.0), f.user_id)
        .await
        .unwrap();
    let outcome = storage
        .save_grade(save_request(&f, f.p2, 5.0), f.user_id)
        .await
        .unwrap();
    // (8*2 + 5*1) / 3
    assert_eq!(outcome.final_grade, Some(7.0));
}

#[tokio::test]
async fn test_delete_grade_and_component_cascade() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    storage
        .save_grade(save_request(&f, f.p1, 6.0), f.user_id)
        .await
        .unwrap();
    storage
        .save_grade(save_request(&f, f.p2, 4.0), f.user_id)
        .await
        .unwrap();

    let removed = storage
        .delete_grade(
            DeleteGradeRequest {
                class_id: f.class_id,
                subject_id: Some(f.subject_id),
                student_id: f.student_id,
                component_id: f.p1,
            },
            f.user_id,
        )
        .await
        .unwrap();
    assert_eq!(removed, Some(6.0));

    let again = storage
        .delete_grade(
            DeleteGradeRequest {
                class_id: f.class_id,
                subject_id: None,
                student_id: f.student_id,
                component_id: f.p1,
            },
            f.user_id,
        )
        .await
        .unwrap();
    assert_eq!(again, None);

    assert!(storage.delete_component(f.p2).await.unwrap());
    let records = storage
        .list_grade_records(f.class_id, f.subject_id)
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_adjust_final_grade() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    let adjusted = storage
        .adjust_final_grade(
            AdjustFinalGradeRequest {
                class_id: f.class_id,
                subject_id: f.subject_id,
                student_id: f.student_id,
                adjusted_value: Some(6.005),
                use_adjusted: true,
            },
            f.user_id,
        )
        .await
        .unwrap();
    assert_eq!(adjusted.computed_value, None);
    assert_eq!(adjusted.effective_value(), Some(6.01));

    let audits = storage
        .list_grade_audits_with_pagination(GradeAuditListParams {
            student_id: Some(f.student_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(audits.items[0].component_id, None);
    assert_eq!(audits.items[0].message, "Final grade adjusted to 6.01");
}

#[tokio::test]
async fn test_component_uniqueness_and_update() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    let err = storage
        .create_component(CreateComponentRequest {
            subject_id: f.subject_id,
            name: "Outra prova".into(),
            abbreviation: "P1".into(),
            description: None,
            weight: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let updated = storage
        .update_component(
            f.p2,
            UpdateComponentRequest {
                weight: Some(3.0),
                description: Some("Prova final".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.weight, 3.0);
    assert_eq!(updated.abbreviation, "P2");

    let components = storage.list_components(f.subject_id).await.unwrap();
    let abbreviations: Vec<_> = components.iter().map(|c| c.abbreviation.as_str()).collect();
    assert_eq!(abbreviations, vec!["P1", "P2"]);
}

#[tokio::test]
async fn test_subject_formula_update_and_clear() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    let subject = storage
        .update_subject_formula(f.subject_id, Some("P1 * 0.6 + P2 * 0.4".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        subject.final_grade_formula.as_deref(),
        Some("P1 * 0.6 + P2 * 0.4")
    );

    let cleared = storage
        .update_subject_formula(f.subject_id, Some("   ".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.final_grade_formula, None);
}

#[tokio::test]
async fn test_password_reset_token_lifecycle() {
    let storage = setup().await;
    let user_id = create_user(&storage, "reset@example.com").await;
    let expires_at = chrono::Utc::now().timestamp() + 3600;

    let token_id = storage
        .create_password_reset_token(user_id, "abc123", expires_at)
        .await
        .unwrap();
    let token = storage
        .get_password_reset_token("abc123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(token.id, token_id);
    assert!(!token.used);
    assert!(!token.is_expired());

    storage
        .reset_password_with_token(token_id, user_id, "new-hash")
        .await
        .unwrap();

    let token = storage
        .get_password_reset_token("abc123")
        .await
        .unwrap()
        .unwrap();
    assert!(token.used);
    let user = storage.get_user_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(user.password_hash, "new-hash");

    // 令牌只能使用一次
    let err = storage
        .reset_password_with_token(token_id, user_id, "other-hash")
        .await
        .unwrap_err();
    assert!(matches!(err, NotaDezError::NotFound(_)));
    let user = storage.get_user_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(user.password_hash, "new-hash");

    assert!(storage.delete_password_reset_token(token_id).await.unwrap());
    assert!(storage
        .get_password_reset_token("abc123")
        .await
        .unwrap()
        .is_none());
}

async fn stored_final(storage: &SeaOrmStorage, f: &Fixture) -> Option<f64> {
    storage
        .list_final_grades(f.class_id, f.subject_id)
        .await
        .unwrap()
        .first()
        .and_then(|g| g.computed_value)
}

#[tokio::test]
async fn test_component_added_after_formula_leaves_final_pending() {
    let storage = setup().await;
    let f = fixture(&storage, Some("(P1 + P2) / 2")).await;

    storage
        .save_grade(save_request(&f, f.p1, 8.0), f.user_id)
        .await
        .unwrap();
    let outcome = storage
        .save_grade(save_request(&f, f.p2, 6.0), f.user_id)
        .await
        .unwrap();
    assert_eq!(outcome.final_grade, Some(7.0));

    let p3 = storage
        .create_component(CreateComponentRequest {
            subject_id: f.subject_id,
            name: "Trabalho".into(),
            abbreviation: "P3".into(),
            description: None,
            weight: None,
        })
        .await
        .unwrap();
    assert_eq!(stored_final(&storage, &f).await, None);

    // 公式未包含 P3 前不产生最终成绩
    let outcome = storage
        .save_grade(save_request(&f, p3.id, 9.0), f.user_id)
        .await
        .unwrap();
    assert_eq!(outcome.final_grade, None);

    storage
        .update_subject_formula(f.subject_id, Some("(P1 + P2 + P3) / 3".into()))
        .await
        .unwrap();
    assert_eq!(stored_final(&storage, &f).await, Some(7.67));
}

#[tokio::test]
async fn test_formula_and_weight_changes_recompute_stored_final() {
    let storage = setup().await;
    let f = fixture(&storage, None).await;

    storage
        .save_grade(save_request(&f, f.p1, 8.0), f.user_id)
        .await
        .unwrap();
    storage
        .save_grade(save_request(&f, f.p2, 5.0), f.user_id)
        .await
        .unwrap();
    assert_eq!(stored_final(&storage, &f).await, Some(7.0));

    storage
        .update_subject_formula(f.subject_id, Some("MAX(P1, P2)".into()))
        .await
        .unwrap();
    assert_eq!(stored_final(&storage, &f).await, Some(8.0));

    storage
        .update_subject_formula(f.subject_id, None)
        .await
        .unwrap();
    assert_eq!(stored_final(&storage, &f).await, Some(7.0));

    storage
        .update_component(
            f.p2,
            UpdateComponentRequest {
                weight: Some(2.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(stored_final(&storage, &f).await, Some(6.5));

    assert!(storage.delete_component(f.p2).await.unwrap());
    assert_eq!(stored_final(&storage, &f).await, Some(8.0));
}
