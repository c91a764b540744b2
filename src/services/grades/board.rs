//! 成绩表：班级学生 × 学科组成项

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{GradeService, check_class_subject};
use crate::errors::NotaDezError;
use crate::formula::{self, ComponentGrade};
use crate::models::components::entities::GradeComponent;
use crate::models::grades::entities::{FinalGrade, GradeRecord};
use crate::models::grades::requests::GradeBoardParams;
use crate::models::grades::responses::{GradeBoardResponse, GradeBoardRow};
use crate::models::students::entities::Student;
use crate::models::subjects::entities::Subject;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::current_user_id;
use crate::services::{error_response, not_found};
use crate::storage::Storage;

pub async fn get_board(
    service: &GradeService,
    request: &HttpRequest,
    query: GradeBoardParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match load_board(&storage, user_id, query.class_id, query.subject_id).await {
        Ok((_, board)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            board,
            "Grade board retrieved successfully",
        ))),
        Err(resp) => Ok(resp),
    }
}

/// 读取并组装成绩表，同时返回学科（导出文件名需要）
pub(crate) async fn load_board(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    class_id: i64,
    subject_id: i64,
) -> Result<(Subject, GradeBoardResponse), HttpResponse> {
    check_class_subject(storage, user_id, class_id, subject_id).await?;

    let to_response = |e: NotaDezError| error_response(&e, ErrorCode::Conflict);

    let subject = storage
        .get_subject_by_id(subject_id)
        .await
        .map_err(to_response)?
        .ok_or_else(|| not_found(ErrorCode::SubjectNotFound, "Subject not found"))?;
    let components = storage
        .list_components(subject_id)
        .await
        .map_err(to_response)?;
    let students = storage
        .list_class_students(class_id)
        .await
        .map_err(to_response)?;
    let records = storage
        .list_grade_records(class_id, subject_id)
        .await
        .map_err(to_response)?;
    let finals = storage
        .list_final_grades(class_id, subject_id)
        .await
        .map_err(to_response)?;

    let board = build_board(class_id, &subject, components, students, &records, &finals);
    Ok((subject, board))
}

/// 组装成绩表
///
/// 最终成绩按当前公式（或加权平均）实时计算，人工调整值取自已保存的最终成绩。
pub(crate) fn build_board(
    class_id: i64,
    subject: &Subject,
    components: Vec<GradeComponent>,
    students: Vec<Student>,
    records: &[GradeRecord],
    finals: &[FinalGrade],
) -> GradeBoardResponse {
    let values: HashMap<(i64, i64), f64> = records
        .iter()
        .map(|r| ((r.student_id, r.component_id), r.value))
        .collect();
    let finals: HashMap<i64, &FinalGrade> = finals.iter().map(|f| (f.student_id, f)).collect();

    let rows: Vec<GradeBoardRow> = students
        .into_iter()
        .map(|student| {
            let grades: Vec<ComponentGrade<'_>> = components
                .iter()
                .map(|c| ComponentGrade {
                    abbreviation: &c.abbreviation,
                    weight: c.weight,
                    value: values.get(&(student.id, c.id)).copied(),
                })
                .collect();

            let final_grade = formula::final_grade(subject.final_grade_formula.as_deref(), &grades)
                .ok()
                .flatten();
            let stored = finals.get(&student.id);

            GradeBoardRow {
                student_id: student.id,
                registration: student.registration,
                name: student.name,
                grades: grades
                    .iter()
                    .map(|g| (g.abbreviation.to_string(), g.value))
                    .collect::<BTreeMap<_, _>>(),
                final_grade,
                adjusted_grade: stored.and_then(|f| f.adjusted_value),
                use_adjusted: stored.is_some_and(|f| f.use_adjusted),
            }
        })
        .collect();

    let complete = rows.iter().all(GradeBoardRow::is_complete);

    GradeBoardResponse {
        class_id,
        subject_id: subject.id,
        formula: subject.final_grade_formula.clone(),
        components,
        students: rows,
        complete,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    pub(crate) fn subject(formula: Option<&str>) -> Subject {
        Subject {
            id: 7,
            course_id: 1,
            name: "Algoritmos".to_string(),
            abbreviation: Some("ALG".to_string()),
            code: None,
            period: None,
            final_grade_formula: formula.map(str::to_string),
            created_at: now(),
            updated_at: now(),
        }
    }

    pub(crate) fn component(id: i64, abbreviation: &str, weight: f64) -> GradeComponent {
        GradeComponent {
            id,
            subject_id: 7,
            name: abbreviation.to_string(),
            abbreviation: abbreviation.to_string(),
            description: None,
            weight,
            created_at: now(),
            updated_at: now(),
        }
    }

    pub(crate) fn student(id: i64, registration: &str, name: &str) -> Student {
        Student {
            id,
            registration: registration.to_string(),
            name: name.to_string(),
            created_at: now(),
            updated_at: now(),
        }
    }

    pub(crate) fn record(student_id: i64, component_id: i64, value: f64) -> GradeRecord {
        GradeRecord {
            id: student_id * 100 + component_id,
            class_id: 3,
            student_id,
            component_id,
            value,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_board_with_formula() {
        let board = build_board(
            3,
            &subject(Some("P1 * 0.4 + P2 * 0.6")),
            vec![component(1, "P1", 1.0), component(2, "P2", 1.0)],
            vec![student(10, "2024001", "Ana"), student(11, "2024002", "Bruno")],
            &[record(10, 1, 5.0), record(10, 2, 8.0), record(11, 1, 7.0)],
            &[],
        );

        assert!(!board.complete);
        assert_eq!(board.students.len(), 2);

        let ana = &board.students[0];
        assert!(ana.is_complete());
        assert_eq!(ana.grades.get("P1"), Some(&Some(5.0)));
        assert_eq!(ana.final_grade, Some(6.8));

        let bruno = &board.students[1];
        assert_eq!(bruno.grades.get("P2"), Some(&None));
        assert_eq!(bruno.final_grade, None);
    }

    #[test]
    fn test_board_weighted_mean_and_adjustment() {
        let finals = vec![FinalGrade {
            class_id: 3,
            subject_id: 7,
            student_id: 10,
            computed_value: Some(6.0),
            adjusted_value: Some(7.0),
            use_adjusted: true,
            updated_at: now(),
        }];
        let board = build_board(
            3,
            &subject(None),
            vec![component(1, "P1", 2.0), component(2, "T1", 1.0)],
            vec![student(10, "2024001", "Ana")],
            &[record(10, 1, 6.0), record(10, 2, 9.0)],
            &finals,
        );

        assert!(board.complete);
        let ana = &board.students[0];
        assert_eq!(ana.final_grade, Some(7.0));
        assert_eq!(ana.adjusted_grade, Some(7.0));
        assert!(ana.use_adjusted);
        assert_eq!(ana.effective_grade(), Some(7.0));
    }

    #[test]
    fn test_board_division_by_zero_leaves_final_empty() {
        let board = build_board(
            3,
            &subject(Some("P1 / P2")),
            vec![component(1, "P1", 1.0), component(2, "P2", 1.0)],
            vec![student(10, "2024001", "Ana")],
            &[record(10, 1, 5.0), record(10, 2, 0.0)],
            &[],
        );
        assert!(board.complete);
        assert_eq!(board.students[0].final_grade, None);
    }
}
