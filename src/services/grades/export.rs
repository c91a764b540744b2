//! 成绩表 CSV 导出

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, TimeZone};
use tracing::{error, info};

use super::GradeService;
use super::board::load_board;
use crate::models::ErrorCode;
use crate::models::grades::requests::GradeBoardParams;
use crate::models::grades::responses::{GradeBoardResponse, GradeBoardRow};
use crate::models::subjects::entities::Subject;
use crate::services::access::current_user_id;
use crate::services::bad_request;

pub async fn export_grades(
    service: &GradeService,
    request: &HttpRequest,
    query: GradeBoardParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    let (subject, board) =
        match load_board(&storage, user_id, query.class_id, query.subject_id).await {
            Ok(result) => result,
            Err(resp) => return Ok(resp),
        };

    // 所有成绩录入完成后才能导出
    if !board.complete {
        return Ok(bad_request(
            ErrorCode::GradesIncomplete,
            "All grades must be filled in before exporting",
        ));
    }

    let data = render_csv(&board).map_err(|e| {
        error!("CSV 生成失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("CSV 生成失败: {e}"))
    })?;
    let filename = export_filename(&chrono::Local::now(), board.class_id, &subject);

    info!(
        "Grades exported for class {} subject {} ({} students)",
        board.class_id,
        board.subject_id,
        board.students.len()
    );

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(data))
}

fn format_grade(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// 表头 `Matrícula,Nome,<缩写…>[,Nota Final]`，设置了公式时才有最终成绩列
pub(crate) fn render_csv(board: &GradeBoardResponse) -> Result<Vec<u8>, csv::Error> {
    let include_final = board
        .formula
        .as_deref()
        .is_some_and(|f| !f.trim().is_empty());

    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["Matrícula".to_string(), "Nome".to_string()];
    header.extend(board.components.iter().map(|c| c.abbreviation.clone()));
    if include_final {
        header.push("Nota Final".to_string());
    }
    wtr.write_record(&header)?;

    let mut rows: Vec<&GradeBoardRow> = board.students.iter().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    for row in rows {
        let mut record = vec![row.registration.clone(), row.name.clone()];
        record.extend(
            board
                .components
                .iter()
                .map(|c| format_grade(row.grades.get(&c.abbreviation).copied().flatten())),
        );
        if include_final {
            record.push(format_grade(row.effective_grade()));
        }
        wtr.write_record(&record)?;
    }

    wtr.into_inner().map_err(|e| e.into_error().into())
}

/// `YYYY-MM-DD_HHMMSSmmm-Turma{class_id}_{学科缩写或 ID}.csv`
pub(crate) fn export_filename<Tz: TimeZone>(
    now: &DateTime<Tz>,
    class_id: i64,
    subject: &Subject,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}-Turma{}_{}.csv",
        now.format("%Y-%m-%d_%H%M%S%3f"),
        class_id,
        subject.file_label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::grades::board::build_board;
    use crate::services::grades::board::tests::{component, record, student, subject};
    use chrono::Utc;

    #[test]
    fn test_render_csv_with_formula() {
        let board = build_board(
            3,
            &subject(Some("(P1 + P2) / 2")),
            vec![component(1, "P1", 1.0), component(2, "P2", 1.0)],
            vec![student(11, "2024002", "Bruno"), student(10, "2024001", "Ana")],
            &[
                record(10, 1, 5.0),
                record(10, 2, 8.5),
                record(11, 1, 7.0),
                record(11, 2, 6.25),
            ],
            &[],
        );

        let csv = String::from_utf8(render_csv(&board).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Matrícula,Nome,P1,P2,Nota Final");
        assert_eq!(lines[1], "2024001,Ana,5.00,8.50,6.75");
        assert_eq!(lines[2], "2024002,Bruno,7.00,6.25,6.63");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_render_csv_without_formula_has_no_final_column() {
        let board = build_board(
            3,
            &subject(None),
            vec![component(1, "P1", 1.0)],
            vec![student(10, "2024001", "Ana, Maria")],
            &[record(10, 1, 10.0)],
            &[],
        );

        let csv = String::from_utf8(render_csv(&board).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Matrícula,Nome,P1");
        assert_eq!(lines[1], "2024001,\"Ana, Maria\",10.00");
    }

    #[test]
    fn test_export_filename() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 5, 9, 7, 2)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(45);

        assert_eq!(
            export_filename(&now, 3, &subject(None)),
            "2024-03-05_090702045-Turma3_ALG.csv"
        );

        let mut without_abbreviation = subject(None);
        without_abbreviation.abbreviation = None;
        assert_eq!(
            export_filename(&now, 12, &without_abbreviation),
            "2024-03-05_090702045-Turma12_7.csv"
        );
    }
}
