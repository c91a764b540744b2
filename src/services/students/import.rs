//! 学生批量导入（JSON 与 CSV）

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::StreamExt;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::info;

use super::StudentService;
use crate::config::AppConfig;
use crate::models::students::requests::{ImportStudentRow, ImportStudentsRequest};
use crate::models::students::responses::ImportRowError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response};
use crate::storage::OwnedResource;

/// 首行首列为这些词时视为表头
const HEADER_WORDS: &[&str] = &[
    "matricula",
    "matrícula",
    "registration",
    "identificador",
    "ra",
    "id",
];

/// 带行号的导入行（行号从 1 开始，对应文件中的实际行）
#[derive(Debug, Clone, PartialEq)]
struct NumberedRow {
    row: usize,
    student: ImportStudentRow,
}

/// 上传的 CSV 与附带字段
struct CsvUpload {
    data: Vec<u8>,
    class_id: Option<i64>,
}

pub async fn import_students_json(
    service: &StudentService,
    request: &HttpRequest,
    data: ImportStudentsRequest,
) -> ActixResult<HttpResponse> {
    let rows = data
        .students
        .into_iter()
        .enumerate()
        .map(|(i, student)| NumberedRow { row: i + 1, student })
        .collect();

    import_rows(service, request, rows, data.class_id).await
}

pub async fn import_students_csv(
    service: &StudentService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let config = AppConfig::get();

    let upload = match read_upload(&mut payload, config.import.max_file_size).await {
        Ok(upload) => upload,
        Err(e) => {
            return Ok(bad_request(
                ErrorCode::FileUploadFailed,
                format!("Failed to read uploaded file: {e}"),
            ));
        }
    };

    let rows = match parse_csv(&upload.data) {
        Ok(rows) => rows,
        Err(e) => return Ok(bad_request(ErrorCode::ImportFileParseFailed, e)),
    };

    import_rows(service, request, rows, upload.class_id).await
}

async fn import_rows(
    service: &StudentService,
    request: &HttpRequest,
    rows: Vec<NumberedRow>,
    class_id: Option<i64>,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let max_rows = AppConfig::get().import.max_rows;

    if let Some(class_id) = class_id {
        let user_id = match current_user_id(request) {
            Ok(id) => id,
            Err(resp) => return Ok(resp),
        };
        if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Class, class_id).await {
            return Ok(resp);
        }
    }

    if rows.is_empty() {
        return Ok(bad_request(
            ErrorCode::ImportFileDataInvalid,
            "No student rows to import",
        ));
    }
    if rows.len() > max_rows {
        return Ok(bad_request(
            ErrorCode::ImportFileDataInvalid,
            format!("At most {max_rows} rows can be imported at once"),
        ));
    }

    let total = rows.len();
    let (valid, errors) = validate_rows(rows);
    let failed: HashSet<usize> = errors.iter().map(|e| e.row).collect();

    let mut summary = match storage.import_students(valid, class_id).await {
        Ok(summary) => summary,
        Err(e) => return Ok(error_response(&e, ErrorCode::StudentAlreadyExists)),
    };
    summary.total = total;
    summary.failed = failed.len();
    summary.errors = errors;

    info!(
        "Student import: {} rows, {} created, {} updated, {} enrolled, {} failed",
        summary.total, summary.created, summary.updated, summary.enrolled, summary.failed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "Import completed")))
}

/// 必填校验与文件内学号去重；返回可写入的行与逐行错误
fn validate_rows(rows: Vec<NumberedRow>) -> (Vec<ImportStudentRow>, Vec<ImportRowError>) {
    let mut valid = Vec::new();
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for NumberedRow { row, student } in rows {
        let registration = student.registration.trim().to_string();
        let name = student.name.trim().to_string();
        let mut ok = true;

        if registration.is_empty() {
            ok = false;
            errors.push(ImportRowError {
                row,
                field: "registration".to_string(),
                message: "Registration is required".to_string(),
            });
        }
        if name.is_empty() {
            ok = false;
            errors.push(ImportRowError {
                row,
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }
        if ok && !seen.insert(registration.clone()) {
            ok = false;
            errors.push(ImportRowError {
                row,
                field: "registration".to_string(),
                message: format!("Registration {registration} appears more than once"),
            });
        }

        if ok {
            valid.push(ImportStudentRow { registration, name });
        }
    }

    (valid, errors)
}

async fn read_upload(payload: &mut Multipart, max_size: usize) -> Result<CsvUpload, String> {
    let mut data = Vec::new();
    let mut class_id = None;
    let mut found_file = false;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("invalid multipart field: {e}"))?;
        let name = field.name().unwrap_or_default().to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| format!("failed to read data: {e}"))?;
            if bytes.len() + chunk.len() > max_size {
                return Err(format!("file exceeds {max_size} bytes"));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => {
                found_file = true;
                data = bytes;
            }
            "class_id" | "turma_id" => {
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                if !text.is_empty() {
                    class_id = Some(
                        text.parse::<i64>()
                            .map_err(|_| format!("invalid class_id: {text}"))?,
                    );
                }
            }
            _ => {}
        }
    }

    if !found_file || data.is_empty() {
        return Err("file field is missing or empty".to_string());
    }

    Ok(CsvUpload { data, class_id })
}

/// 首行分号多于逗号时按分号分隔，否则按逗号
fn detect_delimiter(data: &[u8]) -> u8 {
    let first_line = data.split(|b| *b == b'\n').next().unwrap_or_default();
    let count = |needle: u8| first_line.iter().filter(|b| **b == needle).count();
    if count(b';') > count(b',') { b';' } else { b',' }
}

fn is_header(cell: &str) -> bool {
    let cell = cell.trim().to_lowercase();
    HEADER_WORDS.contains(&cell.as_str())
}

fn parse_csv(data: &[u8]) -> Result<Vec<NumberedRow>, String> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(detect_delimiter(data))
        .from_reader(Cursor::new(data));

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("Failed to parse line {}: {e}", index + 1))?;
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);

        let registration = record.get(0).unwrap_or_default();
        let name = record.get(1).unwrap_or_default();

        if index == 0 && is_header(registration) {
            continue;
        }
        if registration.is_empty() && name.is_empty() {
            continue;
        }

        rows.push(NumberedRow {
            row,
            student: ImportStudentRow {
                registration: registration.to_string(),
                name: name.to_string(),
            },
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(registration: &str, name: &str) -> ImportStudentRow {
        ImportStudentRow {
            registration: registration.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"123;Ana\n456,Bia"), b';');
        assert_eq!(detect_delimiter(b"123,Ana\n456;Bia"), b',');
        assert_eq!(detect_delimiter(b""), b',');
        assert_eq!(detect_delimiter(b"2024001,\"Souza; Ana\""), b',');
        assert_eq!(detect_delimiter(b"2024001;\"Souza, Ana\";x"), b';');
    }

    #[test]
    fn test_parse_comma_with_semicolon_in_quoted_name() {
        let rows = parse_csv(b"2024001,\"Souza; Ana\"\n2024002,Bruno\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].student, student("2024001", "Souza; Ana"));
        assert_eq!(rows[1].student, student("2024002", "Bruno"));
    }

    #[test]
    fn test_parse_comma_with_header() {
        let data = "Matrícula,Nome\n2024001,Ana Souza\n2024002, Bruno Lima \n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[0].student, student("2024001", "Ana Souza"));
        assert_eq!(rows[1].student, student("2024002", "Bruno Lima"));
    }

    #[test]
    fn test_parse_semicolon_without_header() {
        let data = "\u{feff}2024001;Ana\r\n2024002;Bia\r\n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[1].student, student("2024002", "Bia"));
    }

    #[test]
    fn test_parse_missing_name_is_kept_for_validation() {
        let rows = parse_csv(b"identificador;nome\n2024001\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student, student("2024001", ""));

        let (valid, errors) = validate_rows(rows);
        assert!(valid.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[0].row, 2);
    }

    #[test]
    fn test_validate_rows_rejects_duplicates() {
        let rows = vec![
            NumberedRow {
                row: 1,
                student: student("1", "Ana"),
            },
            NumberedRow {
                row: 2,
                student: student(" 1 ", "Ana Maria"),
            },
            NumberedRow {
                row: 3,
                student: student("", ""),
            },
        ];

        let (valid, errors) = validate_rows(rows);
        assert_eq!(valid, vec![student("1", "Ana")]);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.row == 2 && e.field == "registration"));
        assert_eq!(errors.iter().filter(|e| e.row == 3).count(), 2);
    }
}
