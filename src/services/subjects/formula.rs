//! 最终成绩公式的保存与校验

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use super::SubjectService;
use crate::errors::NotaDezError;
use crate::formula::{self, Formula};
use crate::models::{
    ApiResponse, ErrorCode,
    subjects::{requests::UpdateFormulaRequest, responses::FormulaValidationResponse},
};
use crate::services::access::{current_user_id, ensure_owner};
use crate::services::{bad_request, error_response, not_found};
use crate::storage::{OwnedResource, Storage};

/// 去掉首尾空白，空字符串视为清除
pub(crate) fn normalize_formula(formula: Option<&str>) -> Option<&str> {
    formula.map(str::trim).filter(|f| !f.is_empty())
}

/// 按学科当前的成绩组成项校验公式
pub(crate) async fn check_against_components(
    storage: &Arc<dyn Storage>,
    subject_id: i64,
    source: &str,
) -> Result<(), HttpResponse> {
    let components = storage
        .list_components(subject_id)
        .await
        .map_err(|e| error_response(&e, ErrorCode::Conflict))?;
    let abbreviations: Vec<&str> = components.iter().map(|c| c.abbreviation.as_str()).collect();

    match formula::validate_formula(source, &abbreviations) {
        Ok(_) => Ok(()),
        Err(NotaDezError::Formula(msg)) => Err(bad_request(ErrorCode::FormulaInvalid, msg)),
        Err(e) => Err(bad_request(ErrorCode::FormulaIncomplete, e.message())),
    }
}

/// 只检查语法（创建学科时尚无组成项）
pub(crate) fn check_syntax(source: &str) -> Result<(), HttpResponse> {
    Formula::parse(source)
        .map(|_| ())
        .map_err(|e| bad_request(ErrorCode::FormulaInvalid, e.message()))
}

pub async fn update_formula(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    data: UpdateFormulaRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Subject, subject_id).await {
        return Ok(resp);
    }

    let source = normalize_formula(data.formula.as_deref()).map(str::to_string);
    if let Some(ref source) = source
        && let Err(resp) = check_against_components(&storage, subject_id, source).await
    {
        return Ok(resp);
    }

    match storage.update_subject_formula(subject_id, source).await {
        Ok(Some(subject)) => {
            info!(
                "Subject {} formula {}",
                subject_id,
                if subject.final_grade_formula.is_some() { "updated" } else { "cleared" }
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(subject, "Formula saved successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::SubjectNotFound, "Subject not found")),
        Err(e) => Ok(error_response(&e, ErrorCode::Conflict)),
    }
}

pub async fn validate_formula(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    data: UpdateFormulaRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = ensure_owner(&storage, user_id, OwnedResource::Subject, subject_id).await {
        return Ok(resp);
    }

    let components = match storage.list_components(subject_id).await {
        Ok(components) => components,
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };
    let abbreviations: Vec<&str> = components.iter().map(|c| c.abbreviation.as_str()).collect();

    let response = build_validation(normalize_formula(data.formula.as_deref()), &abbreviations);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Formula checked")))
}

fn build_validation(source: Option<&str>, abbreviations: &[&str]) -> FormulaValidationResponse {
    let Some(source) = source else {
        return FormulaValidationResponse {
            valid: false,
            missing: abbreviations.iter().map(|a| a.to_string()).collect(),
            unknown: Vec::new(),
            message: Some("Formula is empty".to_string()),
        };
    };

    match Formula::parse(source) {
        Ok(parsed) => {
            let check = parsed.check(abbreviations);
            FormulaValidationResponse {
                valid: check.is_valid(),
                message: check.message(),
                missing: check.missing,
                unknown: check.unknown,
            }
        }
        Err(e) => FormulaValidationResponse {
            valid: false,
            missing: Vec::new(),
            unknown: Vec::new(),
            message: Some(e.message().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_normalize_formula() {
        assert_eq!(normalize_formula(Some("  P1 + P2 ")), Some("P1 + P2"));
        assert_eq!(normalize_formula(Some("   ")), None);
        assert_eq!(normalize_formula(None), None);
    }

    #[test]
    fn test_check_syntax() {
        assert!(check_syntax("(P1 + P2) / 2").is_ok());
        let resp = check_syntax("P1 +").unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_build_validation_lists_missing_and_unknown() {
        let result = build_validation(Some("P1 * 0.5 + X"), &["P1", "P2"]);
        assert!(!result.valid);
        assert_eq!(result.missing, vec!["P2".to_string()]);
        assert_eq!(result.unknown, vec!["X".to_string()]);
        assert!(result.message.is_some());

        let result = build_validation(Some("MAX(P1, P2)"), &["P1", "P2"]);
        assert!(result.valid);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_build_validation_syntax_error() {
        let result = build_validation(Some("P1 ** 2"), &["P1"]);
        assert!(!result.valid);
        assert!(result.message.is_some());
    }

    #[test]
    fn test_build_validation_empty_formula() {
        let result = build_validation(None, &["P1"]);
        assert!(!result.valid);
        assert_eq!(result.missing, vec!["P1".to_string()]);
    }
}
