//! 路径参数提取器
//!
//! 只接受正整数 ID，解析失败时直接返回统一格式的 400 响应。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_path_id(req: &HttpRequest, param: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(param).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!("Invalid path parameter '{param}': '{raw}'"),
            ));
            Err(InternalError::from_response(format!("invalid {param}"), response).into())
        }
    }
}

macro_rules! define_safe_id_extractors {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_path_id(req, $param).map($name))
                }
            }
        )*
    };
}

define_safe_id_extractors! {
    SafeIDI64 => "id",
    SafeSubjectIdI64 => "subject_id",
    SafeStudentIdI64 => "student_id",
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_extracts_positive_id() {
        let req = TestRequest::default().param("id", "15").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 15);

        let req = TestRequest::default()
            .param("student_id", "3")
            .to_http_request();
        assert_eq!(SafeStudentIdI64::extract(&req).await.unwrap().0, 3);
    }

    #[actix_web::test]
    async fn test_rejects_invalid_ids() {
        for raw in ["abc", "0", "-4", ""] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            let err = SafeIDI64::extract(&req).await.unwrap_err();
            assert_eq!(
                err.as_response_error().status_code(),
                actix_web::http::StatusCode::BAD_REQUEST
            );
        }
    }
}
