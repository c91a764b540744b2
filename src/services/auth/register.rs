use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{
    ApiResponse, ErrorCode, auth::RegisterRequest, users::requests::CreateUserRequest,
};
use crate::services::error_response;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let name = register_request.name.trim().to_string();
    let email = register_request.email.trim().to_lowercase();
    let phone = register_request
        .phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    // 1. 必填字段
    if name.is_empty() || email.is_empty() || register_request.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Name, email and password are required",
        )));
    }

    // 2. 邮箱与密码格式
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }
    if let Err(msg) = validate_password(&register_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    // 3. 邮箱是否已注册
    if let Err(response) = check_email_exists(&storage, &email).await {
        return Ok(response);
    }

    // 4. 哈希密码并创建用户
    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Password hashing failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::RegisterFailed,
                    format!("Register failed: {e}"),
                )),
            );
        }
    };

    let create_request = CreateUserRequest {
        name,
        email,
        phone,
        password_hash,
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            info!("User {} registered", user.email);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "Registration successful")))
        }
        // 并发注册同一邮箱时由唯一约束兜底
        Err(e) => Ok(error_response(&e, ErrorCode::UserEmailAlreadyExists)),
    }
}

async fn check_email_exists(storage: &Arc<dyn Storage>, email: &str) -> Result<(), HttpResponse> {
    match storage.get_user_by_email(email).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(error_response(&e, ErrorCode::RegisterFailed)),
    }
}
