use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use crate::errors::NotaDezError;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{ForgotPasswordRequest, ResetPasswordRequest},
};
use crate::services::{bad_request, error_response, not_found};
use crate::utils::password::hash_password;
use crate::utils::reset_token::{generate_reset_token, hash_reset_token};
use crate::utils::validate::validate_password;

use super::AuthService;

/// 发送密码重置邮件
///
/// 邮件发送失败时删除刚创建的令牌，避免留下无法使用的记录。
pub async fn handle_forgot_password(
    service: &AuthService,
    forgot_request: ForgotPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    let email = forgot_request.email.trim().to_lowercase();
    if email.is_empty() {
        return Ok(bad_request(ErrorCode::BadRequest, "Email is required"));
    }

    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "Email not found")),
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };

    let Some(email_service) = service.get_email(request) else {
        error!("Email service not found in app data");
        return Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::EmailSendFailed,
                "Email service is not available",
            )),
        );
    };

    let token = generate_reset_token();
    let expires_at = chrono::Utc::now().timestamp() + config.email.reset_token_ttl_minutes * 60;

    let token_id = match storage
        .create_password_reset_token(user.id, &hash_reset_token(&token), expires_at)
        .await
    {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };

    if let Err(e) = email_service
        .send_password_reset_email(&user.email, &user.name, &token)
        .await
    {
        error!("Failed to send password reset email to {}: {}", user.email, e);
        if let Err(e) = storage.delete_password_reset_token(token_id).await {
            warn!("Failed to delete unsent reset token {}: {}", token_id, e);
        }
        return Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::EmailSendFailed,
                "Failed to send password reset email",
            )),
        );
    }

    info!("Password reset requested for user {}", user.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
        "Password reset email sent",
    )))
}

pub async fn handle_reset_password(
    service: &AuthService,
    reset_request: ResetPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(msg) = validate_password(&reset_request.new_password) {
        return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
    }

    let token_hash = hash_reset_token(&reset_request.token);
    let token = match storage.get_password_reset_token(&token_hash).await {
        Ok(Some(token)) if !token.used => token,
        Ok(_) => {
            return Ok(not_found(
                ErrorCode::ResetTokenInvalid,
                "Reset token is invalid or has already been used",
            ));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };

    if token.is_expired() {
        if let Err(e) = storage.mark_password_reset_token_used(token.id).await {
            warn!("Failed to mark expired reset token {}: {}", token.id, e);
        }
        return Ok(bad_request(
            ErrorCode::ResetTokenExpired,
            "Reset token has expired",
        ));
    }

    let password_hash = match hash_password(&reset_request.new_password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    };

    match storage
        .reset_password_with_token(token.id, token.user_id, &password_hash)
        .await
    {
        Ok(()) => {}
        // 并发请求已先消费该令牌
        Err(NotaDezError::NotFound(_)) => {
            return Ok(not_found(
                ErrorCode::ResetTokenInvalid,
                "Reset token is invalid or has already been used",
            ));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::Conflict)),
    }

    // 缓存中的用户信息包含旧密码摘要
    if let Some(cache) = service.get_cache(request) {
        cache.invalidate_all().await;
    }

    info!("Password reset completed for user {}", token.user_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
        "Password has been reset",
    )))
}
