pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::PasswordResetToken;
pub use requests::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest};
pub use responses::{LoginResponse, RefreshTokenResponse, TokenVerificationResponse, UserInfoResponse};
