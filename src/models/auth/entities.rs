// 密码重置令牌（只保存摘要，原始令牌仅出现在邮件中）
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
}

impl PasswordResetToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= chrono::Utc::now()
    }
}
