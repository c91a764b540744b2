//! 密码重置令牌存储操作

use super::SeaOrmStorage;
use crate::entity::password_reset_tokens::{ActiveModel, Column, Entity as PasswordResetTokens};
use crate::entity::users::{ActiveModel as UserActiveModel, Entity as Users};
use crate::errors::{NotaDezError, Result};
use crate::models::auth::PasswordResetToken;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};

impl SeaOrmStorage {
    pub async fn create_password_reset_token_impl(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<i64> {
        let model = ActiveModel {
            user_id: Set(user_id),
            token_hash: Set(token_hash.to_string()),
            expires_at: Set(expires_at),
            used: Set(false),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("创建重置令牌失败", e))?;

        Ok(result.id)
    }

    pub async fn get_password_reset_token_impl(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>> {
        let result = PasswordResetTokens::find()
            .filter(Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询重置令牌失败", e))?;

        Ok(result.map(|m| m.into_reset_token()))
    }

    pub async fn mark_password_reset_token_used_impl(&self, token_id: i64) -> Result<bool> {
        let result = PasswordResetTokens::update_many()
            .col_expr(Column::Used, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(token_id))
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("更新重置令牌失败", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_password_reset_token_impl(&self, token_id: i64) -> Result<bool> {
        let result = PasswordResetTokens::delete_by_id(token_id)
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("删除重置令牌失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 作废令牌并更新密码
    ///
    /// 令牌只能被消费一次；已被使用时返回 `NotFound` 并回滚。
    pub async fn reset_password_with_token_impl(
        &self,
        token_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        let consumed = PasswordResetTokens::update_many()
            .col_expr(Column::Used, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(token_id))
            .filter(Column::Used.eq(false))
            .exec(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("更新重置令牌失败", e))?;
        if consumed.rows_affected == 0 {
            return Err(NotaDezError::not_found("Reset token already used"));
        }

        let user = Users::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("查询用户失败", e))?
            .ok_or_else(|| NotaDezError::not_found("User not found"))?;

        let mut active: UserActiveModel = user.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(chrono::Utc::now().timestamp());
        active
            .update(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("更新密码失败", e))?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        Ok(())
    }
}
