//! 成绩组成项存储操作

use super::SeaOrmStorage;
use super::grades::recompute_subject_final_grades;
use crate::entity::grade_components::{ActiveModel, Column, Entity as GradeComponents};
use crate::errors::{NotaDezError, Result};
use crate::models::components::{
    entities::GradeComponent,
    requests::{CreateComponentRequest, UpdateComponentRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

const DEFAULT_WEIGHT: f64 = 1.0;

impl SeaOrmStorage {
    pub async fn create_component_impl(
        &self,
        req: CreateComponentRequest,
    ) -> Result<GradeComponent> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            subject_id: Set(req.subject_id),
            name: Set(req.name.trim().to_string()),
            abbreviation: Set(req.abbreviation.trim().to_string()),
            description: Set(req.description.filter(|d| !d.trim().is_empty())),
            weight: Set(req.weight.unwrap_or(DEFAULT_WEIGHT)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        let result = model
            .insert(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("创建成绩组成项失败", e))?;
        recompute_subject_final_grades(&txn, result.subject_id).await?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        Ok(result.into_component())
    }

    pub async fn get_component_by_id_impl(&self, id: i64) -> Result<Option<GradeComponent>> {
        let result = GradeComponents::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询成绩组成项失败", e))?;

        Ok(result.map(|m| m.into_component()))
    }

    /// 学科下的组成项，按缩写排序
    pub async fn list_components_impl(&self, subject_id: i64) -> Result<Vec<GradeComponent>> {
        let result = GradeComponents::find()
            .filter(Column::SubjectId.eq(subject_id))
            .order_by_asc(Column::Abbreviation)
            .all(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询成绩组成项失败", e))?;

        Ok(result.into_iter().map(|m| m.into_component()).collect())
    }

    pub async fn update_component_impl(
        &self,
        id: i64,
        update: UpdateComponentRequest,
    ) -> Result<Option<GradeComponent>> {
        let Some(existing) = self.get_component_by_id_impl(id).await? else {
            return Ok(None);
        };

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(abbreviation) = update.abbreviation {
            model.abbreviation = Set(abbreviation.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }
        if let Some(weight) = update.weight {
            model.weight = Set(weight);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        model
            .update(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("更新成绩组成项失败", e))?;
        recompute_subject_final_grades(&txn, existing.subject_id).await?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        self.get_component_by_id_impl(id).await
    }

    /// 删除组成项（级联删除对应成绩）
    pub async fn delete_component_impl(&self, id: i64) -> Result<bool> {
        let Some(existing) = self.get_component_by_id_impl(id).await? else {
            return Ok(false);
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        let result = GradeComponents::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("删除成绩组成项失败", e))?;
        recompute_subject_final_grades(&txn, existing.subject_id).await?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
