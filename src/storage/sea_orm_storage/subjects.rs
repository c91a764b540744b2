//! 学科存储操作

use super::SeaOrmStorage;
use super::grades::recompute_subject_final_grades;
use crate::entity::subjects::{self, ActiveModel, Column, Entity as Subjects};
use crate::entity::{courses, institutions};
use crate::errors::{NotaDezError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, SubjectListParams, UpdateSubjectRequest},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

/// 空白字符串视为未设置
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SeaOrmStorage {
    /// 创建学科
    pub async fn create_subject_impl(&self, req: CreateSubjectRequest) -> Result<Subject> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            name: Set(req.name.trim().to_string()),
            abbreviation: Set(normalize(req.abbreviation)),
            code: Set(normalize(req.code)),
            period: Set(normalize(req.period)),
            final_grade_formula: Set(normalize(req.final_grade_formula)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("创建学科失败", e))?;

        Ok(result.into_subject())
    }

    /// 通过 ID 获取学科
    pub async fn get_subject_by_id_impl(&self, id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询学科失败", e))?;

        Ok(result.map(|m| m.into_subject()))
    }

    /// 分页列出当前用户的学科
    pub async fn list_subjects_with_pagination_impl(
        &self,
        user_id: i64,
        params: SubjectListParams,
    ) -> Result<PaginatedResponse<Subject>> {
        let mut select = Subjects::find()
            .join(JoinType::InnerJoin, subjects::Relation::Course.def())
            .join(JoinType::InnerJoin, courses::Relation::Institution.def())
            .filter(institutions::Column::UserId.eq(user_id));

        if let Some(course_id) = params.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        if let Some(ref search) = params.search
            && !search.trim().is_empty()
        {
            let pattern = contains_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.like(pattern.clone()))
                    .add(Column::Abbreviation.like(pattern.clone()))
                    .add(Column::Code.like(pattern)),
            );
        }

        let paginator = select
            .order_by_asc(Column::Name)
            .paginate(&self.db, params.pagination.size());

        let total = paginator
            .num_items()
            .await
            .map_err(|e| NotaDezError::from_db("查询学科总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| NotaDezError::from_db("查询学科页数失败", e))?;
        let items = paginator
            .fetch_page(params.pagination.page() - 1)
            .await
            .map_err(|e| NotaDezError::from_db("查询学科列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_subject()).collect(),
            pagination: PaginationInfo::new(&params.pagination, total, pages),
        })
    }

    /// 更新学科（部分字段）
    ///
    /// 可选文本字段传入空字符串表示清除。
    pub async fn update_subject_impl(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        let existing = self.get_subject_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if update.abbreviation.is_some() {
            model.abbreviation = Set(normalize(update.abbreviation));
        }
        if update.code.is_some() {
            model.code = Set(normalize(update.code));
        }
        if update.period.is_some() {
            model.period = Set(normalize(update.period));
        }
        let formula_changed = update.final_grade_formula.is_some();
        if formula_changed {
            model.final_grade_formula = Set(normalize(update.final_grade_formula));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        model
            .update(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("更新学科失败", e))?;
        if formula_changed {
            recompute_subject_final_grades(&txn, id).await?;
        }

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        self.get_subject_by_id_impl(id).await
    }

    /// 设置或清除最终成绩公式
    pub async fn update_subject_formula_impl(
        &self,
        id: i64,
        formula: Option<String>,
    ) -> Result<Option<Subject>> {
        let existing = self.get_subject_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            final_grade_formula: Set(normalize(formula)),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        model
            .update(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("更新公式失败", e))?;
        recompute_subject_final_grades(&txn, id).await?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        self.get_subject_by_id_impl(id).await
    }

    /// 删除学科
    pub async fn delete_subject_impl(&self, id: i64) -> Result<bool> {
        let result = Subjects::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("删除学科失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
