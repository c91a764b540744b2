//! 机构存储操作与资源归属查询

use super::SeaOrmStorage;
use crate::entity::{
    classes, courses, grade_components,
    institutions::{self, ActiveModel, Column, Entity as Institutions},
    prelude::{Classes, CourseActiveModel, Courses, GradeComponents, Subjects},
    subjects,
};
use crate::errors::{NotaDezError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    institutions::{
        entities::Institution,
        requests::{
            CreateInstitutionRequest, InstitutionListParams, OnboardingRequest,
            UpdateInstitutionRequest,
        },
        responses::OnboardingResponse,
    },
};
use crate::storage::OwnedResource;
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建机构
    pub async fn create_institution_impl(
        &self,
        user_id: i64,
        req: CreateInstitutionRequest,
    ) -> Result<Institution> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            user_id: Set(user_id),
            name: Set(req.name.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("创建机构失败", e))?;

        Ok(result.into_institution())
    }

    /// 通过 ID 获取机构
    pub async fn get_institution_by_id_impl(&self, id: i64) -> Result<Option<Institution>> {
        let result = Institutions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询机构失败", e))?;

        Ok(result.map(|m| m.into_institution()))
    }

    /// 分页列出当前用户的机构
    pub async fn list_institutions_with_pagination_impl(
        &self,
        user_id: i64,
        params: InstitutionListParams,
    ) -> Result<PaginatedResponse<Institution>> {
        let mut select = Institutions::find().filter(Column::UserId.eq(user_id));

        if let Some(ref search) = params.search
            && !search.trim().is_empty()
        {
            let pattern = contains_pattern(search.trim());
            select = select.filter(Column::Name.like(pattern));
        }

        let paginator = select
            .order_by_asc(Column::Name)
            .paginate(&self.db, params.pagination.size());

        let total = paginator
            .num_items()
            .await
            .map_err(|e| NotaDezError::from_db("查询机构总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| NotaDezError::from_db("查询机构页数失败", e))?;
        let items = paginator
            .fetch_page(params.pagination.page() - 1)
            .await
            .map_err(|e| NotaDezError::from_db("查询机构列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_institution()).collect(),
            pagination: PaginationInfo::new(&params.pagination, total, pages),
        })
    }

    /// 更新机构
    pub async fn update_institution_impl(
        &self,
        id: i64,
        update: UpdateInstitutionRequest,
    ) -> Result<Option<Institution>> {
        let existing = self.get_institution_by_id_impl(id).await?;
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

        model
            .update(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("更新机构失败", e))?;

        self.get_institution_by_id_impl(id).await
    }

    /// 删除机构（级联删除课程及其下属数据）
    pub async fn delete_institution_impl(&self, id: i64) -> Result<bool> {
        let result = Institutions::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("删除机构失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 首次使用引导：同名机构复用，课程总是新建
    pub async fn onboard_impl(
        &self,
        user_id: i64,
        req: OnboardingRequest,
    ) -> Result<OnboardingResponse> {
        let institution_name = req.institution_name.trim().to_string();
        let course_name = req.course_name.trim().to_string();
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        let existing = Institutions::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Name.eq(institution_name.as_str()))
            .one(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("查询机构失败", e))?;

        let (institution, institution_created) = match existing {
            Some(model) => (model, false),
            None => {
                let model = ActiveModel {
                    user_id: Set(user_id),
                    name: Set(institution_name),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| NotaDezError::from_db("创建机构失败", e))?;
                (model, true)
            }
        };

        let course = CourseActiveModel {
            institution_id: Set(institution.id),
            name: Set(course_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| NotaDezError::from_db("创建课程失败", e))?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        let institution_name = institution.name.clone();
        Ok(OnboardingResponse {
            institution: institution.into_institution(),
            course: course.into_course(Some(institution_name)),
            institution_created,
        })
    }

    /// 查询资源所属用户
    pub async fn resolve_owner_impl(
        &self,
        resource: OwnedResource,
        id: i64,
    ) -> Result<Option<i64>> {
        let owner = match resource {
            OwnedResource::Institution => {
                Institutions::find_by_id(id)
                    .select_only()
                    .column(institutions::Column::UserId)
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
            }
            OwnedResource::Course => {
                Courses::find_by_id(id)
                    .select_only()
                    .column(institutions::Column::UserId)
                    .join(JoinType::InnerJoin, courses::Relation::Institution.def())
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
            }
            OwnedResource::Subject => {
                Subjects::find_by_id(id)
                    .select_only()
                    .column(institutions::Column::UserId)
                    .join(JoinType::InnerJoin, subjects::Relation::Course.def())
                    .join(JoinType::InnerJoin, courses::Relation::Institution.def())
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
            }
            OwnedResource::Class => {
                Classes::find_by_id(id)
                    .select_only()
                    .column(institutions::Column::UserId)
                    .join(JoinType::InnerJoin, classes::Relation::Course.def())
                    .join(JoinType::InnerJoin, courses::Relation::Institution.def())
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
            }
            OwnedResource::Component => {
                GradeComponents::find_by_id(id)
                    .select_only()
                    .column(institutions::Column::UserId)
                    .join(JoinType::InnerJoin, grade_components::Relation::Subject.def())
                    .join(JoinType::InnerJoin, subjects::Relation::Course.def())
                    .join(JoinType::InnerJoin, courses::Relation::Institution.def())
                    .into_tuple::<i64>()
                    .one(&self.db)
                    .await
            }
        };

        owner.map_err(|e| NotaDezError::from_db("查询资源归属失败", e))
    }
}
