//! 课程存储操作

use super::SeaOrmStorage;
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::institutions::{self, Entity as Institutions};
use crate::errors::{NotaDezError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    courses::{
        entities::Course,
        requests::{CourseListParams, CreateCourseRequest, UpdateCourseRequest},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            institution_id: Set(req.institution_id),
            name: Set(req.name.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("创建课程失败", e))?;

        // 带上机构名称返回
        self.get_course_by_id_impl(result.id)
            .await?
            .ok_or_else(|| NotaDezError::database_operation("课程创建后无法读取"))
    }

    /// 通过 ID 获取课程（含机构名称）
    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .find_also_related(Institutions)
            .one(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询课程失败", e))?;

        Ok(result.map(|(course, institution)| course.into_course(institution.map(|i| i.name))))
    }

    /// 分页列出当前用户的课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        user_id: i64,
        params: CourseListParams,
    ) -> Result<PaginatedResponse<Course>> {
        let mut select = Courses::find()
            .find_also_related(Institutions)
            .filter(institutions::Column::UserId.eq(user_id));

        if let Some(institution_id) = params.institution_id {
            select = select.filter(Column::InstitutionId.eq(institution_id));
        }

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
            .map_err(|e| NotaDezError::from_db("查询课程总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| NotaDezError::from_db("查询课程页数失败", e))?;
        let items = paginator
            .fetch_page(params.pagination.page() - 1)
            .await
            .map_err(|e| NotaDezError::from_db("查询课程列表失败", e))?;

        Ok(PaginatedResponse {
            items: items
                .into_iter()
                .map(|(course, institution)| course.into_course(institution.map(|i| i.name)))
                .collect(),
            pagination: PaginationInfo::new(&params.pagination, total, pages),
        })
    }

    /// 更新课程
    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        let existing = self.get_course_by_id_impl(id).await?;
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
            .map_err(|e| NotaDezError::from_db("更新课程失败", e))?;

        self.get_course_by_id_impl(id).await
    }

    /// 删除课程
    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("删除课程失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
