//! 学生存储操作

use super::SeaOrmStorage;
use crate::entity::enrollments;
use crate::entity::prelude::{EnrollmentActiveModel, Enrollments};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{NotaDezError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, ImportStudentRow, StudentListParams, UpdateStudentRequest},
        responses::StudentImportResponse,
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建学生
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            registration: Set(req.registration.trim().to_string()),
            name: Set(req.name.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("创建学生失败", e))?;

        Ok(result.into_student())
    }

    /// 通过 ID 获取学生
    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 通过学号获取学生
    pub async fn get_student_by_registration_impl(
        &self,
        registration: &str,
    ) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::Registration.eq(registration.trim()))
            .one(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 分页列出学生
    pub async fn list_students_with_pagination_impl(
        &self,
        params: StudentListParams,
    ) -> Result<PaginatedResponse<Student>> {
        let mut select = Students::find();

        // 搜索条件
        if let Some(ref search) = params.search
            && !search.trim().is_empty()
        {
            let pattern = contains_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.like(pattern.clone()))
                    .add(Column::Registration.like(pattern)),
            );
        }

        let paginator = select
            .order_by_asc(Column::Name)
            .paginate(&self.db, params.pagination.size());

        let total = paginator
            .num_items()
            .await
            .map_err(|e| NotaDezError::from_db("查询学生总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| NotaDezError::from_db("查询学生页数失败", e))?;
        let items = paginator
            .fetch_page(params.pagination.page() - 1)
            .await
            .map_err(|e| NotaDezError::from_db("查询学生列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo::new(&params.pagination, total, pages),
        })
    }

    /// 更新学生信息
    pub async fn update_student_impl(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        let existing = self.get_student_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(registration) = update.registration {
            model.registration = Set(registration.trim().to_string());
        }
        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("更新学生失败", e))?;

        self.get_student_by_id_impl(id).await
    }

    /// 删除学生
    pub async fn delete_student_impl(&self, id: i64) -> Result<bool> {
        let result = Students::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("删除学生失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 批量导入：按学号 upsert，可选加入班级
    ///
    /// 行数据应已校验；任一写入失败则整体回滚。
    pub async fn import_students_impl(
        &self,
        rows: Vec<ImportStudentRow>,
        class_id: Option<i64>,
    ) -> Result<StudentImportResponse> {
        let now = chrono::Utc::now().timestamp();
        let mut summary = StudentImportResponse {
            total: rows.len(),
            ..Default::default()
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        for row in rows {
            let registration = row.registration.trim().to_string();
            let name = row.name.trim().to_string();

            let existing = Students::find()
                .filter(Column::Registration.eq(registration.as_str()))
                .one(&txn)
                .await
                .map_err(|e| NotaDezError::from_db("查询学生失败", e))?;

            let student_id = match existing {
                Some(student) => {
                    let id = student.id;
                    if student.name != name {
                        let mut active: ActiveModel = student.into();
                        active.name = Set(name);
                        active.updated_at = Set(now);
                        active
                            .update(&txn)
                            .await
                            .map_err(|e| NotaDezError::from_db("更新学生失败", e))?;
                    }
                    summary.updated += 1;
                    id
                }
                None => {
                    let created = ActiveModel {
                        registration: Set(registration),
                        name: Set(name),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(|e| NotaDezError::from_db("创建学生失败", e))?;
                    summary.created += 1;
                    created.id
                }
            };

            let Some(class_id) = class_id else {
                continue;
            };

            // 已在班级中的学生忽略
            let enrolled = Enrollments::find()
                .filter(enrollments::Column::ClassId.eq(class_id))
                .filter(enrollments::Column::StudentId.eq(student_id))
                .count(&txn)
                .await
                .map_err(|e| NotaDezError::from_db("查询选课记录失败", e))?;

            if enrolled == 0 {
                EnrollmentActiveModel {
                    class_id: Set(class_id),
                    student_id: Set(student_id),
                    enrolled_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| NotaDezError::from_db("学生加入班级失败", e))?;
                summary.enrolled += 1;
            }
        }

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        Ok(summary)
    }
}
