//! 班级存储操作（含学科关联与选课）

use super::SeaOrmStorage;
use crate::entity::classes::{self, ActiveModel, Column, Entity as Classes};
use crate::entity::prelude::{
    ClassSubjectActiveModel, ClassSubjects, EnrollmentActiveModel, Enrollments, Students, Subjects,
};
use crate::entity::{class_subjects, courses, enrollments, institutions, students, subjects};
use crate::errors::{NotaDezError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    classes::{
        entities::Class,
        requests::{ClassListParams, CreateClassRequest, UpdateClassRequest},
    },
    students::entities::Student,
    subjects::entities::Subject,
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};

impl SeaOrmStorage {
    /// 创建班级（学科关联由服务层逐个处理）
    pub async fn create_class_impl(&self, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            name: Set(req.name.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("创建班级失败", e))?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询班级失败", e))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 分页列出当前用户的班级
    pub async fn list_classes_with_pagination_impl(
        &self,
        user_id: i64,
        params: ClassListParams,
    ) -> Result<PaginatedResponse<Class>> {
        let mut select = Classes::find()
            .join(JoinType::InnerJoin, classes::Relation::Course.def())
            .join(JoinType::InnerJoin, courses::Relation::Institution.def())
            .filter(institutions::Column::UserId.eq(user_id));

        if let Some(course_id) = params.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
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
            .map_err(|e| NotaDezError::from_db("查询班级总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| NotaDezError::from_db("查询班级页数失败", e))?;
        let items = paginator
            .fetch_page(params.pagination.page() - 1)
            .await
            .map_err(|e| NotaDezError::from_db("查询班级列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_class()).collect(),
            pagination: PaginationInfo::new(&params.pagination, total, pages),
        })
    }

    /// 更新班级信息
    pub async fn update_class_impl(
        &self,
        id: i64,
        update: UpdateClassRequest,
    ) -> Result<Option<Class>> {
        let existing = self.get_class_by_id_impl(id).await?;
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
            .map_err(|e| NotaDezError::from_db("更新班级失败", e))?;

        self.get_class_by_id_impl(id).await
    }

    /// 删除班级
    pub async fn delete_class_impl(&self, id: i64) -> Result<bool> {
        let result = Classes::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("删除班级失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 关联学科到班级；重复关联返回唯一约束错误
    pub async fn link_class_subject_impl(&self, class_id: i64, subject_id: i64) -> Result<()> {
        ClassSubjectActiveModel {
            class_id: Set(class_id),
            subject_id: Set(subject_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| NotaDezError::from_db("关联学科失败", e))?;

        Ok(())
    }

    pub async fn unlink_class_subject_impl(&self, class_id: i64, subject_id: i64) -> Result<bool> {
        let result = ClassSubjects::delete_many()
            .filter(class_subjects::Column::ClassId.eq(class_id))
            .filter(class_subjects::Column::SubjectId.eq(subject_id))
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("取消学科关联失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 班级关联的学科，按名称排序
    pub async fn list_class_subjects_impl(&self, class_id: i64) -> Result<Vec<Subject>> {
        let result = Subjects::find()
            .join(JoinType::InnerJoin, subjects::Relation::ClassSubjects.def())
            .filter(class_subjects::Column::ClassId.eq(class_id))
            .order_by_asc(subjects::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询班级学科失败", e))?;

        Ok(result.into_iter().map(|m| m.into_subject()).collect())
    }

    pub async fn is_subject_linked_impl(&self, class_id: i64, subject_id: i64) -> Result<bool> {
        let count = ClassSubjects::find()
            .filter(class_subjects::Column::ClassId.eq(class_id))
            .filter(class_subjects::Column::SubjectId.eq(subject_id))
            .count(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询学科关联失败", e))?;

        Ok(count > 0)
    }

    /// 学生加入班级；重复加入返回唯一约束错误
    pub async fn enroll_student_impl(&self, class_id: i64, student_id: i64) -> Result<()> {
        EnrollmentActiveModel {
            class_id: Set(class_id),
            student_id: Set(student_id),
            enrolled_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| NotaDezError::from_db("学生加入班级失败", e))?;

        Ok(())
    }

    pub async fn unenroll_student_impl(&self, class_id: i64, student_id: i64) -> Result<bool> {
        let result = Enrollments::delete_many()
            .filter(enrollments::Column::ClassId.eq(class_id))
            .filter(enrollments::Column::StudentId.eq(student_id))
            .exec(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("学生退出班级失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 班级学生，按姓名排序
    pub async fn list_class_students_impl(&self, class_id: i64) -> Result<Vec<Student>> {
        let result = Students::find()
            .join(JoinType::InnerJoin, students::Relation::Enrollments.def())
            .filter(enrollments::Column::ClassId.eq(class_id))
            .order_by_asc(students::Column::Name)
            .order_by_asc(students::Column::Registration)
            .all(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询班级学生失败", e))?;

        Ok(result.into_iter().map(|m| m.into_student()).collect())
    }

    pub async fn is_student_enrolled_impl(&self, class_id: i64, student_id: i64) -> Result<bool> {
        let count = Enrollments::find()
            .filter(enrollments::Column::ClassId.eq(class_id))
            .filter(enrollments::Column::StudentId.eq(student_id))
            .count(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询选课记录失败", e))?;

        Ok(count > 0)
    }
}
