//! 成绩存储操作：单项成绩、最终成绩与审计日志

use super::SeaOrmStorage;
use crate::entity::grade_records::{self, ActiveModel, Column, Entity as GradeRecords};
use crate::entity::prelude::{
    FinalGradeActiveModel, FinalGradeModel, FinalGrades, GradeAuditActiveModel, GradeAudits,
    GradeComponentModel, GradeComponents, Subjects,
};
use crate::entity::{final_grades, grade_audits, grade_components};
use crate::errors::{NotaDezError, Result};
use crate::formula::{self, ComponentGrade};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    grades::{
        entities::{FinalGrade, GradeAudit, GradeRecord, GradeWriteOutcome},
        requests::{AdjustFinalGradeRequest, DeleteGradeRequest, GradeAuditListParams, SaveGradeRequest},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::warn;

/// 成绩变更审计行
struct AuditEntry {
    class_id: i64,
    subject_id: i64,
    student_id: i64,
    component_id: Option<i64>,
    changed_by: i64,
    old_value: Option<f64>,
    new_value: Option<f64>,
    message: String,
}

async fn write_audit<C: ConnectionTrait>(db: &C, entry: AuditEntry) -> Result<()> {
    GradeAuditActiveModel {
        class_id: Set(entry.class_id),
        subject_id: Set(entry.subject_id),
        student_id: Set(entry.student_id),
        component_id: Set(entry.component_id),
        changed_by: Set(Some(entry.changed_by)),
        old_value: Set(entry.old_value),
        new_value: Set(entry.new_value),
        message: Set(entry.message),
        changed_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| NotaDezError::from_db("写入成绩审计失败", e))?;

    Ok(())
}

fn grade_change_message(abbreviation: &str, old: Option<f64>, new: Option<f64>) -> String {
    match (old, new) {
        (None, Some(new)) => format!("Grade {abbreviation} set to {new:.2}"),
        (Some(old), Some(new)) => {
            format!("Grade {abbreviation} changed from {old:.2} to {new:.2}")
        }
        (Some(old), None) => format!("Grade {abbreviation} removed (was {old:.2})"),
        (None, None) => format!("Grade {abbreviation} unchanged"),
    }
}

async fn find_final_grade<C: ConnectionTrait>(
    db: &C,
    class_id: i64,
    subject_id: i64,
    student_id: i64,
) -> Result<Option<FinalGradeModel>> {
    FinalGrades::find()
        .filter(final_grades::Column::ClassId.eq(class_id))
        .filter(final_grades::Column::SubjectId.eq(subject_id))
        .filter(final_grades::Column::StudentId.eq(student_id))
        .one(db)
        .await
        .map_err(|e| NotaDezError::from_db("查询最终成绩失败", e))
}

/// 重新计算并保存某学生在某学科的最终成绩
///
/// 公式求值失败（如除零）时计算值记为空，不影响成绩录入。
async fn recompute_final_grade<C: ConnectionTrait>(
    db: &C,
    class_id: i64,
    subject_id: i64,
    student_id: i64,
) -> Result<FinalGradeModel> {
    let subject = Subjects::find_by_id(subject_id)
        .one(db)
        .await
        .map_err(|e| NotaDezError::from_db("查询学科失败", e))?
        .ok_or_else(|| NotaDezError::not_found("Subject not found"))?;

    let components: Vec<GradeComponentModel> = GradeComponents::find()
        .filter(grade_components::Column::SubjectId.eq(subject_id))
        .order_by_asc(grade_components::Column::Abbreviation)
        .all(db)
        .await
        .map_err(|e| NotaDezError::from_db("查询成绩组成项失败", e))?;

    let values: HashMap<i64, f64> = GradeRecords::find()
        .join(JoinType::InnerJoin, grade_records::Relation::Component.def())
        .filter(Column::ClassId.eq(class_id))
        .filter(Column::StudentId.eq(student_id))
        .filter(grade_components::Column::SubjectId.eq(subject_id))
        .all(db)
        .await
        .map_err(|e| NotaDezError::from_db("查询成绩失败", e))?
        .into_iter()
        .map(|r| (r.component_id, r.value))
        .collect();

    let grades: Vec<ComponentGrade<'_>> = components
        .iter()
        .map(|c| ComponentGrade {
            abbreviation: &c.abbreviation,
            weight: c.weight,
            value: values.get(&c.id).copied(),
        })
        .collect();

    let computed = match formula::final_grade(subject.final_grade_formula.as_deref(), &grades) {
        Ok(value) => value,
        Err(e) => {
            warn!(
                subject_id,
                student_id,
                "最终成绩公式求值失败: {}",
                e.message()
            );
            None
        }
    };

    let now = chrono::Utc::now().timestamp();
    let model = match find_final_grade(db, class_id, subject_id, student_id).await? {
        Some(existing) => {
            let mut active: FinalGradeActiveModel = existing.into();
            active.computed_value = Set(computed);
            active.updated_at = Set(now);
            active.update(db).await
        }
        None => {
            FinalGradeActiveModel {
                class_id: Set(class_id),
                subject_id: Set(subject_id),
                student_id: Set(student_id),
                computed_value: Set(computed),
                adjusted_value: Set(None),
                use_adjusted: Set(false),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await
        }
    }
    .map_err(|e| NotaDezError::from_db("保存最终成绩失败", e))?;

    Ok(model)
}

/// 重新计算学科下所有已有最终成绩记录（公式或组成项变更后调用）
pub(super) async fn recompute_subject_final_grades<C: ConnectionTrait>(
    db: &C,
    subject_id: i64,
) -> Result<usize> {
    let rows = FinalGrades::find()
        .filter(final_grades::Column::SubjectId.eq(subject_id))
        .all(db)
        .await
        .map_err(|e| NotaDezError::from_db("查询最终成绩失败", e))?;

    let count = rows.len();
    for row in rows {
        recompute_final_grade(db, row.class_id, subject_id, row.student_id).await?;
    }
    Ok(count)
}

impl SeaOrmStorage {
    /// 录入成绩：upsert + 审计 + 重新计算最终成绩
    pub async fn save_grade_impl(
        &self,
        req: SaveGradeRequest,
        changed_by: i64,
    ) -> Result<GradeWriteOutcome> {
        let value = formula::round2(req.value);
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        let component = GradeComponents::find_by_id(req.component_id)
            .one(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("查询成绩组成项失败", e))?
            .ok_or_else(|| NotaDezError::not_found("Grade component not found"))?;

        let existing = GradeRecords::find()
            .filter(Column::ClassId.eq(req.class_id))
            .filter(Column::StudentId.eq(req.student_id))
            .filter(Column::ComponentId.eq(req.component_id))
            .one(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("查询成绩失败", e))?;

        let previous_value = existing.as_ref().map(|r| r.value);

        let record = match existing {
            Some(record) => {
                if record.value == value {
                    record
                } else {
                    let mut active: ActiveModel = record.into();
                    active.value = Set(value);
                    active.updated_at = Set(now);
                    active
                        .update(&txn)
                        .await
                        .map_err(|e| NotaDezError::from_db("更新成绩失败", e))?
                }
            }
            None => ActiveModel {
                class_id: Set(req.class_id),
                student_id: Set(req.student_id),
                component_id: Set(req.component_id),
                value: Set(value),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("录入成绩失败", e))?,
        };

        if previous_value != Some(value) {
            write_audit(
                &txn,
                AuditEntry {
                    class_id: req.class_id,
                    subject_id: req.subject_id,
                    student_id: req.student_id,
                    component_id: Some(req.component_id),
                    changed_by,
                    old_value: previous_value,
                    new_value: Some(value),
                    message: grade_change_message(&component.abbreviation, previous_value, Some(value)),
                },
            )
            .await?;
        }

        let final_grade =
            recompute_final_grade(&txn, req.class_id, req.subject_id, req.student_id).await?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        Ok(GradeWriteOutcome {
            record: record.into_grade_record(),
            previous_value,
            final_grade: final_grade.computed_value,
        })
    }

    /// 删除成绩；记录不存在时返回 None
    pub async fn delete_grade_impl(
        &self,
        req: DeleteGradeRequest,
        changed_by: i64,
    ) -> Result<Option<f64>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        let existing = GradeRecords::find()
            .filter(Column::ClassId.eq(req.class_id))
            .filter(Column::StudentId.eq(req.student_id))
            .filter(Column::ComponentId.eq(req.component_id))
            .find_also_related(GradeComponents)
            .one(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("查询成绩失败", e))?;

        let Some((record, component)) = existing else {
            return Ok(None);
        };

        let Some(component) = component else {
            return Ok(None);
        };

        let previous_value = record.value;
        let subject_id = req.subject_id.unwrap_or(component.subject_id);
        let abbreviation = component.abbreviation;

        GradeRecords::delete_by_id(record.id)
            .exec(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("删除成绩失败", e))?;

        write_audit(
            &txn,
            AuditEntry {
                class_id: req.class_id,
                subject_id,
                student_id: req.student_id,
                component_id: Some(req.component_id),
                changed_by,
                old_value: Some(previous_value),
                new_value: None,
                message: grade_change_message(&abbreviation, Some(previous_value), None),
            },
        )
        .await?;

        recompute_final_grade(&txn, req.class_id, subject_id, req.student_id).await?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        Ok(Some(previous_value))
    }

    /// 班级在某学科下的全部单项成绩
    pub async fn list_grade_records_impl(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<GradeRecord>> {
        let result = GradeRecords::find()
            .join(JoinType::InnerJoin, grade_records::Relation::Component.def())
            .filter(Column::ClassId.eq(class_id))
            .filter(grade_components::Column::SubjectId.eq(subject_id))
            .all(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询成绩失败", e))?;

        Ok(result.into_iter().map(|m| m.into_grade_record()).collect())
    }

    pub async fn list_final_grades_impl(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Vec<FinalGrade>> {
        let result = FinalGrades::find()
            .filter(final_grades::Column::ClassId.eq(class_id))
            .filter(final_grades::Column::SubjectId.eq(subject_id))
            .all(&self.db)
            .await
            .map_err(|e| NotaDezError::from_db("查询最终成绩失败", e))?;

        Ok(result.into_iter().map(|m| m.into_final_grade()).collect())
    }

    /// 人工调整最终成绩
    pub async fn adjust_final_grade_impl(
        &self,
        req: AdjustFinalGradeRequest,
        changed_by: i64,
    ) -> Result<FinalGrade> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| NotaDezError::from_db("开启事务失败", e))?;

        let previous = find_final_grade(&txn, req.class_id, req.subject_id, req.student_id)
            .await?
            .map(|m| m.into_final_grade().effective_value());

        let current =
            recompute_final_grade(&txn, req.class_id, req.subject_id, req.student_id).await?;

        let mut active: FinalGradeActiveModel = current.into();
        active.adjusted_value = Set(req.adjusted_value.map(formula::round2));
        active.use_adjusted = Set(req.use_adjusted);
        active.updated_at = Set(chrono::Utc::now().timestamp());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| NotaDezError::from_db("调整最终成绩失败", e))?
            .into_final_grade();

        let old_value = previous.flatten();
        let new_value = updated.effective_value();
        let message = match (updated.use_adjusted, updated.adjusted_value) {
            (true, Some(v)) => format!("Final grade adjusted to {v:.2}"),
            _ => "Final grade adjustment removed".to_string(),
        };

        write_audit(
            &txn,
            AuditEntry {
                class_id: req.class_id,
                subject_id: req.subject_id,
                student_id: req.student_id,
                component_id: None,
                changed_by,
                old_value,
                new_value,
                message,
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| NotaDezError::from_db("提交事务失败", e))?;

        Ok(updated)
    }

    /// 分页列出成绩审计，最新的在前
    pub async fn list_grade_audits_with_pagination_impl(
        &self,
        params: GradeAuditListParams,
    ) -> Result<PaginatedResponse<GradeAudit>> {
        let mut select = GradeAudits::find();

        if let Some(class_id) = params.class_id {
            select = select.filter(grade_audits::Column::ClassId.eq(class_id));
        }
        if let Some(subject_id) = params.subject_id {
            select = select.filter(grade_audits::Column::SubjectId.eq(subject_id));
        }
        if let Some(student_id) = params.student_id {
            select = select.filter(grade_audits::Column::StudentId.eq(student_id));
        }

        let paginator = select
            .order_by_desc(grade_audits::Column::ChangedAt)
            .order_by_desc(grade_audits::Column::Id)
            .paginate(&self.db, params.pagination.size());

        let total = paginator
            .num_items()
            .await
            .map_err(|e| NotaDezError::from_db("查询审计总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| NotaDezError::from_db("查询审计页数失败", e))?;
        let items = paginator
            .fetch_page(params.pagination.page() - 1)
            .await
            .map_err(|e| NotaDezError::from_db("查询审计列表失败", e))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_audit()).collect(),
            pagination: PaginationInfo::new(&params.pagination, total, pages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::grade_change_message;

    #[test]
    fn test_grade_change_messages() {
        assert_eq!(
            grade_change_message("P1", None, Some(7.5)),
            "Grade P1 set to 7.50"
        );
        assert_eq!(
            grade_change_message("P1", Some(7.5), Some(8.0)),
            "Grade P1 changed from 7.50 to 8.00"
        );
        assert_eq!(
            grade_change_message("P1", Some(8.0), None),
            "Grade P1 removed (was 8.00)"
        );
    }
}
