use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_school_tables::{Classes, Students, Subjects, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 成绩组成项 ====================
        manager
            .create_table(
                Table::create()
                    .table(GradeComponents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeComponents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeComponents::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeComponents::Name).string().not_null())
                    .col(
                        ColumnDef::new(GradeComponents::Abbreviation)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeComponents::Description).text().null())
                    .col(
                        ColumnDef::new(GradeComponents::Weight)
                            .double()
                            .not_null()
                            .default(1.0),
                    )
                    .col(
                        ColumnDef::new(GradeComponents::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeComponents::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeComponents::Table, GradeComponents::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 成绩记录 ====================
        manager
            .create_table(
                Table::create()
                    .table(GradeRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::ComponentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeRecords::Value).double().not_null())
                    .col(
                        ColumnDef::new(GradeRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeRecords::Table, GradeRecords::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeRecords::Table, GradeRecords::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeRecords::Table, GradeRecords::ComponentId)
                            .to(GradeComponents::Table, GradeComponents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 最终成绩 ====================
        manager
            .create_table(
                Table::create()
                    .table(FinalGrades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinalGrades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinalGrades::ClassId).big_integer().not_null())
                    .col(
                        ColumnDef::new(FinalGrades::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinalGrades::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FinalGrades::ComputedValue).double().null())
                    .col(ColumnDef::new(FinalGrades::AdjustedValue).double().null())
                    .col(
                        ColumnDef::new(FinalGrades::UseAdjusted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FinalGrades::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FinalGrades::Table, FinalGrades::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FinalGrades::Table, FinalGrades::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FinalGrades::Table, FinalGrades::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 成绩审计日志 ====================
        manager
            .create_table(
                Table::create()
                    .table(GradeAudits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeAudits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GradeAudits::ClassId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GradeAudits::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeAudits::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeAudits::ComponentId).big_integer().null())
                    .col(ColumnDef::new(GradeAudits::ChangedBy).big_integer().null())
                    .col(ColumnDef::new(GradeAudits::OldValue).double().null())
                    .col(ColumnDef::new(GradeAudits::NewValue).double().null())
                    .col(ColumnDef::new(GradeAudits::Message).text().not_null())
                    .col(
                        ColumnDef::new(GradeAudits::ChangedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeAudits::Table, GradeAudits::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeAudits::Table, GradeAudits::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeAudits::Table, GradeAudits::ChangedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 密码重置令牌 ====================
        manager
            .create_table(
                Table::create()
                    .table(PasswordResetTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PasswordResetTokens::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::TokenHash)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::ExpiresAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::Used)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PasswordResetTokens::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PasswordResetTokens::Table, PasswordResetTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 唯一约束 ====================

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_grade_components_subject_abbreviation")
                    .table(GradeComponents::Table)
                    .col(GradeComponents::SubjectId)
                    .col(GradeComponents::Abbreviation)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_grade_records_class_student_component")
                    .table(GradeRecords::Table)
                    .col(GradeRecords::ClassId)
                    .col(GradeRecords::StudentId)
                    .col(GradeRecords::ComponentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_final_grades_class_subject_student")
                    .table(FinalGrades::Table)
                    .col(FinalGrades::ClassId)
                    .col(FinalGrades::SubjectId)
                    .col(FinalGrades::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ==================== 查询索引 ====================

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grade_audits_class_changed_at")
                    .table(GradeAudits::Table)
                    .col(GradeAudits::ClassId)
                    .col(GradeAudits::ChangedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_password_reset_tokens_user_id")
                    .table(PasswordResetTokens::Table)
                    .col(PasswordResetTokens::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordResetTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeAudits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FinalGrades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeComponents::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum GradeComponents {
    #[sea_orm(iden = "grade_components")]
    Table,
    Id,
    SubjectId,
    Name,
    Abbreviation,
    Description,
    Weight,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradeRecords {
    #[sea_orm(iden = "grade_records")]
    Table,
    Id,
    ClassId,
    StudentId,
    ComponentId,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FinalGrades {
    #[sea_orm(iden = "final_grades")]
    Table,
    Id,
    ClassId,
    SubjectId,
    StudentId,
    ComputedValue,
    AdjustedValue,
    UseAdjusted,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradeAudits {
    #[sea_orm(iden = "grade_audits")]
    Table,
    Id,
    ClassId,
    SubjectId,
    StudentId,
    ComponentId,
    ChangedBy,
    OldValue,
    NewValue,
    Message,
    ChangedAt,
}

#[derive(DeriveIden)]
enum PasswordResetTokens {
    #[sea_orm(iden = "password_reset_tokens")]
    Table,
    Id,
    UserId,
    TokenHash,
    ExpiresAt,
    Used,
    CreatedAt,
}
