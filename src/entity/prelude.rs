//! 预导入模块，方便使用

pub use super::class_subjects::{
    ActiveModel as ClassSubjectActiveModel, Entity as ClassSubjects, Model as ClassSubjectModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::enrollments::{
    ActiveModel as EnrollmentActiveModel, Entity as Enrollments, Model as EnrollmentModel,
};
pub use super::final_grades::{
    ActiveModel as FinalGradeActiveModel, Entity as FinalGrades, Model as FinalGradeModel,
};
pub use super::grade_audits::{
    ActiveModel as GradeAuditActiveModel, Entity as GradeAudits, Model as GradeAuditModel,
};
pub use super::grade_components::{
    ActiveModel as GradeComponentActiveModel, Entity as GradeComponents,
    Model as GradeComponentModel,
};
pub use super::grade_records::{
    ActiveModel as GradeRecordActiveModel, Entity as GradeRecords, Model as GradeRecordModel,
};
pub use super::institutions::{
    ActiveModel as InstitutionActiveModel, Entity as Institutions, Model as InstitutionModel,
};
pub use super::password_reset_tokens::{
    ActiveModel as PasswordResetTokenActiveModel, Entity as PasswordResetTokens,
    Model as PasswordResetTokenModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::subjects::{
    ActiveModel as SubjectActiveModel, Entity as Subjects, Model as SubjectModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
