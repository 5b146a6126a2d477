use super::entities::StudentStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 学生查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 按姓名、学号、班级名称模糊搜索
    pub search: Option<String>,
}

// 学生档案字段，创建与更新共用
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct StudentProfileInput {
    pub name: String,
    pub class_id: Option<i64>,
    pub major: String,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub hometown: Option<String>,
    pub id_card: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub enrollment_date: Option<String>,
    pub status: Option<StudentStatus>,
}

// 创建学生请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct CreateStudentRequest {
    pub student_id: i64,
    #[serde(flatten)]
    #[ts(flatten)]
    pub profile: StudentProfileInput,
}

// 更新学生请求（整体覆盖）
pub type UpdateStudentRequest = StudentProfileInput;

// 学生列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    pub page: u64,
    pub size: u64,
    pub search: Option<String>,
}
