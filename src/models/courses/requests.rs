use super::entities::{CourseStatus, CourseType};
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 按课程编号、名称、开课院系模糊搜索
    pub search: Option<String>,
}

// 课程创建/更新请求（更新为整体覆盖）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseInput {
    pub course_code: String,
    pub course_name: String,
    pub credits: f64,
    pub hours: i32,
    pub course_type: Option<CourseType>,
    pub department: Option<String>,
    pub prerequisites: Option<String>,
    pub description: Option<String>,
    pub status: Option<CourseStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: u64,
    pub size: u64,
    pub search: Option<String>,
}
