use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course.ts")]
pub enum CourseType {
    Required, // 必修
    Elective, // 选修
}

impl std::fmt::Display for CourseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseType::Required => write!(f, "required"),
            CourseType::Elective => write!(f, "elective"),
        }
    }
}

impl std::str::FromStr for CourseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(CourseType::Required),
            "elective" => Ok(CourseType::Elective),
            _ => Err(format!("Invalid course type: {s}")),
        }
    }
}

// 课程状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course.ts")]
pub enum CourseStatus {
    Open,   // 开设
    Closed, // 停开
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Open => write!(f, "open"),
            CourseStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(CourseStatus::Open),
            "closed" => Ok(CourseStatus::Closed),
            _ => Err(format!("Invalid course status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub credits: f64,
    pub hours: i32,
    pub course_type: CourseType,
    pub department: Option<String>,
    pub prerequisites: Option<String>,
    pub description: Option<String>,
    pub status: CourseStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
