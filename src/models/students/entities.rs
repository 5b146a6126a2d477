use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学籍状态
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "student.ts")]
pub enum StudentStatus {
    Enrolled,  // 在读
    Suspended, // 休学
    Graduated, // 毕业
    Deleted,   // 已删除（逻辑删除）
}

impl std::fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudentStatus::Enrolled => write!(f, "enrolled"),
            StudentStatus::Suspended => write!(f, "suspended"),
            StudentStatus::Graduated => write!(f, "graduated"),
            StudentStatus::Deleted => write!(f, "deleted"),
        }
    }
}

impl std::str::FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enrolled" => Ok(StudentStatus::Enrolled),
            "suspended" => Ok(StudentStatus::Suspended),
            "graduated" => Ok(StudentStatus::Graduated),
            "deleted" => Ok(StudentStatus::Deleted),
            _ => Err(format!("Invalid student status: {s}")),
        }
    }
}

// 学生档案
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    pub class_id: Option<i64>,
    pub class_name: Option<String>,
    pub major: String,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub hometown: Option<String>,
    pub id_card: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub enrollment_date: Option<String>,
    pub status: StudentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
