//! 课程实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub course_code: String,
    pub course_name: String,
    pub credits: f64,
    pub hours: i32,
    pub course_type: String,
    pub department: Option<String>,
    pub prerequisites: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_course(self) -> crate::models::courses::entities::Course {
        use crate::models::courses::entities::{Course, CourseStatus, CourseType};
        use chrono::{DateTime, Utc};

        Course {
            id: self.id,
            course_code: self.course_code,
            course_name: self.course_name,
            credits: self.credits,
            hours: self.hours,
            course_type: self
                .course_type
                .parse::<CourseType>()
                .unwrap_or(CourseType::Required),
            department: self.department,
            prerequisites: self.prerequisites,
            description: self.description,
            status: self
                .status
                .parse::<CourseStatus>()
                .unwrap_or(CourseStatus::Open),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
