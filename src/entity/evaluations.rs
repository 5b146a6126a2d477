//! 综合测评实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comprehensive_evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub academic_year: String,
    pub semester: i32,
    pub physical_score: Option<f64>,
    pub moral_score: Option<f64>,
    pub gpa: Option<f64>,
    pub academic_score: Option<f64>,
    pub innovation_basic_score: Option<f64>,
    pub innovation_bonus_score: Option<f64>,
    pub student_work_score: Option<f64>,
    pub social_service_score: Option<f64>,
    pub social_reward_score: Option<f64>,
    pub cultural_sports_score: Option<f64>,
    pub innovation_total_score: f64,
    pub social_total_score: f64,
    pub total_score: f64,
    pub class_rank: Option<i32>,
    pub grade_rank: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::StudentId"
    )]
    Student,
    #[sea_orm(has_many = "super::bonus_details::Entity")]
    BonusDetails,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::bonus_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BonusDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 原始分项
    pub fn raw_scores(&self) -> crate::models::evaluations::entities::RawScores {
        crate::models::evaluations::entities::RawScores {
            physical_score: self.physical_score,
            moral_score: self.moral_score,
            gpa: self.gpa,
            academic_score: self.academic_score,
            innovation_basic_score: self.innovation_basic_score,
            innovation_bonus_score: self.innovation_bonus_score,
            student_work_score: self.student_work_score,
            social_service_score: self.social_service_score,
            social_reward_score: self.social_reward_score,
            cultural_sports_score: self.cultural_sports_score,
        }
    }

    pub fn into_score_record(self) -> crate::models::evaluations::entities::ScoreRecord {
        use crate::models::evaluations::entities::ScoreRecord;
        use chrono::{DateTime, Utc};

        ScoreRecord {
            scores: self.raw_scores(),
            id: self.id,
            student_id: self.student_id,
            academic_year: self.academic_year,
            semester: self.semester,
            innovation_total_score: self.innovation_total_score,
            social_total_score: self.social_total_score,
            total_score: self.total_score,
            class_rank: self.class_rank,
            grade_rank: self.grade_rank,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
