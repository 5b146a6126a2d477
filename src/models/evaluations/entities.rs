use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 综测原始分项
///
/// 每一项都可以缺省：缺省表示尚未录入，展示时保留为 `null`，
/// 只有在计算总分时才按 0 处理。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct RawScores {
    #[serde(default)]
    pub physical_score: Option<f64>,
    #[serde(default)]
    pub moral_score: Option<f64>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub academic_score: Option<f64>,
    #[serde(default)]
    pub innovation_basic_score: Option<f64>,
    #[serde(default)]
    pub innovation_bonus_score: Option<f64>,
    #[serde(default)]
    pub student_work_score: Option<f64>,
    #[serde(default)]
    pub social_service_score: Option<f64>,
    #[serde(default)]
    pub social_reward_score: Option<f64>,
    #[serde(default)]
    pub cultural_sports_score: Option<f64>,
}

impl RawScores {
    /// 按字段名列出全部分项
    pub fn fields(&self) -> [(&'static str, Option<f64>); 10] {
        [
            ("physical_score", self.physical_score),
            ("moral_score", self.moral_score),
            ("gpa", self.gpa),
            ("academic_score", self.academic_score),
            ("innovation_basic_score", self.innovation_basic_score),
            ("innovation_bonus_score", self.innovation_bonus_score),
            ("student_work_score", self.student_work_score),
            ("social_service_score", self.social_service_score),
            ("social_reward_score", self.social_reward_score),
            ("cultural_sports_score", self.cultural_sports_score),
        ]
    }

    /// 是否存在未录入的分项
    pub fn is_partial(&self) -> bool {
        self.fields().iter().any(|(_, v)| v.is_none())
    }
}

/// 综测记录的唯一键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvaluationKey {
    pub student_id: i64,
    pub academic_year: String,
    pub semester: i32,
}

/// 学年学期（一个排名批次）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cohort {
    pub academic_year: String,
    pub semester: i32,
}

impl std::fmt::Display for Cohort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}学年第{}学期", self.academic_year, self.semester)
    }
}

// 综合测评记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct ScoreRecord {
    pub id: i64,
    pub student_id: i64,
    pub academic_year: String,
    pub semester: i32,
    #[serde(flatten)]
    #[ts(flatten)]
    pub scores: RawScores,
    pub innovation_total_score: f64,
    pub social_total_score: f64,
    pub total_score: f64,
    pub class_rank: Option<i32>,
    pub grade_rank: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 加分明细
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct BonusItem {
    pub id: i64,
    pub evaluation_id: i64,
    pub category: String,
    pub item_name: String,
    pub score: f64,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 综测视图：记录 + 学生/班级身份信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct EvaluationView {
    #[serde(flatten)]
    #[ts(flatten)]
    pub record: ScoreRecord,
    pub student_name: String,
    pub class_id: Option<i64>,
    pub class_name: Option<String>,
    pub major: Option<String>,
}

/// 学生综测详情（含加分明细）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "evaluation.ts")]
pub struct EvaluationDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub view: EvaluationView,
    pub bonus_items: Vec<BonusItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_scores_serialize_as_null() {
        let scores = RawScores {
            gpa: Some(3.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&scores).unwrap();
        assert_eq!(json["gpa"], serde_json::json!(3.5));
        assert!(json["moral_score"].is_null());
    }

    #[test]
    fn test_is_partial() {
        let mut scores = RawScores {
            physical_score: Some(1.0),
            moral_score: Some(1.0),
            gpa: Some(1.0),
            academic_score: Some(1.0),
            innovation_basic_score: Some(1.0),
            innovation_bonus_score: Some(1.0),
            student_work_score: Some(1.0),
            social_service_score: Some(1.0),
            social_reward_score: Some(1.0),
            cultural_sports_score: Some(1.0),
        };
        assert!(!scores.is_partial());
        scores.gpa = None;
        assert!(scores.is_partial());
    }

    #[test]
    fn test_cohort_display() {
        let cohort = Cohort {
            academic_year: "2023-2024".to_string(),
            semester: 1,
        };
        assert_eq!(cohort.to_string(), "2023-2024学年第1学期");
    }
}
