use once_cell::sync::Lazy;
use regex::Regex;

use super::policy::{BonusBucket, EvaluationPolicy};
use crate::errors::{GradeSystemError, Result};
use crate::models::evaluations::entities::{BonusItem, EvaluationKey, RawScores};

static ACADEMIC_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{4})$").expect("Invalid academic year regex"));

/// 计算结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedScores {
    pub innovation_total_score: f64,
    pub social_total_score: f64,
    pub total_score: f64,
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 校验学年格式（如 2023-2024，后一年须为前一年加一）
pub fn validate_academic_year(academic_year: &str) -> Result<()> {
    let caps = ACADEMIC_YEAR_RE.captures(academic_year).ok_or_else(|| {
        GradeSystemError::validation(format!(
            "学年格式错误: '{academic_year}'，应为 YYYY-YYYY"
        ))
    })?;
    let start: i32 = caps[1]
        .parse()
        .map_err(|_| GradeSystemError::validation("学年起始年份无效"))?;
    let end: i32 = caps[2]
        .parse()
        .map_err(|_| GradeSystemError::validation("学年结束年份无效"))?;
    if end != start + 1 {
        return Err(GradeSystemError::validation(format!(
            "学年格式错误: '{academic_year}'，结束年份应为起始年份加一"
        )));
    }
    Ok(())
}

pub fn validate_semester(semester: i32) -> Result<()> {
    if semester == 1 || semester == 2 {
        Ok(())
    } else {
        Err(GradeSystemError::validation(format!(
            "学期必须为 1 或 2，收到 {semester}"
        )))
    }
}

/// 校验并组装综测记录的唯一键
pub fn validate_key(
    student_id: Option<i64>,
    academic_year: Option<&str>,
    semester: Option<i32>,
) -> Result<EvaluationKey> {
    let student_id =
        student_id.ok_or_else(|| GradeSystemError::validation("缺少必填字段 student_id"))?;
    if student_id <= 0 {
        return Err(GradeSystemError::validation("student_id 必须为正整数"));
    }
    let academic_year = academic_year
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GradeSystemError::validation("缺少必填字段 academic_year"))?;
    validate_academic_year(academic_year)?;
    let semester = semester.ok_or_else(|| GradeSystemError::validation("缺少必填字段 semester"))?;
    validate_semester(semester)?;

    Ok(EvaluationKey {
        student_id,
        academic_year: academic_year.to_string(),
        semester,
    })
}

/// 校验原始分项：必须为有限的非负数
pub fn validate_raw_scores(scores: &RawScores) -> Result<()> {
    for (name, value) in scores.fields() {
        if let Some(v) = value
            && (!v.is_finite() || v < 0.0)
        {
            return Err(GradeSystemError::validation(format!(
                "{name} 必须为非负有限数，收到 {v}"
            )));
        }
    }
    Ok(())
}

/// 校验加分分值：允许负数（扣分），但必须是有限数
pub fn validate_bonus_score(score: f64) -> Result<()> {
    if score.is_finite() {
        Ok(())
    } else {
        Err(GradeSystemError::validation("加分分值必须为有限数"))
    }
}

/// 学业分项：优先使用 academic_score，否则由 GPA 折算
pub fn academic_component(scores: &RawScores, policy: &EvaluationPolicy) -> f64 {
    match (scores.academic_score, scores.gpa) {
        (Some(academic), _) => academic,
        (None, Some(gpa)) => gpa * policy.gpa_to_academic_factor,
        (None, None) => 0.0,
    }
}

/// 根据原始分项与加分明细计算综测各项总分
pub fn compute_scores(
    scores: &RawScores,
    bonus_items: &[BonusItem],
    policy: &EvaluationPolicy,
) -> Result<ComputedScores> {
    for (name, value) in scores.fields() {
        if let Some(v) = value
            && !v.is_finite()
        {
            return Err(GradeSystemError::validation(format!(
                "{name} 不是有效数值"
            )));
        }
    }

    let mut innovation_bonus = 0.0;
    let mut social_bonus = 0.0;
    let mut other_bonus = 0.0;
    for item in bonus_items {
        validate_bonus_score(item.score)?;
        match policy.bucket_of(&item.category) {
            BonusBucket::Innovation => innovation_bonus += item.score,
            BonusBucket::Social => social_bonus += item.score,
            BonusBucket::Other => other_bonus += item.score,
        }
    }

    let innovation_total = scores.innovation_basic_score.unwrap_or(0.0)
        + scores.innovation_bonus_score.unwrap_or(0.0)
        + innovation_bonus;
    let social_total = scores.social_service_score.unwrap_or(0.0)
        + scores.social_reward_score.unwrap_or(0.0)
        + social_bonus;

    let w = &policy.weights;
    let total = w.moral * scores.moral_score.unwrap_or(0.0)
        + w.academic * academic_component(scores, policy)
        + w.physical * scores.physical_score.unwrap_or(0.0)
        + w.innovation * innovation_total
        + w.social * social_total
        + w.cultural_sports * scores.cultural_sports_score.unwrap_or(0.0)
        + w.student_work * scores.student_work_score.unwrap_or(0.0)
        + w.other_bonus * other_bonus;

    Ok(ComputedScores {
        innovation_total_score: round2(innovation_total),
        social_total_score: round2(social_total),
        total_score: round2(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluationConfig;

    fn bonus(category: &str, score: f64) -> BonusItem {
        BonusItem {
            id: 1,
            evaluation_id: 1,
            category: category.to_string(),
            item_name: "测试项目".to_string(),
            score,
            description: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn full_scores() -> RawScores {
        RawScores {
            physical_score: Some(8.0),
            moral_score: Some(10.0),
            gpa: Some(3.5),
            academic_score: Some(60.0),
            innovation_basic_score: Some(2.0),
            innovation_bonus_score: Some(1.5),
            student_work_score: Some(3.0),
            social_service_score: Some(1.0),
            social_reward_score: Some(0.5),
            cultural_sports_score: Some(2.0),
        }
    }

    #[test]
    fn test_all_absent_is_zero() {
        let policy = EvaluationPolicy::default();
        let result = compute_scores(&RawScores::default(), &[], &policy).unwrap();
        assert_eq!(result.total_score, 0.0);
        assert_eq!(result.innovation_total_score, 0.0);
        assert_eq!(result.social_total_score, 0.0);
    }

    #[test]
    fn test_default_weights_sum_all_fields() {
        let policy = EvaluationPolicy::default();
        let result = compute_scores(&full_scores(), &[], &policy).unwrap();
        assert_eq!(result.innovation_total_score, 3.5);
        assert_eq!(result.social_total_score, 1.5);
        // 10 + 60 + 8 + 3.5 + 1.5 + 2 + 3
        assert_eq!(result.total_score, 88.0);
    }

    #[test]
    fn test_gpa_used_when_academic_absent() {
        let policy = EvaluationPolicy::default();
        let scores = RawScores {
            gpa: Some(3.2),
            ..Default::default()
        };
        let result = compute_scores(&scores, &[], &policy).unwrap();
        assert_eq!(result.total_score, 64.0);
    }

    #[test]
    fn test_bonus_items_routed_by_category() {
        let policy = EvaluationPolicy::default();
        let items = vec![
            bonus("竞赛获奖", 2.0),
            bonus("志愿服务", 1.25),
            bonus("学生工作", 0.5),
        ];
        let result = compute_scores(&RawScores::default(), &items, &policy).unwrap();
        assert_eq!(result.innovation_total_score, 2.0);
        assert_eq!(result.social_total_score, 1.25);
        assert_eq!(result.total_score, 3.75);
    }

    #[test]
    fn test_added_bonus_changes_innovation_and_total() {
        let policy = EvaluationPolicy::default();
        let before = compute_scores(&full_scores(), &[], &policy).unwrap();
        let after =
            compute_scores(&full_scores(), &[bonus("创新创业", 1.0)], &policy).unwrap();
        assert_eq!(after.innovation_total_score, before.innovation_total_score + 1.0);
        assert_eq!(after.total_score, before.total_score + 1.0);
        assert_eq!(after.social_total_score, before.social_total_score);
    }

    #[test]
    fn test_negative_bonus_is_penalty() {
        let policy = EvaluationPolicy::default();
        let result =
            compute_scores(&full_scores(), &[bonus("违纪扣分", -3.0)], &policy).unwrap();
        assert_eq!(result.total_score, 85.0);
    }

    #[test]
    fn test_total_monotonic_in_each_field() {
        let policy = EvaluationPolicy::default();
        let base = full_scores();
        let base_total = compute_scores(&base, &[], &policy).unwrap().total_score;

        let bumps: Vec<fn(&mut RawScores)> = vec![
            |s| s.physical_score = s.physical_score.map(|v| v + 1.0),
            |s| s.moral_score = s.moral_score.map(|v| v + 1.0),
            |s| s.gpa = s.gpa.map(|v| v + 1.0),
            |s| s.academic_score = s.academic_score.map(|v| v + 1.0),
            |s| s.innovation_basic_score = s.innovation_basic_score.map(|v| v + 1.0),
            |s| s.innovation_bonus_score = s.innovation_bonus_score.map(|v| v + 1.0),
            |s| s.student_work_score = s.student_work_score.map(|v| v + 1.0),
            |s| s.social_service_score = s.social_service_score.map(|v| v + 1.0),
            |s| s.social_reward_score = s.social_reward_score.map(|v| v + 1.0),
            |s| s.cultural_sports_score = s.cultural_sports_score.map(|v| v + 1.0),
        ];
        for bump in bumps {
            let mut scores = base.clone();
            bump(&mut scores);
            let total = compute_scores(&scores, &[], &policy).unwrap().total_score;
            assert!(total >= base_total, "{total} < {base_total}");
        }
    }

    #[test]
    fn test_weights_applied() {
        let mut config = EvaluationConfig::default();
        config.weights.academic = 0.6;
        config.weights.moral = 0.0;
        let policy = EvaluationPolicy::from_config(&config).unwrap();
        let scores = RawScores {
            academic_score: Some(90.0),
            moral_score: Some(10.0),
            ..Default::default()
        };
        let result = compute_scores(&scores, &[], &policy).unwrap();
        assert_eq!(result.total_score, 54.0);
    }

    #[test]
    fn test_result_rounded_to_two_decimals() {
        let policy = EvaluationPolicy::default();
        let scores = RawScores {
            physical_score: Some(1.0 / 3.0),
            ..Default::default()
        };
        let result = compute_scores(&scores, &[], &policy).unwrap();
        assert_eq!(result.total_score, 0.33);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let policy = EvaluationPolicy::default();
        let scores = RawScores {
            moral_score: Some(f64::NAN),
            ..Default::default()
        };
        let err = compute_scores(&scores, &[], &policy).unwrap_err();
        assert_eq!(err.code(), "E007");

        let err = compute_scores(&RawScores::default(), &[bonus("创新", f64::INFINITY)], &policy)
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[test]
    fn test_validate_key() {
        let key = validate_key(Some(2023001), Some("2023-2024"), Some(1)).unwrap();
        assert_eq!(key.academic_year, "2023-2024");

        assert!(validate_key(None, Some("2023-2024"), Some(1)).is_err());
        assert!(validate_key(Some(1), None, Some(1)).is_err());
        assert!(validate_key(Some(1), Some("  "), Some(1)).is_err());
        assert!(validate_key(Some(1), Some("2023-2024"), None).is_err());
        assert!(validate_key(Some(1), Some("2023-2024"), Some(3)).is_err());
        assert!(validate_key(Some(0), Some("2023-2024"), Some(1)).is_err());
        assert!(validate_key(Some(1), Some("2023-2025"), Some(1)).is_err());
        assert!(validate_key(Some(1), Some("2023/2024"), Some(1)).is_err());
    }

    #[test]
    fn test_validate_raw_scores() {
        assert!(validate_raw_scores(&full_scores()).is_ok());
        let scores = RawScores {
            physical_score: Some(-1.0),
            ..Default::default()
        };
        let err = validate_raw_scores(&scores).unwrap_err();
        assert!(err.message().contains("physical_score"));
    }
}
