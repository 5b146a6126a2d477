use crate::config::{EvaluationConfig, EvaluationWeights};
use crate::errors::{GradeSystemError, Result};
use crate::models::rankings::entities::TieBreak;

/// 加分明细归属的分项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusBucket {
    Innovation,
    Social,
    Other,
}

/// 综测计算策略
#[derive(Debug, Clone)]
pub struct EvaluationPolicy {
    pub weights: EvaluationWeights,
    pub gpa_to_academic_factor: f64,
    innovation_keywords: Vec<String>,
    social_keywords: Vec<String>,
    pub tie_break: TieBreak,
}

impl EvaluationPolicy {
    pub fn from_config(config: &EvaluationConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| GradeSystemError::validation(e.to_string()))?;
        let tie_break = config
            .tie_break
            .parse::<TieBreak>()
            .map_err(GradeSystemError::validation)?;

        Ok(Self {
            weights: config.weights.clone(),
            gpa_to_academic_factor: config.gpa_to_academic_factor,
            innovation_keywords: normalize_keywords(&config.innovation_categories),
            social_keywords: normalize_keywords(&config.social_categories),
            tie_break,
        })
    }

    /// 根据类别名称判断加分归属，创新类优先匹配
    pub fn bucket_of(&self, category: &str) -> BonusBucket {
        let category = category.trim().to_lowercase();
        if self
            .innovation_keywords
            .iter()
            .any(|k| category.contains(k.as_str()))
        {
            BonusBucket::Innovation
        } else if self
            .social_keywords
            .iter()
            .any(|k| category.contains(k.as_str()))
        {
            BonusBucket::Social
        } else {
            BonusBucket::Other
        }
    }
}

impl Default for EvaluationPolicy {
    fn default() -> Self {
        let config = EvaluationConfig::default();
        Self {
            weights: config.weights.clone(),
            gpa_to_academic_factor: config.gpa_to_academic_factor,
            innovation_keywords: normalize_keywords(&config.innovation_categories),
            social_keywords: normalize_keywords(&config.social_categories),
            tie_break: TieBreak::StudentId,
        }
    }
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_matching() {
        let policy = EvaluationPolicy::default();
        assert_eq!(policy.bucket_of("竞赛获奖"), BonusBucket::Innovation);
        assert_eq!(policy.bucket_of("科研项目"), BonusBucket::Innovation);
        assert_eq!(policy.bucket_of("志愿服务"), BonusBucket::Social);
        assert_eq!(policy.bucket_of("Social Practice"), BonusBucket::Social);
        assert_eq!(policy.bucket_of("学生工作"), BonusBucket::Other);
    }

    #[test]
    fn test_from_config_reads_tie_break() {
        let config = EvaluationConfig {
            tie_break: "shared".to_string(),
            ..EvaluationConfig::default()
        };
        let policy = EvaluationPolicy::from_config(&config).unwrap();
        assert_eq!(policy.tie_break, TieBreak::Shared);
    }

    #[test]
    fn test_from_config_rejects_invalid_weights() {
        let mut config = EvaluationConfig::default();
        config.weights.moral = f64::INFINITY;
        let err = EvaluationPolicy::from_config(&config).unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[test]
    fn test_blank_keywords_ignored() {
        let config = EvaluationConfig {
            innovation_categories: vec!["  ".to_string(), "创新".to_string()],
            ..EvaluationConfig::default()
        };
        let policy = EvaluationPolicy::from_config(&config).unwrap();
        assert_eq!(policy.bucket_of("其他"), BonusBucket::Other);
    }
}
