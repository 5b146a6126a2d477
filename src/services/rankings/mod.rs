pub mod calculate;
pub mod export;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::EvaluationConfig;
use crate::errors::{GradeSystemError, Result};
use crate::models::evaluations::entities::Cohort;
use crate::models::rankings::requests::{
    CalculateRankingRequest, RankingExportQuery, RankingListQuery,
};
use crate::models::users::entities::UserRole;
use crate::scoring::calculator::{validate_academic_year, validate_semester};
use crate::storage::Storage;

pub struct RankingService {
    storage: Option<Arc<dyn Storage>>,
}

impl RankingService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 重新计算整个学年学期的总分与排名
    pub async fn calculate(
        &self,
        body: CalculateRankingRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        calculate::calculate_rankings(self, body, request).await
    }

    pub async fn list(
        &self,
        query: RankingListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_rankings(self, query, request).await
    }

    pub async fn export(
        &self,
        query: RankingExportQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        export::export_rankings(self, query, request).await
    }
}

/// 校验学年学期参数
pub(crate) fn cohort_from(academic_year: Option<&str>, semester: Option<i32>) -> Result<Cohort> {
    let academic_year = academic_year
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GradeSystemError::validation("缺少必填字段 academic_year"))?;
    validate_academic_year(academic_year)?;
    let semester = semester.ok_or_else(|| GradeSystemError::validation("缺少必填字段 semester"))?;
    validate_semester(semester)?;

    Ok(Cohort {
        academic_year: academic_year.to_string(),
        semester,
    })
}

/// 排名列表条数：缺省取默认值，限制在 1..=最大值，学生角色再截断到学生上限
pub(crate) fn resolve_limit(
    requested: Option<u64>,
    role: Option<&UserRole>,
    config: &EvaluationConfig,
) -> u64 {
    let limit = requested
        .unwrap_or(config.default_ranking_limit)
        .clamp(1, config.max_ranking_limit.max(1));
    match role {
        Some(UserRole::Student) | None => limit.min(config.student_ranking_limit),
        Some(_) => limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_requires_both_fields() {
        let cohort = cohort_from(Some("2023-2024"), Some(2)).unwrap();
        assert_eq!(cohort.semester, 2);
        assert_eq!(cohort_from(None, Some(1)).unwrap_err().code(), "E007");
        assert_eq!(cohort_from(Some("2023-2024"), Some(3)).unwrap_err().code(), "E007");
    }

    #[test]
    fn test_limit_resolution() {
        let config = EvaluationConfig::default();
        assert_eq!(resolve_limit(None, Some(&UserRole::Teacher), &config), 50);
        assert_eq!(resolve_limit(Some(0), Some(&UserRole::Teacher), &config), 1);
        assert_eq!(resolve_limit(Some(10_000), Some(&UserRole::Admin), &config), 500);
    }

    #[test]
    fn test_student_limit_is_capped() {
        let config = EvaluationConfig::default();
        assert_eq!(resolve_limit(Some(100), Some(&UserRole::Student), &config), 10);
        assert_eq!(resolve_limit(Some(3), Some(&UserRole::Student), &config), 3);
        assert_eq!(resolve_limit(None, None, &config), 10);
    }
}
