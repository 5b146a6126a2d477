use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{RankingService, cohort_from};
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::rankings::{
    requests::CalculateRankingRequest, responses::CalculateRankingResponse,
};
use crate::services::{error_response, policy_from_request};

pub async fn calculate_rankings(
    service: &RankingService,
    body: CalculateRankingRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let cohort = match cohort_from(body.academic_year.as_deref(), body.semester) {
        Ok(cohort) => cohort,
        Err(e) => return Ok(error_response(&e)),
    };

    let storage = service.get_storage(request)?;
    let policy = policy_from_request(request)?;

    info!(
        "用户 {:?} 触发 {} 排名计算",
        RequireJWT::extract_user_id(request),
        cohort
    );

    match storage.recalculate_rankings(&cohort, policy.get_ref()).await {
        Ok(ranked_count) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CalculateRankingResponse {
                academic_year: cohort.academic_year,
                semester: cohort.semester,
                ranked_count,
            },
            "排名计算完成",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
