use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{RankingService, cohort_from, resolve_limit};
use crate::config::AppConfig;
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::models::rankings::{requests::RankingListQuery, responses::RankingListResponse};
use crate::services::error_response;

pub async fn list_rankings(
    service: &RankingService,
    query: RankingListQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let cohort = match cohort_from(query.academic_year.as_deref(), query.semester) {
        Ok(cohort) => cohort,
        Err(e) => return Ok(error_response(&e)),
    };

    let role = RequireJWT::extract_user_role(request);
    let limit = resolve_limit(query.limit, role.as_ref(), &AppConfig::get().evaluation);

    let storage = service.get_storage(request)?;
    match storage.list_rankings(&cohort, query.class_id, limit).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RankingListResponse {
                academic_year: cohort.academic_year,
                semester: cohort.semester,
                limit,
                items,
            },
            "获取排名成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
