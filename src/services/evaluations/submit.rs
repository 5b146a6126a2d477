use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::EvaluationService;
use crate::models::ApiResponse;
use crate::models::evaluations::{
    requests::SubmitEvaluationRequest, responses::EvaluationResponse,
};
use crate::scoring::validate_key;
use crate::services::{error_response, policy_from_request};

pub async fn submit_evaluation(
    service: &EvaluationService,
    submission: SubmitEvaluationRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let key = match validate_key(
        submission.student_id,
        submission.academic_year.as_deref(),
        submission.semester,
    ) {
        Ok(key) => key,
        Err(e) => return Ok(error_response(&e)),
    };

    let storage = service.get_storage(request)?;
    let policy = policy_from_request(request)?;

    match storage
        .upsert_evaluation(key, submission.scores, policy.get_ref())
        .await
    {
        Ok(evaluation) => {
            info!(
                "学号 {} 的 {} 学年第 {} 学期综测已保存，总分 {}",
                evaluation.student_id,
                evaluation.academic_year,
                evaluation.semester,
                evaluation.total_score
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                EvaluationResponse { evaluation },
                "综测成绩提交成功",
            )))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
