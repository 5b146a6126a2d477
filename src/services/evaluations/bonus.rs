use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::models::evaluations::{
    requests::CreateBonusItemRequest,
    responses::{BonusItemListResponse, BonusItemResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, policy_from_request};

pub async fn add_bonus_item(
    service: &EvaluationService,
    evaluation_id: i64,
    item: CreateBonusItemRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let policy = policy_from_request(request)?;

    match storage
        .append_bonus_item(evaluation_id, item, policy.get_ref())
        .await
    {
        Ok((bonus_item, evaluation)) => Ok(HttpResponse::Created().json(ApiResponse::success(
            BonusItemResponse {
                bonus_item,
                evaluation,
            },
            "加分明细添加成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_bonus_items(
    service: &EvaluationService,
    evaluation_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_evaluation_by_id(evaluation_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EvaluationNotFound,
                "综测记录不存在",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    }

    match storage.list_bonus_items(evaluation_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            BonusItemListResponse {
                evaluation_id,
                items,
            },
            "获取加分明细成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
