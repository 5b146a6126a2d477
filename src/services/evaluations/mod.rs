pub mod bonus;
pub mod detail;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::evaluations::requests::{
    CreateBonusItemRequest, StudentDetailQuery, SubmitEvaluationRequest,
};
use crate::storage::Storage;

pub struct EvaluationService {
    storage: Option<Arc<dyn Storage>>,
}

impl EvaluationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 提交（覆盖）某学生某学期的综测原始分
    pub async fn submit_evaluation(
        &self,
        submission: SubmitEvaluationRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_evaluation(self, submission, request).await
    }

    // 追加加分明细并重新计算总分
    pub async fn add_bonus_item(
        &self,
        evaluation_id: i64,
        item: CreateBonusItemRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        bonus::add_bonus_item(self, evaluation_id, item, request).await
    }

    pub async fn list_bonus_items(
        &self,
        evaluation_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        bonus::list_bonus_items(self, evaluation_id, request).await
    }

    pub async fn get_student_detail(
        &self,
        student_id: i64,
        query: StudentDetailQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::get_student_detail(self, student_id, query, request).await
    }
}
