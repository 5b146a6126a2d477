pub mod auth;
pub mod classes;
pub mod courses;
pub mod evaluations;
pub mod rankings;
pub mod students;
pub mod system;
pub mod users;

pub use auth::AuthService;
pub use classes::ClassService;
pub use courses::CourseService;
pub use evaluations::EvaluationService;
pub use rankings::RankingService;
pub use students::StudentService;
pub use system::SystemService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use std::sync::Arc;
use tracing::error;

use crate::cache::ObjectCache;
use crate::errors::GradeSystemError;
use crate::models::{ApiResponse, ErrorCode};
use crate::scoring::EvaluationPolicy;
use crate::storage::Storage;

/// 从应用数据中取出存储
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("存储未注册到应用数据");
            actix_web::error::ErrorInternalServerError("storage unavailable")
        })
}

/// 从应用数据中取出综测计算策略
pub(crate) fn policy_from_request(
    request: &HttpRequest,
) -> ActixResult<web::Data<EvaluationPolicy>> {
    request
        .app_data::<web::Data<EvaluationPolicy>>()
        .cloned()
        .ok_or_else(|| {
            error!("综测计算策略未注册到应用数据");
            actix_web::error::ErrorInternalServerError("evaluation policy unavailable")
        })
}

pub(crate) fn cache_from_request(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
}

/// 领域错误对应的 HTTP 状态码
pub(crate) fn error_status(err: &GradeSystemError) -> StatusCode {
    match err {
        GradeSystemError::Validation(_) | GradeSystemError::DateParse(_) => StatusCode::BAD_REQUEST,
        GradeSystemError::NotFound(_) => StatusCode::NOT_FOUND,
        GradeSystemError::Conflict(_) => StatusCode::CONFLICT,
        GradeSystemError::Authentication(_) => StatusCode::UNAUTHORIZED,
        GradeSystemError::Authorization(_) => StatusCode::FORBIDDEN,
        GradeSystemError::ComputationPrecondition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 把领域错误转换为统一的错误响应
pub(crate) fn error_response(err: &GradeSystemError) -> HttpResponse {
    let status = error_status(err);
    if status.is_server_error() {
        error!("{}", err);
    }
    HttpResponse::build(status).json(ApiResponse::error_empty(
        ErrorCode::from_error(err),
        err.message(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&GradeSystemError::validation("学期必须为 1 或 2")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&GradeSystemError::not_found("x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&GradeSystemError::conflict("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&GradeSystemError::computation_precondition("x")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(&GradeSystemError::database_operation("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_status() {
        let resp = error_response(&GradeSystemError::conflict("学号已存在"));
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
