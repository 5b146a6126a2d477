use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::StudentService;
use crate::middlewares::require_jwt::user_cache_key;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{cache_from_request, error_response};

pub async fn delete_student(
    service: &StudentService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_student(student_id).await {
        Ok(true) => {
            info!("删除学生 {}，关联账号已停用", student_id);

            // 让已登录的学生账号立即失效
            if let Some(cache) = cache_from_request(request) {
                match storage.get_user_by_username(&student_id.to_string()).await {
                    Ok(Some(user)) => cache.remove(&user_cache_key(user.id)).await,
                    Ok(None) => {}
                    Err(e) => warn!("查询学生 {} 的账号失败: {}", student_id, e),
                }
            }

            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("学生删除成功")))
        }
        Ok(false) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::StudentNotFound, "学生不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}
