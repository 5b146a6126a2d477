use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ClassService, normalize_class_name};
use crate::models::classes::requests::UpdateClassRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn update_class(
    service: &ClassService,
    class_id: i64,
    mut update_data: UpdateClassRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Some(name) = update_data.class_name.take() {
        match normalize_class_name(&name) {
            Some(name) => update_data.class_name = Some(name),
            None => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ClassInfoInvalid,
                    "班级名称不能为空且不超过 64 个字符",
                )));
            }
        }
    }

    let storage = service.get_storage(request)?;
    match storage.update_class(class_id, update_data).await {
        Ok(Some(class)) => Ok(HttpResponse::Ok().json(ApiResponse::success(class, "班级更新成功"))),
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::ClassNotFound, "班级不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}
