use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ClassService, normalize_class_name};
use crate::models::classes::requests::CreateClassRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn create_class(
    service: &ClassService,
    mut class_data: CreateClassRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(class_name) = normalize_class_name(&class_data.class_name) else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ClassInfoInvalid,
            "班级名称不能为空且不超过 64 个字符",
        )));
    };
    class_data.class_name = class_name;

    let storage = service.get_storage(request)?;
    match storage.create_class(class_data).await {
        Ok(class) => {
            info!("创建班级 {} ({})", class.class_name, class.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(class, "班级创建成功")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
