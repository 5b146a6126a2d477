use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StudentService, validate_profile};
use crate::models::students::{requests::UpdateStudentRequest, responses::StudentResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn update_student(
    service: &StudentService,
    student_id: i64,
    mut update_data: UpdateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_profile(&mut update_data) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::StudentInfoInvalid, msg)));
    }

    let storage = service.get_storage(request)?;
    match storage.update_student(student_id, update_data).await {
        Ok(Some(student)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentResponse { student },
            "学生信息更新成功",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::StudentNotFound, "学生不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}
