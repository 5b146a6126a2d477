use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, validate_course};
use crate::models::courses::{requests::CourseInput, responses::CourseResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn update_course(
    service: &CourseService,
    course_id: i64,
    mut course_data: CourseInput,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_course(&mut course_data) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseInfoInvalid, msg)));
    }

    let storage = service.get_storage(request)?;
    match storage.update_course(course_id, course_data).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(CourseResponse { course }, "课程更新成功"))),
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::CourseNotFound, "课程不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}
