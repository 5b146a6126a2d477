use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CourseService, validate_course};
use crate::models::courses::{requests::CourseInput, responses::CourseResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn create_course(
    service: &CourseService,
    mut course_data: CourseInput,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_course(&mut course_data) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseInfoInvalid, msg)));
    }

    let storage = service.get_storage(request)?;
    match storage.create_course(course_data).await {
        Ok(course) => {
            info!("创建课程 {} {}", course.course_code, course.course_name);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(CourseResponse { course }, "课程创建成功")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
