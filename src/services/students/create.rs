use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{StudentService, validate_profile};
use crate::config::AppConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    students::{requests::CreateStudentRequest, responses::StudentResponse},
    users::{
        entities::{UserRole, UserStatus},
        requests::NewUser,
    },
};
use crate::services::error_response;
use crate::utils::password::hash_password;

pub async fn create_student(
    service: &StudentService,
    mut student_data: CreateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if student_data.student_id <= 0 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::StudentInfoInvalid,
            "学号必须为正整数",
        )));
    }
    if let Err(msg) = validate_profile(&mut student_data.profile) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::StudentInfoInvalid, msg)));
    }

    // 学生账号：用户名为学号，初始密码取配置
    let password_hash = match hash_password(&AppConfig::get().students.default_password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e)),
    };
    let account = NewUser {
        username: student_data.student_id.to_string(),
        password_hash,
        role: UserRole::Student,
        status: UserStatus::Active,
        display_name: Some(student_data.profile.name.clone()),
        related_student_id: Some(student_data.student_id),
    };

    let storage = service.get_storage(request)?;
    match storage.create_student(student_data, account).await {
        Ok(student) => {
            info!("创建学生 {} ({})", student.student_id, student.name);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(StudentResponse { student }, "学生创建成功")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
