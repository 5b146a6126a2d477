use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::{UserRole, UserStatus},
        requests::{CreateUserRequest, NewUser},
        responses::UserResponse,
    },
};
use crate::services::error_response;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_password, validate_username};

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    if let Err(msg) = validate_password(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    let storage = service.get_storage(request)?;

    // 学生账号必须关联到已存在的学生档案
    let related_student_id = match (&user_data.role, user_data.related_student_id) {
        (UserRole::Student, None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "学生账号必须提供 related_student_id",
            )));
        }
        (UserRole::Student, Some(student_id)) => match storage.get_student_by_id(student_id).await {
            Ok(Some(_)) => Some(student_id),
            Ok(None) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::StudentNotFound,
                    format!("学号 {student_id} 不存在"),
                )));
            }
            Err(e) => return Ok(error_response(&e)),
        },
        (_, _) => None,
    };

    let password_hash = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e)),
    };

    let new_user = NewUser {
        username: user_data.username,
        password_hash,
        role: user_data.role,
        status: UserStatus::Active,
        display_name: user_data
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        related_student_id,
    };

    match storage.create_user(new_user).await {
        Ok(user) => {
            info!("创建用户 {} ({})", user.username, user.role);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "用户创建成功")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
