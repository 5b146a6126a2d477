use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::{
    requests::StudentDetailQuery, responses::EvaluationDetailResponse,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::scoring::validate_key;
use crate::services::error_response;

/// 学生只能查看自己的综测详情
pub(crate) fn can_view_student(user: &User, student_id: i64) -> bool {
    match user.role {
        UserRole::Student => user.related_student_id == Some(student_id),
        UserRole::Teacher | UserRole::Admin => true,
    }
}

pub async fn get_student_detail(
    service: &EvaluationService,
    student_id: i64,
    query: StudentDetailQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };
    if !can_view_student(&user, student_id) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只能查看本人的综测详情",
        )));
    }

    let key = match validate_key(Some(student_id), query.academic_year.as_deref(), query.semester) {
        Ok(key) => key,
        Err(e) => return Ok(error_response(&e)),
    };

    let storage = service.get_storage(request)?;
    match storage.get_evaluation_detail(&key).await {
        Ok(Some(detail)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EvaluationDetailResponse { detail },
            "获取综测详情成功",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EvaluationNotFound,
            format!(
                "学号 {} 在 {} 学年第 {} 学期没有综测记录",
                key.student_id, key.academic_year, key.semester
            ),
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;

    fn user(role: UserRole, related_student_id: Option<i64>) -> User {
        let now = chrono::Utc::now();
        User {
            id: 1,
            username: "u".to_string(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            related_student_id,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_student_sees_only_own_detail() {
        let student = user(UserRole::Student, Some(2023001));
        assert!(can_view_student(&student, 2023001));
        assert!(!can_view_student(&student, 2023002));
        assert!(!can_view_student(&user(UserRole::Student, None), 2023001));
        assert!(can_view_student(&user(UserRole::Teacher, None), 2023002));
    }
}
