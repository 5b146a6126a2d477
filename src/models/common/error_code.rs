use serde::{Deserialize, Serialize};

use crate::errors::GradeSystemError;

// 业务错误码（ApiResponse.code）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证 2xxx
    AuthFailed = 2000,
    AccountSuspended = 2001,

    // 用户 3xxx
    UserNotFound = 3000,
    UserNameInvalid = 3001,
    UserPasswordInvalid = 3002,
    UserNameAlreadyExists = 3003,
    UserCreationFailed = 3004,

    // 学生 4xxx
    StudentNotFound = 4000,
    StudentAlreadyExists = 4001,
    StudentInfoInvalid = 4002,

    // 课程 5xxx
    CourseNotFound = 5000,
    CourseAlreadyExists = 5001,
    CourseInfoInvalid = 5002,

    // 班级 6xxx
    ClassNotFound = 6000,
    ClassAlreadyExists = 6001,
    ClassInfoInvalid = 6002,

    // 综合测评 7xxx
    EvaluationNotFound = 7000,
    EvaluationInvalid = 7001,
    BonusItemInvalid = 7002,

    // 排名 8xxx
    RankingPreconditionFailed = 8000,
    ExportFailed = 8001,
}

impl ErrorCode {
    /// 由领域错误推断通用错误码
    pub fn from_error(err: &GradeSystemError) -> Self {
        match err {
            GradeSystemError::Validation(_) | GradeSystemError::DateParse(_) => {
                ErrorCode::BadRequest
            }
            GradeSystemError::NotFound(_) => ErrorCode::NotFound,
            GradeSystemError::Conflict(_) => ErrorCode::Conflict,
            GradeSystemError::Authentication(_) => ErrorCode::Unauthorized,
            GradeSystemError::Authorization(_) => ErrorCode::Forbidden,
            GradeSystemError::ComputationPrecondition(_) => ErrorCode::RankingPreconditionFailed,
            GradeSystemError::Export(_) => ErrorCode::ExportFailed,
            _ => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            ErrorCode::from_error(&GradeSystemError::validation("x")),
            ErrorCode::BadRequest
        );
        assert_eq!(
            ErrorCode::from_error(&GradeSystemError::not_found("x")),
            ErrorCode::NotFound
        );
        assert_eq!(
            ErrorCode::from_error(&GradeSystemError::database_operation("x")),
            ErrorCode::InternalServerError
        );
        assert_eq!(ErrorCode::Conflict as i32, 1009);
    }
}
