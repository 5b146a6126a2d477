//! 路径参数提取器
//!
//! 路径中的 ID 解析失败时直接返回统一格式的 400 响应，
//! 而不是 actix 默认的纯文本错误。

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, HttpResponse, error::InternalError};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path(message: String) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

/// 从路径中读取指定名称的正整数参数
fn parse_positive_i64(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| bad_path(format!("缺少路径参数: {name}")))?;
    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(bad_path(format!("路径参数 {name} 必须为正整数，收到 '{raw}'"))),
    }
}

macro_rules! define_safe_id {
    ($($name:ident => $param:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name(pub i64);

            impl FromRequest for $name {
                type Error = actix_web::Error;
                type Future = Ready<Result<Self, Self::Error>>;

                fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                    ready(parse_positive_i64(req, $param).map($name))
                }
            }
        )*
    };
}

define_safe_id! {
    SafeIDI64 => "id",
    SafeStudentIdI64 => "student_id",
    SafeEvaluationIdI64 => "evaluation_id",
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_id() {
        let req = TestRequest::default()
            .param("student_id", "2023001")
            .to_http_request();
        assert_eq!(parse_positive_i64(&req, "student_id").unwrap(), 2023001);
    }

    #[test]
    fn test_reject_non_numeric_and_zero() {
        let req = TestRequest::default().param("id", "abc").to_http_request();
        assert!(parse_positive_i64(&req, "id").is_err());

        let req = TestRequest::default().param("id", "0").to_http_request();
        assert!(parse_positive_i64(&req, "id").is_err());

        let req = TestRequest::default().to_http_request();
        assert!(parse_positive_i64(&req, "id").is_err());
    }
}
