//! JWT 认证中间件
//!
//! 校验 `Authorization: Bearer <token>` 中的 access token，
//! 并把当前用户写入请求扩展，供后续中间件与处理程序读取。
//! 用户信息按用户 ID 缓存，缓存未命中时回源数据库，停用的账号一律拒绝。

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::errors::GradeSystemError;
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireJWT;

/// 用户缓存键
pub fn user_cache_key(user_id: i64) -> String {
    format!("auth:user:{user_id}")
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

async fn authenticate(req: &ServiceRequest) -> Result<User, GradeSystemError> {
    let token = bearer_token(req)
        .ok_or_else(|| GradeSystemError::authentication("缺少或无效的 Authorization 头"))?;

    let claims = JwtUtils::verify_access_token(token).map_err(|e| {
        debug!("access token 校验失败: {}", e);
        GradeSystemError::authentication("无效或已过期的 token")
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| GradeSystemError::authentication("token 中的用户 ID 无效"))?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());
    let key = user_cache_key(user_id);

    if let Some(cache) = &cache
        && let CacheResult::Found(user) = cache.get_json::<User>(&key).await
    {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| GradeSystemError::database_config("存储未注册到应用数据"))?;

    let user = storage
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| GradeSystemError::authentication("用户不存在"))?;

    if !user.is_active() {
        return Err(GradeSystemError::authorization("账号已停用"));
    }

    if let Some(cache) = &cache {
        cache
            .insert_json(key, &user, AppConfig::get().cache.default_ttl)
            .await;
    }

    Ok(user)
}

fn rejection(err: &GradeSystemError) -> HttpResponse {
    match err {
        GradeSystemError::Authorization(msg) => {
            create_error_response(StatusCode::FORBIDDEN, ErrorCode::AccountSuspended, msg)
        }
        GradeSystemError::Authentication(msg) => {
            create_error_response(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg)
        }
        other => create_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalServerError,
            other.message(),
        ),
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求交给 CORS 处理
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("用户 {} ({}) 认证通过", user.id, user.role);
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(err) => {
                    info!("请求 {} 认证失败: {}", req.path(), err);
                    Ok(req.into_response(rejection(&err).map_into_right_body()))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前登录用户（仅在 RequireJWT 保护的路由中可用）
    pub fn extract_user_claims(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_srv_request();
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn test_rejection_status() {
        let resp = rejection(&GradeSystemError::authorization("账号已停用"));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let resp = rejection(&GradeSystemError::authentication("x"));
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
