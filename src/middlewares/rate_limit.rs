//! 速率限制中间件
//!
//! 固定时间窗口计数：窗口从第一次请求开始计时，窗口内超过上限返回 429。
//! 已登录的请求按用户 ID 计数，否则按客户端 IP 计数。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::Expiry;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 窗口计数
#[derive(Clone, Copy)]
struct Window {
    count: u32,
    length: Duration,
}

/// 条目在窗口结束时过期，更新计数不会延长窗口
struct WindowExpiry;

impl Expiry<String, Window> for WindowExpiry {
    fn expire_after_create(&self, _key: &String, value: &Window, _now: Instant) -> Option<Duration> {
        Some(value.length)
    }
}

/// 全局计数表，键为 `前缀:user:<id>` 或 `前缀:ip:<addr>`
static WINDOWS: Lazy<Cache<String, Window>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .expire_after(WindowExpiry)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: &'static str,
}

impl RateLimit {
    pub fn new(key_prefix: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix,
        }
    }

    /// 登录：每个 IP 每分钟 5 次
    pub fn login() -> Self {
        Self::new("login", 5, 60)
    }

    /// 刷新 token：每个 IP 每分钟 10 次
    pub fn refresh_token() -> Self {
        Self::new("refresh", 10, 60)
    }

    /// 排名计算会重写整个学年学期，每个用户每分钟 6 次
    pub fn ranking_calculation() -> Self {
        Self::new("ranking", 6, 60)
    }

    fn key(&self, identifier: &str) -> String {
        format!("{}:{}", self.key_prefix, identifier)
    }

    /// 记录一次请求，超限时返回需要等待的秒数
    async fn hit(&self, key: String) -> Result<u32, u64> {
        let current = WINDOWS.get(&key).await;
        let count = current.map(|w| w.count).unwrap_or(0);
        if count >= self.max_requests {
            return Err(self.window_secs);
        }
        WINDOWS
            .insert(
                key,
                Window {
                    count: count + 1,
                    length: Duration::from_secs(self.window_secs),
                },
            )
            .await;
        Ok(self.max_requests - count - 1)
    }
}

/// 客户端 IP：优先使用连接信息，其次是反向代理写入的转发头
fn client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);
    if let Some(ip) = connection_ip.as_deref()
        && ip.parse::<IpAddr>().is_ok()
    {
        return ip.to_string();
    }

    ["X-Forwarded-For", "X-Real-IP"]
        .iter()
        .filter_map(|name| req.headers().get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|ip| ip.parse::<IpAddr>().is_ok())
        .map(str::to_string)
        .or(connection_ip)
        .unwrap_or_else(|| "unknown".to_string())
}

fn identifier(req: &ServiceRequest) -> String {
    match req.extensions().get::<User>() {
        Some(user) => format!("user:{}", user.id),
        None => format!("ip:{}", client_ip(req)),
    }
}

fn too_many_requests(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "请求过于频繁，请稍后再试",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            let key = limit.key(&identifier(&req));
            match limit.hit(key.clone()).await {
                Ok(_) => Ok(srv.call(req).await?.map_into_left_body()),
                Err(retry_after) => {
                    warn!("{} 超出速率限制 ({} 次/{} 秒)", key, limit.max_requests, limit.window_secs);
                    Ok(req.into_response(too_many_requests(retry_after).map_into_right_body()))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!((login.max_requests, login.window_secs), (5, 60));
        assert_eq!(login.key("ip:127.0.0.1"), "login:ip:127.0.0.1");
        assert_eq!(RateLimit::refresh_token().max_requests, 10);
    }

    #[tokio::test]
    async fn test_window_blocks_after_limit() {
        let limit = RateLimit::new("unit-test", 2, 60);
        let key = limit.key("ip:10.0.0.1");
        assert_eq!(limit.hit(key.clone()).await, Ok(1));
        assert_eq!(limit.hit(key.clone()).await, Ok(0));
        assert_eq!(limit.hit(key.clone()).await, Err(60));
        // 不同键互不影响
        assert_eq!(limit.hit(limit.key("ip:10.0.0.2")).await, Ok(1));
    }

    #[test]
    fn test_forwarded_header_used_when_peer_missing() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
            .to_srv_request();
        assert_eq!(client_ip(&req), "203.0.113.7");
    }
}
