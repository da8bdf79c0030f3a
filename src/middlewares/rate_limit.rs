/*!
 * 速率限制中间件
 *
 * 固定窗口计数，按 `前缀:IP` 或 `前缀:user:ID` 计数，超限返回 429。
 * 用于登录、注册、找回密码等容易被暴力尝试的端点。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{StatusCode, header},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 窗口计数缓存，条目闲置一小时后淘汰
static RATE_LIMIT_CACHE: Lazy<Cache<String, WindowCounter>> = Lazy::new(|| {
    Cache::builder()
        .time_to_idle(Duration::from_secs(3600))
        .max_capacity(100_000)
        .build()
});

/// 固定窗口内的请求数，被拒绝的请求同样计入
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    started: Instant,
    count: u32,
}

impl WindowCounter {
    /// 记录一次请求，窗口过期则重新开始
    fn record(previous: Option<Self>, now: Instant, window: Duration) -> Self {
        match previous {
            Some(c) if now.duration_since(c.started) < window => Self {
                count: c.count.saturating_add(1),
                ..c
            },
            _ => Self {
                started: now,
                count: 1,
            },
        }
    }

    /// 超过上限时返回需要等待的秒数，至少 1 秒
    fn retry_after(&self, now: Instant, window: Duration, max_requests: u32) -> Option<u64> {
        (self.count > max_requests).then(|| {
            window
                .saturating_sub(now.duration_since(self.started))
                .as_secs()
                .max(1)
        })
    }
}

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window: Duration,
    key_prefix: &'static str,
}

impl RateLimit {
    pub fn new(key_prefix: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            key_prefix,
        }
    }

    /// 5 次 / 分钟
    pub fn login() -> Self {
        Self::new("login", 5, 60)
    }

    /// 3 次 / 分钟
    pub fn register() -> Self {
        Self::new("register", 3, 60)
    }

    /// 3 次 / 5 分钟，同时限制了重置邮件的发送频率
    pub fn forgot_password() -> Self {
        Self::new("forgot_password", 3, 300)
    }

    pub fn reset_password() -> Self {
        Self::new("reset_password", 5, 300)
    }

    pub fn refresh_token() -> Self {
        Self::new("refresh", 10, 60)
    }

    /// 登录后的路由按用户计数
    pub fn file_upload() -> Self {
        Self::new("upload", 10, 60)
    }
}

/// 客户端 IP：连接地址，其次是代理写入的 X-Forwarded-For 首项和 X-Real-IP
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);

    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());
    let real_ip = req.headers().get("X-Real-IP").and_then(|v| v.to_str().ok());

    let parsed = connection_ip
        .as_deref()
        .into_iter()
        .chain(forwarded)
        .chain(real_ip)
        .map(str::trim)
        .find(|ip| ip.parse::<IpAddr>().is_ok())
        .map(str::to_string);

    parsed
        .or(connection_ip)
        .unwrap_or_else(|| "unknown".to_string())
}

fn too_many_requests(limit: &RateLimit, retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((header::RETRY_AFTER, retry_after.to_string()))
        .insert_header(("X-RateLimit-Limit", limit.max_requests.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
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

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            let user_id = req.extensions().get::<User>().map(|user| user.id);
            let identifier = user_id
                .map(|id| format!("user:{id}"))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));
            let cache_key = format!("{}:{}", limit.key_prefix, identifier);

            let now = Instant::now();
            let previous = RATE_LIMIT_CACHE.get(&cache_key).await;
            let counter = WindowCounter::record(previous, now, limit.window);
            RATE_LIMIT_CACHE.insert(cache_key.clone(), counter).await;

            if let Some(retry_after) = counter.retry_after(now, limit.window, limit.max_requests) {
                warn!(
                    "Rate limit exceeded for key: {} ({}/{})",
                    cache_key, counter.count, limit.max_requests
                );
                return Ok(req.into_response(
                    too_many_requests(&limit, retry_after).map_into_right_body(),
                ));
            }

            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window, Duration::from_secs(60));
        assert_eq!(login.key_prefix, "login");

        let forgot = RateLimit::forgot_password();
        assert_eq!(forgot.max_requests, 3);
        assert_eq!(forgot.window, Duration::from_secs(300));
    }

    #[test]
    fn test_window_counter() {
        let start = Instant::now();
        let window = Duration::from_secs(60);

        let c = WindowCounter::record(None, start, window);
        assert_eq!(c.count, 1);
        assert!(c.retry_after(start, window, 2).is_none());

        let c = WindowCounter::record(Some(c), start + Duration::from_secs(1), window);
        assert!(c.retry_after(start, window, 2).is_none());

        let at = start + Duration::from_secs(10);
        let c = WindowCounter::record(Some(c), at, window);
        assert_eq!(c.count, 3);
        assert_eq!(c.retry_after(at, window, 2), Some(50));

        // 窗口结束后重新计数
        let c = WindowCounter::record(Some(c), start + Duration::from_secs(61), window);
        assert_eq!(c.count, 1);
    }

    #[test]
    fn test_client_ip_skips_unparsable_values() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
            .to_srv_request();
        assert_eq!(extract_client_ip(&req), "203.0.113.7");

        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "not-an-ip"))
            .insert_header(("X-Real-IP", "192.0.2.9"))
            .to_srv_request();
        assert_eq!(extract_client_ip(&req), "192.0.2.9");
    }
}
