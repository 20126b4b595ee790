use crate::error::AppError;
use crate::external::AuthProvider;
use crate::utils::{AdminAllowlist, JwtService};
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

/// 通过鉴权的管理员，由中间件写入请求扩展
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: String,
}

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            // 完全匹配的公开路径
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/v1/admin/session",
                "/api/v1/admin/login",
            ],
            // 前缀匹配的公开路径（前台登记与今日计数）
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/v1/entries"],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

/// 从 `Authorization: Bearer <token>` 中取出令牌
pub fn bearer_token(headers: &actix_web::http::header::HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// 后台接口鉴权：先本地校验 JWT，再向认证服务确认会话仍然有效（已登出的令牌被拒绝），
/// 最后按白名单判断管理员权限。
pub struct AuthMiddleware {
    jwt_service: JwtService,
    allowlist: Arc<AdminAllowlist>,
    provider: Arc<dyn AuthProvider>,
}

impl AuthMiddleware {
    pub fn new(
        jwt_service: JwtService,
        allowlist: Arc<AdminAllowlist>,
        provider: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            jwt_service,
            allowlist,
            provider,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: self.jwt_service.clone(),
            allowlist: self.allowlist.clone(),
            provider: self.provider.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: JwtService,
    allowlist: Arc<AdminAllowlist>,
    provider: Arc<dyn AuthProvider>,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_paths.is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let Some(token) = bearer_token(req.headers()).map(str::to_string) else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        let claims = match self.jwt_service.verify_access_token(&token) {
            Ok(claims) => claims,
            Err(_) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                return Box::pin(async move { Err(error.into()) });
            }
        };

        let service = self.service.clone();
        let provider = self.provider.clone();
        let allowlist = self.allowlist.clone();

        Box::pin(async move {
            // 登出后令牌在过期前仍能通过本地校验，需由认证服务确认
            let user = match provider.get_user(&token).await {
                Ok(Some(user)) if user.id == claims.sub => user,
                Ok(_) => {
                    log::warn!("Session for user {} is no longer active", claims.sub);
                    return Err(AppError::AuthError("Session expired".to_string()).into());
                }
                Err(e) => return Err(e.into()),
            };

            if !allowlist.permits(user.email.as_deref()) {
                log::warn!("Rejected non-admin user {} on {}", user.id, req.path());
                return Err(AppError::PermissionDenied.into());
            }

            req.extensions_mut().insert(AdminIdentity {
                user_id: user.id,
                email: user.email,
                access_token: token,
            });
            service.call(req).await
        })
    }
}
