use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::external::{AuthSession, AuthUser};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    #[schema(example = "example@domain.com")]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: String,
    pub email: Option<String>,
}

impl From<AuthUser> for AdminUserResponse {
    fn from(u: AuthUser) -> Self {
        AdminUserResponse {
            id: u.id,
            email: u.email,
        }
    }
}

/// 登录成功：返回认证服务会话与跳转目标
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminLoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AdminUserResponse,
    #[schema(example = "/admin/dashboard")]
    pub redirect: String,
}

impl AdminLoginResponse {
    pub fn new(session: AuthSession, redirect: &str) -> Self {
        AdminLoginResponse {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            token_type: session.token_type,
            expires_in: session.expires_in,
            user: session.user.into(),
            redirect: redirect.to_string(),
        }
    }
}

/// 进入登录页时的会话检查结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionCheckResponse {
    /// 已登录且有管理员权限
    pub authenticated: bool,
    pub email: Option<String>,
    /// 需要跳转的路由；None 表示停留在登录表单
    pub redirect: Option<String>,
    /// 返回首页链接
    #[schema(example = "/")]
    pub home: String,
}
