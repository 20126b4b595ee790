use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::{AuthProvider, AuthSession, AuthUser};
use crate::models::AdminLoginRequest;
use crate::utils::{AdminAllowlist, validate_email};

/// 登录成功后的跳转目标
pub const DASHBOARD_ROUTE: &str = "/admin/dashboard";
/// 返回首页
pub const HOME_ROUTE: &str = "/";

pub const LOGIN_FAILED_MESSAGE: &str = "登入失敗，請稍後再試";
pub const NOT_ADMIN_MESSAGE: &str = "此帳號無管理員權限";

/// 进入登录页时的会话检查结果
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCheck {
    /// 已登录且在白名单内，直接进入后台
    Redirect(AuthUser),
    /// 停留在登录表单（未登录、无权限或查询失败）
    ShowLogin,
}

impl SessionCheck {
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            SessionCheck::Redirect(_) => Some(DASHBOARD_ROUTE),
            SessionCheck::ShowLogin => None,
        }
    }
}

/// 认证 + 授权的合并结果
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authorized(AuthSession),
    /// 凭据有效但不在白名单；会话已在返回前注销
    Unauthorized,
    /// 认证服务拒绝或不可用，附带可展示的原因
    AuthFailed(String),
}

#[derive(Clone)]
pub struct AdminAuthService {
    provider: Arc<dyn AuthProvider>,
    allowlist: Arc<AdminAllowlist>,
}

impl AdminAuthService {
    pub fn new(provider: Arc<dyn AuthProvider>, allowlist: Arc<AdminAllowlist>) -> Self {
        Self {
            provider,
            allowlist,
        }
    }

    /// 检查已有会话：已登录且有权限则跳转后台，否则停留在登录页。
    /// 查询失败不报错，只记录日志。
    pub async fn check_existing_session(&self, access_token: Option<&str>) -> SessionCheck {
        let Some(token) = access_token.filter(|t| !t.is_empty()) else {
            return SessionCheck::ShowLogin;
        };

        match self.provider.get_user(token).await {
            Ok(Some(user)) if self.allowlist.permits(user.email.as_deref()) => {
                SessionCheck::Redirect(user)
            }
            Ok(_) => SessionCheck::ShowLogin,
            Err(e) => {
                log::warn!("Session check failed: {e}");
                SessionCheck::ShowLogin
            }
        }
    }

    /// 登录表单提交：先校验输入，再认证并授权
    pub async fn login(&self, request: &AdminLoginRequest) -> AppResult<AuthOutcome> {
        let email = request.email.trim();
        validate_email(email)?;
        if request.password.is_empty() {
            return Err(AppError::ValidationError("請輸入密碼".to_string()));
        }

        Ok(self.authenticate(email, &request.password).await)
    }

    /// 认证并授权。
    ///
    /// 认证成功但邮箱不在白名单时，新建的会话在返回前即被注销，
    /// 调用方拿不到该会话的令牌。
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthOutcome {
        let session = match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(AppError::AuthError(message)) => {
                log::warn!("Admin sign-in rejected for {email}: {message}");
                let reason = if message.trim().is_empty() {
                    LOGIN_FAILED_MESSAGE.to_string()
                } else {
                    message
                };
                return AuthOutcome::AuthFailed(reason);
            }
            Err(e) => {
                log::error!("Admin sign-in failed for {email}: {e}");
                return AuthOutcome::AuthFailed(LOGIN_FAILED_MESSAGE.to_string());
            }
        };

        if !self.allowlist.permits(session.user.email.as_deref()) {
            log::warn!(
                "User {} ({:?}) is not an admin, revoking session",
                session.user.id,
                session.user.email
            );
            if let Err(e) = self.provider.sign_out(&session.access_token).await {
                log::error!("Failed to revoke non-admin session: {e}");
            }
            return AuthOutcome::Unauthorized;
        }

        log::info!("Admin {} signed in", session.user.id);
        AuthOutcome::Authorized(session)
    }

    pub async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.provider.sign_out(access_token).await
    }
}
