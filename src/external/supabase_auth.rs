use crate::config::SupabaseConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// 认证服务中的用户（只关心 id 与 email）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// 密码登录成功后认证服务返回的会话
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// 托管认证服务的调用约定。
///
/// 认证失败（凭据错误等）以 `AppError::AuthError(message)` 返回，message 为服务端原文，
/// 可能为空；网络或服务端异常以其它错误返回。
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 根据 access token 查询当前用户；令牌无效时返回 None
    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// 注销该令牌对应的会话
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// GoTrue 的错误响应有新旧两种格式，字段都可能缺失
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> String {
        [self.msg, self.error_description, self.message]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
            .unwrap_or_default()
    }
}

/// Supabase Auth (GoTrue) REST 客户端
#[derive(Clone)]
pub struct SupabaseAuthClient {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseAuthClient {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url.trim_end_matches('/'), path)
    }

    async fn error_message(response: reqwest::Response) -> String {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str::<GoTrueErrorBody>(&text)
            .map(GoTrueErrorBody::into_message)
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(Some(response.json::<AuthUser>().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            s => {
                let message = Self::error_message(response).await;
                Err(AppError::ExternalApiError(format!(
                    "Auth get_user failed: HTTP {}: {}",
                    s.as_u16(),
                    message
                )))
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let response = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let session = response.json::<AuthSession>().await?;
            log::info!("Auth provider sign-in succeeded for user {}", session.user.id);
            return Ok(session);
        }

        let message = Self::error_message(response).await;
        if status.is_client_error() {
            // 凭据错误 / 邮箱未验证等，原文返回给调用方展示
            Err(AppError::AuthError(message))
        } else {
            Err(AppError::ExternalApiError(format!(
                "Auth sign-in failed: HTTP {}: {}",
                status.as_u16(),
                message
            )))
        }
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        // 令牌已失效时视为已注销
        if status.is_success() || status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let message = Self::error_message(response).await;
        Err(AppError::ExternalApiError(format!(
            "Auth sign-out failed: HTTP {}: {}",
            status.as_u16(),
            message
        )))
    }
}
