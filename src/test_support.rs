//! 测试用的内存数据库与认证服务

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

use crate::entities::entry_entity;
use crate::error::{AppError, AppResult};
use crate::external::{AuthProvider, AuthSession, AuthUser};
use crate::handlers;
use crate::middlewares::AuthMiddleware;
use crate::services::{AdminAuthService, EntryService};
use crate::utils::jwt::sign_test_token;
use crate::utils::{AdminAllowlist, JwtService};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// 内存 SQLite，按实体建表
pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(entry_entity::Entity)))
        .await
        .unwrap();

    db
}

/// 与 main 相同的路由与中间件，数据库换成内存 SQLite
pub async fn test_app(
    provider: Arc<FakeAuthProvider>,
    admins: &'static [&'static str],
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let allowlist = Arc::new(AdminAllowlist::new(admins.iter().copied()));
    let provider: Arc<dyn AuthProvider> = provider;
    let admin_auth_service = AdminAuthService::new(provider.clone(), allowlist.clone());
    let entry_service = EntryService::new(memory_db().await);

    App::new()
        .wrap(AuthMiddleware::new(
            JwtService::new(TEST_JWT_SECRET),
            allowlist,
            provider,
        ))
        .app_data(web::Data::new(admin_auth_service))
        .app_data(web::Data::new(entry_service))
        .service(
            web::scope("/api/v1")
                .configure(handlers::entry_config)
                .configure(handlers::admin_config),
        )
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Normal,
    /// 拒绝登录且不给出原因
    SilentReject,
    /// 模拟网络故障
    Unavailable,
}

pub struct FakeAuthProvider {
    accounts: HashMap<String, (String, AuthUser)>,
    sessions: Mutex<HashMap<String, AuthUser>>,
    sign_out_calls: AtomicUsize,
    mode: Mode,
}

impl FakeAuthProvider {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            sessions: Mutex::new(HashMap::new()),
            sign_out_calls: AtomicUsize::new(0),
            mode: Mode::Normal,
        }
    }

    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        let user = AuthUser {
            id: format!("uid-{email}"),
            email: Some(email.to_string()),
        };
        self.accounts
            .insert(email.to_string(), (password.to_string(), user));
        self
    }

    pub fn with_emailless_user(mut self, login: &str, password: &str) -> Self {
        let user = AuthUser {
            id: format!("uid-{login}"),
            email: None,
        };
        self.accounts
            .insert(login.to_string(), (password.to_string(), user));
        self
    }

    pub fn rejecting_silently(mut self) -> Self {
        self.mode = Mode::SilentReject;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.mode = Mode::Unavailable;
        self
    }

    /// 直接为某个账号建立会话，返回 access token
    pub fn open_session(&self, login: &str) -> String {
        let (_, user) = self.accounts.get(login).expect("unknown test account");
        self.issue(user.clone())
    }

    pub fn is_active(&self, token: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(token)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    fn issue(&self, user: AuthUser) -> String {
        let token = sign_test_token(TEST_JWT_SECRET, &user.id, user.email.as_deref(), 3600);
        self.sessions.lock().unwrap().insert(token.clone(), user);
        token
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn get_user(&self, access_token: &str) -> AppResult<Option<AuthUser>> {
        if self.mode == Mode::Unavailable {
            return Err(AppError::ExternalApiError("connection refused".into()));
        }
        Ok(self.sessions.lock().unwrap().get(access_token).cloned())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        match self.mode {
            Mode::Unavailable => {
                return Err(AppError::ExternalApiError("connection refused".into()));
            }
            Mode::SilentReject => return Err(AppError::AuthError(String::new())),
            Mode::Normal => {}
        }

        let user = match self.accounts.get(email) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => return Err(AppError::AuthError("Invalid login credentials".into())),
        };

        let access_token = self.issue(user.clone());
        Ok(AuthSession {
            access_token,
            refresh_token: format!("refresh-{}", user.id),
            expires_in: 3600,
            token_type: "bearer".into(),
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.sessions.lock().unwrap().remove(access_token);
        Ok(())
    }
}
