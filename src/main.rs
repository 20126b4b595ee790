use actix_web::{App, HttpServer, middleware::Logger, web};
use env_logger::{Env, Target};
use std::io::Write;
use chrono::Local;
use std::sync::Arc;

use raffle_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{AuthProvider, SupabaseAuthClient},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::{AdminAllowlist, JwtService},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");
    config.validate().expect("Invalid configuration");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 本地校验认证服务签发的 access token
    let jwt_service = JwtService::new(&config.supabase.jwt_secret);

    // 管理员白名单只在启动时读取一次
    let allowlist = Arc::new(AdminAllowlist::new(config.admin.emails.iter()));
    if allowlist.is_empty() {
        log::warn!("ADMIN_EMAILS is empty: every signed-in user is treated as admin");
    } else {
        log::info!("Loaded {} admin email(s)", allowlist.len());
    }

    // 创建外部服务
    let auth_provider: Arc<dyn AuthProvider> =
        Arc::new(SupabaseAuthClient::new(config.supabase.clone()));

    // 创建服务
    let admin_auth_service = AdminAuthService::new(auth_provider.clone(), allowlist.clone());
    let entry_service = EntryService::new(pool);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(
                jwt_service.clone(),
                allowlist.clone(),
                auth_provider.clone(),
            ))
            .app_data(web::Data::new(admin_auth_service.clone()))
            .app_data(web::Data::new(entry_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::entry_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
