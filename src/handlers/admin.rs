use crate::error::AppError;
use crate::handlers::entry::admin_entry_config;
use crate::middlewares::{AdminIdentity, bearer_token};
use crate::models::*;
use crate::services::{
    AdminAuthService, AuthOutcome, DASHBOARD_ROUTE, HOME_ROUTE, SessionCheck,
};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/admin/session",
    tag = "admin",
    security(
        (),
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "会话检查结果；redirect 非空表示直接进入后台", body = SessionCheckResponse)
    )
)]
/// 进入登录页时检查已有会话。
/// 已登录且有管理员权限时返回 redirect，否则停留在登录表单；不会返回错误。
pub async fn check_session(
    service: web::Data<AdminAuthService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let check = service
        .check_existing_session(bearer_token(req.headers()))
        .await;

    let email = match &check {
        SessionCheck::Redirect(user) => user.email.clone(),
        SessionCheck::ShowLogin => None,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(SessionCheckResponse {
        authenticated: check.redirect().is_some(),
        email,
        redirect: check.redirect().map(str::to_string),
        home: HOME_ROUTE.to_string(),
    })))
}

#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "admin",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "登入成功", body = AdminLoginResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "认证失败"),
        (status = 403, description = "此帳號無管理員權限")
    )
)]
/// 管理员登录：认证并校验白名单，无权限的会话在返回前即被注销
pub async fn login(
    service: web::Data<AdminAuthService>,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse> {
    match service.login(&request).await {
        Ok(AuthOutcome::Authorized(session)) => Ok(HttpResponse::Ok().json(
            ApiResponse::success(AdminLoginResponse::new(session, DASHBOARD_ROUTE)),
        )),
        Ok(AuthOutcome::Unauthorized) => Ok(AppError::PermissionDenied.error_response()),
        Ok(AuthOutcome::AuthFailed(reason)) => Ok(AppError::AuthError(reason).error_response()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已登出"),
        (status = 401, description = "未授权")
    )
)]
pub async fn logout(
    service: web::Data<AdminAuthService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(identity) = req.extensions().get::<AdminIdentity>().cloned() else {
        return Ok(AppError::AuthError("Missing access token".to_string()).error_response());
    };

    match service.sign_out(&identity.access_token).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            serde_json::json!({ "redirect": HOME_ROUTE }),
            "已登出",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/session", web::get().to(check_session))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .configure(admin_entry_config),
    );
}
