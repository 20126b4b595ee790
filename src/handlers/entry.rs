use crate::models::*;
use crate::services::EntryService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/entries",
    tag = "entry",
    request_body = CreateEntryRequest,
    responses(
        (status = 200, description = "登记成功", body = EntryResponse),
        (status = 400, description = "请求参数错误"),
        (status = 500, description = "存储失败")
    )
)]
/// 前台抽奖结束后保存一条记录
pub async fn save_entry(
    entry_service: web::Data<EntryService>,
    request: web::Json<CreateEntryRequest>,
) -> Result<HttpResponse> {
    match entry_service.save_entry(request.into_inner()).await {
        Ok(entry) => Ok(HttpResponse::Ok().json(ApiResponse::success(entry))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/entries/today/count",
    tag = "entry",
    responses(
        (status = 200, description = "今日记录数；查询失败时为 0", body = TodayCountResponse)
    )
)]
pub async fn get_today_count(entry_service: web::Data<EntryService>) -> Result<HttpResponse> {
    let count = entry_service.get_today_count().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(TodayCountResponse { count })))
}

#[utoipa::path(
    get,
    path = "/admin/entries",
    tag = "admin",
    params(
        ("page" = Option<i64>, Query, description = "页码，从 1 开始"),
        ("page_size" = Option<i64>, Query, description = "每页数量 (默认 20)"),
        ("search" = Option<String>, Query, description = "用户名模糊搜索"),
        ("amount" = Option<String>, Query, description = "金额精确筛选，all 表示全部"),
        ("date_from" = Option<String>, Query, description = "开始时间（含）"),
        ("date_to" = Option<String>, Query, description = "结束时间（含）")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "分页记录", body = PaginatedEntries),
        (status = 400, description = "日期格式错误"),
        (status = 401, description = "未授权"),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn get_entries_paged(
    entry_service: web::Data<EntryService>,
    query: web::Query<EntryQuery>,
) -> Result<HttpResponse> {
    match entry_service.get_entries_paged(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/entries/all",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部记录，按时间倒序", body = [EntryResponse]),
        (status = 401, description = "未授权"),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn get_entries(entry_service: web::Data<EntryService>) -> Result<HttpResponse> {
    match entry_service.get_entries().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/entries/today",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "今日记录", body = [EntryResponse]),
        (status = 401, description = "未授权"),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn get_today_entries(entry_service: web::Data<EntryService>) -> Result<HttpResponse> {
    match entry_service.get_today_entries().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/entries/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "记录 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已删除（记录不存在同样返回成功）", body = DeleteEntryResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn delete_entry(
    entry_service: web::Data<EntryService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    match entry_service.delete_entry(&id).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(ApiResponse::success(DeleteEntryResponse {
            deleted,
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/entries",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已清空全部记录", body = DeleteEntryResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn clear_all_entries(entry_service: web::Data<EntryService>) -> Result<HttpResponse> {
    match entry_service.clear_all_entries().await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            DeleteEntryResponse { deleted },
            "已清空全部记录",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 前台公开接口
pub fn entry_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/entries")
            .route("", web::post().to(save_entry))
            .route("/today/count", web::get().to(get_today_count)),
    );
}

/// 后台接口，挂在 /admin 下
pub fn admin_entry_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/entries")
            .route("", web::get().to(get_entries_paged))
            .route("", web::delete().to(clear_all_entries))
            .route("/all", web::get().to(get_entries))
            .route("/today", web::get().to(get_today_entries))
            .route("/{id}", web::delete().to(delete_entry)),
    );
}

#[cfg(test)]
mod tests {
    use crate::test_support::{FakeAuthProvider, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn provider() -> Arc<FakeAuthProvider> {
        Arc::new(
            FakeAuthProvider::new()
                .with_user("boss@example.com", "pw-boss")
                .with_user("guest@example.com", "pw-guest"),
        )
    }

    fn entry(id: &str, username: &str, amount: &str, hours_ago: i64) -> Value {
        json!({
            "id": id,
            "timestamp": (Utc::now() - Duration::hours(hours_ago)).to_rfc3339(),
            "username": username,
            "amount": amount,
            "image": "",
            "prize": 88.0
        })
    }

    #[actix_web::test]
    async fn test_public_save_and_today_count() {
        let app = test::init_service(test_app(provider(), &["boss@example.com"]).await).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/entries")
            .set_json(entry("e1", "Anna", "500", 0))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "e1");

        let req = test::TestRequest::get()
            .uri("/api/v1/entries/today/count")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["count"], 1);
    }

    #[actix_web::test]
    async fn test_save_rejects_bad_timestamp() {
        let app = test::init_service(test_app(provider(), &[]).await).await;

        let mut payload = entry("e1", "Anna", "500", 0);
        payload["timestamp"] = json!("yesterday");
        let req = test::TestRequest::post()
            .uri("/api/v1/entries")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_admin_entries_require_token() {
        let app = test::init_service(test_app(provider(), &["boss@example.com"]).await).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/entries")
            .to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_admin_entries_reject_non_admin() {
        let p = provider();
        let guest = p.open_session("guest@example.com");
        let app = test::init_service(test_app(p, &["boss@example.com"]).await).await;

        let req = test::TestRequest::delete()
            .uri("/api/v1/admin/entries")
            .insert_header(("Authorization", format!("Bearer {guest}")))
            .to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_admin_paged_filter_and_delete() {
        let p = provider();
        let boss = p.open_session("boss@example.com");
        let app = test::init_service(test_app(p, &["boss@example.com"]).await).await;
        let auth = ("Authorization", format!("Bearer {boss}"));

        for payload in [
            entry("a", "Anna", "500", 3),
            entry("b", "Joanna", "1000", 2),
            entry("c", "Bob", "500", 1),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/entries")
                .set_json(payload)
                .to_request();
            assert!(test::call_service(&app, req).await.status().is_success());
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/entries?search=ANNA&page_size=1")
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["total_pages"], 2);
        assert_eq!(body["data"]["data"][0]["id"], "b");

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/entries?amount=500")
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["data"][0]["id"], "c");

        let req = test::TestRequest::delete()
            .uri("/api/v1/admin/entries/c")
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["deleted"], true);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/entries/all")
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);

        let req = test::TestRequest::delete()
            .uri("/api/v1/admin/entries")
            .insert_header(auth.clone())
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/entries/today")
            .insert_header(auth)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_admin_paged_rejects_bad_date() {
        let p = provider();
        let boss = p.open_session("boss@example.com");
        let app = test::init_service(test_app(p, &["boss@example.com"]).await).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/entries?date_from=not-a-date")
            .insert_header(("Authorization", format!("Bearer {boss}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
