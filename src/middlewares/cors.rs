use actix_cors::Cors;

/// 前台页面与后台页面都由独立前端调用本服务
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["Location"])
        .max_age(3600)
}
