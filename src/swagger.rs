use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::entry::save_entry,
        handlers::entry::get_today_count,
        handlers::entry::get_entries_paged,
        handlers::entry::get_entries,
        handlers::entry::get_today_entries,
        handlers::entry::delete_entry,
        handlers::entry::clear_all_entries,
        handlers::admin::check_session,
        handlers::admin::login,
        handlers::admin::logout,
    ),
    components(
        schemas(
            CreateEntryRequest,
            EntryResponse,
            EntryQuery,
            TodayCountResponse,
            DeleteEntryResponse,
            PaginatedEntries,
            AdminLoginRequest,
            AdminLoginResponse,
            AdminUserResponse,
            SessionCheckResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "entry", description = "Public raffle entry API"),
        (name = "admin", description = "Admin session and entry management API"),
    ),
    info(
        title = "Raffle Backend API",
        version = "1.0.0",
        description = "Raffle entry store and admin console REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
