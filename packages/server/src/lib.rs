pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dental Clinic CMS API",
        version = "1.0.0",
        description = "Content management API behind the clinic's marketing site and admin dashboard"
    ),
    paths(
        handlers::page::get_page,
        handlers::page::create_page,
        handlers::page::update_page,
        handlers::page::delete_page,
        handlers::service::list_services,
        handlers::service::create_service,
        handlers::service::update_service,
        handlers::service::delete_service,
        handlers::team::list_team_members,
        handlers::team::create_team_member,
        handlers::team::update_team_member,
        handlers::team::delete_team_member,
        handlers::technology::list_technologies,
        handlers::technology::create_technology,
        handlers::technology::update_technology,
        handlers::technology::delete_technology,
    ),
    tags(
        (name = "Pages", description = "Singleton page content: homepage settings and informational pages"),
        (name = "Services", description = "Clinic services"),
        (name = "Team", description = "Team roster"),
        (name = "Technology", description = "Technology showcase"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let allow_origin = if cfg.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allow_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring unparseable CORS origin {origin:?}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(cfg.max_age))
}
