use axum::{
    Router,
    routing::{get, put},
};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/pages", page_routes())
        .nest("/services", service_routes())
        .nest("/team", team_routes())
        .nest("/technologies", technology_routes())
        .layer(handlers::upload::multipart_body_limit())
}

fn page_routes() -> Router<AppState> {
    Router::new().route(
        "/{kind}",
        get(handlers::page::get_page)
            .post(handlers::page::create_page)
            .put(handlers::page::update_page)
            .delete(handlers::page::delete_page),
    )
}

fn service_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::service::list_services).post(handlers::service::create_service),
        )
        .route(
            "/{id}",
            put(handlers::service::update_service).delete(handlers::service::delete_service),
        )
}

fn team_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::team::list_team_members).post(handlers::team::create_team_member),
        )
        .route(
            "/{id}",
            put(handlers::team::update_team_member).delete(handlers::team::delete_team_member),
        )
}

fn technology_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::technology::list_technologies)
                .post(handlers::technology::create_technology),
        )
        .route(
            "/{id}",
            put(handlers::technology::update_technology)
                .delete(handlers::technology::delete_technology),
        )
}
