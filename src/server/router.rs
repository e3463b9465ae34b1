use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;

use super::{auth, records, sections, shifts, users};
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Records
        .route("/records", post(records::create_record))
        .route("/records", get(records::list_records))
        .route("/records/my-records", get(records::list_my_records))
        .route("/records/{id}", get(records::get_record))
        .route("/records/{id}", patch(records::update_record))
        .route("/records/{id}", delete(records::delete_record))
        // Sections
        .route("/sections", post(sections::create_section))
        .route("/sections", get(sections::list_sections))
        .route("/sections/{id}", get(sections::get_section))
        .route("/sections/{id}", patch(sections::update_section))
        .route("/sections/{id}", delete(sections::delete_section))
        // Shifts
        .route("/shifts", post(shifts::create_shift))
        .route("/shifts", get(shifts::list_shifts))
        .route("/shifts/{id}", get(shifts::get_shift))
        .route("/shifts/{id}", patch(shifts::update_shift))
        .route("/shifts/{id}", delete(shifts::delete_shift))
        // Users and roles
        .route("/roles", get(users::list_roles))
        .route("/users", post(users::create_user))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", patch(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
}

pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(cors_layer(allowed_origins))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
