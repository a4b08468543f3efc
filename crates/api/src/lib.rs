pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me))
        .route("/role", get(routes::auth::role));

    let job_routes = Router::new()
        .route("/", get(routes::job::list).post(routes::job::create))
        .route("/summary", get(routes::job::summary))
        .route(
            "/{job_id}",
            get(routes::job::get)
                .put(routes::job::update)
                .delete(routes::job::delete),
        )
        .route("/{job_id}/paid", put(routes::job::mark_paid))
        .route("/{job_id}/completed", put(routes::job::mark_completed));

    let worker_routes = Router::new()
        .route("/", get(routes::worker::list).post(routes::worker::create))
        .route(
            "/{worker_id}",
            put(routes::worker::update).delete(routes::worker::delete),
        )
        .route("/{worker_id}/active", put(routes::worker::set_active));

    let invite_routes = Router::new()
        .route("/", get(routes::invite::list).post(routes::invite::issue))
        .route(
            "/{code}",
            get(routes::invite::history).delete(routes::invite::deactivate),
        );

    let profile_routes = Router::new().route("/{account_id}", put(routes::profile::assign));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/job", job_routes)
        .nest("/worker", worker_routes)
        .nest("/invite", invite_routes)
        .nest("/profile", profile_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if allowed.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
