// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{self, admin, auth, quiz},
    state::AppState,
    utils::token::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * `/api/auth`: open registration and login, plus `me` behind a session.
/// * `/api/questions/random` and `/api/quiz`: any logged-in user.
/// * `/api/questions` and `/api/users` CRUD: administrators only.
/// * Anything else falls through to a JSON 404.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
        HeaderValue::from_static("http://localhost:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let require_session = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route_layer(require_session.clone()),
        );

    let quiz_routes = Router::new()
        .route("/record", post(quiz::record_quiz))
        .route("/records", get(quiz::my_records))
        .route("/leaderboard", get(quiz::leaderboard))
        .route_layer(require_session.clone());

    let question_routes = Router::new()
        .route(
            "/",
            get(admin::list_questions).post(admin::create_question),
        )
        .route(
            "/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        // Double middleware protection: Auth first, then Admin check
        .route_layer(middleware::from_fn(admin_middleware))
        .merge(Router::new().route("/random", get(quiz::random_questions)))
        .route_layer(require_session.clone());

    let user_routes = Router::new()
        .route("/", get(admin::list_users).post(admin::create_user))
        .route(
            "/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(require_session);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/users", user_routes)
        .nest("/api/quiz", quiz_routes)
        .fallback(handlers::fallback)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
