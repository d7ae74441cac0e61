use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use http::{header, HeaderValue, Method};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::web::middleware::auth::{optional_auth, require_auth};
use crate::web::routes::{auth, system, trash_cans, users, ws};

/// Upper bound for multipart bodies; a little above the image limit so the
/// form fields around the file still fit.
pub const UPLOAD_BODY_LIMIT: usize = 12 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = api_routes(&state);

    let uploads = ServeDir::new(&state.config.uploads_root);
    let static_dir = Path::new(&state.config.static_dir);
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .fallback_service(spa)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/test", get(system::test_handler))
        .route("/users/register", post(auth::register_handler))
        .route("/users/login", post(auth::login_handler))
        .route("/users/logout", post(auth::logout_handler))
        .route("/trashcans/nearby", get(trash_cans::nearby_handler))
        .route("/ws", get(ws::ws_handler));

    // Detail is public but shows the caller's own reaction when logged in.
    let viewer_routes = Router::new()
        .route("/trashcans/:id", get(trash_cans::detail_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let protected_routes = Router::new()
        .route("/users/me", get(users::me_handler))
        .route("/users/me/trashcans", get(users::my_trash_cans_handler))
        .route(
            "/trashcans",
            post(trash_cans::create_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/trashcans/:id",
            put(trash_cans::update_handler)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .delete(trash_cans::delete_handler),
        )
        .route("/trashcans/:id/like", post(trash_cans::like_handler))
        .route("/trashcans/:id/dislike", post(trash_cans::dislike_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(viewer_routes)
        .merge(protected_routes)
        .fallback(system::api_not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
