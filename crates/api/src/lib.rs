pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let user_routes = Router::new()
        .route("/me", get(routes::user::me))
        .route("/me", put(routes::user::update_me));

    let item_routes = Router::new()
        .route("/", get(routes::item::list))
        .route("/", post(routes::item::create))
        .route("/expiring", get(routes::item::expiring))
        .route("/expired", get(routes::item::expired))
        .route("/low-stock", get(routes::item::low_stock))
        .route("/{item_id}", get(routes::item::get))
        .route("/{item_id}", put(routes::item::update))
        .route("/{item_id}", delete(routes::item::delete));

    let notification_routes = Router::new()
        .route("/", get(routes::notification::feed))
        .route("/preferences", get(routes::notification::get_preferences))
        .route("/preferences", put(routes::notification::update_preferences))
        .route("/test", post(routes::notification::send_test))
        .route("/read-all", put(routes::notification::mark_all_read))
        .route(
            "/{notification_id}/read",
            put(routes::notification::mark_read),
        );

    Router::new()
        .nest("/api/user", user_routes)
        .nest("/api/item", item_routes)
        .nest("/api/notification", notification_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
