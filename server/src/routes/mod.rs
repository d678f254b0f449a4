use axum::{
    body::Body,
    http::Request,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{auth, chat, engagement, events, health_check};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/signout", post(auth::sign_out))
        .route("/password-reset", post(auth::password_reset))
        .route("/me", get(auth::me));

    let event_routes = Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route("/trending", get(events::trending_events))
        .route("/:id", get(events::get_event))
        .route("/:id/vote", post(engagement::vote))
        .route("/:id/rsvp", put(engagement::rsvp));

    let chat_routes = Router::new().route(
        "/",
        get(chat::transcript)
            .post(chat::send_message)
            .delete(chat::reset),
    );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/events", event_routes)
        .nest("/chat", chat_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                // user_id is filled in once the bearer token resolves
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
}
