pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, payments::StripeGateway, service::ServiceContext};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    stripe_gateway: Option<Arc<StripeGateway>>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, stripe_gateway, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        // Public artist surface
        .route("/api/categories", get(handlers::categories::list))
        .route("/api/artists/apply", post(handlers::artists::apply))
        .route("/api/artists/:id/profile", get(handlers::artists::profile))
        .route(
            "/api/reviews/artist/:artist_id",
            get(handlers::reviews::list_by_artist),
        )
        // Stripe webhook (no auth; signature-verified)
        .route(
            "/webhooks/stripe",
            post(handlers::payments::stripe_webhook),
        )
        // Authenticated API routes
        .nest("/api", api_routes(app_state.clone()))
        // Admin routes
        .nest("/admin", admin_routes(app_state.clone()))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/bookings", booking_routes())
        .nest("/payments", payment_routes())
        .nest("/reviews", review_routes())
        .nest("/notifications", notification_routes())
        .nest("/chat", chat_routes())
        .route("/artists/:id/performance", get(handlers::artists::performance))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::bookings::create))
        .route("/", get(handlers::bookings::list))
        .route("/:id", get(handlers::bookings::get))
        .route("/:id/status", patch(handlers::bookings::update_status))
        .route("/:id/accept", post(handlers::bookings::accept))
        .route("/:id/decline", post(handlers::bookings::decline))
        .route("/:id/review", post(handlers::bookings::submit_for_review))
        .route("/:id/complete", post(handlers::bookings::complete))
        .route("/:id/revision", post(handlers::bookings::request_revision))
        .route("/:id/cancel", post(handlers::bookings::cancel))
        .route("/:id/revisions", get(handlers::bookings::list_revisions))
        .route("/:id/quote", post(handlers::bookings::set_quote))
        .route("/:id/quote/approve", post(handlers::bookings::approve_quote))
        .route("/:id/dispute", post(handlers::bookings::open_dispute))
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::payments::create))
        .route("/", get(handlers::payments::list))
        .route("/:id", get(handlers::payments::get))
        .route("/:id/verify", post(handlers::payments::verify))
}

fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::reviews::create))
        .route("/:id", get(handlers::reviews::get))
        .route("/:id", put(handlers::reviews::update))
        .route("/:id", delete(handlers::reviews::delete))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::notifications::list))
        .route("/:id/read", post(handlers::notifications::mark_read))
        .route("/read-all", post(handlers::notifications::mark_all_read))
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/channels", get(handlers::chat::list_channels))
        .route("/channels/:id/messages", get(handlers::chat::list_messages))
        .route("/channels/:id/messages", post(handlers::chat::send_message))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::admin::stats))
        .route("/users", get(handlers::admin::list_users))
        .route("/categories", post(handlers::categories::create))
        .route("/artists/pending", get(handlers::artists::list_pending))
        .route("/artists/:id/approve", post(handlers::artists::approve))
        .route("/artists/:id/reject", post(handlers::artists::reject))
        .route(
            "/bookings/:id/force-cancel",
            post(handlers::admin::force_cancel),
        )
        .route(
            "/bookings/:id/force-refund",
            post(handlers::admin::force_refund),
        )
        .route(
            "/bookings/:id/resolve-dispute",
            post(handlers::admin::resolve_dispute),
        )
        .route(
            "/reviews/:id/visibility",
            put(handlers::reviews::set_visibility),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
