//! HTTP interface layer - axum router, shared state, and error mapping.
//!
//! Handlers stay thin: they authenticate, authorize, delegate to `core`, and
//! serialize the result. All business rules live in `core`; this module owns
//! the mapping from [`Error`] variants to HTTP status codes.

/// Bearer-token authentication extractor and role checks
pub mod auth;
/// Expense CRUD and status transition handlers
pub mod expenses;
/// Market duty request/assignment/approval handlers
pub mod market;
/// Meal and guest-meal handlers
pub mod meals;
/// Member administration handlers
pub mod members;
/// Notification handlers
pub mod notifications;
/// Monthly ledger, settlement, and invoice handlers
pub mod summary;

use crate::cache::MemberCache;
use crate::errors::{Error, Result};
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection for all store operations
    pub db: DatabaseConnection,
    /// Process-local member-list cache
    pub members: MemberCache,
}

impl AppState {
    /// Creates the shared state with a fresh member cache.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            members: MemberCache::default(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::InvalidAmount { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/summary/:month", get(summary::get_month_summary))
        .route("/api/summary/:month/payment", put(summary::put_payment))
        .route(
            "/api/summary/:month/admin-expenses",
            get(summary::get_admin_expenses),
        )
        .route(
            "/api/summary/:month/invoice/:member_id",
            get(summary::get_invoice),
        )
        .route(
            "/api/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/api/expenses/:id",
            put(expenses::update_expense).delete(expenses::delete_expense),
        )
        .route("/api/meals", get(meals::list_meals).post(meals::create_meal))
        .route("/api/meals/guest", post(meals::create_guest_meal))
        .route("/api/meals/:id", axum::routing::delete(meals::delete_meal))
        .route("/api/market", get(market::list_duties).post(market::create_duty))
        .route(
            "/api/market/id/:id",
            put(market::decide_duty).delete(market::withdraw_duty),
        )
        .route(
            "/api/members",
            get(members::list_members).post(members::create_member),
        )
        .route("/api/members/:id", put(members::update_member))
        .route(
            "/api/notifications",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/api/notifications/:id/read", put(notifications::mark_read))
        .route("/api/notifications/:id/paid", put(notifications::mark_paid))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the listener and serves the API until the process exits.
pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {bind_addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
