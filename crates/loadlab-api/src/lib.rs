pub mod compute;
pub mod error;
pub mod posts;
pub mod system;
pub mod users;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, warn};

use loadlab_db::Database;
use loadlab_db::models::UserRow;
use loadlab_types::models::User;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

/// Builds the full route table. Middleware layers (CORS, tracing) are the
/// server binary's concern.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/users/", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user).delete(users::delete_user),
        )
        .route("/users/{id}/posts/", axum::routing::post(posts::create_post_for_user))
        .route("/posts/", get(posts::list_posts))
        .route("/compute/fibonacci/{n}", get(compute::fibonacci))
        .route("/compute/sum/{n}", get(compute::sum))
        .with_state(state)
}

/// Pagination query parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

/// Run one repository unit of work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.to_string())
    })?
}

pub(crate) fn to_user(row: UserRow) -> User {
    let created_at = parse_timestamp(&row.created_at, row.id);
    User {
        id: row.id,
        email: row.email,
        full_name: row.full_name,
        is_active: row.is_active,
        created_at,
    }
}

pub(crate) fn parse_timestamp(raw: &str, row_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on row {}: {}", raw, row_id, e);
            DateTime::default()
        })
}
