use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use loadlab_types::api::{EndpointIndex, HealthResponse, ServiceDescriptor};

use crate::error::ApiError;
use crate::{AppState, run_blocking};

pub async fn root() -> impl IntoResponse {
    Json(ServiceDescriptor {
        message: "Welcome to the Loadlab profiling demo".into(),
        endpoints: EndpointIndex {
            health: "/health".into(),
            users: "/users/".into(),
            posts: "/posts/".into(),
            compute_fibonacci: "/compute/fibonacci/{n}".into(),
            compute_sum: "/compute/sum/{n}".into(),
        },
    })
}

/// Health probe with a real connectivity test against the store.
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    run_blocking(move || {
        db.health_check()
            .map_err(|e| ApiError::StoreUnavailable(e.to_string()))
    })
    .await?;

    Ok(Json(HealthResponse {
        status: "healthy".into(),
        database: "connected".into(),
    }))
}
