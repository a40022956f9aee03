use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;

use loadlab_types::api::{CreateUserRequest, MessageResponse};
use loadlab_types::models::User;

use crate::error::ApiError;
use crate::{AppState, Pagination, run_blocking, to_user};

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&req)?;

    let db = state.db.clone();
    let row = run_blocking(move || {
        // Uniqueness pre-check; the UNIQUE index catches the race where a
        // concurrent create wins between check and insert.
        if db.get_user_by_email(&req.email)?.is_some() {
            return Err(ApiError::Conflict("Email already registered".into()));
        }
        db.create_user(&req.email, &req.full_name, req.is_active)
            .map_err(|e| {
                if e.is_unique_violation() {
                    ApiError::Conflict("Email already registered".into())
                } else {
                    e.into()
                }
            })
    })
    .await?;

    info!("Created user {} ({})", row.id, row.email);
    Ok((StatusCode::CREATED, Json(to_user(row))))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let rows =
        run_blocking(move || Ok(db.list_users(i64::from(page.skip), i64::from(page.limit))?))
            .await?;

    let users: Vec<User> = rows.into_iter().map(to_user).collect();
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let row = run_blocking(move || Ok(db.get_user(id)?))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(to_user(row)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let deleted = run_blocking(move || Ok(db.delete_user(id)?)).await?;

    if !deleted {
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!("Deleted user {} and owned posts", id);
    Ok(Json(MessageResponse {
        message: "User deleted successfully".into(),
    }))
}

fn validate(req: &CreateUserRequest) -> Result<(), ApiError> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(ApiError::Validation(
            "email must be a valid address".into(),
        ));
    }
    if req.full_name.trim().is_empty() {
        return Err(ApiError::Validation("full_name must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate;
    use loadlab_types::api::CreateUserRequest;

    fn req(email: &str, full_name: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.into(),
            full_name: full_name.into(),
            is_active: true,
        }
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(validate(&req("", "A")).is_err());
        assert!(validate(&req("not-an-email", "A")).is_err());
        assert!(validate(&req("a@x.com", "  ")).is_err());
        assert!(validate(&req("a@x.com", "A")).is_ok());
    }
}
