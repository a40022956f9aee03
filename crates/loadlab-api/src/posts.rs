use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::info;

use loadlab_types::api::CreatePostRequest;
use loadlab_types::models::Post;

use crate::error::ApiError;
use crate::{AppState, Pagination, parse_timestamp, run_blocking, to_user};

pub async fn create_post_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&req)?;

    let db = state.db.clone();
    let (row, owner) = run_blocking(move || {
        let owner = db
            .get_user(user_id)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        // The foreign key rejects the narrow window where the owner is
        // deleted between this check and the insert.
        let row = db
            .create_post(&req.title, &req.content, req.is_published, user_id)
            .map_err(|e| {
                if e.is_foreign_key_violation() {
                    ApiError::NotFound("User not found".into())
                } else {
                    e.into()
                }
            })?;
        Ok((row, owner))
    })
    .await?;

    info!("Created post {} for user {}", row.id, user_id);
    let created_at = parse_timestamp(&row.created_at, row.id);
    let post = Post {
        id: row.id,
        title: row.title,
        content: row.content,
        is_published: row.is_published,
        created_at,
        owner_id: row.owner_id,
        owner: to_user(owner),
    };
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let rows =
        run_blocking(move || Ok(db.list_posts(i64::from(page.skip), i64::from(page.limit))?))
            .await?;

    let posts: Vec<Post> = rows
        .into_iter()
        .map(|row| {
            let created_at = parse_timestamp(&row.post.created_at, row.post.id);
            Post {
                id: row.post.id,
                title: row.post.title,
                content: row.post.content,
                is_published: row.post.is_published,
                created_at,
                owner_id: row.post.owner_id,
                owner: to_user(row.owner),
            }
        })
        .collect();

    Ok(Json(posts))
}

fn validate(req: &CreatePostRequest) -> Result<(), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be empty".into()));
    }
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("content must not be empty".into()));
    }
    Ok(())
}
