/// Database row types — these map directly to SQLite rows.
/// Distinct from the loadlab-types API models to keep the DB layer
/// independent; timestamps stay as the raw text SQLite stores.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub created_at: String,
    pub owner_id: i64,
}

/// A post joined with its owning user in a single query.
#[derive(Debug, Clone)]
pub struct PostWithOwnerRow {
    pub post: PostRow,
    pub owner: UserRow,
}
