use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{PostRow, PostWithOwnerRow, UserRow};
use crate::{Database, Result};

impl Database {
    // -- Users --

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, full_name, is_active, created_at
                 FROM users WHERE email = ?1",
            )?;
            Ok(stmt.query_row([email], map_user).optional()?)
        })
    }

    /// Users in insertion order, window `[skip, skip+limit)`. No upper
    /// bound is enforced on `limit`.
    pub fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, full_name, is_active, created_at
                 FROM users ORDER BY id LIMIT ?2 OFFSET ?1",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![skip, limit], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Inserts and reads back the fully populated row (assigned id and
    /// server-set timestamp) on the same handle. The caller is expected
    /// to have pre-checked email uniqueness; the UNIQUE index is the
    /// backstop.
    pub fn create_user(&self, email: &str, full_name: &str, is_active: bool) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (email, full_name, is_active) VALUES (?1, ?2, ?3)",
                rusqlite::params![email, full_name, is_active],
            )?;
            let id = conn.last_insert_rowid();
            Ok(fetch_user(conn, id)?)
        })
    }

    /// Deletes the user and every post it owns in one transaction.
    /// Returns whether a user row was actually deleted.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM posts WHERE owner_id = ?1", [id])?;
            let deleted = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(deleted > 0)
        })
    }

    // -- Posts --

    /// Posts in insertion order, each joined with its owner in a single
    /// query. Same windowing semantics as `list_users`.
    pub fn list_posts(&self, skip: i64, limit: i64) -> Result<Vec<PostWithOwnerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.title, p.content, p.is_published, p.created_at, p.owner_id,
                        u.id, u.email, u.full_name, u.is_active, u.created_at
                 FROM posts p
                 JOIN users u ON p.owner_id = u.id
                 ORDER BY p.id LIMIT ?2 OFFSET ?1",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![skip, limit], |row| {
                    Ok(PostWithOwnerRow {
                        post: PostRow {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            content: row.get(2)?,
                            is_published: row.get(3)?,
                            created_at: row.get(4)?,
                            owner_id: row.get(5)?,
                        },
                        owner: UserRow {
                            id: row.get(6)?,
                            email: row.get(7)?,
                            full_name: row.get(8)?,
                            is_active: row.get(9)?,
                            created_at: row.get(10)?,
                        },
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Inserts a post bound to `owner_id`. The caller pre-checks that the
    /// owner exists; the foreign key rejects the narrow race where the
    /// owner vanished between check and insert.
    pub fn create_post(
        &self,
        title: &str,
        content: &str,
        is_published: bool,
        owner_id: i64,
    ) -> Result<PostRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (title, content, is_published, owner_id)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![title, content, is_published, owner_id],
            )?;
            let id = conn.last_insert_rowid();
            let row = conn.query_row(
                "SELECT id, title, content, is_published, created_at, owner_id
                 FROM posts WHERE id = ?1",
                [id],
                map_post,
            )?;
            Ok(row)
        })
    }

    // -- Health --

    /// Connectivity probe: one trivial query through the normal scoped
    /// acquisition path.
    pub fn health_check(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, full_name, is_active, created_at
         FROM users WHERE id = ?1",
    )?;
    Ok(stmt.query_row([id], map_user).optional()?)
}

fn fetch_user(conn: &Connection, id: i64) -> rusqlite::Result<UserRow> {
    conn.query_row(
        "SELECT id, email, full_name, is_active, created_at
         FROM users WHERE id = ?1",
        [id],
        map_user,
    )
}

fn map_user(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        is_active: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_post(row: &Row) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        is_published: row.get(3)?,
        created_at: row.get(4)?,
        owner_id: row.get(5)?,
    })
}
