use log::*;
use sqlx::SqliteConnection;

use crate::db_types::User;

pub async fn fetch_user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM users WHERE id = $1"#).bind(id).fetch_optional(conn).await
}

pub async fn insert_user(name: &str, email: &str, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (name, email)
        VALUES ($1, $2)
        RETURNING *;
    "#,
    )
    .bind(name)
    .bind(email)
    .fetch_one(conn)
    .await?;
    debug!("📝️ New user #{} ({}) registered", user.id, user.email);
    Ok(user)
}
