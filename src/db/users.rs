use sqlx::SqlitePool;

use crate::{auth::new_id, clock, models::{Profile, Role}};

pub struct NewProfile<'a> {
    pub username: &'a str,
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
}

pub async fn create_profile(pool: &SqlitePool, profile: NewProfile<'_>) -> Result<String, sqlx::Error> {
    let id = new_id();
    let now = clock::now_timestamp();
    sqlx::query(
        r#"INSERT INTO profiles (id, username, full_name, email, password_hash, active, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, 1, ?, ?)"#,
    )
    .bind(&id)
    .bind(profile.username)
    .bind(profile.full_name)
    .bind(profile.email)
    .bind(profile.password_hash)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn grant_role(pool: &SqlitePool, user_id: &str, role: Role) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO user_roles (id, user_id, role, created_at)
           VALUES (?, ?, ?, ?)
           ON CONFLICT(user_id, role) DO NOTHING"#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(role)
    .bind(clock::now_timestamp())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_active_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        r#"SELECT id, username, full_name, email, password_hash, active, created_at
           FROM profiles
           WHERE username = ? AND active = 1
           LIMIT 1"#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn roles_for(pool: &SqlitePool, user_id: &str) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = ? ORDER BY role")
        .bind(user_id)
        .fetch_all(pool)
        .await
}
