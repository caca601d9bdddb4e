use sqlx::SqlitePool;

use crate::{
    auth::new_id,
    clock,
    models::{Banner, BannerDraft},
};

const BANNER_COLUMNS: &str =
    "id, title, description, image_url, link_url, priority, is_active, created_at, updated_at";

// Ties on both keys fall back to the id so repeated reads agree.
const BANNER_ORDER: &str = "ORDER BY priority DESC, created_at DESC, id";

pub async fn list(pool: &SqlitePool) -> Result<Vec<Banner>, sqlx::Error> {
    sqlx::query_as::<_, Banner>(&format!("SELECT {BANNER_COLUMNS} FROM banners {BANNER_ORDER}"))
        .fetch_all(pool)
        .await
}

pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Banner>, sqlx::Error> {
    sqlx::query_as::<_, Banner>(&format!(
        "SELECT {BANNER_COLUMNS} FROM banners WHERE is_active = 1 {BANNER_ORDER}"
    ))
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Banner>, sqlx::Error> {
    sqlx::query_as::<_, Banner>(&format!("SELECT {BANNER_COLUMNS} FROM banners WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &SqlitePool, draft: &BannerDraft) -> Result<Banner, sqlx::Error> {
    insert_at(pool, draft, &clock::now_timestamp()).await
}

async fn insert_at(
    pool: &SqlitePool,
    draft: &BannerDraft,
    created_at: &str,
) -> Result<Banner, sqlx::Error> {
    let id = new_id();
    sqlx::query(
        r#"INSERT INTO banners
           (id, title, description, image_url, link_url, priority, is_active, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(&draft.image_url)
    .bind(&draft.link_url)
    .bind(draft.priority)
    .bind(draft.is_active)
    .bind(created_at)
    .bind(created_at)
    .execute(pool)
    .await?;

    get(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    draft: &BannerDraft,
) -> Result<Option<Banner>, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE banners
           SET title = ?, description = ?, image_url = ?, link_url = ?, priority = ?, is_active = ?, updated_at = ?
           WHERE id = ?"#,
    )
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(&draft.image_url)
    .bind(&draft.link_url)
    .bind(draft.priority)
    .bind(draft.is_active)
    .bind(clock::now_timestamp())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM banners WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn draft(title: &str, priority: i64, is_active: bool) -> BannerDraft {
        BannerDraft {
            title: title.to_string(),
            description: None,
            image_url: Some("/uploads/banner.png".to_string()),
            link_url: None,
            priority,
            is_active,
        }
    }

    #[actix_web::test]
    async fn ordered_by_priority_then_recency() {
        let pool = test_support::pool().await;
        insert_at(&pool, &draft("low", 1, true), "2026-01-03T00:00:00Z").await.unwrap();
        insert_at(&pool, &draft("high-old", 5, true), "2026-01-01T00:00:00Z").await.unwrap();
        insert_at(&pool, &draft("high-new", 5, true), "2026-01-02T00:00:00Z").await.unwrap();
        insert_at(&pool, &draft("hidden", 9, false), "2026-01-04T00:00:00Z").await.unwrap();

        let all: Vec<_> = list(&pool).await.unwrap().into_iter().map(|b| b.title).collect();
        assert_eq!(all, vec!["hidden", "high-new", "high-old", "low"]);

        let active: Vec<_> = list_active(&pool).await.unwrap().into_iter().map(|b| b.title).collect();
        assert_eq!(active, vec!["high-new", "high-old", "low"]);
    }

    #[actix_web::test]
    async fn delete_removes_only_the_target() {
        let pool = test_support::pool().await;
        let first = insert(&pool, &draft("first", 1, true)).await.unwrap();
        let second = insert(&pool, &draft("second", 1, true)).await.unwrap();

        assert!(delete(&pool, &first.id).await.unwrap());
        let remaining = list(&pool).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
    }
}
