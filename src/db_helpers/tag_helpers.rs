use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::errors::RequestError;

use super::now_ms;

// Tags are a dedup ledger: created on first use, never deleted.
pub(super) async fn ensure_tag(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
) -> Result<i64, RequestError> {
    let tag_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO tags (name, created_at)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = $1
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(now_ms())
    .fetch_one(&mut *tx)
    .await?;
    Ok(tag_id)
}

pub async fn add_tag_in_db(pool: &SqlitePool, name: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    ensure_tag(&mut tx, name).await?;
    tx.commit().await?;
    Ok(())
}
