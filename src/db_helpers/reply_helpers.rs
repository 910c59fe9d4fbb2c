use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::{CreateReplyRequest, UpdateReplyRequest};
use crate::errors::RequestError;
use crate::models::{Reply, ReplyRow};

use super::{generate_id, now_ms, QueryBuilder};

const REPLY_QUERY: &str = r#"
            SELECT replies.id              AS "id",
                   replies.question_id     AS "question_id",
                   replies.parent_reply_id AS "parent_reply_id",
                   replies.content         AS "content",
                   replies.author          AS "author",
                   replies.timestamp       AS "timestamp",
                   replies.upvotes         AS "upvotes"
            FROM   replies
            ORDER  BY replies.timestamp ASC
     "#;

const SINGLE_REPLY_QUERY: &str = r#"
            SELECT replies.id              AS "id",
                   replies.question_id     AS "question_id",
                   replies.parent_reply_id AS "parent_reply_id",
                   replies.content         AS "content",
                   replies.author          AS "author",
                   replies.timestamp       AS "timestamp",
                   replies.upvotes         AS "upvotes"
            FROM   replies
            WHERE  replies.id = $1
     "#;

pub async fn list_replies_in_db(pool: &SqlitePool) -> Result<Vec<Reply>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, ReplyRow>(REPLY_QUERY)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.into_iter().map(Reply::from).collect())
}

pub async fn get_reply_in_db(pool: &SqlitePool, id: &str) -> Result<Option<Reply>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, ReplyRow>(SINGLE_REPLY_QUERY)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.map(Reply::from))
}

pub async fn insert_reply_in_db(
    pool: &SqlitePool,
    question_id: &str,
    CreateReplyRequest {
        content,
        author,
        parent_reply_id,
    }: CreateReplyRequest,
) -> Result<Reply, RequestError> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<Sqlite, bool>("SELECT is_locked FROM questions WHERE id = $1")
        .bind(question_id)
        .fetch_optional(&mut tx)
        .await?;
    let locked = match locked {
        Some(locked) => locked,
        None => return Err(RequestError::NotFound),
    };
    if locked {
        return Err(RequestError::Locked);
    }

    let id = generate_id();
    let timestamp = now_ms();

    sqlx::query(
        r#"
        INSERT INTO replies (id, question_id, parent_reply_id, content, author, timestamp, upvotes)
        VALUES ($1, $2, $3, $4, $5, $6, 0)
        "#,
    )
    .bind(&id)
    .bind(question_id)
    .bind(parent_reply_id)
    .bind(content)
    .bind(author)
    .bind(timestamp)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;

    let result = get_reply_in_db(pool, &id)
        .await?
        .ok_or(RequestError::ServerError)?;

    Ok(result)
}

pub async fn update_reply_in_db(
    pool: &SqlitePool,
    id: &str,
    UpdateReplyRequest { content, author }: UpdateReplyRequest,
) -> Result<Reply, RequestError> {
    let mut tx = pool.begin().await?;

    let builder = QueryBuilder::new(String::from("UPDATE replies SET "), Some(", "))
        .add_param("content = ?", content)
        .add_param("author = ?", author);

    if !builder.is_empty() {
        let (query, params) = builder
            .trim()
            .add_param(" WHERE id = ?", Some(id.to_string()))
            .build();
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        let result = query.execute(&mut tx).await?;
        if result.rows_affected() == 0 {
            return Err(RequestError::NotFound);
        }
    }

    tx.commit().await?;

    let result = get_reply_in_db(pool, id)
        .await?
        .ok_or(RequestError::NotFound)?;

    Ok(result)
}

pub async fn delete_reply_in_db(pool: &SqlitePool, id: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM replies WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }

    // The cascade removes direct children only; grandchildren are left
    // behind as orphans.
    sqlx::query("DELETE FROM replies WHERE parent_reply_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn upvote_reply_in_db(pool: &SqlitePool, id: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("UPDATE replies SET upvotes = upvotes + 1 WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    tx.commit().await?;
    Ok(())
}
