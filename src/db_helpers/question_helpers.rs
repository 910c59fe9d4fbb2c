use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::data_formats::{CreateQuestionRequest, UpdateQuestionRequest};
use crate::errors::RequestError;
use crate::models::{Question, QuestionRow};

use super::tag_helpers::ensure_tag;
use super::{generate_id, now_ms, QueryBuilder};

const QUESTION_QUERY: &str = r#"
            SELECT questions.id          AS "id",
                   questions.content     AS "content",
                   questions.author      AS "author",
                   questions.timestamp   AS "timestamp",
                   questions.upvotes     AS "upvotes",
                   questions.is_pinned   AS "is_pinned",
                   questions.is_locked   AS "is_locked",
                   (SELECT Group_concat(tags.name, ',')
                    FROM   tags
                           JOIN question_tags
                             ON question_tags.tag_id = tags.id
                    WHERE  question_tags.question_id = questions.id) AS "tag_list"
            FROM   questions
            ORDER  BY questions.timestamp DESC
     "#;

const SINGLE_QUESTION_QUERY: &str = r#"
            SELECT questions.id          AS "id",
                   questions.content     AS "content",
                   questions.author      AS "author",
                   questions.timestamp   AS "timestamp",
                   questions.upvotes     AS "upvotes",
                   questions.is_pinned   AS "is_pinned",
                   questions.is_locked   AS "is_locked",
                   (SELECT Group_concat(tags.name, ',')
                    FROM   tags
                           JOIN question_tags
                             ON question_tags.tag_id = tags.id
                    WHERE  question_tags.question_id = questions.id) AS "tag_list"
            FROM   questions
            WHERE  questions.id = $1
     "#;

pub async fn list_questions_in_db(pool: &SqlitePool) -> Result<Vec<Question>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, QuestionRow>(QUESTION_QUERY)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.into_iter().map(Question::from).collect())
}

pub async fn get_question_in_db(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Question>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, QuestionRow>(SINGLE_QUESTION_QUERY)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result.map(Question::from))
}

pub async fn insert_question_in_db(
    pool: &SqlitePool,
    CreateQuestionRequest {
        content,
        author,
        tags,
    }: CreateQuestionRequest,
) -> Result<Question, RequestError> {
    let mut tx = pool.begin().await?;

    let id = generate_id();
    let timestamp = now_ms();

    sqlx::query(
        r#"
        INSERT INTO questions (id, content, author, timestamp, upvotes, is_pinned, is_locked)
        VALUES ($1, $2, $3, $4, 0, FALSE, FALSE)
        "#,
    )
    .bind(&id)
    .bind(content)
    .bind(author)
    .bind(timestamp)
    .execute(&mut tx)
    .await?;

    attach_tags(&mut tx, &id, &tags).await?;
    tx.commit().await?;

    let result = get_question_in_db(pool, &id)
        .await?
        .ok_or(RequestError::ServerError)?;

    Ok(result)
}

pub async fn update_question_in_db(
    pool: &SqlitePool,
    id: &str,
    UpdateQuestionRequest {
        content,
        author,
        is_pinned,
        is_locked,
        tags,
    }: UpdateQuestionRequest,
) -> Result<Question, RequestError> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM questions WHERE id = $1")
        .bind(id)
        .fetch_one(&mut tx)
        .await?;
    if exists == 0 {
        return Err(RequestError::NotFound);
    }

    let builder = QueryBuilder::new(String::from("UPDATE questions SET "), Some(", "))
        .add_param("content = ?", content)
        .add_param("author = ?", author)
        .add_param("is_pinned = ?", is_pinned.map(|b| (b as i64).to_string()))
        .add_param("is_locked = ?", is_locked.map(|b| (b as i64).to_string()));

    if !builder.is_empty() {
        let (query, params) = builder.trim().add_param(" WHERE id = ?", Some(id.to_string())).build();
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.execute(&mut tx).await?;
    }

    if let Some(tags) = tags {
        sqlx::query("DELETE FROM question_tags WHERE question_id = $1")
            .bind(id)
            .execute(&mut tx)
            .await?;
        attach_tags(&mut tx, id, &tags).await?;
    }

    tx.commit().await?;

    let result = get_question_in_db(pool, id)
        .await?
        .ok_or(RequestError::ServerError)?;

    Ok(result)
}

pub async fn delete_question_in_db(pool: &SqlitePool, id: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }

    // Cascade: every reply that belongs to the question goes with it.
    sqlx::query("DELETE FROM replies WHERE question_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    sqlx::query("DELETE FROM question_tags WHERE question_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn upvote_question_in_db(pool: &SqlitePool, id: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("UPDATE questions SET upvotes = upvotes + 1 WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    tx.commit().await?;
    Ok(())
}

async fn attach_tags(
    tx: &mut Transaction<'_, Sqlite>,
    question_id: &str,
    tags: &[String],
) -> Result<(), RequestError> {
    for tag in tags {
        let tag_id = ensure_tag(tx, tag).await?;
        sqlx::query(
            r#"
            INSERT INTO question_tags (question_id, tag_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(question_id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await?;
    }
    Ok(())
}
