mod authentication;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod live;
mod models;
mod ranking;
mod threads;

use anyhow::Context;
pub use anyhow::Result;
pub use authentication::hash_password_argon2;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use data_formats::*;
use handlers::*;
pub use live::LiveData;
pub use models::{Question, Reply};
pub use ranking::{filter_by_tags, recent, trending, trending_score};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
pub use threads::ReplyThread;

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, address: SocketAddr) -> Result<()> {
    let db = init_db().await?;
    serve_app(app, db, address).await
}

pub async fn serve_app(app: Router, db: SqlitePool, address: SocketAddr) -> Result<()> {
    let data = LiveData::connect(db)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load initial snapshots: {:?}", e))?;
    let app = app.layer(Extension(Arc::new(data)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db() -> Result<SqlitePool> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    init_db_at(&db_url).await
}

pub async fn init_db_at(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    }
    let pool = SqlitePool::connect(db_url).await?;
    tracing::info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/admin/login", post(login_admin))
        .route("/questions", get(list_questions).post(create_question))
        .route(
            "/questions/:id",
            get(get_question).put(update_question).delete(delete_question),
        )
        .route("/questions/:id/upvote", post(upvote_question))
        .route(
            "/questions/:id/replies",
            get(list_replies).post(create_reply),
        )
        .route("/questions/:id/thread", get(get_thread))
        .route("/replies/:id", put(update_reply).delete(delete_reply))
        .route("/replies/:id/upvote", post(upvote_reply))
        .route("/tags", get(list_tags).post(create_tag))
        .fallback(not_found)
}

/// Tag names are stored lowercase with whitespace runs collapsed to a
/// single hyphen.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
