use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::SqlitePool;
use tokio::sync::watch;

use crate::data_formats::{
    CreateQuestionRequest, CreateReplyRequest, UpdateQuestionRequest, UpdateReplyRequest,
};
use crate::db_helpers;
use crate::errors::RequestError;
use crate::models::{Question, Reply};
use crate::normalize_tag;

/// Live mirror of the store. One instance per running application, created
/// at startup and handed to handlers explicitly.
///
/// Every mutation writes through to the store; add/update/delete then
/// publish a full snapshot replace of the affected collection, which is
/// what subscribers observe. Upvotes patch the mirror in place instead, so
/// the session-local `upvoted` flag survives until the next snapshot
/// replace resets it.
pub struct LiveData {
    pool: SqlitePool,
    questions: watch::Sender<Vec<Question>>,
    replies: watch::Sender<Vec<Reply>>,
    tags: watch::Sender<Vec<String>>,
    loading: AtomicBool,
}

impl LiveData {
    /// Loads the first snapshot of both collections. `is_loading` stays
    /// true until both have arrived and is never reset afterwards.
    pub async fn connect(pool: SqlitePool) -> Result<Self, RequestError> {
        let (questions, _) = watch::channel(Vec::new());
        let (replies, _) = watch::channel(Vec::new());
        let (tags, _) = watch::channel(Vec::new());
        let data = LiveData {
            pool,
            questions,
            replies,
            tags,
            loading: AtomicBool::new(true),
        };
        data.refresh_questions().await?;
        data.refresh_replies().await?;
        data.loading.store(false, Ordering::SeqCst);
        Ok(data)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    // ----------------- Mirror Reads -----------------

    pub fn questions(&self) -> Vec<Question> {
        self.questions.borrow().clone()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.borrow().clone()
    }

    /// Tags as consumers see them: derived from the questions currently in
    /// the mirror, first-seen order. The ledger table only dedups.
    pub fn available_tags(&self) -> Vec<String> {
        self.tags.borrow().clone()
    }

    pub fn question_by_id(&self, id: &str) -> Option<Question> {
        self.questions
            .borrow()
            .iter()
            .find(|question| question.id == id)
            .cloned()
    }

    pub fn replies_for(&self, question_id: &str) -> Vec<Reply> {
        self.replies
            .borrow()
            .iter()
            .filter(|reply| reply.question_id == question_id)
            .cloned()
            .collect()
    }

    pub fn reply_count(&self, question_id: &str) -> usize {
        self.replies
            .borrow()
            .iter()
            .filter(|reply| reply.question_id == question_id)
            .count()
    }

    // ----------------- Subscriptions -----------------

    // Dropping the receiver unsubscribes. The two collections publish
    // independently; no ordering is guaranteed between them.

    pub fn subscribe_questions(&self) -> watch::Receiver<Vec<Question>> {
        self.questions.subscribe()
    }

    pub fn subscribe_replies(&self) -> watch::Receiver<Vec<Reply>> {
        self.replies.subscribe()
    }

    // ----------------- Question Mutations -----------------

    pub async fn add_question(
        &self,
        mut request: CreateQuestionRequest,
    ) -> Result<Question, RequestError> {
        request.tags = normalize_tags(request.tags);
        let question = db_helpers::insert_question_in_db(&self.pool, request).await?;
        self.refresh_questions_or_degrade().await;
        Ok(question)
    }

    pub async fn update_question(
        &self,
        id: &str,
        mut request: UpdateQuestionRequest,
    ) -> Result<Question, RequestError> {
        request.tags = request.tags.map(normalize_tags);
        let question = db_helpers::update_question_in_db(&self.pool, id, request).await?;
        self.refresh_questions_or_degrade().await;
        Ok(question)
    }

    pub async fn delete_question(&self, id: &str) -> Result<(), RequestError> {
        db_helpers::delete_question_in_db(&self.pool, id).await?;
        self.refresh_questions_or_degrade().await;
        self.refresh_replies_or_degrade().await;
        Ok(())
    }

    pub async fn upvote_question(&self, id: &str) -> Result<Question, RequestError> {
        db_helpers::upvote_question_in_db(&self.pool, id).await?;
        let mut updated = None;
        self.questions.send_modify(|questions| {
            if let Some(question) = questions.iter_mut().find(|question| question.id == id) {
                question.upvotes += 1;
                question.upvoted = true;
                updated = Some(question.clone());
            }
        });
        match updated {
            Some(question) => Ok(question),
            // Mirror was stale; fall back to the store.
            None => db_helpers::get_question_in_db(&self.pool, id)
                .await?
                .ok_or(RequestError::NotFound),
        }
    }

    // ----------------- Reply Mutations -----------------

    pub async fn add_reply(
        &self,
        question_id: &str,
        request: CreateReplyRequest,
    ) -> Result<Reply, RequestError> {
        let reply = db_helpers::insert_reply_in_db(&self.pool, question_id, request).await?;
        self.refresh_replies_or_degrade().await;
        Ok(reply)
    }

    pub async fn update_reply(
        &self,
        id: &str,
        request: UpdateReplyRequest,
    ) -> Result<Reply, RequestError> {
        let reply = db_helpers::update_reply_in_db(&self.pool, id, request).await?;
        self.refresh_replies_or_degrade().await;
        Ok(reply)
    }

    pub async fn delete_reply(&self, id: &str) -> Result<(), RequestError> {
        db_helpers::delete_reply_in_db(&self.pool, id).await?;
        self.refresh_replies_or_degrade().await;
        Ok(())
    }

    pub async fn upvote_reply(&self, id: &str) -> Result<Reply, RequestError> {
        db_helpers::upvote_reply_in_db(&self.pool, id).await?;
        let mut updated = None;
        self.replies.send_modify(|replies| {
            if let Some(reply) = replies.iter_mut().find(|reply| reply.id == id) {
                reply.upvotes += 1;
                reply.upvoted = true;
                updated = Some(reply.clone());
            }
        });
        match updated {
            Some(reply) => Ok(reply),
            None => db_helpers::get_reply_in_db(&self.pool, id)
                .await?
                .ok_or(RequestError::NotFound),
        }
    }

    // ----------------- Tag Mutations -----------------

    pub async fn add_tag(&self, name: &str) -> Result<(), RequestError> {
        let name = normalize_tag(name);
        if name.is_empty() {
            return Err(RequestError::RunTimeError("Tag name required"));
        }
        db_helpers::add_tag_in_db(&self.pool, &name).await
    }

    // ----------------- Snapshot Refresh -----------------

    async fn refresh_questions(&self) -> Result<(), RequestError> {
        let questions = db_helpers::list_questions_in_db(&self.pool).await?;
        let mut tags: Vec<String> = Vec::new();
        for question in &questions {
            for tag in &question.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        self.questions.send_replace(questions);
        self.tags.send_replace(tags);
        Ok(())
    }

    async fn refresh_replies(&self) -> Result<(), RequestError> {
        let replies = db_helpers::list_replies_in_db(&self.pool).await?;
        self.replies.send_replace(replies);
        Ok(())
    }

    // Refresh failures after a successful write degrade to a stale view
    // instead of failing the mutation. Nothing is retried.

    async fn refresh_questions_or_degrade(&self) {
        if let Err(error) = self.refresh_questions().await {
            tracing::error!("Error refreshing questions snapshot: {:?}", error);
        }
    }

    async fn refresh_replies_or_degrade(&self) {
        if let Err(error) = self.refresh_replies().await {
            tracing::error!("Error refreshing replies snapshot: {:?}", error);
        }
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for tag in tags {
        let tag = normalize_tag(&tag);
        if !tag.is_empty() && !result.contains(&tag) {
            result.push(tag);
        }
    }
    result
}
