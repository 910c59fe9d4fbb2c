use serde::{Deserialize, Serialize};

use crate::models::{Question, Reply};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct QuestionResponse {
    pub id: String,
    pub content: String,
    pub author: String,
    pub timestamp: i64,
    pub upvotes: i64,
    #[serde(rename = "isPinned")]
    pub is_pinned: bool,
    #[serde(rename = "isLocked")]
    pub is_locked: bool,
    pub tags: Vec<String>,
    pub upvoted: bool,
    #[serde(rename = "replyCount")]
    pub reply_count: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ReplyResponse {
    pub id: String,
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "parentReplyId")]
    pub parent_reply_id: Option<String>,
    pub content: String,
    pub author: String,
    pub timestamp: i64,
    pub upvotes: i64,
    pub upvoted: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ThreadEntryResponse {
    pub depth: usize,
    #[serde(flatten)]
    pub reply: ReplyResponse,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AdminTokenResponse {
    pub token: String,
}

impl QuestionResponse {
    pub fn new(
        Question {
            id,
            content,
            author,
            timestamp,
            upvotes,
            is_pinned,
            is_locked,
            tags,
            upvoted,
        }: Question,
        reply_count: usize,
    ) -> Self {
        QuestionResponse {
            id,
            content,
            author,
            timestamp,
            upvotes,
            is_pinned,
            is_locked,
            tags,
            upvoted,
            reply_count,
        }
    }
}

impl ReplyResponse {
    pub fn new(
        Reply {
            id,
            question_id,
            parent_reply_id,
            content,
            author,
            timestamp,
            upvotes,
            upvoted,
        }: Reply,
    ) -> Self {
        ReplyResponse {
            id,
            question_id,
            parent_reply_id,
            content,
            author,
            timestamp,
            upvotes,
            upvoted,
        }
    }
}
