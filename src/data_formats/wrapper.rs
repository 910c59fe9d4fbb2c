use serde::{Deserialize, Serialize};

use super::response::{QuestionResponse, ReplyResponse, ThreadEntryResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct QuestionWrapper<T> {
    pub question: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReplyWrapper<T> {
    pub reply: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleQuestionsWrapper {
    pub questions: Vec<QuestionResponse>,
    #[serde(rename = "questionsCount")]
    pub questions_count: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleRepliesWrapper {
    pub replies: Vec<ReplyResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ThreadWrapper {
    pub thread: Vec<ThreadEntryResponse>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TagsWrapper {
    pub tags: Vec<String>,
}
