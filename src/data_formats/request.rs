use serde::{Deserialize, Serialize};

// ----------------- Question Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateQuestionRequest {
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateQuestionRequest {
    pub content: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "isPinned")]
    pub is_pinned: Option<bool>,
    #[serde(rename = "isLocked")]
    pub is_locked: Option<bool>,
    pub tags: Option<Vec<String>>,
}

// ----------------- Reply Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateReplyRequest {
    pub content: String,
    pub author: String,
    #[serde(default, rename = "parentReplyId")]
    pub parent_reply_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateReplyRequest {
    pub content: Option<String>,
    pub author: Option<String>,
}

// ----------------- Tag Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateTagRequest {
    pub name: String,
}

// ----------------- Admin Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct AdminLoginRequest {
    pub password: String,
}
