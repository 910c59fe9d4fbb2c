#[derive(Debug, Clone)]
pub struct Question {
    pub id: String,
    pub content: String,
    pub author: String,
    pub timestamp: i64,
    pub upvotes: i64,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub tags: Vec<String>,
    // Session-local, never persisted. Reset to false on every snapshot load.
    pub upvoted: bool,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub id: String,
    pub question_id: String,
    pub parent_reply_id: Option<String>,
    pub content: String,
    pub author: String,
    pub timestamp: i64,
    pub upvotes: i64,
    pub upvoted: bool,
}

// Row shapes as they come back from the store. Conversion into the model
// types happens once, here, filling defaults for anything nullable so the
// rest of the crate can assume fully populated records.

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: String,
    pub content: String,
    pub author: String,
    pub timestamp: i64,
    pub upvotes: i64,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub tag_list: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReplyRow {
    pub id: String,
    pub question_id: String,
    pub parent_reply_id: Option<String>,
    pub content: String,
    pub author: String,
    pub timestamp: i64,
    pub upvotes: i64,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            id: row.id,
            content: row.content,
            author: row.author,
            timestamp: row.timestamp,
            upvotes: row.upvotes,
            is_pinned: row.is_pinned,
            is_locked: row.is_locked,
            tags: row
                .tag_list
                .map(|list| list.split(',').map(|tag| tag.to_string()).collect())
                .unwrap_or_default(),
            upvoted: false,
        }
    }
}

impl From<ReplyRow> for Reply {
    fn from(row: ReplyRow) -> Self {
        Reply {
            id: row.id,
            question_id: row.question_id,
            parent_reply_id: row.parent_reply_id,
            content: row.content,
            author: row.author,
            timestamp: row.timestamp,
            upvotes: row.upvotes,
            upvoted: false,
        }
    }
}
