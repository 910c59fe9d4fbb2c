use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    Extension, Json,
};
use chrono::Utc;

use crate::{
    authentication::{get_admin_token, verify_password_argon2, MaybeAdmin},
    errors::{RequestError, RequestErrorJsonWrapper},
    live::LiveData,
    ranking,
    threads::ReplyThread,
    AdminLoginRequest, AdminTokenResponse, CreateQuestionRequest, CreateReplyRequest,
    CreateTagRequest, MultipleQuestionsWrapper, MultipleRepliesWrapper, QuestionQueryParams,
    QuestionResponse, QuestionWrapper, ReplyResponse, ReplyWrapper, TagsWrapper,
    ThreadEntryResponse, ThreadWrapper, UpdateQuestionRequest, UpdateReplyRequest,
};

type JsonResult<T> = Result<Json<T>, (StatusCode, Json<RequestErrorJsonWrapper>)>;
type StatusResult = Result<StatusCode, (StatusCode, Json<RequestErrorJsonWrapper>)>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

// ----------------- Admin Handlers -----------------
pub async fn login_admin(
    Json(AdminLoginRequest { password }): Json<AdminLoginRequest>,
) -> JsonResult<AdminTokenResponse> {
    let hash = std::env::var("ADMIN_PASSWORD_HASH")
        .map_err(|_| RequestError::ServerError.to_json_response())?;
    let is_password_correct = verify_password_argon2(password, hash).await.map_err(|_| {
        RequestError::RunTimeError("Could not log in\nPlease Try again").to_json_response()
    })?;

    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password").to_json_response());
    }
    let token = get_admin_token().map_err(|_| {
        RequestError::RunTimeError("Could not generate JWT successfully\nTry again later")
            .to_json_response()
    })?;
    Ok(Json(AdminTokenResponse { token }))
}

// ----------------- Question Handlers -----------------

pub async fn list_questions(
    Extension(data): Extension<Arc<LiveData>>,
    Query(params): Query<QuestionQueryParams>,
) -> Json<MultipleQuestionsWrapper> {
    let selected: Vec<String> = params
        .tags
        .map(|tags| {
            tags.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let snapshot = data.questions();
    let filtered = ranking::filter_by_tags(&snapshot, &selected);
    let ordered = match params.sort.as_deref() {
        Some("recent") => ranking::recent(&filtered),
        _ => ranking::trending(&filtered, Utc::now().timestamp_millis()),
    };

    let questions: Vec<QuestionResponse> = ordered
        .into_iter()
        .map(|question| {
            let reply_count = data.reply_count(&question.id);
            QuestionResponse::new(question, reply_count)
        })
        .collect();

    Json(MultipleQuestionsWrapper {
        questions_count: questions.len(),
        questions,
    })
}

pub async fn create_question(
    Extension(data): Extension<Arc<LiveData>>,
    Json(request): Json<CreateQuestionRequest>,
) -> JsonResult<QuestionWrapper<QuestionResponse>> {
    if request.content.trim().is_empty() {
        return Err(RequestError::RunTimeError("Question content required").to_json_response());
    }
    if request.author.trim().is_empty() {
        return Err(RequestError::RunTimeError("Author name required").to_json_response());
    }

    let question = data
        .add_question(request)
        .await
        .map_err(|e| e.to_json_response())?;

    Ok(Json(QuestionWrapper {
        question: QuestionResponse::new(question, 0),
    }))
}

pub async fn get_question(
    Extension(data): Extension<Arc<LiveData>>,
    Path(id): Path<String>,
) -> JsonResult<QuestionWrapper<QuestionResponse>> {
    let question = match data.question_by_id(&id) {
        Some(question) => question,
        None => return Err(RequestError::NotFound.to_json_response()),
    };
    let reply_count = data.reply_count(&question.id);
    Ok(Json(QuestionWrapper {
        question: QuestionResponse::new(question, reply_count),
    }))
}

pub async fn update_question(
    MaybeAdmin(admin): MaybeAdmin,
    Extension(data): Extension<Arc<LiveData>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuestionRequest>,
) -> JsonResult<QuestionWrapper<QuestionResponse>> {
    if admin.is_none() {
        return Err(RequestError::NotAuthorized("Need to be authorized").to_json_response());
    }
    let question = data
        .update_question(&id, request)
        .await
        .map_err(|e| e.to_json_response())?;
    let reply_count = data.reply_count(&question.id);
    Ok(Json(QuestionWrapper {
        question: QuestionResponse::new(question, reply_count),
    }))
}

pub async fn delete_question(
    MaybeAdmin(admin): MaybeAdmin,
    Extension(data): Extension<Arc<LiveData>>,
    Path(id): Path<String>,
) -> StatusResult {
    if admin.is_none() {
        return Err(RequestError::NotAuthorized("Need to be authorized").to_json_response());
    }
    data.delete_question(&id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::OK)
}

pub async fn upvote_question(
    Extension(data): Extension<Arc<LiveData>>,
    Path(id): Path<String>,
) -> JsonResult<QuestionWrapper<QuestionResponse>> {
    let question = data
        .upvote_question(&id)
        .await
        .map_err(|e| e.to_json_response())?;
    let reply_count = data.reply_count(&question.id);
    Ok(Json(QuestionWrapper {
        question: QuestionResponse::new(question, reply_count),
    }))
}

// ----------------- Reply Handlers -----------------

pub async fn list_replies(
    Extension(data): Extension<Arc<LiveData>>,
    Path(question_id): Path<String>,
) -> JsonResult<MultipleRepliesWrapper> {
    if data.question_by_id(&question_id).is_none() {
        return Err(RequestError::NotFound.to_json_response());
    }
    let replies = data
        .replies_for(&question_id)
        .into_iter()
        .map(ReplyResponse::new)
        .collect();
    Ok(Json(MultipleRepliesWrapper { replies }))
}

pub async fn get_thread(
    Extension(data): Extension<Arc<LiveData>>,
    Path(question_id): Path<String>,
) -> JsonResult<ThreadWrapper> {
    if data.question_by_id(&question_id).is_none() {
        return Err(RequestError::NotFound.to_json_response());
    }
    let thread = ReplyThread::new(data.replies_for(&question_id));
    let entries = thread
        .visible()
        .into_iter()
        .map(|(depth, reply)| ThreadEntryResponse {
            depth,
            reply: ReplyResponse::new(reply.clone()),
        })
        .collect();
    Ok(Json(ThreadWrapper { thread: entries }))
}

pub async fn create_reply(
    Extension(data): Extension<Arc<LiveData>>,
    Path(question_id): Path<String>,
    Json(request): Json<CreateReplyRequest>,
) -> JsonResult<ReplyWrapper<ReplyResponse>> {
    if request.content.trim().is_empty() {
        return Err(RequestError::RunTimeError("Reply content required").to_json_response());
    }
    if request.author.trim().is_empty() {
        return Err(RequestError::RunTimeError("Author name required").to_json_response());
    }

    let reply = data
        .add_reply(&question_id, request)
        .await
        .map_err(|e| e.to_json_response())?;

    Ok(Json(ReplyWrapper {
        reply: ReplyResponse::new(reply),
    }))
}

pub async fn update_reply(
    MaybeAdmin(admin): MaybeAdmin,
    Extension(data): Extension<Arc<LiveData>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateReplyRequest>,
) -> JsonResult<ReplyWrapper<ReplyResponse>> {
    if admin.is_none() {
        return Err(RequestError::NotAuthorized("Need to be authorized").to_json_response());
    }
    let reply = data
        .update_reply(&id, request)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(ReplyWrapper {
        reply: ReplyResponse::new(reply),
    }))
}

pub async fn delete_reply(
    MaybeAdmin(admin): MaybeAdmin,
    Extension(data): Extension<Arc<LiveData>>,
    Path(id): Path<String>,
) -> StatusResult {
    if admin.is_none() {
        return Err(RequestError::NotAuthorized("Need to be authorized").to_json_response());
    }
    data.delete_reply(&id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(StatusCode::OK)
}

pub async fn upvote_reply(
    Extension(data): Extension<Arc<LiveData>>,
    Path(id): Path<String>,
) -> JsonResult<ReplyWrapper<ReplyResponse>> {
    let reply = data
        .upvote_reply(&id)
        .await
        .map_err(|e| e.to_json_response())?;
    Ok(Json(ReplyWrapper {
        reply: ReplyResponse::new(reply),
    }))
}

// ----------------- Tag Handlers -----------------

pub async fn list_tags(Extension(data): Extension<Arc<LiveData>>) -> Json<TagsWrapper> {
    Json(TagsWrapper {
        tags: data.available_tags(),
    })
}

pub async fn create_tag(
    Extension(data): Extension<Arc<LiveData>>,
    Json(CreateTagRequest { name }): Json<CreateTagRequest>,
) -> StatusResult {
    data.add_tag(&name).await.map_err(|e| e.to_json_response())?;
    Ok(StatusCode::OK)
}
