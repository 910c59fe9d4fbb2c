use qriosity::{
    hash_password_argon2, AdminTokenResponse, MultipleQuestionsWrapper, MultipleRepliesWrapper,
    QuestionResponse, QuestionWrapper, ReplyResponse, ReplyWrapper, TagsWrapper, ThreadWrapper,
};
use serde_json::json;

const ADMIN_PASSWORD: &str = "letmein";

async fn spawn_app() -> (reqwest::Client, String) {
    std::env::set_var("JWT_SECRET", "test-secret");

    let db_path = std::env::temp_dir().join(format!("qriosity-test-{:016x}.db", rand::random::<u64>()));
    let db_url = format!("sqlite://{}", db_path.display());
    let pool = qriosity::init_db_at(&db_url).await.unwrap();

    let (port, addr) = qriosity::get_random_free_port();
    let router = qriosity::make_router();
    tokio::spawn(async move {
        qriosity::serve_app(router, pool, addr).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://localhost:{}", port);
    wait_until_healthy(&client, &base).await;
    (client, base)
}

async fn wait_until_healthy(client: &reqwest::Client, base: &str) {
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{base}/check_health")).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    panic!("server did not become healthy");
}

async fn admin_token(client: &reqwest::Client, base: &str) -> String {
    let hash = hash_password_argon2(ADMIN_PASSWORD.to_string()).await.unwrap();
    std::env::set_var("ADMIN_PASSWORD_HASH", hash);

    let response = client
        .post(format!("{base}/admin/login"))
        .json(&json!({ "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response
        .json::<AdminTokenResponse>()
        .await
        .unwrap()
        .token
}

async fn post_question(
    client: &reqwest::Client,
    base: &str,
    content: &str,
    author: &str,
    tags: &[&str],
) -> QuestionResponse {
    let response = client
        .post(format!("{base}/questions"))
        .json(&json!({ "content": content, "author": author, "tags": tags }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response
        .json::<QuestionWrapper<QuestionResponse>>()
        .await
        .unwrap()
        .question
}

async fn post_reply(
    client: &reqwest::Client,
    base: &str,
    question_id: &str,
    content: &str,
    parent_reply_id: Option<&str>,
) -> ReplyResponse {
    let response = client
        .post(format!("{base}/questions/{question_id}/replies"))
        .json(&json!({
            "content": content,
            "author": "cd5678",
            "parentReplyId": parent_reply_id,
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response
        .json::<ReplyWrapper<ReplyResponse>>()
        .await
        .unwrap()
        .reply
}

async fn list_questions(
    client: &reqwest::Client,
    base: &str,
    query: &str,
) -> MultipleQuestionsWrapper {
    client
        .get(format!("{base}/questions{query}"))
        .send()
        .await
        .unwrap()
        .json::<MultipleQuestionsWrapper>()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let (client, base) = spawn_app().await;
    let response = client
        .get(format!("{base}/check_health"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "alive");
}

#[tokio::test]
async fn posted_question_appears_first_in_recent() {
    let (client, base) = spawn_app().await;

    post_question(&client, &base, "What time does the gym open?", "ef9012", &[]).await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let question = post_question(
        &client,
        &base,
        "Where is the library?",
        "ab1234",
        &["campus", "facilities"],
    )
    .await;

    let listing = list_questions(&client, &base, "?sort=recent").await;
    assert_eq!(listing.questions_count, 2);
    assert_eq!(listing.questions[0].id, question.id);
    assert_eq!(listing.questions[0].content, "Where is the library?");
    assert_eq!(listing.questions[0].author, "ab1234");
    assert_eq!(listing.questions[0].tags, vec!["campus", "facilities"]);
    assert_eq!(listing.questions[0].reply_count, 0);
    assert_eq!(listing.questions[0].upvotes, 0);
    assert!(!listing.questions[0].is_pinned);
    assert!(!listing.questions[0].is_locked);
}

#[tokio::test]
async fn replies_count_and_nest_in_the_thread() {
    let (client, base) = spawn_app().await;
    let question = post_question(&client, &base, "Where is the library?", "ab1234", &[]).await;

    let first = post_reply(&client, &base, &question.id, "Second floor, main hall", None).await;
    let listing = list_questions(&client, &base, "").await;
    assert_eq!(listing.questions[0].reply_count, 1);

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let nested = post_reply(
        &client,
        &base,
        &question.id,
        "Thanks, found it!",
        Some(&first.id),
    )
    .await;
    assert_eq!(nested.parent_reply_id.as_deref(), Some(first.id.as_str()));

    let thread = client
        .get(format!("{base}/questions/{}/thread", question.id))
        .send()
        .await
        .unwrap()
        .json::<ThreadWrapper>()
        .await
        .unwrap();
    assert_eq!(thread.thread.len(), 2);
    assert_eq!(thread.thread[0].depth, 0);
    assert_eq!(thread.thread[0].reply.id, first.id);
    assert_eq!(thread.thread[1].depth, 1);
    assert_eq!(thread.thread[1].reply.id, nested.id);

    let flat = client
        .get(format!("{base}/questions/{}/replies", question.id))
        .send()
        .await
        .unwrap()
        .json::<MultipleRepliesWrapper>()
        .await
        .unwrap();
    assert_eq!(flat.replies.len(), 2);
    assert_eq!(flat.replies[0].id, first.id);
}

#[tokio::test]
async fn two_upvotes_increment_twice() {
    let (client, base) = spawn_app().await;
    let question = post_question(&client, &base, "Best coffee on campus?", "gh3456", &[]).await;

    client
        .post(format!("{base}/questions/{}/upvote", question.id))
        .send()
        .await
        .unwrap();
    let response = client
        .post(format!("{base}/questions/{}/upvote", question.id))
        .send()
        .await
        .unwrap()
        .json::<QuestionWrapper<QuestionResponse>>()
        .await
        .unwrap();
    assert_eq!(response.question.upvotes, 2);
    assert!(response.question.upvoted);
}

#[tokio::test]
async fn upvoted_flag_resets_on_next_snapshot() {
    let (client, base) = spawn_app().await;
    let question = post_question(&client, &base, "first", "ab1234", &[]).await;

    client
        .post(format!("{base}/questions/{}/upvote", question.id))
        .send()
        .await
        .unwrap();
    let listing = list_questions(&client, &base, "?sort=recent").await;
    let entry = listing
        .questions
        .iter()
        .find(|q| q.id == question.id)
        .unwrap();
    assert!(entry.upvoted);

    // Any mutation replaces the questions snapshot and drops the
    // session-local flag; the persisted counter stays.
    post_question(&client, &base, "second", "ab1234", &[]).await;
    let listing = list_questions(&client, &base, "?sort=recent").await;
    let entry = listing
        .questions
        .iter()
        .find(|q| q.id == question.id)
        .unwrap();
    assert!(!entry.upvoted);
    assert_eq!(entry.upvotes, 1);
}

#[tokio::test]
async fn tag_filter_keeps_any_match() {
    let (client, base) = spawn_app().await;
    let campus = post_question(&client, &base, "q1", "ab1234", &["campus", "facilities"]).await;
    post_question(&client, &base, "q2", "ab1234", &["food"]).await;
    let labs = post_question(&client, &base, "q3", "ab1234", &["labs"]).await;

    let listing = list_questions(&client, &base, "?tags=campus,labs").await;
    let mut ids: Vec<&str> = listing.questions.iter().map(|q| q.id.as_str()).collect();
    ids.sort_unstable();
    let mut expected = vec![campus.id.as_str(), labs.id.as_str()];
    expected.sort_unstable();
    assert_eq!(ids, expected);

    let unfiltered = list_questions(&client, &base, "").await;
    assert_eq!(unfiltered.questions_count, 3);
}

#[tokio::test]
async fn trending_favors_older_for_equal_upvotes() {
    let (client, base) = spawn_app().await;
    let older = post_question(&client, &base, "older", "ab1234", &[]).await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let newer = post_question(&client, &base, "newer", "ab1234", &[]).await;

    let listing = list_questions(&client, &base, "?sort=trending").await;
    assert_eq!(listing.questions[0].id, older.id);
    assert_eq!(listing.questions[1].id, newer.id);
}

#[tokio::test]
async fn tags_are_normalized_and_listed() {
    let (client, base) = spawn_app().await;
    post_question(&client, &base, "q", "ab1234", &["Study  Rooms", "CAMPUS"]).await;

    let tags = client
        .get(format!("{base}/tags"))
        .send()
        .await
        .unwrap()
        .json::<TagsWrapper>()
        .await
        .unwrap();
    assert_eq!(tags.tags, vec!["study-rooms", "campus"]);
}

#[tokio::test]
async fn admin_can_lock_a_question() {
    let (client, base) = spawn_app().await;
    let token = admin_token(&client, &base).await;
    let question = post_question(&client, &base, "lock me", "ab1234", &[]).await;

    let response = client
        .put(format!("{base}/questions/{}", question.id))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "isLocked": true, "isPinned": true }))
        .send()
        .await
        .unwrap()
        .json::<QuestionWrapper<QuestionResponse>>()
        .await
        .unwrap();
    assert!(response.question.is_locked);
    assert!(response.question.is_pinned);

    let response = client
        .post(format!("{base}/questions/{}/replies", question.id))
        .json(&json!({ "content": "too late", "author": "cd5678" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 423);
}

#[tokio::test]
async fn deleting_a_question_removes_its_replies() {
    let (client, base) = spawn_app().await;
    let token = admin_token(&client, &base).await;
    let question = post_question(&client, &base, "doomed", "ab1234", &[]).await;
    post_reply(&client, &base, &question.id, "me too", None).await;

    let response = client
        .delete(format!("{base}/questions/{}", question.id))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .get(format!("{base}/questions/{}", question.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .get(format!("{base}/questions/{}/replies", question.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn deleting_a_reply_spares_grandchildren() {
    let (client, base) = spawn_app().await;
    let token = admin_token(&client, &base).await;
    let question = post_question(&client, &base, "thread", "ab1234", &[]).await;
    let parent = post_reply(&client, &base, &question.id, "parent", None).await;
    let child = post_reply(&client, &base, &question.id, "child", Some(&parent.id)).await;
    let grandchild = post_reply(&client, &base, &question.id, "grandchild", Some(&child.id)).await;

    let response = client
        .delete(format!("{base}/replies/{}", parent.id))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // The cascade stops at direct children; the grandchild is orphaned but
    // still present.
    let flat = client
        .get(format!("{base}/questions/{}/replies", question.id))
        .send()
        .await
        .unwrap()
        .json::<MultipleRepliesWrapper>()
        .await
        .unwrap();
    let ids: Vec<&str> = flat.replies.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![grandchild.id.as_str()]);
}

#[tokio::test]
async fn destructive_routes_require_admin() {
    let (client, base) = spawn_app().await;
    let question = post_question(&client, &base, "protected", "ab1234", &[]).await;

    let response = client
        .delete(format!("{base}/questions/{}", question.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .put(format!("{base}/questions/{}", question.id))
        .json(&json!({ "isPinned": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .delete(format!("{base}/questions/{}", question.id))
        .header("Authorization", "Token not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn blank_questions_are_rejected() {
    let (client, base) = spawn_app().await;

    let response = client
        .post(format!("{base}/questions"))
        .json(&json!({ "content": "   ", "author": "ab1234" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    let response = client
        .post(format!("{base}/questions"))
        .json(&json!({ "content": "hello?", "author": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn missing_question_is_not_found() {
    let (client, base) = spawn_app().await;

    let response = client
        .get(format!("{base}/questions/does-not-exist"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .post(format!("{base}/questions/does-not-exist/upvote"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
