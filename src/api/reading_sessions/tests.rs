use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::test_support;
use axum::http::{Method, StatusCode};
use serde_json::json;
use time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn start_is_idempotent_and_end_accumulates_time() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro50", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "student50", "Student", UserRole::Student, "student-pass")
            .await;
    let book = test_support::insert_book(ctx.state.db(), "Ang Unang Baboy sa Langit", &teacher.id).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let body = json!({ "bookId": book.id });

    let mut session_ids = Vec::new();
    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/reading-sessions/start",
                Some(&token),
                Some(body.clone()),
            ))
            .await
            .expect("start reading");

        let status = response.status();
        let session = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {session}");
        assert!(session["end_time"].is_null());
        session_ids.push(session["id"].clone());
    }
    assert_eq!(session_ids[0], session_ids[1]);

    sqlx::query("UPDATE reading_sessions SET start_time = $1 WHERE id = $2")
        .bind(primitive_now_utc() - Duration::seconds(90))
        .bind(session_ids[0].as_str().expect("session id"))
        .execute(ctx.state.db())
        .await
        .expect("backdate session");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/reading-sessions/end",
            Some(&token),
            Some(body.clone()),
        ))
        .await
        .expect("end reading");

    let status = response.status();
    let ended = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {ended}");
    let elapsed = ended["elapsed_seconds"].as_i64().expect("elapsed");
    assert!((90..=100).contains(&elapsed), "elapsed: {elapsed}");
    assert_eq!(ended["session"]["total_minutes"], elapsed);
    assert!(!ended["session"]["end_time"].is_null());
    assert_eq!(ended["progress"]["total_reading_time"], elapsed);
    assert_eq!(ended["progress"]["percent_complete"], 0);
    assert!(!ended["progress"]["last_read_at"].is_null());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/reading-sessions/end",
            Some(&token),
            Some(body),
        ))
        .await
        .expect("end again");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["detail"], "Active reading session not found");
}

#[tokio::test]
async fn start_requires_existing_book() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "student51", "Student", UserRole::Student, "student-pass")
            .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/reading-sessions/start",
            Some(&token),
            Some(json!({ "book_id": "missing" })),
        ))
        .await
        .expect("start reading");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["detail"], "Book not found");
}

#[tokio::test]
async fn students_cannot_start_reading_unpublished_books() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro52", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "student52", "Student", UserRole::Student, "student-pass")
            .await;
    let draft = test_support::insert_book(ctx.state.db(), "Ang Prinsipe ng Sapa", &teacher.id).await;
    sqlx::query("UPDATE books SET is_published = false WHERE id = $1")
        .bind(&draft.id)
        .execute(ctx.state.db())
        .await
        .expect("unpublish book");
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/reading-sessions/start",
            Some(&token),
            Some(json!({ "book_id": draft.id })),
        ))
        .await
        .expect("start reading");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["detail"], "Book not found");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reading_sessions")
        .fetch_one(ctx.state.db())
        .await
        .expect("count sessions");
    assert_eq!(count, 0);
}
