use crate::core::time::primitive_now_utc;
use crate::db::models::QuizAttempt;
use crate::db::types::{QuizMode, UserRole};
use crate::repositories;
use crate::services::quiz_attempts::{self, NewAttempt};
use crate::test_support;
use axum::http::{Method, StatusCode};
use serde_json::json;
use sqlx::PgPool;
use time::{Duration, PrimitiveDateTime};
use tower::ServiceExt;
use uuid::Uuid;

#[allow(clippy::too_many_arguments)]
async fn insert_attempt(
    pool: &PgPool,
    user_id: &str,
    book_id: &str,
    attempt_number: i32,
    score_correct: i32,
    score_total: i32,
    mode: QuizMode,
    created_at: PrimitiveDateTime,
) -> QuizAttempt {
    repositories::quiz_attempts::create(
        pool,
        repositories::quiz_attempts::CreateAttempt {
            id: &Uuid::new_v4().to_string(),
            user_id,
            book_id,
            page_id: None,
            score_correct,
            score_total,
            percentage: score_correct * 100 / score_total,
            mode,
            attempt_number,
            duration_sec: 30,
            created_at,
        },
    )
    .await
    .expect("insert attempt")
}

#[tokio::test]
async fn attempts_are_numbered_per_page_scope() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro30", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "student30", "Student", UserRole::Student, "student-pass")
            .await;
    let book = test_support::insert_book(ctx.state.db(), "Ang Pagong at ang Kuneho", &teacher.id).await;
    let page = test_support::insert_page(ctx.state.db(), &book.id, 1).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let payload = json!({
        "bookId": book.id,
        "pageId": page.id,
        "scoreCorrect": 2,
        "scoreTotal": 3,
        "durationSec": 999999
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&token),
            Some(payload.clone()),
        ))
        .await
        .expect("first attempt");

    let status = response.status();
    let first = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {first}");
    assert_eq!(first["success"], true);
    assert_eq!(first["attempt"]["attempt_number"], 1);
    assert_eq!(first["attempt"]["percentage"], 67);
    assert_eq!(first["attempt"]["mode"], "retry");
    assert_eq!(
        first["attempt"]["duration_sec"],
        ctx.state.settings().quiz().max_duration_seconds
    );
    assert_eq!(first["attempt"]["user_id"], student.id.as_str());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&token),
            Some(payload),
        ))
        .await
        .expect("second attempt");

    let status = response.status();
    let second = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {second}");
    assert_eq!(second["attempt"]["attempt_number"], 2);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&token),
            Some(json!({ "book_id": book.id, "score_correct": 1, "score_total": 1, "mode": "straight" })),
        ))
        .await
        .expect("book level attempt");

    let status = response.status();
    let book_level = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {book_level}");
    assert_eq!(book_level["attempt"]["attempt_number"], 1);
    assert!(book_level["attempt"]["page_id"].is_null());
    assert_eq!(book_level["attempt"]["duration_sec"], 0);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/quiz-attempts?book_id={}&latest_per_book=true", book.id),
            Some(&token),
            None,
        ))
        .await
        .expect("latest per book");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    let items = listed["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["attempt_number"], 2);
}

#[tokio::test]
async fn invalid_submissions_are_rejected() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro31", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "student31", "Student", UserRole::Student, "student-pass")
            .await;
    let book = test_support::insert_book(ctx.state.db(), "Si Juan Tamad", &teacher.id).await;
    let other_book = test_support::insert_book(ctx.state.db(), "Ang Alamat ng Ampalaya", &teacher.id).await;
    let foreign_page = test_support::insert_page(ctx.state.db(), &other_book.id, 1).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&token),
            Some(json!({ "book_id": book.id, "score_correct": 0, "score_total": 0 })),
        ))
        .await
        .expect("zero total");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["detail"], "score_total must be positive");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&token),
            Some(json!({ "book_id": book.id, "score_correct": 6, "score_total": 5 })),
        ))
        .await
        .expect("too many correct");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&token),
            Some(json!({
                "book_id": book.id,
                "page_id": foreign_page.id,
                "score_correct": 1,
                "score_total": 2
            })),
        ))
        .await
        .expect("foreign page");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["detail"], "Page not found");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&token),
            Some(json!({ "book_id": "missing", "score_correct": 1, "score_total": 2 })),
        ))
        .await
        .expect("missing book");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&token),
            Some(json!({
                "book_id": book.id,
                "score_correct": 1,
                "score_total": 2,
                "user_id": teacher.id
            })),
        ))
        .await
        .expect("submit for other");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts")
        .fetch_one(ctx.state.db())
        .await
        .expect("count attempts");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn sessions_split_on_inactivity_gap() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro32", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "student32", "Student", UserRole::Student, "student-pass")
            .await;
    let book = test_support::insert_book(ctx.state.db(), "Ang Kalabaw at ang Baka", &teacher.id).await;
    let base = primitive_now_utc() - Duration::hours(1);

    insert_attempt(ctx.state.db(), &student.id, &book.id, 1, 3, 5, QuizMode::Retry, base).await;
    insert_attempt(
        ctx.state.db(),
        &student.id,
        &book.id,
        2,
        4,
        5,
        QuizMode::Straight,
        base + Duration::seconds(30),
    )
    .await;
    insert_attempt(
        ctx.state.db(),
        &student.id,
        &book.id,
        3,
        5,
        5,
        QuizMode::Retry,
        base + Duration::seconds(60),
    )
    .await;
    insert_attempt(
        ctx.state.db(),
        &student.id,
        &book.id,
        4,
        1,
        4,
        QuizMode::Retry,
        base + Duration::minutes(30),
    )
    .await;

    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/quiz-attempts/sessions?book_id={}", book.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("list sessions");

    let status = response.status();
    let sessions = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {sessions}");
    let sessions = sessions.as_array().expect("sessions");
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["attempt_count"], 3);
    assert_eq!(sessions[0]["total_correct"], 12);
    assert_eq!(sessions[0]["total_total"], 15);
    assert_eq!(sessions[0]["percentage"], 80);
    assert_eq!(sessions[0]["mode"], "straight");
    assert_eq!(sessions[1]["attempt_count"], 1);
    assert_eq!(sessions[1]["percentage"], 25);
    assert_eq!(sessions[1]["mode"], "retry");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/quiz-attempts/sessions/latest?book_id={}&user_id={}", book.id, student.id),
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("latest session");

    let status = response.status();
    let latest = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {latest}");
    assert_eq!(latest["session"]["total_correct"], 1);
    assert_eq!(latest["session"]["total_total"], 4);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/quiz-attempts/sessions/latest",
            Some(&student_token),
            None,
        ))
        .await
        .expect("latest without book");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/quiz-attempts/sessions?user_id={}", teacher.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("other user's sessions");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn latest_session_is_null_without_attempts() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro33", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let book = test_support::insert_book(ctx.state.db(), "Biag ni Lam-ang", &teacher.id).await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/quiz-attempts/sessions/latest?bookId={}", book.id),
            Some(&token),
            None,
        ))
        .await
        .expect("latest session");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert!(body["session"].is_null());
}

#[tokio::test]
async fn submissions_need_a_real_user_and_a_visible_book() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro34", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "student34", "Student", UserRole::Student, "student-pass")
            .await;
    let book = test_support::insert_book(ctx.state.db(), "Ang Alamat ng Pinya", &teacher.id).await;
    let draft = test_support::insert_book(ctx.state.db(), "Ang Alamat ng Saging", &teacher.id).await;
    sqlx::query("UPDATE books SET is_published = false WHERE id = $1")
        .bind(&draft.id)
        .execute(ctx.state.db())
        .await
        .expect("unpublish book");

    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&teacher_token),
            Some(json!({
                "book_id": book.id,
                "score_correct": 1,
                "score_total": 2,
                "user_id": "no-such-user"
            })),
        ))
        .await
        .expect("unknown user");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["detail"], "User not found");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/quiz-attempts",
            Some(&student_token),
            Some(json!({ "book_id": draft.id, "score_correct": 1, "score_total": 2 })),
        ))
        .await
        .expect("unpublished book");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["detail"], "Book not found");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts")
        .fetch_one(ctx.state.db())
        .await
        .expect("count attempts");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn concurrent_submissions_get_distinct_numbers() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro35", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "student35", "Student", UserRole::Student, "student-pass")
            .await;
    let book = test_support::insert_book(ctx.state.db(), "Si Malakas at si Maganda", &teacher.id).await;
    let page = test_support::insert_page(ctx.state.db(), &book.id, 1).await;

    let submission = || NewAttempt {
        user_id: student.id.as_str(),
        book_id: book.id.as_str(),
        page_id: Some(page.id.as_str()),
        score_correct: 1,
        score_total: 2,
        percentage: None,
        mode: QuizMode::Retry,
        duration_sec: 10,
    };

    let (first, second) = tokio::join!(
        quiz_attempts::record_attempt(ctx.state.db(), submission()),
        quiz_attempts::record_attempt(ctx.state.db(), submission()),
    );

    let mut numbers = vec![
        first.expect("first attempt").attempt_number,
        second.expect("second attempt").attempt_number,
    ];
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn latest_per_book_listing_is_paginated() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "guro36", "Guro", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "student36", "Student", UserRole::Student, "student-pass")
            .await;
    let older = test_support::insert_book(ctx.state.db(), "Ang Diwata ng Karagatan", &teacher.id).await;
    let newer = test_support::insert_book(ctx.state.db(), "Ang Ibong Adarna", &teacher.id).await;
    let base = primitive_now_utc() - Duration::hours(2);

    insert_attempt(ctx.state.db(), &student.id, &older.id, 1, 1, 2, QuizMode::Retry, base).await;
    insert_attempt(
        ctx.state.db(),
        &student.id,
        &older.id,
        2,
        2,
        2,
        QuizMode::Retry,
        base + Duration::minutes(1),
    )
    .await;
    insert_attempt(
        ctx.state.db(),
        &student.id,
        &newer.id,
        1,
        1,
        4,
        QuizMode::Retry,
        base + Duration::minutes(5),
    )
    .await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/quiz-attempts?latest_per_book=true&limit=1",
            Some(&token),
            None,
        ))
        .await
        .expect("first window");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    let items = listed["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["book_id"], newer.id.as_str());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/quiz-attempts?latest_per_book=true&skip=1&limit=1",
            Some(&token),
            None,
        ))
        .await
        .expect("second window");

    let status = response.status();
    let listed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    let items = listed["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["book_id"], older.id.as_str());
    assert_eq!(items[0]["attempt_number"], 2);
}
