use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStaff, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::badge::{BadgeCreate, BadgeListQuery, BadgeResponse, BadgeUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_badges).post(create_badge))
        .route("/:badge_id", get(get_badge).patch(update_badge).delete(delete_badge))
}

async fn list_badges(
    Query(params): Query<BadgeListQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<BadgeResponse>>, ApiError> {
    let active_only = params.active_only || !user.role.is_staff();
    let badges = repositories::badges::list(state.db(), active_only)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list badges"))?;

    Ok(Json(badges.into_iter().map(BadgeResponse::from_db).collect()))
}

async fn create_badge(
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<BadgeCreate>,
) -> Result<(StatusCode, Json<BadgeResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let badge = repositories::badges::create(
        state.db(),
        repositories::badges::CreateBadge {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            description: payload.description.as_deref(),
            icon_url: payload.icon_url.as_deref(),
            is_generic: payload.is_generic,
            is_active: payload.is_active,
            created_by: &staff.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create badge"))?;

    tracing::info!(
        user_id = %staff.id,
        badge_id = %badge.id,
        action = "badge_create",
        "Badge created"
    );

    Ok((StatusCode::CREATED, Json(BadgeResponse::from_db(badge))))
}

async fn get_badge(
    Path(badge_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<BadgeResponse>, ApiError> {
    let badge = repositories::badges::find_by_id(state.db(), &badge_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch badge"))?
        .ok_or_else(|| ApiError::NotFound("Badge not found".to_string()))?;

    Ok(Json(BadgeResponse::from_db(badge)))
}

async fn update_badge(
    Path(badge_id): Path<String>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<BadgeUpdate>,
) -> Result<Json<BadgeResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = repositories::badges::update(
        state.db(),
        &badge_id,
        repositories::badges::UpdateBadge {
            name: payload.name.map(|name| name.trim().to_string()),
            description: payload.description,
            icon_url: payload.icon_url,
            is_generic: payload.is_generic,
            is_active: payload.is_active,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update badge"))?;

    if !updated {
        return Err(ApiError::NotFound("Badge not found".to_string()));
    }

    let badge = repositories::badges::fetch_one_by_id(state.db(), &badge_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch updated badge"))?;

    tracing::info!(
        user_id = %staff.id,
        badge_id = %badge.id,
        action = "badge_update",
        "Badge updated"
    );

    Ok(Json(BadgeResponse::from_db(badge)))
}

/// Removing a badge also removes its book mappings and every earned copy.
async fn delete_badge(
    Path(badge_id): Path<String>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::badges::delete(state.db(), &badge_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete badge"))?;

    if !deleted {
        return Err(ApiError::NotFound("Badge not found".to_string()));
    }

    tracing::info!(
        user_id = %staff.id,
        badge_id = %badge_id,
        action = "badge_delete",
        "Badge deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::db::types::UserRole;
    use crate::test_support;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn deleting_badge_cascades_earned_copies() {
        let ctx = test_support::setup_test_context().await;

        let admin =
            test_support::insert_user(ctx.state.db(), "admin20", "Admin", UserRole::Admin, "admin-pass")
                .await;
        let student = test_support::insert_user(
            ctx.state.db(),
            "student20",
            "Student",
            UserRole::Student,
            "student-pass",
        )
        .await;
        let book = test_support::insert_book(ctx.state.db(), "Mga Kuwento ni Lola Basyang", &admin.id)
            .await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/badges",
                Some(&token),
                Some(json!({ "name": "Bituin", "iconUrl": "https://cdn.example/bituin.png" })),
            ))
            .await
            .expect("create badge");

        let status = response.status();
        let badge = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CREATED, "response: {badge}");
        assert_eq!(badge["icon_url"], "https://cdn.example/bituin.png");
        let badge_id = badge["id"].as_str().expect("badge id").to_string();

        test_support::map_badge(ctx.state.db(), &book.id, &badge_id).await;
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/users/{}/badges", student.id),
                Some(&token),
                Some(json!({ "badge_id": badge_id, "book_id": book.id })),
            ))
            .await
            .expect("award badge");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::DELETE,
                &format!("/api/v1/badges/{badge_id}"),
                Some(&token),
                None,
            ))
            .await
            .expect("delete badge");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let remaining: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM earned_badges) + (SELECT COUNT(*) FROM book_badges)",
        )
        .fetch_one(ctx.state.db())
        .await
        .expect("count remaining");
        assert_eq!(remaining, 0);

        let response = ctx
            .app
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/api/v1/badges/{badge_id}"),
                Some(&token),
                None,
            ))
            .await
            .expect("get deleted badge");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn students_only_list_active_badges() {
        let ctx = test_support::setup_test_context().await;

        let teacher = test_support::insert_user(
            ctx.state.db(),
            "guro21",
            "Guro",
            UserRole::Teacher,
            "teacher-pass",
        )
        .await;
        let student = test_support::insert_user(
            ctx.state.db(),
            "student21",
            "Student",
            UserRole::Student,
            "student-pass",
        )
        .await;
        let retired = test_support::insert_badge(ctx.state.db(), "Luma", &teacher.id).await;
        test_support::insert_badge(ctx.state.db(), "Bago", &teacher.id).await;
        let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());
        let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/badges/{}", retired.id),
                Some(&teacher_token),
                Some(json!({ "is_active": false })),
            ))
            .await
            .expect("retire badge");
        assert_eq!(response.status(), StatusCode::OK);

        let response = ctx
            .app
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/badges",
                Some(&student_token),
                None,
            ))
            .await
            .expect("list badges");

        let status = response.status();
        let listed = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {listed}");
        let names: Vec<&str> =
            listed.as_array().expect("array").iter().filter_map(|b| b["name"].as_str()).collect();
        assert_eq!(names, vec!["Bago"]);
    }
}
