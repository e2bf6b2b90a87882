//! Handlers for user management, reviewer views and comments.

use super::pages::IdQuery;
use super::extract::{ValidJson, ValidQuery, blocking};
use super::server::AppState;
use super::session::CurrentUser;
use crate::actions::comments::{self as comment_actions, CommentInput};
use crate::actions::staff::{self, StaffEntry, StaffForm, UserInput};
use crate::actions::supervision::{self, StaffPerformance, StaffReport};
use crate::error::{AppError, AppResult};
use crate::types::{Comment, CommentTarget, User};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    pub objective_id: Option<i64>,
    pub activity_id: Option<i64>,
}

// Staff management

pub async fn staff_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<StaffEntry>>> {
    Ok(Json(staff::list_staff(&state.db, &user)?))
}

pub async fn new_staff_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<StaffForm>> {
    Ok(Json(staff::staff_form(&state.db, &user, None)?))
}

pub async fn create_staff(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<UserInput>,
) -> AppResult<Response> {
    let db = state.db.clone();
    let created = blocking(move || staff::create_user(&db, &user, &input)).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub async fn staff_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<Json<StaffForm>> {
    Ok(Json(staff::staff_form(&state.db, &user, Some(q.id))?))
}

pub async fn update_staff(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
    ValidJson(input): ValidJson<UserInput>,
) -> AppResult<Json<User>> {
    let db = state.db.clone();
    let updated = blocking(move || staff::update_user(&db, &user, q.id, &input)).await?;
    Ok(Json(updated))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<StatusCode> {
    staff::delete_user(&state.db, &user, q.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Reviewer views

pub async fn supervisor_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<StaffPerformance>>> {
    Ok(Json(supervision::supervisor_dashboard(&state.db, &user)?))
}

pub async fn staff_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<Json<StaffReport>> {
    Ok(Json(supervision::staff_report(&state.db, &user, q.id)?))
}

// Comments

pub async fn list_comments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<CommentsQuery>,
) -> AppResult<Json<Vec<Comment>>> {
    let target = CommentTarget::from_columns(q.objective_id, q.activity_id).ok_or_else(|| {
        AppError::invalid(
            "target",
            "exactly one of objective_id or activity_id is required",
        )
    })?;
    Ok(Json(comment_actions::list_comments(&state.db, &user, target)?))
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<CommentInput>,
) -> AppResult<Response> {
    let comment = comment_actions::add_comment(&state.db, &user, &input)?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<StatusCode> {
    comment_actions::delete_comment(&state.db, &user, q.id)?;
    Ok(StatusCode::NO_CONTENT)
}
