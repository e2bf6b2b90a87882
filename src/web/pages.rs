//! Handlers for authentication, personal views and the objective hierarchy.
//!
//! GET renders a view model as JSON, POST mutates with a JSON body. Record
//! ids travel as query parameters.

use super::extract::{ValidJson, ValidQuery, blocking};
use super::server::AppState;
use super::session::{CurrentUser, clear_session_cookie, session_token, set_session_cookie};
use crate::actions::activities::{self as activity_actions, ActivityForm, ActivityInput};
use crate::actions::auth::{self, LoginInput, RegisterInput};
use crate::actions::objectives::{self as objective_actions, ObjectiveInput};
use crate::actions::outcomes::{self as outcome_actions, OutcomeInput};
use crate::actions::reports::{self, Dashboard, Report};
use crate::actions::tasks::{self as task_actions, TaskForm, TaskInput};
use crate::error::{AppError, AppResult};
use crate::types::{Activity, ExpectedOutcome, Objective, ObjectiveTree, Task, User};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ObjectiveQuery {
    pub objective_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct OutcomeQuery {
    pub outcome_id: i64,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

fn created<T: Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

// Authentication

pub async fn root(user: Result<CurrentUser, AppError>) -> Redirect {
    match user {
        Ok(_) => Redirect::to("/dashboard"),
        Err(_) => Redirect::to("/login"),
    }
}

pub async fn login_page() -> Json<Message> {
    Json(Message {
        message: "POST username and password to /login",
    })
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    ValidJson(input): ValidJson<LoginInput>,
) -> AppResult<Json<User>> {
    let db = state.db.clone();
    let ttl_hours = state.session.ttl_hours;
    let session = blocking(move || auth::login(&db, &input, ttl_hours)).await?;
    set_session_cookie(&cookies, &state.session, &session.token);
    Ok(Json(session.user))
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> AppResult<Json<Message>> {
    if let Some(token) = session_token(&cookies, &state.session) {
        auth::logout(&state.db, &token)?;
    }
    clear_session_cookie(&cookies, &state.session);
    Ok(Json(Message {
        message: "logged out",
    }))
}

pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    ValidJson(input): ValidJson<RegisterInput>,
) -> AppResult<Response> {
    let db = state.db.clone();
    let ttl_hours = state.session.ttl_hours;
    let session = blocking(move || auth::register(&db, &input, ttl_hours)).await?;
    set_session_cookie(&cookies, &state.session, &session.token);
    Ok(created(session.user))
}

// Personal views

pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Dashboard>> {
    Ok(Json(reports::dashboard(&state.db, &user)?))
}

pub async fn objectives_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<ObjectiveTree>>> {
    Ok(Json(objective_actions::my_objective_trees(&state.db, &user)?))
}

pub async fn reports_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Report>> {
    Ok(Json(reports::report(&state.db, &user)?))
}

pub async fn tasks_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(task_actions::my_tasks(&state.db, &user)?))
}

// Objectives

pub async fn new_objective_form(CurrentUser(_): CurrentUser) -> Json<Option<Objective>> {
    Json(None)
}

pub async fn create_objective(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<ObjectiveInput>,
) -> AppResult<Response> {
    Ok(created(objective_actions::create_objective(&state.db, &user, &input)?))
}

pub async fn objective_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<Json<Objective>> {
    Ok(Json(objective_actions::editable_objective(&state.db, &user, q.id)?))
}

pub async fn update_objective(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
    ValidJson(input): ValidJson<ObjectiveInput>,
) -> AppResult<Json<Objective>> {
    Ok(Json(objective_actions::update_objective(&state.db, &user, q.id, &input)?))
}

pub async fn delete_objective(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<StatusCode> {
    objective_actions::delete_objective(&state.db, &user, q.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Expected outcomes

pub async fn new_outcome_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<ObjectiveQuery>,
) -> AppResult<Json<Objective>> {
    Ok(Json(outcome_actions::outcome_parent(&state.db, &user, q.objective_id)?))
}

pub async fn create_outcome(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<ObjectiveQuery>,
    ValidJson(input): ValidJson<OutcomeInput>,
) -> AppResult<Response> {
    Ok(created(outcome_actions::create_outcome(
        &state.db,
        &user,
        q.objective_id,
        &input,
    )?))
}

pub async fn outcome_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<Json<ExpectedOutcome>> {
    Ok(Json(outcome_actions::editable_outcome(&state.db, &user, q.id)?))
}

pub async fn update_outcome(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
    ValidJson(input): ValidJson<OutcomeInput>,
) -> AppResult<Json<ExpectedOutcome>> {
    Ok(Json(outcome_actions::update_outcome(&state.db, &user, q.id, &input)?))
}

pub async fn delete_outcome(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<StatusCode> {
    outcome_actions::delete_outcome(&state.db, &user, q.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Activities

pub async fn new_activity_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<OutcomeQuery>,
) -> AppResult<Json<ActivityForm>> {
    Ok(Json(activity_actions::new_activity_form(&state.db, &user, q.outcome_id)?))
}

pub async fn create_activity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<OutcomeQuery>,
    ValidJson(input): ValidJson<ActivityInput>,
) -> AppResult<Response> {
    Ok(created(activity_actions::create_activity(
        &state.db,
        &user,
        q.outcome_id,
        &input,
    )?))
}

pub async fn activity_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<Json<ActivityForm>> {
    Ok(Json(activity_actions::edit_activity_form(&state.db, &user, q.id)?))
}

pub async fn update_activity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
    ValidJson(input): ValidJson<ActivityInput>,
) -> AppResult<Json<Activity>> {
    Ok(Json(activity_actions::update_activity(&state.db, &user, q.id, &input)?))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<StatusCode> {
    activity_actions::delete_activity(&state.db, &user, q.id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Tasks

pub async fn new_task_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<TaskForm>> {
    Ok(Json(task_actions::task_form(&state.db, &user, None)?))
}

pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<TaskInput>,
) -> AppResult<Response> {
    Ok(created(task_actions::create_task(&state.db, &user, &input)?))
}

pub async fn task_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<Json<TaskForm>> {
    Ok(Json(task_actions::task_form(&state.db, &user, Some(q.id))?))
}

pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
    ValidJson(input): ValidJson<TaskInput>,
) -> AppResult<Json<Task>> {
    Ok(Json(task_actions::update_task(&state.db, &user, q.id, &input)?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidQuery(q): ValidQuery<IdQuery>,
) -> AppResult<StatusCode> {
    task_actions::delete_task(&state.db, &user, q.id)?;
    Ok(StatusCode::NO_CONTENT)
}
