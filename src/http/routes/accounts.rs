// ==========================================
// 登录 / 用户 / 个人资料 / 配置 路由
// ==========================================

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::{CreateUserInput, LoginForm, LoginResponse, PatchOutcome, ProfileInput, UpdateUserInput};
use crate::auth::policy::{Action, Resource};
use crate::http::error::blocking;
use crate::http::extract::Caller;
use crate::http::SharedState;

pub fn auth_routes() -> Router<SharedState> {
    Router::new().route("/login", post(login))
}

pub fn settings_routes() -> Router<SharedState> {
    Router::new().route("/profile", put(update_profile))
}

pub fn user_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

pub fn config_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_configs))
        .route("/{key}", put(update_config))
}

fn patch_message(outcome: PatchOutcome, updated: &str) -> Json<Value> {
    let message = match outcome {
        PatchOutcome::Updated => updated,
        PatchOutcome::NoChanges => "No fields to update",
    };
    Json(json!({ "message": message }))
}

// ==========================================
// 登录 / 个人资料
// ==========================================

async fn login(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<LoginResponse>> {
    let api = state.auth_api.clone();
    let resp = blocking(move || api.login(&form.username, &form.password)).await?;
    Ok(Json(resp))
}

async fn update_profile(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<ProfileInput>,
) -> ApiResult<Json<Value>> {
    let principal = caller.require(&state, Action::Update, Resource::Profile)?;
    let api = state.user_api.clone();
    let outcome = blocking(move || api.update_profile(&principal, input)).await?;
    Ok(patch_message(outcome, "Profile updated"))
}

// ==========================================
// 用户
// ==========================================

async fn list_users(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::User)?;
    let api = state.user_api.clone();
    let users = blocking(move || api.list_users()).await?;
    Ok(Json(json!({ "users": users })))
}

async fn get_user(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::User)?;
    let api = state.user_api.clone();
    let user = blocking(move || api.get_user(id)).await?;
    Ok(Json(json!({ "user": user })))
}

async fn create_user(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<CreateUserInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::User)?;
    let api = state.user_api.clone();
    let id = blocking(move || api.create_user(input)).await?;
    Ok(Json(json!({ "id": id })))
}

async fn update_user(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUserInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::User)?;
    let api = state.user_api.clone();
    let outcome = blocking(move || api.update_user(id, input)).await?;
    Ok(patch_message(outcome, "User updated"))
}

async fn delete_user(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::User)?;
    let api = state.user_api.clone();
    blocking(move || api.delete_user(id)).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}

// ==========================================
// 配置
// ==========================================

#[derive(Debug, Deserialize)]
struct ConfigValueInput {
    value: String,
}

async fn list_configs(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Config)?;
    let api = state.config_api.clone();
    let overview = blocking(move || api.list_configs()).await?;
    Ok(Json(json!({ "config": overview })))
}

async fn update_config(
    State(state): State<SharedState>,
    caller: Caller,
    Path(key): Path<String>,
    Json(input): Json<ConfigValueInput>,
) -> ApiResult<Json<Value>> {
    let principal = caller.require(&state, Action::Update, Resource::Config)?;
    let api = state.config_api.clone();
    blocking(move || api.update_config(&key, &input.value, &principal)).await?;
    Ok(Json(json!({ "message": "Config updated" })))
}
