// ==========================================
// 设备 / 产线 路由
// ==========================================

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::{MachineInput, ProductionLineInput};
use crate::auth::policy::{Action, Resource};
use crate::http::error::blocking;
use crate::http::extract::Caller;
use crate::http::SharedState;

pub fn machine_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_machines).post(create_machine))
        .route(
            "/{id}",
            get(get_machine).put(update_machine).delete(delete_machine),
        )
        .route("/{id}/oee", get(get_machine_oee))
}

pub fn production_line_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_lines).post(create_line))
        .route("/{id}", get(get_line).put(update_line).delete(delete_line))
}

// ==========================================
// 设备
// ==========================================

async fn list_machines(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Machine)?;
    let api = state.machine_api.clone();
    let machines = blocking(move || api.list_machines()).await?;
    Ok(Json(json!({ "machines": machines })))
}

async fn get_machine(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Machine)?;
    let api = state.machine_api.clone();
    let machine = blocking(move || api.get_machine(id)).await?;
    Ok(Json(json!({ "machine": machine })))
}

#[derive(Debug, Deserialize)]
struct OeeQuery {
    shift_id: Option<i64>,
}

async fn get_machine_oee(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Query(query): Query<OeeQuery>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Machine)?;
    let api = state.machine_api.clone();
    let report = blocking(move || api.get_machine_oee(id, query.shift_id)).await?;
    Ok(Json(json!({ "oee": report })))
}

async fn create_machine(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<MachineInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::Machine)?;
    let api = state.machine_api.clone();
    let id = blocking(move || api.create_machine(input)).await?;
    Ok(Json(json!({ "id": id })))
}

async fn update_machine(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<MachineInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::Machine)?;
    let api = state.machine_api.clone();
    blocking(move || api.update_machine(id, input)).await?;
    Ok(Json(json!({ "message": "Machine updated" })))
}

async fn delete_machine(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::Machine)?;
    let api = state.machine_api.clone();
    blocking(move || api.delete_machine(id)).await?;
    Ok(Json(json!({ "message": "Machine deleted" })))
}

// ==========================================
// 产线
// ==========================================

async fn list_lines(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::ProductionLine)?;
    let api = state.production_line_api.clone();
    let lines = blocking(move || api.list_lines()).await?;
    Ok(Json(json!({ "production_lines": lines })))
}

async fn get_line(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::ProductionLine)?;
    let api = state.production_line_api.clone();
    let line = blocking(move || api.get_line(id)).await?;
    Ok(Json(json!({ "production_line": line })))
}

async fn create_line(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<ProductionLineInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::ProductionLine)?;
    let api = state.production_line_api.clone();
    let id = blocking(move || api.create_line(input)).await?;
    Ok(Json(json!({ "id": id })))
}

async fn update_line(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<ProductionLineInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::ProductionLine)?;
    let api = state.production_line_api.clone();
    blocking(move || api.update_line(id, input)).await?;
    Ok(Json(json!({ "message": "Production line updated" })))
}

async fn delete_line(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::ProductionLine)?;
    let api = state.production_line_api.clone();
    blocking(move || api.delete_line(id)).await?;
    Ok(Json(json!({ "message": "Production line deleted" })))
}
