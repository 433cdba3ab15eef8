// ==========================================
// 班次 / 停机 / 告警 / 设备事件 路由
// ==========================================

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::{AlarmInput, EventInput, ShiftInput, StopInput};
use crate::auth::policy::{Action, Resource};
use crate::http::error::blocking;
use crate::http::extract::Caller;
use crate::http::SharedState;

pub fn shift_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_shifts).post(create_shift))
        .route("/{id}", get(get_shift).put(update_shift).delete(delete_shift))
}

pub fn stop_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_stops).post(create_stop))
        .route("/{id}", get(get_stop).put(update_stop).delete(delete_stop))
}

pub fn alarm_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_alarms).post(create_alarm))
        .route("/{id}", get(get_alarm).put(update_alarm).delete(delete_alarm))
}

pub fn event_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event))
}

// ==========================================
// 班次
// ==========================================

async fn list_shifts(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Shift)?;
    let api = state.shift_api.clone();
    let shifts = blocking(move || api.list_shifts()).await?;
    Ok(Json(json!({ "shifts": shifts })))
}

async fn get_shift(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Shift)?;
    let api = state.shift_api.clone();
    let shift = blocking(move || api.get_shift(id)).await?;
    Ok(Json(json!({ "shift": shift })))
}

async fn create_shift(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<ShiftInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::Shift)?;
    let api = state.shift_api.clone();
    let id = blocking(move || api.create_shift(input)).await?;
    Ok(Json(json!({ "id": id })))
}

async fn update_shift(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<ShiftInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::Shift)?;
    let api = state.shift_api.clone();
    blocking(move || api.update_shift(id, input)).await?;
    Ok(Json(json!({ "message": "Shift updated" })))
}

async fn delete_shift(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::Shift)?;
    let api = state.shift_api.clone();
    blocking(move || api.delete_shift(id)).await?;
    Ok(Json(json!({ "message": "Shift deleted" })))
}

// ==========================================
// 停机
// ==========================================

async fn list_stops(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Stop)?;
    let api = state.stop_api.clone();
    let stops = blocking(move || api.list_stops()).await?;
    Ok(Json(json!({ "stops": stops })))
}

async fn get_stop(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Stop)?;
    let api = state.stop_api.clone();
    let stop = blocking(move || api.get_stop(id)).await?;
    Ok(Json(json!({ "stop": stop })))
}

async fn create_stop(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<StopInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::Stop)?;
    let api = state.stop_api.clone();
    let id = blocking(move || api.create_stop(input)).await?;
    Ok(Json(json!({ "id": id })))
}

async fn update_stop(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<StopInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::Stop)?;
    let api = state.stop_api.clone();
    blocking(move || api.update_stop(id, input)).await?;
    Ok(Json(json!({ "message": "Stop updated" })))
}

async fn delete_stop(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::Stop)?;
    let api = state.stop_api.clone();
    blocking(move || api.delete_stop(id)).await?;
    Ok(Json(json!({ "message": "Stop deleted" })))
}

// ==========================================
// 告警
// ==========================================

async fn list_alarms(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Alarm)?;
    let api = state.alarm_api.clone();
    let alarms = blocking(move || api.list_alarms()).await?;
    Ok(Json(json!({ "alarms": alarms })))
}

async fn get_alarm(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Alarm)?;
    let api = state.alarm_api.clone();
    let alarm = blocking(move || api.get_alarm(id)).await?;
    Ok(Json(json!({ "alarm": alarm })))
}

async fn create_alarm(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<AlarmInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::Alarm)?;
    let api = state.alarm_api.clone();
    let id = blocking(move || api.create_alarm(input)).await?;
    Ok(Json(json!({ "id": id })))
}

async fn update_alarm(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<AlarmInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::Alarm)?;
    let api = state.alarm_api.clone();
    blocking(move || api.update_alarm(id, input)).await?;
    Ok(Json(json!({ "message": "Alarm updated" })))
}

async fn delete_alarm(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::Alarm)?;
    let api = state.alarm_api.clone();
    blocking(move || api.delete_alarm(id)).await?;
    Ok(Json(json!({ "message": "Alarm deleted" })))
}

// ==========================================
// 设备事件
// ==========================================

async fn list_events(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Event)?;
    let api = state.event_api.clone();
    let events = blocking(move || api.list_events()).await?;
    Ok(Json(json!({ "events": events })))
}

async fn get_event(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Event)?;
    let api = state.event_api.clone();
    let event = blocking(move || api.get_event(id)).await?;
    Ok(Json(json!({ "event": event })))
}

async fn create_event(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<EventInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::Event)?;
    let api = state.event_api.clone();
    let id = blocking(move || api.create_event(input)).await?;
    Ok(Json(json!({ "id": id })))
}

async fn update_event(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<EventInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::Event)?;
    let api = state.event_api.clone();
    blocking(move || api.update_event(id, input)).await?;
    Ok(Json(json!({ "message": "Event updated" })))
}

async fn delete_event(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::Event)?;
    let api = state.event_api.clone();
    blocking(move || api.delete_event(id)).await?;
    Ok(Json(json!({ "message": "Event deleted" })))
}
