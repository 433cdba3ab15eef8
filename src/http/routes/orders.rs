// ==========================================
// 产品 / 工单 路由
// ==========================================

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::{ProductInput, WorkOrderInput};
use crate::auth::policy::{Action, Resource};
use crate::http::error::blocking;
use crate::http::extract::Caller;
use crate::http::SharedState;

pub fn product_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/{id}", put(update_product).delete(delete_product))
}

pub fn work_order_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_work_orders).post(create_work_order))
        .route("/{id}", put(update_work_order).delete(delete_work_order))
}

// ==========================================
// 产品
// ==========================================

async fn list_products(State(state): State<SharedState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::Product)?;
    let api = state.product_api.clone();
    let products = blocking(move || api.list_products()).await?;
    Ok(Json(json!({ "products": products })))
}

async fn create_product(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::Product)?;
    let api = state.product_api.clone();
    let product = blocking(move || {
        let id = api.create_product(input)?;
        api.get_product(id)
    })
    .await?;
    Ok(Json(json!({
        "id": product.id,
        "created_at": product.created_at,
        "updated_at": product.updated_at,
    })))
}

async fn update_product(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::Product)?;
    let api = state.product_api.clone();
    blocking(move || api.update_product(id, input)).await?;
    Ok(Json(json!({ "message": "Product updated" })))
}

async fn delete_product(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::Product)?;
    let api = state.product_api.clone();
    blocking(move || api.delete_product(id)).await?;
    Ok(Json(json!({ "message": "Product deleted" })))
}

// ==========================================
// 工单
// ==========================================

async fn list_work_orders(
    State(state): State<SharedState>,
    caller: Caller,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Read, Resource::WorkOrder)?;
    let api = state.work_order_api.clone();
    let orders = blocking(move || api.list_work_orders()).await?;
    Ok(Json(json!({ "work_orders": orders })))
}

async fn create_work_order(
    State(state): State<SharedState>,
    caller: Caller,
    Json(input): Json<WorkOrderInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Create, Resource::WorkOrder)?;
    let api = state.work_order_api.clone();
    let order = blocking(move || {
        let id = api.create_work_order(input)?;
        api.get_work_order(id)
    })
    .await?;
    Ok(Json(json!({
        "id": order.id,
        "created_at": order.created_at,
        "updated_at": order.updated_at,
    })))
}

async fn update_work_order(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(input): Json<WorkOrderInput>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Update, Resource::WorkOrder)?;
    let api = state.work_order_api.clone();
    blocking(move || api.update_work_order(id, input)).await?;
    Ok(Json(json!({ "message": "Work order updated" })))
}

async fn delete_work_order(
    State(state): State<SharedState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    caller.authorize(&state, Action::Delete, Resource::WorkOrder)?;
    let api = state.work_order_api.clone();
    blocking(move || api.delete_work_order(id)).await?;
    Ok(Json(json!({ "message": "Work order deleted" })))
}
