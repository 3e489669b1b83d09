use super::common::{created_response, no_content_response, parse_date, success_response, validate_input};
use crate::{
    auth::AuthenticatedBusiness,
    entities::order,
    errors::{ErrorResponse, ServiceError},
    services::orders::{OrderDetailView, OrderSummary, OrderWithDetails, PlaceOrder, UpdateOrder},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

/// Places an order with a supplier
#[utoipa::path(
    post,
    path = "/allOrders",
    tag = "orders",
    request_body = PlaceOrder,
    responses(
        (status = 201, description = "Order placed, stock received and balance debited", body = OrderWithDetails),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 422, description = "Insufficient funds", body = ErrorResponse),
    )
)]
pub async fn place_order(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<PlaceOrder>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let order = state.services.orders.place(auth.business_id, payload).await?;
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    responses((status = 200, description = "Orders with supplier names", body = [OrderSummary]))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.list(auth.business_id).await?;
    Ok(success_response(orders))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with supplier and details", body = OrderWithDetails),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get(auth.business_id, id).await?;
    Ok(success_response(order))
}

#[utoipa::path(
    get,
    path = "/order-details/{id}",
    tag = "orders",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Line items of the order", body = [OrderDetailView]),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn order_details(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let details = state.services.orders.details(auth.business_id, id).await?;
    Ok(success_response(details))
}

#[utoipa::path(
    get,
    path = "/orders-by-supplier/{id}",
    tag = "orders",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Orders placed with the supplier", body = [order::Model]),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
    )
)]
pub async fn orders_by_supplier(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state
        .services
        .orders
        .by_supplier(auth.business_id, id)
        .await?;
    Ok(success_response(orders))
}

#[utoipa::path(
    get,
    path = "/orders-by-date/{date}",
    tag = "orders",
    params(("date" = String, Path, description = "Order date, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Orders placed on that date", body = [OrderSummary]),
        (status = 400, description = "Malformed date", body = ErrorResponse),
    )
)]
pub async fn orders_by_date(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let date = parse_date(&date)?;
    let orders = state.services.orders.by_date(auth.business_id, date).await?;
    Ok(success_response(orders))
}

#[utoipa::path(
    get,
    path = "/order-details-by-product/{name}",
    tag = "orders",
    params(("name" = String, Path, description = "Product name")),
    responses((status = 200, description = "Order lines for the product", body = [OrderDetailView]))
)]
pub async fn order_details_by_product(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let details = state
        .services
        .orders
        .details_by_product(auth.business_id, &name)
        .await?;
    Ok(success_response(details))
}

#[utoipa::path(
    put,
    path = "/update-order/{id}",
    tag = "orders",
    params(("id" = i32, Path, description = "Order id")),
    request_body = UpdateOrder,
    responses(
        (status = 200, description = "Order updated", body = OrderWithDetails),
        (status = 404, description = "Order or order line not found", body = ErrorResponse),
        (status = 422, description = "Insufficient stock or funds", body = ErrorResponse),
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrder>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let order = state
        .services
        .orders
        .update(auth.business_id, id, payload)
        .await?;
    Ok(success_response(order))
}

#[utoipa::path(
    delete,
    path = "/delete-order/{id}",
    tag = "orders",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete(auth.business_id, id).await?;
    Ok(no_content_response())
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/allOrders", post(place_order))
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/order-details/:id", get(order_details))
        .route("/orders-by-supplier/:id", get(orders_by_supplier))
        .route("/orders-by-date/:date", get(orders_by_date))
        .route("/order-details-by-product/:name", get(order_details_by_product))
        .route("/update-order/:id", put(update_order))
        .route("/delete-order/:id", delete(delete_order))
}
