use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedBusiness,
    entities::sale,
    errors::{ErrorResponse, ServiceError},
    services::sales::{NewSale, SaleUpdate},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

/// Sells stock at the product's current price
#[utoipa::path(
    post,
    path = "/sales",
    tag = "sales",
    request_body = NewSale,
    responses(
        (status = 201, description = "Sale recorded, stock decremented and balance credited", body = sale::Model),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Product or customer not found", body = ErrorResponse),
        (status = 422, description = "Insufficient stock", body = ErrorResponse),
    )
)]
pub async fn record_sale(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<NewSale>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let sale = state.services.sales.record(auth.business_id, payload).await?;
    Ok(created_response(sale))
}

#[utoipa::path(
    get,
    path = "/sales",
    tag = "sales",
    responses((status = 200, description = "Sales of the business, newest first", body = [sale::Model]))
)]
pub async fn list_sales(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let sales = state.services.sales.list(auth.business_id).await?;
    Ok(success_response(sales))
}

#[utoipa::path(
    get,
    path = "/sale/{id}",
    tag = "sales",
    params(("id" = i32, Path, description = "Sale id")),
    responses(
        (status = 200, description = "Sale", body = sale::Model),
        (status = 404, description = "Sale not found", body = ErrorResponse),
    )
)]
pub async fn get_sale(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let sale = state.services.sales.get(auth.business_id, id).await?;
    Ok(success_response(sale))
}

#[utoipa::path(
    put,
    path = "/sale/{id}",
    tag = "sales",
    params(("id" = i32, Path, description = "Sale id")),
    request_body = SaleUpdate,
    responses(
        (status = 200, description = "Sale updated", body = sale::Model),
        (status = 404, description = "Sale not found", body = ErrorResponse),
        (status = 422, description = "Insufficient stock or funds", body = ErrorResponse),
    )
)]
pub async fn update_sale(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
    Json(payload): Json<SaleUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let sale = state
        .services
        .sales
        .update(auth.business_id, id, payload)
        .await?;
    Ok(success_response(sale))
}

#[utoipa::path(
    delete,
    path = "/sale/{id}",
    tag = "sales",
    params(("id" = i32, Path, description = "Sale id")),
    responses(
        (status = 204, description = "Sale record deleted"),
        (status = 404, description = "Sale not found", body = ErrorResponse),
    )
)]
pub async fn delete_sale(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.sales.delete(auth.business_id, id).await?;
    Ok(no_content_response())
}

pub fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(record_sale))
        .route(
            "/sale/:id",
            get(get_sale).put(update_sale).delete(delete_sale),
        )
}
