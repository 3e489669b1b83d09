use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedBusiness,
    entities::supplier,
    errors::{ErrorResponse, ServiceError},
    services::suppliers::{CategoryQuery, NewSupplier, SupplierUpdate},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

#[utoipa::path(
    post,
    path = "/suppliers",
    tag = "suppliers",
    request_body = NewSupplier,
    responses(
        (status = 201, description = "Supplier created", body = supplier::Model),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
    )
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<NewSupplier>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let supplier = state
        .services
        .suppliers
        .create(auth.business_id, payload)
        .await?;
    Ok(created_response(supplier))
}

#[utoipa::path(
    get,
    path = "/suppliers",
    tag = "suppliers",
    responses((status = 200, description = "Suppliers of the business", body = [supplier::Model]))
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = state.services.suppliers.list(auth.business_id).await?;
    Ok(success_response(suppliers))
}

#[utoipa::path(
    get,
    path = "/suppliers/{id}",
    tag = "suppliers",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier", body = supplier::Model),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
    )
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.suppliers.get(auth.business_id, id).await?;
    Ok(success_response(supplier))
}

#[utoipa::path(
    get,
    path = "/suppliers/categories",
    tag = "suppliers",
    responses((status = 200, description = "Distinct supplier categories", body = [String]))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.suppliers.categories(auth.business_id).await?;
    Ok(success_response(categories))
}

#[utoipa::path(
    get,
    path = "/suppliers/category",
    tag = "suppliers",
    params(CategoryQuery),
    responses((status = 200, description = "Suppliers in the category", body = [supplier::Model]))
)]
pub async fn suppliers_by_category(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Query(query): Query<CategoryQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = state
        .services
        .suppliers
        .by_category(auth.business_id, &query.category)
        .await?;
    Ok(success_response(suppliers))
}

/// Supplier of an order. The path id is an order id here, unlike PUT/DELETE.
#[utoipa::path(
    get,
    path = "/supplier/{id}",
    tag = "suppliers",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Supplier the order was placed with", body = supplier::Model),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn supplier_for_order(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state
        .services
        .suppliers
        .for_order(auth.business_id, order_id)
        .await?;
    Ok(success_response(supplier))
}

#[utoipa::path(
    put,
    path = "/supplier/{id}",
    tag = "suppliers",
    params(("id" = i32, Path, description = "Supplier id")),
    request_body = SupplierUpdate,
    responses(
        (status = 200, description = "Supplier updated", body = supplier::Model),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
    )
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
    Json(payload): Json<SupplierUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let supplier = state
        .services
        .suppliers
        .update(auth.business_id, id, payload)
        .await?;
    Ok(success_response(supplier))
}

#[utoipa::path(
    delete,
    path = "/supplier/{id}",
    tag = "suppliers",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
        (status = 409, description = "Supplier is referenced by orders", body = ErrorResponse),
    )
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.suppliers.delete(auth.business_id, id).await?;
    Ok(no_content_response())
}

pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route("/suppliers/categories", get(list_categories))
        .route("/suppliers/category", get(suppliers_by_category))
        .route("/suppliers/:id", get(get_supplier))
        .route(
            "/supplier/:id",
            get(supplier_for_order)
                .put(update_supplier)
                .delete(delete_supplier),
        )
}
