use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedBusiness,
    entities::product,
    errors::{ErrorResponse, ServiceError},
    services::products::{LowStockProduct, NewProduct, ProductUpdate},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = product::Model),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Supplier not found", body = ErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .create(auth.business_id, payload)
        .await?;
    Ok(created_response(product))
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses((status = 200, description = "Products of the business", body = [product::Model]))
)]
pub async fn list_products(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.list(auth.business_id).await?;
    Ok(success_response(products))
}

#[utoipa::path(
    get,
    path = "/products/name/{name}",
    tag = "products",
    params(("name" = String, Path, description = "Exact product name")),
    responses((status = 200, description = "Products with that name", body = [product::Model]))
)]
pub async fn products_by_name(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state
        .services
        .products
        .find_by_name(auth.business_id, &name)
        .await?;
    Ok(success_response(products))
}

#[utoipa::path(
    get,
    path = "/products/low-stock",
    tag = "products",
    responses((status = 200, description = "Products at or below their reorder level", body = [LowStockProduct]))
)]
pub async fn low_stock_products(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.low_stock(auth.business_id).await?;
    Ok(success_response(products))
}

#[utoipa::path(
    get,
    path = "/product/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = product::Model),
        (status = 404, description = "Product not found", body = ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.get(auth.business_id, id).await?;
    Ok(success_response(product))
}

#[utoipa::path(
    put,
    path = "/product/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductUpdate,
    responses(
        (status = 200, description = "Product updated", body = product::Model),
        (status = 404, description = "Product or supplier not found", body = ErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
    Json(payload): Json<ProductUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .update(auth.business_id, id, payload)
        .await?;
    Ok(success_response(product))
}

#[utoipa::path(
    delete,
    path = "/product/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Product is referenced by orders or sales", body = ErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(auth.business_id, id).await?;
    Ok(no_content_response())
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock_products))
        .route("/products/name/:name", get(products_by_name))
        .route(
            "/product/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}
