use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedBusiness,
    entities::customer,
    errors::{ErrorResponse, ServiceError},
    services::customers::{CustomerUpdate, NewCustomer},
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
    path = "/customers",
    tag = "customers",
    request_body = NewCustomer,
    responses(
        (status = 201, description = "Customer created", body = customer::Model),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<NewCustomer>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let customer = state
        .services
        .customers
        .create(auth.business_id, payload)
        .await?;
    Ok(created_response(customer))
}

#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    responses((status = 200, description = "Customers of the business", body = [customer::Model]))
)]
pub async fn list_customers(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let customers = state.services.customers.list(auth.business_id).await?;
    Ok(success_response(customers))
}

#[utoipa::path(
    get,
    path = "/customer/{id}",
    tag = "customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = customer::Model),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.get(auth.business_id, id).await?;
    Ok(success_response(customer))
}

#[utoipa::path(
    put,
    path = "/customer/{id}",
    tag = "customers",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerUpdate,
    responses(
        (status = 200, description = "Customer updated", body = customer::Model),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
    Json(payload): Json<CustomerUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let customer = state
        .services
        .customers
        .update(auth.business_id, id, payload)
        .await?;
    Ok(success_response(customer))
}

#[utoipa::path(
    delete,
    path = "/customer/{id}",
    tag = "customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.delete(auth.business_id, id).await?;
    Ok(no_content_response())
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customer/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}
