use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedBusiness,
    entities::balance,
    errors::{ErrorResponse, ServiceError},
    services::balances::{BalanceAmount, NewBalance},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

#[utoipa::path(
    post,
    path = "/balance",
    tag = "balances",
    request_body = NewBalance,
    responses(
        (status = 201, description = "Balance created", body = balance::Model),
        (status = 409, description = "Business already has a balance", body = ErrorResponse),
    )
)]
pub async fn create_balance(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<NewBalance>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let balance = state
        .services
        .balances
        .create(auth.business_id, payload)
        .await?;
    Ok(created_response(balance))
}

#[utoipa::path(
    get,
    path = "/balance",
    tag = "balances",
    responses(
        (status = 200, description = "Current balance", body = balance::Model),
        (status = 404, description = "No balance recorded", body = ErrorResponse),
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let balance = state.services.balances.get(auth.business_id).await?;
    Ok(success_response(balance))
}

#[utoipa::path(
    put,
    path = "/balance/{id}",
    tag = "balances",
    params(("id" = i32, Path, description = "Balance id")),
    request_body = BalanceAmount,
    responses(
        (status = 200, description = "Balance overwritten", body = balance::Model),
        (status = 404, description = "Balance not found", body = ErrorResponse),
    )
)]
pub async fn set_balance(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
    Json(payload): Json<BalanceAmount>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let balance = state
        .services
        .balances
        .set(auth.business_id, id, payload)
        .await?;
    Ok(success_response(balance))
}

#[utoipa::path(
    put,
    path = "/addbalance",
    tag = "balances",
    request_body = BalanceAmount,
    responses((status = 200, description = "Amount added", body = balance::Model))
)]
pub async fn add_balance(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<BalanceAmount>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let balance = state
        .services
        .balances
        .add(auth.business_id, payload)
        .await?;
    Ok(success_response(balance))
}

#[utoipa::path(
    put,
    path = "/subtractbalance",
    tag = "balances",
    request_body = BalanceAmount,
    responses(
        (status = 200, description = "Amount subtracted", body = balance::Model),
        (status = 422, description = "Balance would go negative", body = ErrorResponse),
    )
)]
pub async fn subtract_balance(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<BalanceAmount>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let balance = state
        .services
        .balances
        .subtract(auth.business_id, payload)
        .await?;
    Ok(success_response(balance))
}

#[utoipa::path(
    delete,
    path = "/balance/{id}",
    tag = "balances",
    params(("id" = i32, Path, description = "Balance id")),
    responses(
        (status = 204, description = "Balance deleted"),
        (status = 404, description = "Balance not found", body = ErrorResponse),
    )
)]
pub async fn delete_balance(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.balances.delete(auth.business_id, id).await?;
    Ok(no_content_response())
}

pub fn balance_routes() -> Router<AppState> {
    Router::new()
        .route("/balance", get(get_balance).post(create_balance))
        .route("/balance/:id", put(set_balance).delete(delete_balance))
        .route("/addbalance", put(add_balance))
        .route("/subtractbalance", put(subtract_balance))
}
