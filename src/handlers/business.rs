use super::common::{success_response, validate_input};
use crate::{
    auth::{clear_cookie, AuthenticatedBusiness},
    errors::{ErrorResponse, ServiceError},
    services::business::{AccountPage, BusinessUpdate},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

/// Business info of the logged-in account
#[utoipa::path(
    get,
    path = "/business",
    tag = "business",
    responses(
        (status = 200, description = "Business info", body = crate::entities::business::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Business no longer exists", body = ErrorResponse),
    )
)]
pub async fn get_business(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let business = state.services.business.get(auth.business_id).await?;
    Ok(success_response(business))
}

#[utoipa::path(
    put,
    path = "/business",
    tag = "business",
    request_body = BusinessUpdate,
    responses(
        (status = 200, description = "Business updated", body = crate::entities::business::Model),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn update_business(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<BusinessUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let business = state
        .services
        .business
        .update(auth.business_id, payload)
        .await?;
    Ok(success_response(business))
}

/// Deletes the account with all of its data and ends the session
#[utoipa::path(
    delete,
    path = "/business",
    tag = "business",
    responses(
        (status = 204, description = "Business and all owned rows deleted"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn delete_business(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.business.delete(auth.business_id).await?;
    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_cookie(state.auth.config.cookie_secure))],
    ))
}

/// Path form of [`delete_business`]. The id must be the signed-in business.
#[utoipa::path(
    delete,
    path = "/business/{business_id}",
    tag = "business",
    params(("business_id" = i32, Path, description = "Id of the signed-in business")),
    responses(
        (status = 204, description = "Business and all owned rows deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not the signed-in business", body = ErrorResponse),
    )
)]
pub async fn delete_business_by_id(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(business_id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    if business_id != auth.business_id {
        return Err(ServiceError::not_found("Business", business_id));
    }
    delete_business(State(state), auth).await
}

#[utoipa::path(
    get,
    path = "/getaccountpage",
    tag = "business",
    responses(
        (status = 200, description = "Account summary", body = AccountPage),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn account_page(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<Json<AccountPage>, ServiceError> {
    let page = state
        .services
        .business
        .account_page(auth.business_id)
        .await?;
    Ok(Json(page))
}

pub fn business_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/business",
            get(get_business).put(update_business).delete(delete_business),
        )
        .route("/business/:business_id", delete(delete_business_by_id))
        .route("/getaccountpage", get(account_page))
}
