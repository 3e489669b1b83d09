use super::common::{created_response, validate_input};
use crate::{
    auth::{clear_cookie, session_cookie, TokenPayload},
    errors::{ErrorResponse, ServiceError},
    services::business::{LoginRequest, RegisterBusiness},
    AppState,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::info;

/// Creates a business account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterBusiness,
    responses(
        (status = 201, description = "Business registered", body = crate::entities::business::Model),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterBusiness>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let business = state.services.business.register(payload).await?;
    Ok(created_response(business))
}

/// Logs in and sets the session cookie
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; `token` cookie set", body = TokenPayload),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 422, description = "Account not found or password incorrect", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let business = state.services.business.login(payload).await?;
    let issued = state.auth.issue_token(&business)?;

    let cookie = session_cookie(
        &issued.token,
        issued.expires_in,
        state.auth.config.cookie_secure,
    )
    .ok_or_else(|| ServiceError::InternalError("token is not a valid cookie value".into()))?;

    info!(business_id = business.business_id, "business logged in");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(TokenPayload::from(&issued.claims)),
    ))
}

/// Clears the session cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses((status = 204, description = "Session cookie cleared"))
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_cookie(state.auth.config.cookie_secure))],
    )
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}
