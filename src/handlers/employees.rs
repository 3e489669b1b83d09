use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::AuthenticatedBusiness,
    entities::employee,
    errors::{ErrorResponse, ServiceError},
    services::employees::{EmployeeUpdate, NewEmployee},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    responses(
        (status = 200, description = "Employees of the business", body = [employee::Model]),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn list_employees(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
) -> Result<impl IntoResponse, ServiceError> {
    let employees = state.services.employees.list(auth.business_id).await?;
    Ok(success_response(employees))
}

#[utoipa::path(
    get,
    path = "/employee/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee", body = employee::Model),
        (status = 404, description = "Employee not found", body = ErrorResponse),
    )
)]
pub async fn get_employee(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let employee = state.services.employees.get(auth.business_id, id).await?;
    Ok(success_response(employee))
}

#[utoipa::path(
    post,
    path = "/employee",
    tag = "employees",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created", body = employee::Model),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
    )
)]
pub async fn create_employee(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Json(payload): Json<NewEmployee>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let employee = state
        .services
        .employees
        .create(auth.business_id, payload)
        .await?;
    Ok(created_response(employee))
}

#[utoipa::path(
    put,
    path = "/employee/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    request_body = EmployeeUpdate,
    responses(
        (status = 200, description = "Employee updated", body = employee::Model),
        (status = 404, description = "Employee not found", body = ErrorResponse),
    )
)]
pub async fn update_employee(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
    Json(payload): Json<EmployeeUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let employee = state
        .services
        .employees
        .update(auth.business_id, id, payload)
        .await?;
    Ok(success_response(employee))
}

#[utoipa::path(
    delete,
    path = "/employee/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = ErrorResponse),
    )
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    auth: AuthenticatedBusiness,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.employees.delete(auth.business_id, id).await?;
    Ok(no_content_response())
}

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/employee", post(create_employee))
        .route(
            "/employee/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}
