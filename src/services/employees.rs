use crate::{db::DbPool, entities::employee, errors::ServiceError};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use super::validate_money;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewEmployee {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(custom = "validate_money")]
    pub salary: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EmployeeUpdate {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(custom = "validate_money")]
    pub salary: Option<Decimal>,
}

#[derive(Clone)]
pub struct EmployeeService {
    db: Arc<DbPool>,
}

impl EmployeeService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, business_id: i32) -> Result<Vec<employee::Model>, ServiceError> {
        Ok(employee::Entity::find()
            .filter(employee::Column::BusinessId.eq(business_id))
            .order_by_asc(employee::Column::EmployeeId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        business_id: i32,
        employee_id: i32,
    ) -> Result<employee::Model, ServiceError> {
        employee::Entity::find_by_id(employee_id)
            .filter(employee::Column::BusinessId.eq(business_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Employee", employee_id))
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        business_id: i32,
        input: NewEmployee,
    ) -> Result<employee::Model, ServiceError> {
        let model = employee::ActiveModel {
            business_id: Set(business_id),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            salary: Set(input.salary.unwrap_or(Decimal::ZERO)),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(business_id, employee_id = model.employee_id, "employee created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        business_id: i32,
        employee_id: i32,
        changes: EmployeeUpdate,
    ) -> Result<employee::Model, ServiceError> {
        let existing = self.get(business_id, employee_id).await?;

        let mut active: employee::ActiveModel = existing.into();
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if changes.email.is_some() {
            active.email = Set(changes.email);
        }
        if changes.phone.is_some() {
            active.phone = Set(changes.phone);
        }
        if changes.address.is_some() {
            active.address = Set(changes.address);
        }
        if let Some(salary) = changes.salary {
            active.salary = Set(salary);
        }

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: i32, employee_id: i32) -> Result<(), ServiceError> {
        let result = employee::Entity::delete_many()
            .filter(employee::Column::EmployeeId.eq(employee_id))
            .filter(employee::Column::BusinessId.eq(business_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Employee", employee_id));
        }

        info!(business_id, employee_id, "employee deleted");
        Ok(())
    }
}
