use crate::{db::DbPool, entities::customer, errors::ServiceError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CustomerUpdate {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Loads a customer owned by `business_id`.
pub(crate) async fn find_customer<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
    customer_id: i32,
) -> Result<customer::Model, ServiceError> {
    customer::Entity::find_by_id(customer_id)
        .filter(customer::Column::BusinessId.eq(business_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Customer", customer_id))
}

#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, business_id: i32) -> Result<Vec<customer::Model>, ServiceError> {
        Ok(customer::Entity::find()
            .filter(customer::Column::BusinessId.eq(business_id))
            .order_by_asc(customer::Column::LastName)
            .order_by_asc(customer::Column::FirstName)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        business_id: i32,
        customer_id: i32,
    ) -> Result<customer::Model, ServiceError> {
        find_customer(&*self.db, business_id, customer_id).await
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        business_id: i32,
        input: NewCustomer,
    ) -> Result<customer::Model, ServiceError> {
        let model = customer::ActiveModel {
            business_id: Set(business_id),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(business_id, customer_id = model.customer_id, "customer created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        business_id: i32,
        customer_id: i32,
        changes: CustomerUpdate,
    ) -> Result<customer::Model, ServiceError> {
        let existing = find_customer(&*self.db, business_id, customer_id).await?;

        let mut active: customer::ActiveModel = existing.into();
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

        Ok(active.update(&*self.db).await?)
    }

    /// Deletes a customer. Past sales keep their `customer_id`.
    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: i32, customer_id: i32) -> Result<(), ServiceError> {
        let result = customer::Entity::delete_many()
            .filter(customer::Column::CustomerId.eq(customer_id))
            .filter(customer::Column::BusinessId.eq(business_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Customer", customer_id));
        }
        Ok(())
    }
}
