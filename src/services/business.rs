use crate::{
    auth::{hash_password, verify_password},
    db::{self, DbPool},
    entities::{
        balance, business, customer, employee, order, order_detail, order_supplier, product, sale,
        supplier,
    },
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::balances::find_balance;

#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterBusiness {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 255))]
    pub business_name: String,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

impl std::fmt::Debug for RegisterBusiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterBusiness")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("business_name", &self.business_name)
            .field("address", &self.address)
            .finish()
    }
}

#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BusinessUpdate {
    #[validate(length(min = 1, max = 255))]
    pub business_name: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
}

/// Summary shown on the account page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountPage {
    pub business: business::Model,
    pub balance: Decimal,
    pub employee_count: u64,
    pub supplier_count: u64,
    pub product_count: u64,
    pub customer_count: u64,
    pub order_count: u64,
    pub sale_count: u64,
    pub low_stock_count: u64,
}

/// Service for tenant accounts
#[derive(Clone)]
pub struct BusinessService {
    db: Arc<DbPool>,
}

impl BusinessService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn register(&self, input: RegisterBusiness) -> Result<business::Model, ServiceError> {
        let db = &*self.db;
        let taken = business::Entity::find()
            .filter(business::Column::Username.eq(input.username.as_str()))
            .count(db)
            .await?;
        if taken > 0 {
            return Err(username_taken(&input.username));
        }

        let password_hash = hash_password(&input.password)?;
        let username = input.username.clone();
        let model = business::ActiveModel {
            username: Set(input.username),
            password_hash: Set(password_hash),
            business_name: Set(input.business_name),
            address: Set(input.address),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => username_taken(&username),
            _ => ServiceError::db_error(e),
        })?;

        info!(business_id = model.business_id, "business registered");
        Ok(model)
    }

    /// Checks credentials and returns the business on success.
    #[instrument(skip(self))]
    pub async fn login(&self, input: LoginRequest) -> Result<business::Model, ServiceError> {
        let account = business::Entity::find()
            .filter(business::Column::Username.eq(input.username.as_str()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::InvalidCredentials("Account not found".to_string()))?;

        if !verify_password(&account.password_hash, &input.password)? {
            warn!(business_id = account.business_id, "login with wrong password");
            return Err(ServiceError::InvalidCredentials(
                "Password incorrect".to_string(),
            ));
        }

        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, business_id: i32) -> Result<business::Model, ServiceError> {
        business::Entity::find_by_id(business_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Business", business_id))
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        business_id: i32,
        changes: BusinessUpdate,
    ) -> Result<business::Model, ServiceError> {
        let existing = self.get(business_id).await?;

        let mut active: business::ActiveModel = existing.into();
        if let Some(name) = changes.business_name {
            active.business_name = Set(name);
        }
        if changes.address.is_some() {
            active.address = Set(changes.address);
        }

        Ok(active.update(&*self.db).await?)
    }

    /// Deletes the business and every row it owns.
    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: i32) -> Result<(), ServiceError> {
        self.get(business_id).await?;

        db::transaction(&self.db, "delete_business", move |txn| {
            Box::pin(async move {
                let owned_orders = Query::select()
                    .column(order::Column::OrderId)
                    .from(order::Entity)
                    .and_where(Expr::col(order::Column::BusinessId).eq(business_id))
                    .to_owned();

                order_detail::Entity::delete_many()
                    .filter(order_detail::Column::OrderId.in_subquery(owned_orders.clone()))
                    .exec(txn)
                    .await?;
                order_supplier::Entity::delete_many()
                    .filter(order_supplier::Column::OrderId.in_subquery(owned_orders))
                    .exec(txn)
                    .await?;
                order::Entity::delete_many()
                    .filter(order::Column::BusinessId.eq(business_id))
                    .exec(txn)
                    .await?;
                sale::Entity::delete_many()
                    .filter(sale::Column::BusinessId.eq(business_id))
                    .exec(txn)
                    .await?;
                product::Entity::delete_many()
                    .filter(product::Column::BusinessId.eq(business_id))
                    .exec(txn)
                    .await?;
                supplier::Entity::delete_many()
                    .filter(supplier::Column::BusinessId.eq(business_id))
                    .exec(txn)
                    .await?;
                customer::Entity::delete_many()
                    .filter(customer::Column::BusinessId.eq(business_id))
                    .exec(txn)
                    .await?;
                employee::Entity::delete_many()
                    .filter(employee::Column::BusinessId.eq(business_id))
                    .exec(txn)
                    .await?;
                balance::Entity::delete_many()
                    .filter(balance::Column::BusinessId.eq(business_id))
                    .exec(txn)
                    .await?;
                business::Entity::delete_by_id(business_id).exec(txn).await?;
                Ok(())
            })
        })
        .await?;

        info!(business_id, "business deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn account_page(&self, business_id: i32) -> Result<AccountPage, ServiceError> {
        let db = &*self.db;
        let business = self.get(business_id).await?;
        let balance = find_balance(db, business_id)
            .await?
            .map(|b| b.balance)
            .unwrap_or(Decimal::ZERO);

        let employee_count = employee::Entity::find()
            .filter(employee::Column::BusinessId.eq(business_id))
            .count(db)
            .await?;
        let supplier_count = supplier::Entity::find()
            .filter(supplier::Column::BusinessId.eq(business_id))
            .count(db)
            .await?;
        let product_count = product::Entity::find()
            .filter(product::Column::BusinessId.eq(business_id))
            .count(db)
            .await?;
        let customer_count = customer::Entity::find()
            .filter(customer::Column::BusinessId.eq(business_id))
            .count(db)
            .await?;
        let order_count = order::Entity::find()
            .filter(order::Column::BusinessId.eq(business_id))
            .count(db)
            .await?;
        let sale_count = sale::Entity::find()
            .filter(sale::Column::BusinessId.eq(business_id))
            .count(db)
            .await?;
        let low_stock_count = super::ProductService::new(self.db.clone())
            .low_stock_count(business_id)
            .await?;

        Ok(AccountPage {
            business,
            balance,
            employee_count,
            supplier_count,
            product_count,
            customer_count,
            order_count,
            sale_count,
            low_stock_count,
        })
    }
}

fn username_taken(username: &str) -> ServiceError {
    ServiceError::Conflict(format!("Username '{}' is already taken", username))
}
