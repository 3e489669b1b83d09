use crate::{
    db::{self, DbPool},
    entities::balance,
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    SqlErr,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::{money_add, validate_money};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewBalance {
    #[validate(custom = "validate_money")]
    pub balance: Decimal,
}

/// Body of the balance mutation endpoints. For `addbalance`/`subtractbalance`
/// the value is the amount to move; for `PUT /balance/:id` it is the new total.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BalanceAmount {
    #[validate(custom = "validate_money")]
    pub new_balance: Decimal,
}

/// Returns the balance row of `business_id`, if any.
pub(crate) async fn find_balance<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
) -> Result<Option<balance::Model>, ServiceError> {
    balance::Entity::find()
        .filter(balance::Column::BusinessId.eq(business_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Adds `delta` (possibly negative) to the business balance.
///
/// A missing row counts as zero and is created on demand. The result may not
/// be negative.
pub(crate) async fn adjust_balance<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
    delta: Decimal,
) -> Result<balance::Model, ServiceError> {
    // Held until the surrounding transaction ends so concurrent movements
    // apply one after the other.
    let existing = balance::Entity::find()
        .filter(balance::Column::BusinessId.eq(business_id))
        .lock_exclusive()
        .one(conn)
        .await?;
    let current = existing
        .as_ref()
        .map(|b| b.balance)
        .unwrap_or(Decimal::ZERO);
    let updated = money_add(current, delta)?;

    if updated < Decimal::ZERO {
        warn!(business_id, %current, %delta, "balance would go negative");
        return Err(ServiceError::InsufficientFunds(format!(
            "balance {} cannot cover {}",
            current, -delta
        )));
    }

    let model = match existing {
        Some(row) => {
            let mut active: balance::ActiveModel = row.into();
            active.balance = Set(updated);
            active.update(conn).await?
        }
        None => {
            balance::ActiveModel {
                business_id: Set(business_id),
                balance: Set(updated),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };

    Ok(model)
}

/// Service for the per-business cash balance
#[derive(Clone)]
pub struct BalanceService {
    db: Arc<DbPool>,
}

impl BalanceService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates the balance row; a business may only have one.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        business_id: i32,
        input: NewBalance,
    ) -> Result<balance::Model, ServiceError> {
        let db = &*self.db;
        if find_balance(db, business_id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "A balance already exists for this business".to_string(),
            ));
        }

        let model = balance::ActiveModel {
            business_id: Set(business_id),
            balance: Set(input.balance),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(
                "A balance already exists for this business".to_string(),
            ),
            _ => ServiceError::db_error(e),
        })?;

        info!(business_id, balance_id = model.balance_id, "balance created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, business_id: i32) -> Result<balance::Model, ServiceError> {
        find_balance(&*self.db, business_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Balance not found".to_string()))
    }

    /// Overwrites the balance identified by `balance_id`.
    #[instrument(skip(self))]
    pub async fn set(
        &self,
        business_id: i32,
        balance_id: i32,
        input: BalanceAmount,
    ) -> Result<balance::Model, ServiceError> {
        let db = &*self.db;
        let row = self.find_owned(business_id, balance_id).await?;

        let mut active: balance::ActiveModel = row.into();
        active.balance = Set(input.new_balance);
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn add(
        &self,
        business_id: i32,
        input: BalanceAmount,
    ) -> Result<balance::Model, ServiceError> {
        let amount = input.new_balance;
        db::transaction(&self.db, "add_balance", move |txn| {
            Box::pin(async move { adjust_balance(txn, business_id, amount).await })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn subtract(
        &self,
        business_id: i32,
        input: BalanceAmount,
    ) -> Result<balance::Model, ServiceError> {
        let amount = -input.new_balance;
        db::transaction(&self.db, "subtract_balance", move |txn| {
            Box::pin(async move { adjust_balance(txn, business_id, amount).await })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: i32, balance_id: i32) -> Result<(), ServiceError> {
        let result = balance::Entity::delete_many()
            .filter(balance::Column::BalanceId.eq(balance_id))
            .filter(balance::Column::BusinessId.eq(business_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Balance", balance_id));
        }
        Ok(())
    }

    async fn find_owned(
        &self,
        business_id: i32,
        balance_id: i32,
    ) -> Result<balance::Model, ServiceError> {
        balance::Entity::find_by_id(balance_id)
            .filter(balance::Column::BusinessId.eq(business_id))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("Balance", balance_id))
    }
}
