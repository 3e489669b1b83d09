use crate::{
    db::{self, DbPool},
    entities::sale,
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::{balances::adjust_balance, customers::find_customer, line_amount, products};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewSale {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(length(min = 1, max = 255))]
    pub payment_details: String,
    pub customer_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct SaleUpdate {
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub payment_details: Option<String>,
    pub customer_id: Option<i32>,
}

async fn find_sale<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
    sale_id: i32,
) -> Result<sale::Model, ServiceError> {
    sale::Entity::find_by_id(sale_id)
        .filter(sale::Column::BusinessId.eq(business_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Sale", sale_id))
}

/// Service for sales of stock to customers
#[derive(Clone)]
pub struct SaleService {
    db: Arc<DbPool>,
}

impl SaleService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Sells stock at the product's current price and credits the balance.
    #[instrument(skip(self))]
    pub async fn record(&self, business_id: i32, input: NewSale) -> Result<sale::Model, ServiceError> {
        let recorded = db::transaction(&self.db, "record_sale", move |txn| {
            Box::pin(async move {
                if let Some(customer_id) = input.customer_id {
                    find_customer(txn, business_id, customer_id).await?;
                }

                let product =
                    products::adjust_stock(txn, business_id, input.product_id, -input.quantity)
                        .await?;
                if product.needs_reorder() {
                    warn!(
                        business_id,
                        product_id = product.product_id,
                        quantity = product.quantity,
                        reorder_level = product.reorder_level,
                        "product at or below reorder level"
                    );
                }

                let total = line_amount(product.price, input.quantity)?;
                let sale = sale::ActiveModel {
                    business_id: Set(business_id),
                    product_id: Set(product.product_id),
                    customer_id: Set(input.customer_id),
                    quantity: Set(input.quantity),
                    unit_price: Set(product.price),
                    total_amount: Set(total),
                    payment_details: Set(input.payment_details),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                adjust_balance(txn, business_id, total).await?;
                Ok(sale)
            })
        })
        .await?;

        info!(
            business_id,
            sale_id = recorded.sale_id,
            total = %recorded.total_amount,
            "sale recorded"
        );
        Ok(recorded)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, business_id: i32) -> Result<Vec<sale::Model>, ServiceError> {
        Ok(sale::Entity::find()
            .filter(sale::Column::BusinessId.eq(business_id))
            .order_by_desc(sale::Column::SaleDate)
            .order_by_desc(sale::Column::SaleId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, business_id: i32, sale_id: i32) -> Result<sale::Model, ServiceError> {
        find_sale(&*self.db, business_id, sale_id).await
    }

    /// Edits a sale. A quantity change moves the stock difference and the
    /// money difference at the sale's unit price.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        business_id: i32,
        sale_id: i32,
        changes: SaleUpdate,
    ) -> Result<sale::Model, ServiceError> {
        db::transaction(&self.db, "update_sale", move |txn| {
            Box::pin(async move {
                let existing = find_sale(txn, business_id, sale_id).await?;
                if let Some(customer_id) = changes.customer_id {
                    find_customer(txn, business_id, customer_id).await?;
                }

                let quantity = changes.quantity.unwrap_or(existing.quantity);
                let delta = quantity - existing.quantity;
                let unit_price = existing.unit_price;

                let total = line_amount(unit_price, quantity)?;
                if delta != 0 {
                    products::adjust_stock(txn, business_id, existing.product_id, -delta).await?;
                    adjust_balance(txn, business_id, line_amount(unit_price, delta)?).await?;
                }

                let mut active: sale::ActiveModel = existing.into();
                active.quantity = Set(quantity);
                active.total_amount = Set(total);
                if let Some(payment_details) = changes.payment_details {
                    active.payment_details = Set(payment_details);
                }
                if changes.customer_id.is_some() {
                    active.customer_id = Set(changes.customer_id);
                }

                Ok(active.update(txn).await?)
            })
        })
        .await
    }

    /// Deletes the sale record only; stock and balance are not reversed.
    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: i32, sale_id: i32) -> Result<(), ServiceError> {
        let result = sale::Entity::delete_many()
            .filter(sale::Column::SaleId.eq(sale_id))
            .filter(sale::Column::BusinessId.eq(business_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Sale", sale_id));
        }
        Ok(())
    }
}
