use crate::{
    db::DbPool,
    entities::{order_detail, product, sale, supplier},
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::validate_money;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    #[validate(length(max = 100))]
    pub category_name: Option<String>,
    pub product_description: Option<String>,
    pub supplier_id: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub reorder_level: Option<i32>,
    #[validate(range(min = 0))]
    pub reorder_quantity: Option<i32>,
    #[validate(custom = "validate_money")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 255))]
    pub product_name: Option<String>,
    #[validate(length(max = 100))]
    pub category_name: Option<String>,
    pub product_description: Option<String>,
    pub supplier_id: Option<i32>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub reorder_level: Option<i32>,
    #[validate(range(min = 0))]
    pub reorder_quantity: Option<i32>,
    #[validate(custom = "validate_money")]
    pub price: Option<Decimal>,
}

/// A product at or below its reorder level
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LowStockProduct {
    #[serde(flatten)]
    pub product: product::Model,
    pub suggested_reorder_quantity: i32,
}

impl From<product::Model> for LowStockProduct {
    fn from(product: product::Model) -> Self {
        let shortfall = product.reorder_level - product.quantity;
        let suggested_reorder_quantity = product.reorder_quantity.max(shortfall).max(0);
        Self {
            product,
            suggested_reorder_quantity,
        }
    }
}

/// Loads a product owned by `business_id`.
pub(crate) async fn find_product<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
    product_id: i32,
) -> Result<product::Model, ServiceError> {
    product::Entity::find_by_id(product_id)
        .filter(product::Column::BusinessId.eq(business_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product", product_id))
}

/// Adds `delta` units to a product's stock. Stock may not drop below zero.
pub(crate) async fn adjust_stock<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
    product_id: i32,
    delta: i32,
) -> Result<product::Model, ServiceError> {
    // Row lock held until the surrounding transaction ends.
    let product = product::Entity::find_by_id(product_id)
        .filter(product::Column::BusinessId.eq(business_id))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product", product_id))?;
    let updated = product
        .quantity
        .checked_add(delta)
        .ok_or_else(|| ServiceError::BadRequest("Quantity out of range".to_string()))?;

    if updated < 0 {
        warn!(
            business_id,
            product_id,
            on_hand = product.quantity,
            delta,
            "stock would go negative"
        );
        return Err(ServiceError::InsufficientStock(format!(
            "Product {} has {} units on hand, {} requested",
            product_id, product.quantity, -delta
        )));
    }

    let mut active: product::ActiveModel = product.into();
    active.quantity = Set(updated);
    Ok(active.update(conn).await?)
}

/// Ensures `supplier_id` belongs to `business_id`.
pub(crate) async fn ensure_supplier<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
    supplier_id: i32,
) -> Result<supplier::Model, ServiceError> {
    supplier::Entity::find_by_id(supplier_id)
        .filter(supplier::Column::BusinessId.eq(business_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))
}

/// Service for products and inventory levels
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        business_id: i32,
        input: NewProduct,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db;
        if let Some(supplier_id) = input.supplier_id {
            ensure_supplier(db, business_id, supplier_id).await?;
        }

        let model = product::ActiveModel {
            business_id: Set(business_id),
            supplier_id: Set(input.supplier_id),
            category_name: Set(input.category_name),
            product_name: Set(input.product_name),
            product_description: Set(input.product_description),
            quantity: Set(input.quantity),
            reorder_level: Set(input.reorder_level.unwrap_or(0)),
            reorder_quantity: Set(input.reorder_quantity.unwrap_or(0)),
            price: Set(input.price),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(business_id, product_id = model.product_id, "product created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, business_id: i32) -> Result<Vec<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::BusinessId.eq(business_id))
            .order_by_asc(product::Column::ProductName)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        business_id: i32,
        product_id: i32,
    ) -> Result<product::Model, ServiceError> {
        find_product(&*self.db, business_id, product_id).await
    }

    /// Products whose name matches exactly.
    #[instrument(skip(self))]
    pub async fn find_by_name(
        &self,
        business_id: i32,
        name: &str,
    ) -> Result<Vec<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::BusinessId.eq(business_id))
            .filter(product::Column::ProductName.eq(name))
            .order_by_asc(product::Column::ProductId)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn low_stock(&self, business_id: i32) -> Result<Vec<LowStockProduct>, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::BusinessId.eq(business_id))
            .filter(Expr::col(product::Column::Quantity).lte(Expr::col(product::Column::ReorderLevel)))
            .order_by_asc(product::Column::Quantity)
            .all(&*self.db)
            .await?;

        Ok(products.into_iter().map(LowStockProduct::from).collect())
    }

    /// Number of products at or below their reorder level.
    pub async fn low_stock_count(&self, business_id: i32) -> Result<u64, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::BusinessId.eq(business_id))
            .filter(Expr::col(product::Column::Quantity).lte(Expr::col(product::Column::ReorderLevel)))
            .count(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        business_id: i32,
        product_id: i32,
        changes: ProductUpdate,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db;
        let existing = find_product(db, business_id, product_id).await?;
        if let Some(supplier_id) = changes.supplier_id {
            ensure_supplier(db, business_id, supplier_id).await?;
        }

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = changes.product_name {
            active.product_name = Set(name);
        }
        if changes.category_name.is_some() {
            active.category_name = Set(changes.category_name);
        }
        if changes.product_description.is_some() {
            active.product_description = Set(changes.product_description);
        }
        if changes.supplier_id.is_some() {
            active.supplier_id = Set(changes.supplier_id);
        }
        if let Some(quantity) = changes.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(level) = changes.reorder_level {
            active.reorder_level = Set(level);
        }
        if let Some(qty) = changes.reorder_quantity {
            active.reorder_quantity = Set(qty);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }

        Ok(active.update(db).await?)
    }

    /// Deletes a product that no order line or sale refers to.
    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: i32, product_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        find_product(db, business_id, product_id).await?;

        let detail_refs = order_detail::Entity::find()
            .filter(order_detail::Column::ProductId.eq(product_id))
            .count(db)
            .await?;
        let sale_refs = sale::Entity::find()
            .filter(sale::Column::ProductId.eq(product_id))
            .count(db)
            .await?;
        if detail_refs + sale_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "Product {} is referenced by {} order line(s) and {} sale(s)",
                product_id, detail_refs, sale_refs
            )));
        }

        product::Entity::delete_by_id(product_id).exec(db).await?;
        info!(business_id, product_id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(quantity: i32, reorder_level: i32, reorder_quantity: i32) -> product::Model {
        product::Model {
            product_id: 1,
            business_id: 1,
            supplier_id: None,
            category_name: None,
            product_name: "Widget".into(),
            product_description: None,
            quantity,
            reorder_level,
            reorder_quantity,
            price: Decimal::new(250, 2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn suggested_reorder_covers_shortfall() {
        assert_eq!(LowStockProduct::from(product(2, 10, 5)).suggested_reorder_quantity, 8);
        assert_eq!(LowStockProduct::from(product(8, 10, 20)).suggested_reorder_quantity, 20);
        assert_eq!(LowStockProduct::from(product(10, 10, 0)).suggested_reorder_quantity, 0);
    }

    #[test]
    fn needs_reorder_at_threshold() {
        assert!(product(5, 5, 0).needs_reorder());
        assert!(!product(6, 5, 0).needs_reorder());
    }
}
