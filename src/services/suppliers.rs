use crate::{
    db::{self, DbPool},
    entities::{order, order_supplier, product, supplier},
    errors::ServiceError,
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::products::ensure_supplier;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewSupplier {
    #[validate(length(min = 1, max = 255))]
    pub supplier_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub supplier_category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct SupplierUpdate {
    #[validate(length(min = 1, max = 255))]
    pub supplier_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub supplier_category: Option<String>,
}

/// `?category=` filter for `GET /suppliers/category`
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CategoryQuery {
    pub category: String,
}

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        business_id: i32,
        input: NewSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        let model = supplier::ActiveModel {
            business_id: Set(business_id),
            supplier_name: Set(input.supplier_name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            supplier_category: Set(input.supplier_category),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(business_id, supplier_id = model.supplier_id, "supplier created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, business_id: i32) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find()
            .filter(supplier::Column::BusinessId.eq(business_id))
            .order_by_asc(supplier::Column::SupplierName)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        business_id: i32,
        supplier_id: i32,
    ) -> Result<supplier::Model, ServiceError> {
        ensure_supplier(&*self.db, business_id, supplier_id).await
    }

    /// Distinct, non-empty supplier categories in alphabetical order.
    #[instrument(skip(self))]
    pub async fn categories(&self, business_id: i32) -> Result<Vec<String>, ServiceError> {
        Ok(supplier::Entity::find()
            .select_only()
            .column(supplier::Column::SupplierCategory)
            .distinct()
            .filter(supplier::Column::BusinessId.eq(business_id))
            .filter(supplier::Column::SupplierCategory.is_not_null())
            .filter(supplier::Column::SupplierCategory.ne(""))
            .order_by_asc(supplier::Column::SupplierCategory)
            .into_tuple::<String>()
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn by_category(
        &self,
        business_id: i32,
        category: &str,
    ) -> Result<Vec<supplier::Model>, ServiceError> {
        Ok(supplier::Entity::find()
            .filter(supplier::Column::BusinessId.eq(business_id))
            .filter(supplier::Column::SupplierCategory.eq(category))
            .order_by_asc(supplier::Column::SupplierName)
            .all(&*self.db)
            .await?)
    }

    /// The supplier an order was placed with.
    #[instrument(skip(self))]
    pub async fn for_order(
        &self,
        business_id: i32,
        order_id: i32,
    ) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db;
        let order = order::Entity::find_by_id(order_id)
            .filter(order::Column::BusinessId.eq(business_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;

        order
            .find_related(supplier::Entity)
            .filter(supplier::Column::BusinessId.eq(business_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No supplier recorded for order {}", order_id)))
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        business_id: i32,
        supplier_id: i32,
        changes: SupplierUpdate,
    ) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db;
        let existing = ensure_supplier(db, business_id, supplier_id).await?;

        let mut active: supplier::ActiveModel = existing.into();
        if let Some(name) = changes.supplier_name {
            active.supplier_name = Set(name);
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
        if changes.supplier_category.is_some() {
            active.supplier_category = Set(changes.supplier_category);
        }

        Ok(active.update(db).await?)
    }

    /// Deletes a supplier no order refers to. Products it supplied are kept
    /// with their supplier cleared.
    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: i32, supplier_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db;
        ensure_supplier(db, business_id, supplier_id).await?;

        let order_refs = order_supplier::Entity::find()
            .filter(order_supplier::Column::SupplierId.eq(supplier_id))
            .count(db)
            .await?;
        if order_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "Supplier {} is referenced by {} order(s)",
                supplier_id, order_refs
            )));
        }

        db::transaction(db, "delete_supplier", move |txn| {
            Box::pin(async move {
                product::Entity::update_many()
                    .col_expr(product::Column::SupplierId, Expr::value(Option::<i32>::None))
                    .filter(product::Column::BusinessId.eq(business_id))
                    .filter(product::Column::SupplierId.eq(supplier_id))
                    .exec(txn)
                    .await?;
                supplier::Entity::delete_by_id(supplier_id).exec(txn).await?;
                Ok(())
            })
        })
        .await?;

        info!(business_id, supplier_id, "supplier deleted");
        Ok(())
    }
}
