use crate::{
    db::{self, DbPool},
    entities::{order, order_detail, order_supplier, product, supplier},
    errors::ServiceError,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use super::{balances::adjust_balance, line_amount, money_add, products, validate_money};

/// One line of a new order. Lines name products; unknown names create the
/// product.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OrderLineInput {
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom = "validate_money")]
    pub price: Decimal,
    #[validate(length(max = 100))]
    pub category_name: Option<String>,
    pub product_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PlaceOrder {
    pub supplier_id: i32,
    /// Defaults to today (UTC)
    pub order_date: Option<NaiveDate>,
    #[validate]
    pub products: Vec<OrderLineInput>,
}

/// Change to the line of `product_id` within an existing order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OrderDetailChange {
    pub product_id: i32,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_money")]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOrder {
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate]
    pub details: Vec<OrderDetailChange>,
}

/// An order with its supplier and line items
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderWithDetails {
    #[serde(flatten)]
    pub order: order::Model,
    pub supplier: Option<supplier::Model>,
    pub details: Vec<order_detail::Model>,
}

/// Order row joined with its supplier's name
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
pub struct OrderSummary {
    pub order_id: i32,
    pub order_date: NaiveDate,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub supplier_id: Option<i32>,
    pub supplier_name: Option<String>,
}

/// Order line joined with its product's name
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
pub struct OrderDetailView {
    pub order_detail_id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub order_date: NaiveDate,
}

fn order_total(details: &[order_detail::Model]) -> Result<Decimal, ServiceError> {
    details.iter().try_fold(Decimal::ZERO, |total, detail| {
        money_add(total, line_amount(detail.unit_price, detail.quantity)?)
    })
}

async fn find_order<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
    order_id: i32,
) -> Result<order::Model, ServiceError> {
    order::Entity::find_by_id(order_id)
        .filter(order::Column::BusinessId.eq(business_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order", order_id))
}

async fn load_order_with_details<C: ConnectionTrait>(
    conn: &C,
    order: order::Model,
) -> Result<OrderWithDetails, ServiceError> {
    let supplier = order.find_related(supplier::Entity).one(conn).await?;
    let details = order
        .find_related(order_detail::Entity)
        .order_by_asc(order_detail::Column::OrderDetailId)
        .all(conn)
        .await?;
    Ok(OrderWithDetails {
        order,
        supplier,
        details,
    })
}

/// Finds the product named by `line` or creates it, then books the received
/// units into stock. Returns the product id.
async fn receive_line<C: ConnectionTrait>(
    conn: &C,
    business_id: i32,
    supplier_id: i32,
    line: &OrderLineInput,
) -> Result<i32, ServiceError> {
    let existing = product::Entity::find()
        .filter(product::Column::BusinessId.eq(business_id))
        .filter(product::Column::ProductName.eq(line.product_name.as_str()))
        .order_by_asc(product::Column::ProductId)
        .one(conn)
        .await?;

    match existing {
        Some(found) => {
            let updated =
                products::adjust_stock(conn, business_id, found.product_id, line.quantity).await?;
            debug!(product_id = updated.product_id, quantity = updated.quantity, "restocked product");
            Ok(updated.product_id)
        }
        None => {
            let created = product::ActiveModel {
                business_id: Set(business_id),
                supplier_id: Set(Some(supplier_id)),
                category_name: Set(line.category_name.clone()),
                product_name: Set(line.product_name.clone()),
                product_description: Set(line.product_description.clone()),
                quantity: Set(line.quantity),
                reorder_level: Set(0),
                reorder_quantity: Set(0),
                price: Set(line.price),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            debug!(product_id = created.product_id, "created product from order line");
            Ok(created.product_id)
        }
    }
}

/// Service for supplier orders
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Records an order, restocks its products and pays for it from the
    /// business balance, all in one transaction.
    #[instrument(skip(self))]
    pub async fn place(
        &self,
        business_id: i32,
        input: PlaceOrder,
    ) -> Result<OrderWithDetails, ServiceError> {
        if input.products.is_empty() {
            return Err(ServiceError::BadRequest(
                "An order needs at least one product".to_string(),
            ));
        }

        let placed = db::transaction(&self.db, "place_order", move |txn| {
            Box::pin(async move {
                let supplier =
                    products::ensure_supplier(txn, business_id, input.supplier_id).await?;

                let mut lines = Vec::with_capacity(input.products.len());
                for line in &input.products {
                    let product_id =
                        receive_line(txn, business_id, supplier.supplier_id, line).await?;
                    lines.push((product_id, line.quantity, line.price));
                }

                let mut total = Decimal::ZERO;
                for (_, quantity, price) in &lines {
                    total = money_add(total, line_amount(*price, *quantity)?)?;
                }

                let order = order::ActiveModel {
                    business_id: Set(business_id),
                    order_date: Set(input
                        .order_date
                        .unwrap_or_else(|| Utc::now().date_naive())),
                    total_amount: Set(total),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let mut details = Vec::with_capacity(lines.len());
                for (product_id, quantity, unit_price) in lines {
                    let detail = order_detail::ActiveModel {
                        order_id: Set(order.order_id),
                        product_id: Set(product_id),
                        quantity: Set(quantity),
                        unit_price: Set(unit_price),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    details.push(detail);
                }

                order_supplier::ActiveModel {
                    order_id: Set(order.order_id),
                    supplier_id: Set(supplier.supplier_id),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                adjust_balance(txn, business_id, -total).await?;

                Ok(OrderWithDetails {
                    order,
                    supplier: Some(supplier),
                    details,
                })
            })
        })
        .await?;

        info!(
            business_id,
            order_id = placed.order.order_id,
            total = %placed.order.total_amount,
            "order placed"
        );
        Ok(placed)
    }

    /// All orders with the supplier each was placed with, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, business_id: i32) -> Result<Vec<OrderSummary>, ServiceError> {
        self.summaries(business_id, None).await
    }

    #[instrument(skip(self))]
    pub async fn by_date(
        &self,
        business_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        self.summaries(business_id, Some(date)).await
    }

    async fn summaries(
        &self,
        business_id: i32,
        date: Option<NaiveDate>,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        let mut query = order::Entity::find()
            .select_only()
            .column(order::Column::OrderId)
            .column(order::Column::OrderDate)
            .column(order::Column::TotalAmount)
            .column(order::Column::CreatedAt)
            .column_as(supplier::Column::SupplierId, "supplier_id")
            .column_as(supplier::Column::SupplierName, "supplier_name")
            .join(JoinType::LeftJoin, order::Relation::OrderSupplier.def())
            .join(JoinType::LeftJoin, order_supplier::Relation::Supplier.def())
            .filter(order::Column::BusinessId.eq(business_id));

        if let Some(date) = date {
            query = query.filter(order::Column::OrderDate.eq(date));
        }

        Ok(query
            .order_by_desc(order::Column::OrderDate)
            .order_by_desc(order::Column::OrderId)
            .into_model::<OrderSummary>()
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        business_id: i32,
        order_id: i32,
    ) -> Result<OrderWithDetails, ServiceError> {
        let db = &*self.db;
        let order = find_order(db, business_id, order_id).await?;
        load_order_with_details(db, order).await
    }

    /// Line items of one order with product names.
    #[instrument(skip(self))]
    pub async fn details(
        &self,
        business_id: i32,
        order_id: i32,
    ) -> Result<Vec<OrderDetailView>, ServiceError> {
        let db = &*self.db;
        find_order(db, business_id, order_id).await?;
        self.detail_views(business_id, order_detail::Column::OrderId.eq(order_id))
            .await
    }

    /// Order lines of every order containing products named `product_name`.
    #[instrument(skip(self))]
    pub async fn details_by_product(
        &self,
        business_id: i32,
        product_name: &str,
    ) -> Result<Vec<OrderDetailView>, ServiceError> {
        self.detail_views(business_id, product::Column::ProductName.eq(product_name))
            .await
    }

    async fn detail_views(
        &self,
        business_id: i32,
        condition: sea_orm::sea_query::SimpleExpr,
    ) -> Result<Vec<OrderDetailView>, ServiceError> {
        Ok(order_detail::Entity::find()
            .select_only()
            .column(order_detail::Column::OrderDetailId)
            .column(order_detail::Column::OrderId)
            .column(order_detail::Column::ProductId)
            .column(product::Column::ProductName)
            .column(order_detail::Column::Quantity)
            .column(order_detail::Column::UnitPrice)
            .column(order::Column::OrderDate)
            .join(JoinType::InnerJoin, order_detail::Relation::Order.def())
            .join(JoinType::InnerJoin, order_detail::Relation::Product.def())
            .filter(order::Column::BusinessId.eq(business_id))
            .filter(condition)
            .order_by_asc(order_detail::Column::OrderId)
            .order_by_asc(order_detail::Column::OrderDetailId)
            .into_model::<OrderDetailView>()
            .all(&*self.db)
            .await?)
    }

    /// Orders placed with `supplier_id`, newest first.
    #[instrument(skip(self))]
    pub async fn by_supplier(
        &self,
        business_id: i32,
        supplier_id: i32,
    ) -> Result<Vec<order::Model>, ServiceError> {
        let db = &*self.db;
        products::ensure_supplier(db, business_id, supplier_id).await?;

        Ok(order::Entity::find()
            .join(JoinType::InnerJoin, order::Relation::OrderSupplier.def())
            .filter(order::Column::BusinessId.eq(business_id))
            .filter(order_supplier::Column::SupplierId.eq(supplier_id))
            .order_by_desc(order::Column::OrderDate)
            .order_by_desc(order::Column::OrderId)
            .all(db)
            .await?)
    }

    /// Edits order lines. Quantity changes move stock and price changes move
    /// money; the order total is recomputed from its lines.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        business_id: i32,
        order_id: i32,
        changes: UpdateOrder,
    ) -> Result<OrderWithDetails, ServiceError> {
        let updated = db::transaction(&self.db, "update_order", move |txn| {
            Box::pin(async move {
                let order = find_order(txn, business_id, order_id).await?;

                for change in &changes.details {
                    let detail = order_detail::Entity::find()
                        .filter(order_detail::Column::OrderId.eq(order_id))
                        .filter(order_detail::Column::ProductId.eq(change.product_id))
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Order {} has no line for product {}",
                                order_id, change.product_id
                            ))
                        })?;

                    let new_quantity = change.quantity.unwrap_or(detail.quantity);
                    let new_price = change.unit_price.unwrap_or(detail.unit_price);

                    let stock_delta = new_quantity - detail.quantity;
                    if stock_delta != 0 {
                        products::adjust_stock(txn, business_id, detail.product_id, stock_delta)
                            .await?;
                    }

                    let cost_delta = money_add(
                        line_amount(new_price, new_quantity)?,
                        -line_amount(detail.unit_price, detail.quantity)?,
                    )?;
                    if !cost_delta.is_zero() {
                        adjust_balance(txn, business_id, -cost_delta).await?;
                    }

                    let mut active: order_detail::ActiveModel = detail.into();
                    active.quantity = Set(new_quantity);
                    active.unit_price = Set(new_price);
                    active.update(txn).await?;
                }

                let details = order
                    .find_related(order_detail::Entity)
                    .all(txn)
                    .await?;
                let total = order_total(&details)?;

                let mut active: order::ActiveModel = order.into();
                active.total_amount = Set(total);
                if let Some(date) = changes.order_date {
                    active.order_date = Set(date);
                }
                let order = active.update(txn).await?;

                load_order_with_details(txn, order).await
            })
        })
        .await?;

        info!(business_id, order_id, total = %updated.order.total_amount, "order updated");
        Ok(updated)
    }

    /// Removes an order with its lines and supplier link. Stock and balance
    /// are left as they are.
    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: i32, order_id: i32) -> Result<(), ServiceError> {
        db::transaction(&self.db, "delete_order", move |txn| {
            Box::pin(async move {
                find_order(txn, business_id, order_id).await?;

                order_detail::Entity::delete_many()
                    .filter(order_detail::Column::OrderId.eq(order_id))
                    .exec(txn)
                    .await?;
                order_supplier::Entity::delete_many()
                    .filter(order_supplier::Column::OrderId.eq(order_id))
                    .exec(txn)
                    .await?;
                order::Entity::delete_by_id(order_id).exec(txn).await?;
                Ok(())
            })
        })
        .await?;

        info!(business_id, order_id, "order deleted");
        Ok(())
    }
}
