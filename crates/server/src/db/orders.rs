//! Order repository: placement, listing, and status transitions.
//!
//! Placement runs as a single transaction. Each line item is claimed with a
//! conditional decrement (`... AND stock >= $qty`); a line that matches no
//! row aborts the whole order, so stock is never oversold and never goes
//! negative even under concurrent checkouts. Prices, names and images are
//! snapshotted from the catalog inside the same transaction, so the client
//! never dictates what it pays.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use kisan_suraksha_core::{
    OrderCode, OrderStatus, PaymentMethod, ProductId, ShippingMode, UserId,
    pricing::{compute_pricing, promo_by_code},
};

use super::RepositoryError;
use crate::models::{CustomerSummary, Order, OrderDetail, OrderItem, ShippingAddress, TimelineEntry};

const ORDER_COLUMNS: &str = "id, order_code, user_id, ship_full_name, ship_phone, ship_line1, \
                             ship_line2, ship_city, ship_state, ship_pincode, ship_country, \
                             shipping_mode, payment_method, subtotal, discount, taxes, delivery, \
                             total, promo_code, status, eta, created_at, updated_at";

const ITEM_COLUMNS: &str = "order_id, product_id, name, price, qty, image_url";

/// Default limit on order listings.
const LIST_LIMIT: i64 = 200;

/// How far out the delivery estimate is set at placement.
const ETA_DAYS: i64 = 4;

/// One requested line of a new order.
#[derive(Debug, Clone, Copy)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub qty: i32,
}

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The product does not exist or is no longer sold.
    #[error("product {0} is unavailable")]
    ProductUnavailable(ProductId),

    /// Not enough stock to cover the requested quantity.
    #[error("insufficient stock for {name}")]
    InsufficientStock { product_id: ProductId, name: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Why a status update was rejected.
#[derive(Debug, Error)]
pub enum StatusUpdateError {
    #[error("order not found")]
    NotFound,

    /// The transition is not forward-adjacent and not a cancellation.
    #[error("cannot move order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for StatusUpdateError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Rows claimed by the conditional stock decrement.
#[derive(sqlx::FromRow)]
struct ClaimedLine {
    name: String,
    price: Decimal,
    image_url: String,
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: UserId,
    name: String,
    email: String,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order atomically.
    ///
    /// Claims stock line by line with a conditional decrement, snapshots
    /// catalog prices, computes the pricing breakdown server-side, and
    /// writes the order, its items and the initial timeline entry in one
    /// transaction. Any failure rolls back everything, including the
    /// decrements.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::ProductUnavailable` or
    /// `PlaceOrderError::InsufficientStock` when a line cannot be claimed,
    /// and `PlaceOrderError::Repository` for database failures.
    pub async fn place(
        &self,
        user_id: UserId,
        lines: &[OrderLine],
        address: &ShippingAddress,
        promo_code: Option<&str>,
        mode: ShippingMode,
        method: PaymentMethod,
    ) -> Result<OrderDetail, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let mut subtotal = Decimal::ZERO;
        let mut snapshots: Vec<(OrderLine, ClaimedLine)> = Vec::with_capacity(lines.len());

        for line in lines {
            let claimed = sqlx::query_as::<_, ClaimedLine>(
                "UPDATE product \
                 SET stock = stock - $2, updated_at = now() \
                 WHERE id = $1 AND is_active AND stock >= $2 \
                 RETURNING name, price, image_url",
            )
            .bind(line.product_id)
            .bind(line.qty)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(claimed) = claimed else {
                // The decrement matched nothing; find out which way it failed.
                // A no-match UPDATE does not abort the transaction, so this
                // follow-up read is safe.
                let name: Option<String> = sqlx::query_scalar(
                    "SELECT name FROM product WHERE id = $1 AND is_active",
                )
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await?;

                return Err(match name {
                    Some(name) => PlaceOrderError::InsufficientStock {
                        product_id: line.product_id,
                        name,
                    },
                    None => PlaceOrderError::ProductUnavailable(line.product_id),
                });
            };

            subtotal += claimed.price * Decimal::from(line.qty);
            snapshots.push((*line, claimed));
        }

        let promo = promo_code.and_then(promo_by_code);
        let pricing = compute_pricing(subtotal, promo.as_ref(), mode);
        let applied_code = promo
            .filter(|p| subtotal >= p.min_subtotal)
            .map(|p| p.code)
            .unwrap_or_default();

        let code = Self::allocate_order_code(&mut tx).await?;
        let eta = Utc::now() + Duration::days(ETA_DAYS);

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO customer_order \
                 (order_code, user_id, ship_full_name, ship_phone, ship_line1, ship_line2, \
                  ship_city, ship_state, ship_pincode, ship_country, shipping_mode, \
                  payment_method, subtotal, discount, taxes, delivery, total, promo_code, eta) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&code)
        .bind(user_id)
        .bind(&address.full_name)
        .bind(&address.phone)
        .bind(&address.line1)
        .bind(&address.line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.pincode)
        .bind(&address.country)
        .bind(mode)
        .bind(method)
        .bind(pricing.subtotal)
        .bind(pricing.discount)
        .bind(pricing.taxes)
        .bind(pricing.delivery)
        .bind(pricing.total)
        .bind(&applied_code)
        .bind(eta)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(snapshots.len());
        for (line, claimed) in snapshots {
            sqlx::query(
                "INSERT INTO order_item (order_id, product_id, name, price, qty, image_url) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(&claimed.name)
            .bind(claimed.price)
            .bind(line.qty)
            .bind(&claimed.image_url)
            .execute(&mut *tx)
            .await?;

            items.push(OrderItem {
                order_id: order.id,
                product_id: line.product_id,
                name: claimed.name,
                price: claimed.price,
                qty: line.qty,
                image_url: claimed.image_url,
            });
        }

        sqlx::query("INSERT INTO order_event (order_id, label, at) VALUES ($1, $2, $3)")
            .bind(order.id)
            .bind("Order placed")
            .bind(order.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let timeline = vec![TimelineEntry {
            order_id: order.id,
            label: "Order placed".to_owned(),
            at: order.created_at,
        }];
        Ok(order.into_detail(items, timeline, None))
    }

    /// Pick an unused order code. A pre-check keeps the surrounding
    /// transaction alive; a unique-violation on INSERT would abort it and
    /// make a retry impossible.
    async fn allocate_order_code(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<OrderCode, RepositoryError> {
        for _ in 0..10 {
            let code = OrderCode::generate();
            let taken: Option<i32> =
                sqlx::query_scalar("SELECT 1 FROM customer_order WHERE order_code = $1")
                    .bind(&code)
                    .fetch_optional(&mut **tx)
                    .await?;
            if taken.is_none() {
                return Ok(code);
            }
        }
        Err(RepositoryError::Conflict(
            "could not allocate a unique order code".to_owned(),
        ))
    }

    /// List a user's orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderDetail>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM customer_order \
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3"
        ))
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;

        self.assemble(orders, false).await
    }

    /// Look up a single order by public code, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        code: &OrderCode,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM customer_order \
             WHERE order_code = $1 AND user_id = $2"
        ))
        .bind(code)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };
        Ok(self.assemble(vec![order], false).await?.into_iter().next())
    }

    /// List all orders for the admin view, newest first, with the customer
    /// identity attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn admin_list(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderDetail>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM customer_order \
             WHERE $1::TEXT IS NULL OR status = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;

        self.assemble(orders, true).await
    }

    /// Move an order to a new status, appending a timeline entry.
    ///
    /// Only forward-adjacent transitions are allowed, plus cancellation
    /// from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns `StatusUpdateError::NotFound` for an unknown code,
    /// `StatusUpdateError::IllegalTransition` for a rejected transition,
    /// and `StatusUpdateError::Repository` for database failures.
    pub async fn update_status(
        &self,
        code: &OrderCode,
        to: OrderStatus,
        note: Option<&str>,
    ) -> Result<OrderDetail, StatusUpdateError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM customer_order WHERE order_code = $1 FOR UPDATE"
        ))
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StatusUpdateError::NotFound)?;

        if !current.status.can_transition_to(to) {
            return Err(StatusUpdateError::IllegalTransition {
                from: current.status,
                to,
            });
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE customer_order SET status = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(current.id)
        .bind(to)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO order_event (order_id, label) VALUES ($1, $2)")
            .bind(order.id)
            .bind(note.map_or_else(
                || format!("Status updated to {}", to.label()),
                ToOwned::to_owned,
            ))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut details = self.assemble(vec![order], true).await?;
        details
            .pop()
            .ok_or_else(|| RepositoryError::DataCorruption("updated order vanished".to_owned()).into())
    }

    /// Attach items, timeline and (optionally) customer identity to a batch
    /// of order rows, preserving their order.
    async fn assemble(
        &self,
        orders: Vec<Order>,
        with_customer: bool,
    ) -> Result<Vec<OrderDetail>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();

        let mut items_by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        let item_rows = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_item WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;
        for item in item_rows {
            items_by_order
                .entry(item.order_id.as_i32())
                .or_default()
                .push(item);
        }

        let mut events_by_order: HashMap<i32, Vec<TimelineEntry>> = HashMap::new();
        let event_rows = sqlx::query_as::<_, TimelineEntry>(
            "SELECT order_id, label, at FROM order_event \
             WHERE order_id = ANY($1) ORDER BY at, id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;
        for event in event_rows {
            events_by_order
                .entry(event.order_id.as_i32())
                .or_default()
                .push(event);
        }

        let mut customers: HashMap<i32, CustomerSummary> = HashMap::new();
        if with_customer {
            let user_ids: Vec<i32> = orders.iter().map(|o| o.user_id.as_i32()).collect();
            let rows = sqlx::query_as::<_, CustomerRow>(
                "SELECT id, name, email FROM app_user WHERE id = ANY($1)",
            )
            .bind(&user_ids)
            .fetch_all(self.pool)
            .await?;
            for row in rows {
                customers.insert(
                    row.id.as_i32(),
                    CustomerSummary {
                        name: row.name,
                        email: row.email,
                    },
                );
            }
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id.as_i32()).unwrap_or_default();
                let timeline = events_by_order.remove(&order.id.as_i32()).unwrap_or_default();
                let customer = customers.get(&order.user_id.as_i32()).cloned();
                order.into_detail(items, timeline, customer)
            })
            .collect())
    }
}
