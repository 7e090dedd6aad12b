//! Order models: the stored row, its snapshots, and the API shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use kisan_suraksha_core::{
    OrderCode, OrderId, OrderStatus, PaymentMethod, ProductId, ShippingMode, UserId,
};

/// An order row as stored.
///
/// The address and pricing columns are snapshots fixed at placement time;
/// nothing recomputes them afterwards, even if the referenced products
/// change price or disappear.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub order_code: OrderCode,
    pub user_id: UserId,
    pub ship_full_name: String,
    pub ship_phone: String,
    pub ship_line1: String,
    pub ship_line2: String,
    pub ship_city: String,
    pub ship_state: String,
    pub ship_pincode: String,
    pub ship_country: String,
    pub shipping_mode: ShippingMode,
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxes: Decimal,
    pub delivery: Decimal,
    pub total: Decimal,
    pub promo_code: String,
    pub status: OrderStatus,
    pub eta: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item snapshot attached to an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(skip_serializing)]
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub qty: i32,
    pub image_url: String,
}

/// One entry in an order's append-only timeline.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    #[serde(skip_serializing)]
    pub order_id: OrderId,
    pub label: String,
    pub at: DateTime<Utc>,
}

/// Shipping address as embedded in order responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSnapshot {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

/// Pricing breakdown as embedded in order responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxes: Decimal,
    pub delivery: Decimal,
    pub total: Decimal,
    pub promo_code: String,
}

/// Customer identity attached to admin order listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub name: String,
    pub email: String,
}

/// The full order shape returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    /// Public order code; the storage id is not exposed.
    pub order_id: OrderCode,
    pub items: Vec<OrderItem>,
    pub address: AddressSnapshot,
    pub shipping_mode: ShippingMode,
    pub payment_method: PaymentMethod,
    pub pricing: PricingSnapshot,
    pub status: OrderStatus,
    pub timeline: Vec<TimelineEntry>,
    pub eta: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<CustomerSummary>,
}

impl Order {
    /// Assemble the API shape from the row plus its child rows.
    #[must_use]
    pub fn into_detail(
        self,
        items: Vec<OrderItem>,
        timeline: Vec<TimelineEntry>,
        user: Option<CustomerSummary>,
    ) -> OrderDetail {
        OrderDetail {
            order_id: self.order_code,
            items,
            address: AddressSnapshot {
                full_name: self.ship_full_name,
                phone: self.ship_phone,
                line1: self.ship_line1,
                line2: self.ship_line2,
                city: self.ship_city,
                state: self.ship_state,
                pincode: self.ship_pincode,
                country: self.ship_country,
            },
            shipping_mode: self.shipping_mode,
            payment_method: self.payment_method,
            pricing: PricingSnapshot {
                subtotal: self.subtotal,
                discount: self.discount,
                taxes: self.taxes,
                delivery: self.delivery,
                total: self.total,
                promo_code: self.promo_code,
            },
            status: self.status,
            timeline,
            eta: self.eta,
            created_at: self.created_at,
            user,
        }
    }
}
