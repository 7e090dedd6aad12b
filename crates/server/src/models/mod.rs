//! Domain models mapped to database rows and API payloads.

pub mod order;
pub mod product;
pub mod user;

pub use order::{
    AddressSnapshot, CustomerSummary, Order, OrderDetail, OrderItem, PricingSnapshot,
    TimelineEntry,
};
pub use product::{NewProduct, Product, ProductPatch};
pub use user::{Address, AddressInput, ShippingAddress, ShippingProfile, User, UserSummary};
