//! Domain models for the storefront.
//!
//! These are plain records shared between the in-memory repositories,
//! the services, and the JSON API.

pub mod address;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use address::{Address, AddressInput};
pub use order::{DeliveryMethod, NewOrder, Order, OrderLine};
pub use product::{NewProduct, Product, ProductUpdate};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
