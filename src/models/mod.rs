pub mod customer;
pub mod notification;
pub mod order;
pub mod product;

pub use customer::{Address, Buyer, Customer, CustomerStatus, EmailAddresses};
pub use notification::CustomerNotification;
pub use order::{GroupingCategory, Order, OrderLine, OrderStatus};
pub use product::{PriceListPrice, Product, ProductCategory, ProductVariant};
