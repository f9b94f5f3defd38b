pub mod audit_logs;
pub mod cart_lines;
pub mod cart_sessions;
pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_lines::Entity as CartLines;
pub use cart_sessions::Entity as CartSessions;
pub use carts::Entity as Carts;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use users::Entity as Users;
