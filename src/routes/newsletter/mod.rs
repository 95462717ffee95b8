pub mod store;
pub mod subscribe; // Public for OpenAPI annotations
pub mod unsubscribe; // Public for OpenAPI annotations

pub use subscribe::*;
pub use unsubscribe::*;
