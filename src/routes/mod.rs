pub mod chat; // Public for OpenAPI annotations
pub mod constants;
pub mod contact; // Public for OpenAPI annotations
pub mod health; // Public for OpenAPI annotations
pub mod newsletter; // Public for OpenAPI annotations
mod response;

pub use chat::*;
pub use contact::*;
pub use health::*;
pub use newsletter::*;
pub use response::{ApiError, ApiResponse};
