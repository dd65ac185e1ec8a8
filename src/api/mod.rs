//! Allowance Sentinel HTTP API
//! JSON endpoints over the approval risk engine and trust score composer

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
