pub mod auth;
pub mod error;
pub mod routes;
pub mod server;

pub use auth::AuthUser;
pub use error::{ApiError, ApiResult};
pub use server::{build_router, serve, AppState};
