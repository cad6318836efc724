pub mod auth;
pub mod db;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

pub use auth::AuthService;
pub use db::Database;
pub use routes::create_app;
pub use state::AppState;
pub use utils::{ApiError, ApiResult, Config};
