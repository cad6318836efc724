pub mod config;
pub mod error;
pub mod extract;
pub mod image;
pub mod response;
pub mod validation;

pub use config::Config;
pub use error::{db_error, ApiError, ApiResult, ErrorKind};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, Empty, Envelope};
pub use validation::validate_request;
