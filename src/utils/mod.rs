pub mod error;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
