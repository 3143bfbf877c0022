pub mod api_error;
pub mod retry;

pub use api_error::ApiError;
pub use retry::{retry_with_backoff, RetryError, RetryNotice, RetryPolicy};
