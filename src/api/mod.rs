pub mod client;
pub mod models;

pub use client::{ApiClient, ApiError, Transport};
pub use models::{ApiConfig, FetchedResponse, ResponseBody};
