use std::fmt;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

use super::client::ApiError;

/// Response metadata plus a body that has not been read yet.
pub struct FetchedResponse {
    /// Declared body size. `None` when the header is missing, unparseable or zero.
    pub content_length: Option<u64>,
    pub content_disposition: Option<String>,
    pub body: ResponseBody,
}

pub enum ResponseBody {
    /// Incremental reader yielding chunks as they arrive.
    Streaming(BoxStream<'static, Result<Bytes, ApiError>>),
    /// Whole body delivered at once.
    Buffered(BoxFuture<'static, Result<Bytes, ApiError>>),
}

impl fmt::Debug for FetchedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.body {
            ResponseBody::Streaming(_) => "streaming",
            ResponseBody::Buffered(_) => "buffered",
        };
        f.debug_struct("FetchedResponse")
            .field("content_length", &self.content_length)
            .field("content_disposition", &self.content_disposition)
            .field("body", &body)
            .finish()
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub user_agent: String,
    /// Read bodies incrementally. When off, bodies are buffered in one go.
    pub streaming: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("arts-console/", env!("CARGO_PKG_VERSION")).to_string(),
            streaming: true,
        }
    }
}
