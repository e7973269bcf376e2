use async_trait::async_trait;
use futures::{FutureExt, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_LENGTH, USER_AGENT};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use super::models::{ApiConfig, FetchedResponse, ResponseBody};
use crate::domain::TransferError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server responded with {0}")]
    Status(StatusCode),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Invalid URL {0:?}: {1}")]
    InvalidUrl(String, url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for TransferError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RequestError(e) => TransferError::Network(e.to_string()),
            ApiError::Status(status) => TransferError::HttpStatus(status.as_u16()),
            ApiError::Body(e) => TransferError::StreamRead(e),
            e @ ApiError::InvalidUrl(..) => TransferError::Unexpected(e.to_string()),
        }
    }
}

/// Something that can turn a URL into response metadata and a body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse> {
        let url = Url::parse(url).map_err(|e| ApiError::InvalidUrl(url.to_string(), e))?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let headers = response.headers();
        let content_length = header_str(headers, CONTENT_LENGTH)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|len| *len > 0);
        let content_disposition = header_str(headers, CONTENT_DISPOSITION).map(str::to_string);

        let body = if self.config.streaming {
            ResponseBody::Streaming(
                response
                    .bytes_stream()
                    .map_err(|e| ApiError::Body(e.to_string()))
                    .boxed(),
            )
        } else {
            ResponseBody::Buffered(
                async move {
                    response
                        .bytes()
                        .await
                        .map_err(|e| ApiError::Body(e.to_string()))
                }
                .boxed(),
            )
        };

        Ok(FetchedResponse {
            content_length,
            content_disposition,
            body,
        })
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
