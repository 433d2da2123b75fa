use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod pfdcm;

pub use pfdcm::PfdcmService;

/// Sends a request to the PACS intermediary and returns its JSON response.
///
/// Implementations make at most one attempt per call.
#[async_trait]
pub trait QueryService: Send + Sync {
	async fn send(&self, request: &Value) -> Result<Value, ServiceError>;
}

#[derive(Debug, Error)]
pub enum ServiceError {
	#[error("invalid service address `{address}`: {source}")]
	Address {
		address: String,
		source: url::ParseError,
	},
	#[error("failed to reach the PACS intermediary service: {0}")]
	Transport(#[from] reqwest::Error),
	#[error("PACS intermediary service responded with {status}: {body}")]
	Status {
		status: reqwest::StatusCode,
		body: String,
	},
	#[error("PACS intermediary service returned a response that is not JSON: {0}")]
	Decode(#[from] serde_json::Error),
}
