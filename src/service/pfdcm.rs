use crate::service::{QueryService, ServiceError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};
use url::Url;

/// HTTP client for the pfdcm PACS intermediary service.
pub struct PfdcmService {
	client: reqwest::Client,
	endpoint: Url,
	wrapper: Option<String>,
}

impl PfdcmService {
	/// Creates a client for the service at `address`.
	///
	/// `address` is either `host:port` or a full URL. If `wrapper` is set, requests are sent
	/// as `{"<wrapper>": request}`.
	pub fn new(address: &str, wrapper: Option<&str>) -> Result<Self, ServiceError> {
		let endpoint = service_url(address)?;
		// Every run sends a single request, so idle connections are never kept.
		// Redirects are not followed: following one would POST the body a second time.
		let client = reqwest::Client::builder()
			.pool_max_idle_per_host(0)
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self {
			client,
			endpoint,
			wrapper: wrapper.map(String::from),
		})
	}

	fn body(&self, request: &Value) -> Value {
		match &self.wrapper {
			Some(key) => {
				let mut body = Map::with_capacity(1);
				body.insert(key.clone(), request.clone());
				Value::Object(body)
			}
			None => request.clone(),
		}
	}
}

#[async_trait]
impl QueryService for PfdcmService {
	#[instrument(skip_all, fields(endpoint = %self.endpoint))]
	async fn send(&self, request: &Value) -> Result<Value, ServiceError> {
		let body = self.body(request);
		info!("Sending request to PACS intermediary service");
		debug!(%body, "Request body");

		let response = self
			.client
			.post(self.endpoint.clone())
			.json(&body)
			.send()
			.await?;

		let status = response.status();
		let text = response.text().await?;
		debug!(%status, length = text.len(), "Received response");

		if !status.is_success() {
			return Err(ServiceError::Status { status, body: text });
		}

		Ok(serde_json::from_str(&text)?)
	}
}

/// Turns `host:port` into `http://host:port`. Addresses that carry a scheme are kept as-is.
pub fn service_url(address: &str) -> Result<Url, ServiceError> {
	let address = address.trim();
	let url = if address.contains("://") {
		Url::parse(address)
	} else {
		Url::parse(&format!("http://{address}"))
	};

	url.map_err(|source| ServiceError::Address {
		address: String::from(address),
		source,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use wiremock::matchers::{body_json, body_string, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn query() -> Value {
		json!({
			"action": "PACSinteract",
			"meta": { "do": "query", "on": { "PatientID": "4780041" }, "PACS": "orthanc" }
		})
	}

	#[test]
	fn host_and_port_get_http_scheme() {
		let url = service_url("pfdcm.local:4005").unwrap();
		assert_eq!(url.as_str(), "http://pfdcm.local:4005/");
	}

	#[test]
	fn full_url_is_kept() {
		let url = service_url("https://pfdcm.local:4005/api/v1/").unwrap();
		assert_eq!(url.as_str(), "https://pfdcm.local:4005/api/v1/");
	}

	#[test]
	fn invalid_address_is_rejected() {
		let result = service_url("pfdcm.local:notaport");
		assert!(matches!(result, Err(ServiceError::Address { .. })));
	}

	#[tokio::test]
	async fn posts_unwrapped_request_verbatim() {
		let server = MockServer::start().await;
		let request = query();
		Mock::given(method("POST"))
			.and(path("/"))
			.and(header("content-type", "application/json"))
			.and(body_string(serde_json::to_string(&request).unwrap()))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
			.expect(1)
			.mount(&server)
			.await;

		let service = PfdcmService::new(&server.address().to_string(), None).unwrap();
		let response = service.send(&request).await.unwrap();

		assert_eq!(response, json!({"status": true}));
	}

	#[tokio::test]
	async fn wraps_request_under_configured_key() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(body_json(json!({ "payload": query() })))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
			.expect(1)
			.mount(&server)
			.await;

		let service = PfdcmService::new(&server.address().to_string(), Some("payload")).unwrap();
		service.send(&query()).await.unwrap();
	}

	#[tokio::test]
	async fn non_json_response_is_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_string("<html>pfdcm</html>"))
			.expect(1)
			.mount(&server)
			.await;

		let service = PfdcmService::new(&server.address().to_string(), None).unwrap();
		let result = service.send(&query()).await;

		assert!(matches!(result, Err(ServiceError::Decode(_))));
	}

	#[tokio::test]
	async fn error_status_is_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(500).set_body_string("boom"))
			.expect(1)
			.mount(&server)
			.await;

		let service = PfdcmService::new(&server.address().to_string(), None).unwrap();
		let result = service.send(&query()).await;

		match result {
			Err(ServiceError::Status { status, body }) => {
				assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
				assert_eq!(body, "boom");
			}
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[tokio::test]
	async fn redirect_is_not_followed() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/"))
			.respond_with(ResponseTemplate::new(307).insert_header("location", "/other"))
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path("/other"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
			.expect(0)
			.mount(&server)
			.await;

		let service = PfdcmService::new(&server.address().to_string(), None).unwrap();
		let result = service.send(&query()).await;

		match result {
			Err(ServiceError::Status { status, .. }) => {
				assert_eq!(status, reqwest::StatusCode::TEMPORARY_REDIRECT);
			}
			other => panic!("unexpected result: {other:?}"),
		}
		assert_eq!(server.received_requests().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn unreachable_service_is_a_transport_error() {
		let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
		let address = listener.local_addr().unwrap().to_string();
		drop(listener);

		let service = PfdcmService::new(&address, None).unwrap();
		let result = service.send(&query()).await;

		assert!(matches!(result, Err(ServiceError::Transport(_))));
	}
}
