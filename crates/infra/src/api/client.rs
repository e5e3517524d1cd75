//! API client with retry logic
//!
//! Provides the HTTP-based client the attendance adapters share, with
//! automatic retry of transient failures and bearer authentication.

use std::sync::Arc;
use std::time::Duration;

use pasalista_common::resilience::policies::PredicateRetry;
use pasalista_common::resilience::{RetryConfig, RetryError, RetryExecutor};
use pasalista_domain::{ApiConfig, EngineConfig, SyncConfig};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::auth::AccessTokenProvider;
use super::errors::ApiError;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the attendance backend (e.g., "https://api.pasalista.example")
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
    /// Transient-failure retries on top of the first attempt
    pub max_retries: u32,
    /// Fixed delay between retries
    pub retry_delay: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from_parts(&ApiConfig::default(), &SyncConfig::default())
    }
}

impl ApiClientConfig {
    /// Derive the client settings from the loaded engine configuration
    pub fn from_engine_config(config: &EngineConfig) -> Self {
        Self::from_parts(&config.api, &config.sync)
    }

    fn from_parts(api: &ApiConfig, sync: &SyncConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            timeout: Duration::from_secs(api.timeout_seconds),
            max_retries: sync.max_retries,
            retry_delay: Duration::from_millis(sync.retry_delay_ms),
        }
    }
}

/// HTTP client for the attendance backend
pub struct ApiClient {
    client: reqwest::Client,
    auth: Arc<dyn AccessTokenProvider>,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is invalid or the
    /// underlying HTTP client cannot be built.
    pub fn new(
        config: ApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ApiError> {
        Url::parse(&config.base_url).map_err(|err| {
            ApiError::Config(format!("invalid base url '{}': {}", config.base_url, err))
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .no_proxy()
            .build()
            .map_err(|err| ApiError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { client, auth, config })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns error if the request fails after retries or the response
    /// cannot be deserialized.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url_for(path);
        debug!(url = %url, "GET request");

        let response = self.execute_with_retry(Method::GET, &url, None).await?;
        let result = Self::decode(response, &url).await?;

        info!(path = %path, "GET request successful");
        Ok(result)
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if the body cannot be serialized, the request fails
    /// after retries, or the response cannot be deserialized.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let url = self.url_for(path);
        let payload = serde_json::to_value(body)
            .map_err(|err| ApiError::Client(format!("Failed to serialize body: {err}")))?;
        debug!(url = %url, "POST request");

        let response = self.execute_with_retry(Method::POST, &url, Some(payload)).await?;
        let result = Self::decode(response, &url).await?;

        info!(path = %path, "POST request successful");
        Ok(result)
    }

    /// Health check for the backend
    ///
    /// # Returns
    ///
    /// `true` if the backend is reachable and healthy
    ///
    /// # Errors
    ///
    /// Returns error if the backend could not be reached at all
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let url = self.url_for("/health");
        debug!(url = %url, "Health check");

        let timeout = Duration::from_secs(5);
        let request = self.client.request(Method::GET, &url);

        let response = match tokio::time::timeout(timeout, request.send()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Health check timeout");
                return Err(ApiError::Timeout(timeout));
            }
        };

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!("Attendance backend is healthy");
                Ok(true)
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "Attendance backend returned non-success status");
                Ok(false)
            }
            Err(err) => {
                warn!(error = %err, "Health check failed");
                Err(ApiError::from(err))
            }
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn execute_with_retry(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Response, ApiError> {
        // With a single attempt the executor reports exhaustion instead of
        // the underlying error, so bypass it.
        if self.config.max_retries == 0 {
            return self.attempt(method, url, body.as_ref()).await;
        }

        let retry_config = RetryConfig::builder()
            .max_attempts(self.config.max_retries + 1)
            .fixed_backoff(self.config.retry_delay)
            .no_jitter()
            .build()
            .map_err(|err| ApiError::Config(err.to_string()))?;
        let policy = PredicateRetry::new(|error: &ApiError, _attempt: u32| error.should_retry());

        RetryExecutor::new(retry_config, policy)
            .execute(|| self.attempt(method.clone(), url, body.as_ref()))
            .await
            .map_err(|err| flatten_retry_error(err, url))
    }

    async fn attempt(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, ApiError> {
        // Token is requested per attempt so refreshing providers can rotate it
        let token = self.auth.access_token().await?;

        let mut request = self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json");
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = match tokio::time::timeout(self.config.timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(ApiError::from(err)),
            Err(_) => return Err(ApiError::Timeout(self.config.timeout)),
        };

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body_text = response.text().await.unwrap_or_default();
            Err(map_status_error(status, url, body_text))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let status = response.status();

        // 204/205 carry no body by RFC spec
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|_| {
                ApiError::Client(format!(
                    "{} returned no content ({}) but the caller expects a body",
                    url,
                    status.as_u16()
                ))
            });
        }

        response
            .json()
            .await
            .map_err(|err| ApiError::Client(format!("Failed to parse response from {url}: {err}")))
    }
}

fn map_status_error(status: StatusCode, url: &str, body: String) -> ApiError {
    let message = if body.is_empty() {
        format!("{} returned status {}", url, status)
    } else {
        format!("{} returned status {}: {}", url, status, body)
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ApiError::Auth(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        ApiError::RateLimit(message)
    } else if status.is_server_error() {
        ApiError::Server(message)
    } else if status.is_client_error() {
        ApiError::Client(message)
    } else {
        ApiError::Network(message)
    }
}

fn flatten_retry_error(err: RetryError<ApiError>, url: &str) -> ApiError {
    match err {
        RetryError::NonRetryable { source } => source,
        RetryError::AttemptsExhausted { attempts } => {
            ApiError::Network(format!("{url} still failing after {attempts} attempts"))
        }
        RetryError::InvalidConfiguration { message } => ApiError::Config(message),
        RetryError::TimeoutExceeded { elapsed } => ApiError::Timeout(elapsed),
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the authentication provider
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let auth =
            self.auth.ok_or_else(|| ApiError::Config("Auth provider not set".to_string()))?;

        ApiClient::new(config, auth)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Clone)]
    struct MockAuthProvider {
        token: String,
    }

    #[async_trait]
    impl AccessTokenProvider for MockAuthProvider {
        async fn access_token(&self) -> Result<String, ApiError> {
            Ok(self.token.clone())
        }
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
    struct TestResponse {
        message: String,
    }

    #[derive(Debug, serde::Serialize)]
    struct TestRequest {
        data: String,
    }

    fn fast_config(server: &MockServer) -> ApiClientConfig {
        ApiClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_delay: Duration::from_millis(1),
        }
    }

    fn client_for(server: &MockServer) -> ApiClient {
        let auth = Arc::new(MockAuthProvider { token: "test-token".to_string() });
        ApiClient::new(fast_config(server), auth).unwrap()
    }

    #[tokio::test]
    async fn test_health_check_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = client_for(&server).health_check().await;
        assert!(result.unwrap());
    }

    #[tokio::test]
    async fn test_health_check_reports_unhealthy_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).health_check().await;
        assert!(!result.unwrap()); // Unhealthy but no error
    }

    #[tokio::test]
    async fn test_builder_pattern() {
        let auth = Arc::new(MockAuthProvider { token: "test-token".to_string() });
        let client = ApiClient::builder().auth(auth).build();
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_builder_missing_auth() {
        let result = ApiClient::builder().build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_base_url_rejected() {
        let auth = Arc::new(MockAuthProvider { token: "test-token".to_string() });
        let config = ApiClientConfig {
            base_url: "not a url".to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 0,
            retry_delay: Duration::from_millis(1),
        };

        let result = ApiClient::new(config, auth);
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn test_get_with_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/test"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(TestResponse { message: "success".to_string() }),
            )
            .mount(&server)
            .await;

        let result: Result<TestResponse, ApiError> = client_for(&server).get("/test").await;
        assert_eq!(result.unwrap().message, "success");
    }

    #[tokio::test]
    async fn test_get_with_204_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/no-content"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        // () deserializes from null
        let result: Result<(), ApiError> = client_for(&server).get("/no-content").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_post_with_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(TestResponse { message: "created".to_string() }),
            )
            .mount(&server)
            .await;

        let request = TestRequest { data: "test".to_string() };
        let result: Result<TestResponse, ApiError> =
            client_for(&server).post("/create", &request).await;
        assert_eq!(result.unwrap().message, "created");
    }

    #[tokio::test]
    async fn test_get_with_401_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/protected"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let result: Result<TestResponse, ApiError> = client_for(&server).get("/protected").await;

        assert!(matches!(result, Err(ApiError::Auth(_))));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_get_with_404_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notfound"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let result: Result<TestResponse, ApiError> = client_for(&server).get("/notfound").await;

        assert!(matches!(result, Err(ApiError::Client(_))));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_retries_server_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 2 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(TestResponse { message: "recovered".to_string() })
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let result: Result<TestResponse, ApiError> = client_for(&server).get("/flaky").await;

        assert_eq!(result.unwrap().message, "recovered");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_persistent_server_error_exhausts_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal server error"))
            .mount(&server)
            .await;

        let result: Result<TestResponse, ApiError> = client_for(&server).get("/down").await;

        match result {
            Err(ApiError::Network(message)) => assert!(message.contains("attempts")),
            other => panic!("expected exhausted retries, got {:?}", other),
        }
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_preserves_classification() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/protected"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let auth = Arc::new(MockAuthProvider { token: "test-token".to_string() });
        let config = ApiClientConfig { max_retries: 0, ..fast_config(&server) };
        let client = ApiClient::new(config, auth).unwrap();

        let result: Result<TestResponse, ApiError> = client.get("/protected").await;
        assert!(matches!(result, Err(ApiError::Auth(_))));
    }
}
