use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use super::endpoints::EndpointResolver;
use super::error::ApiError;
use super::signer::{self, Credentials};

/// HuaweiCloud API client
///
/// Executes signed REST requests against per-service regional endpoints.
/// Cheap to clone; all state lives behind an [`Arc`].
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    credentials: Credentials,
    region: String,
    project_id: String,
    endpoints: EndpointResolver,
    retry_config: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub access_key: String,
    pub secret_key: String,
    pub security_token: Option<String>,
    pub region: String,
    pub project_id: String,
    pub endpoints: HashMap<String, String>,
    pub insecure: bool,
    pub max_retries: u32,
}

#[derive(Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

/// How a request authenticates itself.
pub(crate) enum RequestAuth<'a> {
    /// AK/SK signature over the canonical request (the default).
    Sign,
    /// Pre-acquired token, used when talking directly to a CSE engine.
    Bearer(&'a str),
    /// No authentication (engines created with auth_type `NONE`).
    Anonymous,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let retry_config = RetryConfig {
            max_retries: config.max_retries,
            ..Default::default()
        };

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(retry_config.timeout_seconds))
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                credentials: Credentials {
                    access_key: config.access_key,
                    secret_key: config.secret_key,
                    security_token: config.security_token,
                },
                region: config.region,
                project_id: config.project_id,
                endpoints: EndpointResolver::new(config.endpoints),
                retry_config,
            }),
        })
    }

    pub fn region(&self) -> &str {
        &self.inner.region
    }

    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    /// Base URL for `service`, honouring a per-resource region override.
    pub fn endpoint(&self, service: &str, region: Option<&str>) -> String {
        self.inner
            .endpoints
            .resolve(service, region.unwrap_or(&self.inner.region))
    }

    /// Execute a GET request and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let bytes = self
            .execute_with_retry(Method::GET, url, None, RequestAuth::Sign)
            .await?;
        self.decode(&bytes, url)
    }

    /// Execute a POST request and decode the JSON response
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let bytes = self
            .execute_with_retry(Method::POST, url, Some(body), RequestAuth::Sign)
            .await?;
        self.decode(&bytes, url)
    }

    /// Execute a POST request whose response body is empty or irrelevant
    pub async fn post_empty<B: Serialize>(&self, url: &str, body: &B) -> Result<(), ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        self.execute_with_retry(Method::POST, url, Some(body), RequestAuth::Sign)
            .await
            .map(|_| ())
    }

    /// Execute a PUT request and decode the JSON response
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        let bytes = self
            .execute_with_retry(Method::PUT, url, Some(body), RequestAuth::Sign)
            .await?;
        self.decode(&bytes, url)
    }

    /// Execute a PUT request whose response body is empty or irrelevant
    pub async fn put_empty<B: Serialize>(&self, url: &str, body: &B) -> Result<(), ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        self.execute_with_retry(Method::PUT, url, Some(body), RequestAuth::Sign)
            .await
            .map(|_| ())
    }

    /// Execute a DELETE request
    pub async fn delete(&self, url: &str) -> Result<(), ApiError> {
        self.execute_with_retry(Method::DELETE, url, None, RequestAuth::Sign)
            .await
            .map(|_| ())
    }

    /// Execute a DELETE request and decode the JSON response
    pub async fn delete_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let bytes = self
            .execute_with_retry(Method::DELETE, url, None, RequestAuth::Sign)
            .await?;
        self.decode(&bytes, url)
    }

    /// Execute a DELETE request carrying a JSON body
    pub async fn delete_with_body<B: Serialize>(&self, url: &str, body: &B) -> Result<(), ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        self.execute_with_retry(Method::DELETE, url, Some(body), RequestAuth::Sign)
            .await
            .map(|_| ())
    }

    pub(crate) async fn request_with_auth<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        auth: RequestAuth<'_>,
    ) -> Result<T, ApiError> {
        let body = match body {
            Some(b) => Some(serde_json::to_vec(b).map_err(|e| ApiError::Parse(e.to_string()))?),
            None => None,
        };
        let bytes = self.execute_with_retry(method, url, body, auth).await?;
        self.decode(&bytes, url)
    }

    pub(crate) async fn request_with_auth_empty<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        auth: RequestAuth<'_>,
    ) -> Result<(), ApiError> {
        let body = match body {
            Some(b) => Some(serde_json::to_vec(b).map_err(|e| ApiError::Parse(e.to_string()))?),
            None => None,
        };
        self.execute_with_retry(method, url, body, auth).await.map(|_| ())
    }

    async fn execute_with_retry(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        auth: RequestAuth<'_>,
    ) -> Result<Vec<u8>, ApiError> {
        let parsed =
            Url::parse(url).map_err(|e| ApiError::Parse(format!("invalid url {}: {}", url, e)))?;

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = backoff_ms(&self.inner.retry_config, attempt);
                tracing::debug!(
                    "retrying {} {} after {}ms (attempt {})",
                    method,
                    url,
                    backoff,
                    attempt
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            match self.send(&method, &parsed, body.as_deref(), &auth).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let bytes = response.bytes().await?;
                        return Ok(bytes.to_vec());
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::Auth);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(decode_error_response(status.as_u16(), response).await);
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::Request(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
        auth: &RequestAuth<'_>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        tracing::debug!("{} {}", method, url);

        let date = Utc::now().format(signer::DATE_FORMAT).to_string();
        let host = match url.port() {
            Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
            None => url.host_str().unwrap_or_default().to_string(),
        };

        let mut request = self
            .inner
            .http_client
            .request(method.clone(), url.clone())
            .header("host", &host)
            .header(signer::DATE_HEADER, &date);

        if body.is_some() {
            request = request.header("content-type", "application/json");
        }

        match auth {
            RequestAuth::Sign => {
                let mut signed_headers = BTreeMap::new();
                signed_headers.insert("host".to_string(), host.clone());
                signed_headers.insert(signer::DATE_HEADER.to_string(), date.clone());
                if body.is_some() {
                    signed_headers
                        .insert("content-type".to_string(), "application/json".to_string());
                }

                let authorization = signer::sign(
                    &self.inner.credentials,
                    method.as_str(),
                    url,
                    &signed_headers,
                    &date,
                    body.unwrap_or_default(),
                );
                request = request.header("authorization", authorization);

                if !self.inner.project_id.is_empty() {
                    request = request.header("x-project-id", &self.inner.project_id);
                }
                if let Some(token) = &self.inner.credentials.security_token {
                    request = request.header("x-security-token", token);
                }
            }
            RequestAuth::Bearer(token) => {
                request = request.header("authorization", format!("Bearer {}", token));
            }
            RequestAuth::Anonymous => {}
        }

        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        request.send().await
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8], url: &str) -> Result<T, ApiError> {
        serde_json::from_slice(bytes).map_err(|e| {
            tracing::error!(
                "failed to deserialize response from {}: {}, body: {}",
                url,
                e,
                String::from_utf8_lossy(bytes)
            );
            ApiError::Parse(format!("failed to parse response: {}", e))
        })
    }
}

fn backoff_ms(config: &RetryConfig, attempt: u32) -> u64 {
    std::cmp::min(
        config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
        config.max_backoff_ms,
    )
}

/// Error payload returned by HuaweiCloud services. Some services use the
/// flat `error_code`/`error_msg` pair, others nest it under `error`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_code: Option<String>,
    error_msg: Option<String>,
    error: Option<NestedError>,
}

#[derive(Debug, Deserialize)]
struct NestedError {
    code: Option<String>,
    message: Option<String>,
}

async fn decode_error_response(status: u16, response: reqwest::Response) -> ApiError {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());

    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(parsed) => {
            let nested = parsed.error.unwrap_or(NestedError {
                code: None,
                message: None,
            });
            (
                parsed.error_code.or(nested.code),
                parsed.error_msg.or(nested.message).unwrap_or_else(|| text.clone()),
            )
        }
        Err(_) => (None, text),
    };

    ApiError::Api {
        status,
        code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(backoff_ms(&config, 1), 100);
        assert_eq!(backoff_ms(&config, 2), 200);
        assert_eq!(backoff_ms(&config, 3), 400);
        assert_eq!(backoff_ms(&config, 20), config.max_backoff_ms);
    }

    #[test]
    fn error_body_flat_shape() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error_code":"CBH.10001","error_msg":"bad flavor"}"#).unwrap();
        assert_eq!(body.error_code.as_deref(), Some("CBH.10001"));
        assert_eq!(body.error_msg.as_deref(), Some("bad flavor"));
    }

    #[test]
    fn error_body_nested_shape() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":{"code":"SDRS.0002","message":"no such group"}}"#)
                .unwrap();
        let nested = body.error.unwrap();
        assert_eq!(nested.code.as_deref(), Some("SDRS.0002"));
        assert_eq!(nested.message.as_deref(), Some("no such group"));
    }

    #[test]
    fn not_found_is_detected() {
        let err = ApiError::Api {
            status: 404,
            code: Some("CBH.404".to_string()),
            message: "gone".to_string(),
        };
        assert!(err.is_not_found());
        let err = ApiError::Api {
            status: 400,
            code: None,
            message: "bad".to_string(),
        };
        assert!(!err.is_not_found());
    }
}
