//! # Registration API Client
//!
//! HTTP client for the registration and admin services. Implements
//! [`RegistrationApi`] over reqwest; every failure leaves this module
//! already classified by [`normalize`](super::normalize).

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::normalize;
use crate::config::{ApiEndpointConfig, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AdminHealth, AggregatedProfile, BulkRetryReport, DlqEntry, ErrorLogEntry, ErrorLogQuery,
    FailedMessage, ManualRetryReceipt, OperatorIdentity, RegistrationReceipt,
    RegistrationRequest, RegistrationStatus, RetryStatus, RetrySuccessRate, StatsSnapshot,
};
use crate::registration::ExportArtifact;
use crate::transport::RegistrationApi;

/// HTTP client for the registration service
///
/// # Examples
///
/// ```rust
/// use registration_client::{ApiEndpointConfig, RegistrationApiClient};
///
/// let client = RegistrationApiClient::new(ApiEndpointConfig::default()).unwrap();
/// assert_eq!(client.base_url().as_str(), "http://localhost:8080/api/v1");
/// ```
#[derive(Clone)]
pub struct RegistrationApiClient {
    client: Client,
    config: ApiEndpointConfig,
    base_url: Url,
}

impl std::fmt::Debug for RegistrationApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .finish()
    }
}

impl RegistrationApiClient {
    /// Create a new client, validating the base URL up front
    pub fn new(config: ApiEndpointConfig) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::config_error(format!("Invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::config_error(format!(
                "Base URL cannot carry API paths: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("registration-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ClientError::config_error(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            "Created registration API client"
        );

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Create a client from the full client configuration
    pub fn from_client_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(config.api.clone())
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, keeping its API prefix
    fn endpoint_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::config_error(format!("Failed to construct URL from {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> ClientResult<Response> {
        request
            .send()
            .await
            .map_err(|e| normalize::error_from_request(operation, &e))
    }

    async fn get_json<T>(&self, url: Url, operation: &str) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(url = %url, "{}", operation);
        let response = self.send(self.client.get(url), operation).await?;
        self.handle_response(response, operation).await
    }

    /// Handle HTTP response and deserialize JSON
    async fn handle_response<T>(&self, response: Response, operation: &str) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| normalize::error_from_request(operation, &e))?;

        if status.is_success() {
            let result = normalize::decode_body(operation, &body)?;
            debug!("Successfully completed operation: {}", operation);
            Ok(result)
        } else {
            error!(status = %status, error = %body, "Failed operation: {}", operation);
            Err(normalize::error_from_body(operation, status, &body))
        }
    }
}

/// Pull the file name out of a `Content-Disposition` header value
fn file_name_from_disposition(value: &str) -> Option<String> {
    value.split(';').find_map(|part| {
        let (key, raw) = part.trim().split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"').trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

#[async_trait]
impl RegistrationApi for RegistrationApiClient {
    fn transport_name(&self) -> &'static str {
        "REST"
    }

    fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }

    async fn submit_registration(
        &self,
        request: &RegistrationRequest,
    ) -> ClientResult<RegistrationReceipt> {
        let operation = "POST /registrations/submit";
        let url = self.endpoint_url(&["registrations", "submit"])?;

        debug!(
            url = %url,
            student_id = %request.student_id,
            year_level = %request.year_level.label(),
            "Submitting registration"
        );

        let response = self
            .send(self.client.post(url).json(request), operation)
            .await?;
        let receipt: RegistrationReceipt = self.handle_response(response, operation).await?;
        normalize::reject_unsuccessful(
            receipt.success,
            &receipt.message,
            "Registration was not accepted",
        )?;

        info!(
            student_id = %request.student_id,
            registration_id = ?receipt.registration_id,
            routed_to = ?receipt.routed_to,
            "Registration accepted"
        );
        Ok(receipt)
    }

    async fn get_aggregated_profile(&self, student_id: &str) -> ClientResult<AggregatedProfile> {
        let url = self.endpoint_url(&["registrations", "profile", student_id])?;
        self.get_json(url, "GET /registrations/profile").await
    }

    async fn download_registration_xml(&self, student_id: &str) -> ClientResult<ExportArtifact> {
        let operation = "GET /registrations/download-xml";
        let url = self.endpoint_url(&["registrations", "download-xml", student_id])?;
        debug!(url = %url, student_id = %student_id, "Downloading registration XML");

        let response = self.send(self.client.get(url), operation).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %body, "Failed operation: {}", operation);
            return Err(normalize::error_from_body(operation, status, &body));
        }

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| ExportArtifact::default_file_name(student_id));
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| ExportArtifact::XML_CONTENT_TYPE.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| normalize::error_from_request(operation, &e))?;

        Ok(ExportArtifact::new(file_name, content_type, bytes.to_vec()))
    }

    async fn get_registration_status(
        &self,
        student_id: &str,
    ) -> ClientResult<RegistrationStatus> {
        let url = self.endpoint_url(&["registrations", "status", student_id])?;
        self.get_json(url, "GET /registrations/status").await
    }

    async fn get_stats(&self) -> ClientResult<StatsSnapshot> {
        let url = self.endpoint_url(&["admin", "stats"])?;
        self.get_json(url, "GET /admin/stats").await
    }

    async fn list_error_logs(&self) -> ClientResult<Vec<ErrorLogEntry>> {
        let url = self.endpoint_url(&["admin", "errors"])?;
        self.get_json(url, "GET /admin/errors").await
    }

    async fn search_error_logs(&self, query: &ErrorLogQuery) -> ClientResult<Vec<ErrorLogEntry>> {
        let mut url = self.endpoint_url(&["admin", "errors", "search"])?;
        {
            let pairs = query.query_pairs();
            if !pairs.is_empty() {
                let mut serializer = url.query_pairs_mut();
                for (name, value) in &pairs {
                    serializer.append_pair(name, value);
                }
            }
        }
        self.get_json(url, "GET /admin/errors/search").await
    }

    async fn list_failed_messages(&self) -> ClientResult<Vec<FailedMessage>> {
        let url = self.endpoint_url(&["admin", "failed-messages"])?;
        self.get_json(url, "GET /admin/failed-messages").await
    }

    async fn list_failed_messages_by_status(
        &self,
        status: RetryStatus,
    ) -> ClientResult<Vec<FailedMessage>> {
        let url = self.endpoint_url(&["admin", "failed-messages", "status", status.as_str()])?;
        self.get_json(url, "GET /admin/failed-messages/status").await
    }

    async fn list_dlq_entries(&self) -> ClientResult<Vec<DlqEntry>> {
        let url = self.endpoint_url(&["admin", "failed-messages", "dlq"])?;
        self.get_json(url, "GET /admin/failed-messages/dlq").await
    }

    async fn get_retry_success_rate(&self) -> ClientResult<RetrySuccessRate> {
        let url = self.endpoint_url(&["admin", "stats", "retry-success-rate"])?;
        self.get_json(url, "GET /admin/stats/retry-success-rate")
            .await
    }

    async fn get_admin_health(&self) -> ClientResult<AdminHealth> {
        let url = self.endpoint_url(&["admin", "health"])?;
        self.get_json(url, "GET /admin/health").await
    }

    async fn manual_retry(
        &self,
        message_id: i64,
        operator: &OperatorIdentity,
        notes: &str,
    ) -> ClientResult<ManualRetryReceipt> {
        let operation = "POST /admin/retry";
        let mut url = self.endpoint_url(&["admin", "retry", &message_id.to_string()])?;
        url.query_pairs_mut()
            .append_pair("adminUser", operator.as_str())
            .append_pair("notes", notes);

        debug!(url = %url, message_id = message_id, operator = %operator, "Issuing manual retry");

        let response = self.send(self.client.post(url), operation).await?;
        let receipt: ManualRetryReceipt = self.handle_response(response, operation).await?;
        if !receipt.success {
            warn!(
                message_id = message_id,
                message = %receipt.message,
                "Manual retry rejected by server"
            );
        }
        normalize::reject_unsuccessful(receipt.success, &receipt.message, "Manual retry failed")?;
        Ok(receipt)
    }

    async fn retry_all_dlq(
        &self,
        operator: &OperatorIdentity,
        notes: &str,
    ) -> ClientResult<BulkRetryReport> {
        let operation = "POST /admin/retry-all-dlq";
        let mut url = self.endpoint_url(&["admin", "retry-all-dlq"])?;
        url.query_pairs_mut()
            .append_pair("adminUser", operator.as_str())
            .append_pair("notes", notes);

        info!(url = %url, operator = %operator, "Issuing bulk DLQ retry");

        let response = self.send(self.client.post(url), operation).await?;
        self.handle_response(response, operation).await
    }
}
