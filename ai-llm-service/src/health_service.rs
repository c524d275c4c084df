//! Health probes for the configured LLM backends.
//!
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth; the configured model
//!   must appear in the listing.
//! - Azure OpenAI: `GET {endpoint}/openai/models?api-version=...` with `api-key`;
//!   deployments are not listed there, so a 2xx answer is enough.
//!
//! [`HealthService::check`] never fails: errors become `ok = false`, which is what
//! the `/health` route serializes.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for a single profile.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(
        cfg: &LlmModelConfig,
        ok: bool,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker that reuses one HTTP client for every probe.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks one config. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            warn!(provider = ?cfg.provider, endpoint = %cfg.endpoint, "invalid endpoint");
            return HealthStatus::new(cfg, false, 0, "endpoint is empty or missing http/https");
        }

        let start = Instant::now();
        match self.try_probe(cfg).await {
            Ok(status) => {
                info!(
                    provider = %status.provider,
                    model = %cfg.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    provider = %status.provider,
                    model = %cfg.model,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Checks several configs sequentially.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    async fn try_probe(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let base = cfg.endpoint.trim().trim_end_matches('/');
        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| HealthError::Decode("missing API key".into()))?;

        let (url, auth_name, auth_value) = match cfg.provider {
            LlmProvider::OpenAI => (
                format!("{base}/v1/models"),
                header::AUTHORIZATION,
                format!("Bearer {api_key}"),
            ),
            LlmProvider::AzureOpenAI => (
                format!(
                    "{base}/openai/models?api-version={}",
                    cfg.api_version.as_deref().unwrap_or("2024-08-01-preview")
                ),
                header::HeaderName::from_static("api-key"),
                api_key.to_string(),
            ),
        };
        let auth_value = header::HeaderValue::from_str(&auth_value)
            .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let start = Instant::now();
        debug!(provider = ?cfg.provider, model = %cfg.model, "GET {}", url);

        let resp = self
            .client
            .get(&url)
            .timeout(timeout)
            .header(auth_name, auth_value)
            .send()
            .await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })
            .into());
        }

        if cfg.provider == LlmProvider::AzureOpenAI {
            return Ok(HealthStatus::new(
                cfg,
                true,
                latency,
                "Azure OpenAI resource is reachable",
            ));
        }

        // { "data": [ { "id": "<model>" }, ... ] }
        #[derive(Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        match resp.json::<Models>().await {
            Ok(models) if models.data.iter().any(|m| m.id == cfg.model) => Ok(HealthStatus::new(
                cfg,
                true,
                latency,
                "OpenAI is healthy; model is available",
            )),
            Ok(_) => Ok(HealthStatus::new(
                cfg,
                false,
                latency,
                "OpenAI is up, but model not found in /v1/models",
            )),
            Err(e) => Ok(HealthStatus::new(
                cfg,
                true,
                latency,
                format!("OpenAI is reachable; failed to decode /v1/models: {e}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(endpoint: String, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: model.into(),
            endpoint,
            api_key: Some("k".into()),
            api_version: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(2),
        }
    }

    #[tokio::test]
    async fn model_listed_is_healthy_and_missing_is_not() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": [ { "id": "gpt-3.5-turbo" } ] })),
            )
            .mount(&server)
            .await;

        let svc = HealthService::new(Some(2)).unwrap();
        assert!(svc.check(&cfg(server.uri(), "gpt-3.5-turbo")).await.ok);
        assert!(!svc.check(&cfg(server.uri(), "gpt-4o")).await.ok);
    }

    #[tokio::test]
    async fn upstream_error_becomes_not_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let svc = HealthService::new(Some(2)).unwrap();
        let status = svc.check(&cfg(server.uri(), "gpt-3.5-turbo")).await;
        assert!(!status.ok);
        assert!(status.message.contains("401"));
    }

    #[tokio::test]
    async fn bad_endpoint_short_circuits() {
        let svc = HealthService::new(Some(2)).unwrap();
        let status = svc.check(&cfg("localhost:1".into(), "m")).await;
        assert!(!status.ok);
        assert_eq!(status.latency_ms, 0);
    }
}
