//! OCR through the Azure Computer Vision Read API (v3.2).
//!
//! 1. `POST {endpoint}/vision/v3.2/read/analyze?pages=N` with the PDF bytes
//!    → `202 Accepted` + `Operation-Location` header.
//! 2. Poll `GET {Operation-Location}` until `status` is `succeeded` or `failed`.
//! 3. Join `analyzeResult.readResults[].lines[].text` with single spaces.
//!
//! # Environment
//! - `OCR_ENDPOINT`  resource endpoint, e.g. `https://my-vision.cognitiveservices.azure.com`
//! - `OCR_KEY`       subscription key
//! - `OCR_POLL_MS`   delay between polls (default 500)
//! - `OCR_MAX_POLLS` polls before giving up (default 60)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::{PageOcr, errors::ExtractError};

#[derive(Debug, Clone, PartialEq)]
pub struct AzureReadConfig {
    pub endpoint: String,
    pub key: String,
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub timeout_secs: u64,
}

impl AzureReadConfig {
    /// `Ok(None)` when OCR is not configured (`OCR_ENDPOINT` or `OCR_KEY` unset).
    pub fn from_env() -> Result<Option<Self>, ExtractError> {
        let (Some(endpoint), Some(key)) = (env("OCR_ENDPOINT"), env("OCR_KEY")) else {
            return Ok(None);
        };
        let poll_ms = match env("OCR_POLL_MS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ExtractError::Config("OCR_POLL_MS must be a u64"))?,
            None => 500,
        };
        let max_polls = match env("OCR_MAX_POLLS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .map_err(|_| ExtractError::Config("OCR_MAX_POLLS must be a u32"))?,
            None => 60,
        };
        Ok(Some(Self {
            endpoint,
            key,
            poll_interval: Duration::from_millis(poll_ms),
            max_polls,
            timeout_secs: 30,
        }))
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug)]
pub struct AzureReadOcr {
    client: reqwest::Client,
    cfg: AzureReadConfig,
    url_analyze: String,
}

impl AzureReadOcr {
    pub fn new(cfg: AzureReadConfig) -> Result<Self, ExtractError> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ExtractError::Config(
                "OCR_ENDPOINT must start with http:// or https://",
            ));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::HeaderName::from_static("ocp-apim-subscription-key"),
            header::HeaderValue::from_str(&cfg.key)
                .map_err(|_| ExtractError::Config("OCR_KEY is not a valid header value"))?,
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        let url_analyze = format!(
            "{}/vision/v3.2/read/analyze",
            endpoint.trim_end_matches('/')
        );
        info!(url = %url_analyze, max_polls = cfg.max_polls, "AzureReadOcr initialized");

        Ok(Self {
            client,
            cfg,
            url_analyze,
        })
    }

    async fn submit(&self, pdf: &[u8], page: u32) -> Result<String, ExtractError> {
        let resp = self
            .client
            .post(&self.url_analyze)
            .query(&[("pages", page.to_string())])
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(pdf.to_vec())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(http_error(status, &self.url_analyze, &text));
        }

        resp.headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ExtractError::OcrFailed("missing Operation-Location header".into()))
    }

    async fn poll(&self, operation: &str) -> Result<ReadOperation, ExtractError> {
        for attempt in 1..=self.cfg.max_polls {
            let resp = self.client.get(operation).send().await?;
            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                return Err(http_error(status, operation, &text));
            }
            let op: ReadOperation = resp
                .json()
                .await
                .map_err(|e| ExtractError::OcrFailed(format!("decode read result: {e}")))?;

            match op.status.as_str() {
                "succeeded" => return Ok(op),
                "failed" => return Err(ExtractError::OcrFailed("read operation failed".into())),
                other => {
                    debug!(attempt, status = other, "read operation pending");
                    tokio::time::sleep(self.cfg.poll_interval).await;
                }
            }
        }
        Err(ExtractError::OcrTimeout(self.cfg.max_polls))
    }
}

fn http_error(status: reqwest::StatusCode, url: &str, body: &str) -> ExtractError {
    let snippet: String = body.trim().chars().take(300).collect();
    error!(%status, %url, %snippet, "OCR request returned non-success status");
    ExtractError::OcrHttp {
        status,
        url: url.to_string(),
        snippet,
    }
}

#[async_trait]
impl PageOcr for AzureReadOcr {
    async fn ocr_page(&self, pdf: &[u8], page: u32) -> Result<String, ExtractError> {
        let started = Instant::now();
        let operation = self.submit(pdf, page).await?;
        let op = self.poll(&operation).await?;

        let text = op
            .analyze_result
            .map(|r| {
                r.read_results
                    .iter()
                    .flat_map(|p| p.lines.iter().map(|l| l.text.as_str()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        info!(
            page,
            chars = text.len(),
            latency_ms = started.elapsed().as_millis(),
            "page OCR completed"
        );
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadOperation {
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResult {
    #[serde(default)]
    read_results: Vec<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
struct ReadLine {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ocr(server: &MockServer, max_polls: u32) -> AzureReadOcr {
        AzureReadOcr::new(AzureReadConfig {
            endpoint: server.uri(),
            key: "vision-key".into(),
            poll_interval: Duration::from_millis(1),
            max_polls,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn submits_page_and_joins_lines() {
        let server = MockServer::start().await;
        let op_url = format!("{}/vision/v3.2/read/analyzeResults/op-1", server.uri());

        Mock::given(method("POST"))
            .and(path("/vision/v3.2/read/analyze"))
            .and(query_param("pages", "2"))
            .and(header("ocp-apim-subscription-key", "vision-key"))
            .respond_with(ResponseTemplate::new(202).insert_header("Operation-Location", op_url.as_str()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/vision/v3.2/read/analyzeResults/op-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "succeeded",
                "analyzeResult": {
                    "readResults": [
                        { "page": 2, "lines": [ { "text": "Chapter 2" }, { "text": "Cells divide." } ] }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let text = ocr(&server, 3).ocr_page(b"%PDF", 2).await.unwrap();
        assert_eq!(text, "Chapter 2 Cells divide.");
    }

    #[tokio::test]
    async fn gives_up_after_max_polls() {
        let server = MockServer::start().await;
        let op_url = format!("{}/op", server.uri());
        Mock::given(method("POST"))
            .and(path("/vision/v3.2/read/analyze"))
            .respond_with(ResponseTemplate::new(202).insert_header("Operation-Location", op_url.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/op"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "running" })))
            .expect(2)
            .mount(&server)
            .await;

        let err = ocr(&server, 2).ocr_page(b"%PDF", 1).await.unwrap_err();
        assert!(matches!(err, ExtractError::OcrTimeout(2)));
    }

    #[tokio::test]
    async fn rejected_submission_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vision/v3.2/read/analyze"))
            .respond_with(ResponseTemplate::new(400).set_body_string("InvalidImage"))
            .mount(&server)
            .await;

        let err = ocr(&server, 1).ocr_page(b"%PDF", 1).await.unwrap_err();
        assert!(matches!(err, ExtractError::OcrHttp { status, .. } if status.as_u16() == 400));
    }
}
