//! HTTP and WebSocket surface of the study backend.

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{
    core::{app_state::AppState, server_config::ServerConfig},
    error_handler::AppError,
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        health_route::health,
        query::query_route::query_document,
        study::{mcq_route::generate_mcq, qa_route::generate_qa, summary_route::summarize_document},
        upload::upload_route::upload_pdf,
        voice::ws_route::voice_ws,
    },
};

/// Builds state from the environment, binds `API_ADDRESS` and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let cfg = ServerConfig::from_env()?;
    let state = Arc::new(AppState::from_env().await?);
    let app = router(state, &cfg)?;

    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %cfg.address, cors_origin = %cfg.cors_origin, "API listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("API stopped");
    Ok(())
}

/// All routes with CORS, tracing, body limit and JSON rejection bodies.
pub fn router(state: Arc<AppState>, cfg: &ServerConfig) -> Result<Router, AppError> {
    let origin = HeaderValue::from_str(&cfg.cors_origin).map_err(|_| {
        AppError::Config(format!(
            "CORS_ALLOWED_ORIGIN is not a valid origin: `{}`",
            cfg.cors_origin
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Ok(Router::new()
        .route("/upload", post(upload_pdf))
        .route("/query", post(query_document))
        .route("/qa", post(generate_qa))
        .route("/mcq", post(generate_mcq))
        .route("/summary", get(summarize_document))
        .route("/health", get(health))
        .route("/ws", get(voice_ws))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .layer(middleware::from_fn(json_error_mapper))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::{LlmModelConfig, LlmProvider, LlmServiceProfiles};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use doc_extract::{ExtractError, PdfExtractor, TextLayer};
    use rag_store::{RagConfig, RagQuery, RagStore};
    use serde_json::{Value, json};
    use services::storage::{DocumentStorage, StorageConfig};
    use tower::ServiceExt;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DIM: usize = 3;
    const BOUNDARY: &str = "studymate-test-boundary";

    /// Text layer that returns fixed pages regardless of the bytes.
    struct FixedLayer(Vec<&'static str>);

    impl TextLayer for FixedLayer {
        fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<String>, ExtractError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn llm_cfg(server: &MockServer, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: model.into(),
            endpoint: server.uri(),
            api_key: Some("test-key".into()),
            api_version: None,
            max_tokens: None,
            temperature: Some(0.2),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    struct Harness {
        app: Router,
        rag: RagStore,
        _tmp: tempfile::TempDir,
        tmp_path: std::path::PathBuf,
    }

    fn harness(server: &MockServer, pages: Vec<&'static str>) -> Harness {
        harness_with(server, pages, ServerConfig::default())
    }

    fn harness_with(server: &MockServer, pages: Vec<&'static str>, cfg: ServerConfig) -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let tmp_path = tmp.path().to_path_buf();

        let llm = Arc::new(
            LlmServiceProfiles::new(
                llm_cfg(server, "gpt-test"),
                None,
                llm_cfg(server, "embed-test"),
                Some(2),
            )
            .unwrap(),
        );
        let rag = RagStore::from_config(RagConfig::in_memory(DIM), llm.clone()).unwrap();
        let storage = DocumentStorage::new(StorageConfig {
            upload_dir: tmp_path.join("uploaded_files"),
            extracted_text_dir: tmp_path.join("extracted_texts"),
        });
        let extractor = PdfExtractor::new(Arc::new(FixedLayer(pages)), None);

        let state = Arc::new(AppState::new(storage, extractor, rag.clone(), llm, None));
        Harness {
            app: router(state, &cfg).unwrap(),
            rag,
            _tmp: tmp,
            tmp_path,
        }
    }

    async fn mock_embeddings(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [ { "embedding": [0.1, 0.7, 0.2] } ]
            })))
            .mount(server)
            .await;
    }

    fn upload_request(directory: &str, filename: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             %PDF-1.5 test\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(format!("/upload?directory={directory}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn upload_then_query_answers_from_document() {
        let server = MockServer::start().await;
        mock_embeddings(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("The sky is blue."))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [ { "message": { "content": "blue" } } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server, vec!["The sky is blue."]);

        let res = h
            .app
            .clone()
            .oneshot(upload_request("science", "sky.pdf"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["chunks"], 1);
        assert!(h.tmp_path.join("uploaded_files/science/sky.pdf").exists());
        assert_eq!(
            std::fs::read_to_string(h.tmp_path.join("extracted_texts/science/sky.txt")).unwrap(),
            "The sky is blue."
        );

        let res = h
            .app
            .clone()
            .oneshot(post("/query?query=What%20color%20is%20the%20sky%3F"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["answer"], "blue");
        assert!(body["context"].as_str().unwrap().contains("The sky is blue."));
        assert_eq!(body["sources"][0]["content"], "The sky is blue.");
    }

    #[tokio::test]
    async fn chunk_metadata_uses_stored_names() {
        let server = MockServer::start().await;
        mock_embeddings(&server).await;

        let h = harness(&server, vec!["The sky is blue."]);
        let res = h
            .app
            .clone()
            .oneshot(upload_request("./science", "docs/sky.pdf"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let hits = h
            .rag
            .rag_context(RagQuery {
                text: "sky",
                top_k: 1,
            })
            .await
            .unwrap();
        assert_eq!(hits[0].filename.as_deref(), Some("sky.pdf"));
        assert_eq!(hits[0].directory.as_deref(), Some("science"));
    }

    #[tokio::test]
    async fn query_before_upload_is_client_error_without_remote_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let h = harness(&server, vec![]);
        let res = h.app.oneshot(post("/query?query=anything")).await.unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "NO_INDEX");
    }

    #[tokio::test]
    async fn zero_k_is_bad_request() {
        let server = MockServer::start().await;
        let h = harness(&server, vec![]);
        let res = h.app.oneshot(post("/query?query=sky&k=0")).await.unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn malformed_qa_output_is_server_error() {
        let server = MockServer::start().await;
        mock_embeddings(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [ { "message": { "content": "Here are three questions: ..." } } ]
            })))
            .mount(&server)
            .await;

        let h = harness(&server, vec!["Cells divide by mitosis."]);
        let res = h
            .app
            .clone()
            .oneshot(upload_request("", "cells.pdf"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = h.app.oneshot(post("/qa?query=cells")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(res).await;
        assert_eq!(body["error"], "MALFORMED_OUTPUT");
        assert!(body.get("questions").is_none());
    }

    #[tokio::test]
    async fn image_only_pdf_without_ocr_is_rejected() {
        let server = MockServer::start().await;
        let h = harness(&server, vec!["", "  "]);
        let res = h.app.oneshot(upload_request("", "scan.pdf")).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let server = MockServer::start().await;
        let cfg = ServerConfig {
            max_upload_bytes: 64,
            ..ServerConfig::default()
        };
        let h = harness_with(&server, vec!["The sky is blue."], cfg);
        let res = h.app.oneshot(upload_request("", "big.pdf")).await.unwrap();

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(res).await["error"], "PAYLOAD_TOO_LARGE");
        assert!(!h.tmp_path.join("uploaded_files/big.pdf").exists());
    }

    #[tokio::test]
    async fn missing_query_param_gets_json_error_body() {
        let server = MockServer::start().await;
        let h = harness(&server, vec![]);
        let res = h.app.oneshot(post("/query")).await.unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = json_body(res).await;
        assert_eq!(body["error"], "BAD_REQUEST");
        assert!(body["message"].as_str().unwrap().contains("query"));
    }

    #[tokio::test]
    async fn websocket_is_unavailable_without_speech() {
        let server = MockServer::start().await;
        let h = harness(&server, vec![]);
        let req = Request::builder().uri("/ws").body(Body::empty()).unwrap();
        let res = h.app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(res).await["error"], "VOICE_DISABLED");
    }
}
