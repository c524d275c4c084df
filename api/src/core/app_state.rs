use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use contextor::Contextor;
use doc_extract::{
    PageOcr, PdfExtractor,
    azure_read::{AzureReadConfig, AzureReadOcr},
};
use rag_store::{RagConfig, RagStore};
use services::storage::{DocumentStorage, StorageConfig};
use speech_service::{AzureSpeechClient, SpeechConfig, SpeechError};
use tracing::{info, warn};
use voice_agent::{VoicePipeline, system_prompt_from_env};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub storage: DocumentStorage,
    pub extractor: PdfExtractor,
    pub rag: RagStore,
    pub contextor: Contextor,
    pub llm: Arc<LlmServiceProfiles>,
    /// `None` when speech credentials are missing.
    pub voice: Option<VoicePipeline>,
    /// First turn of every WebSocket conversation.
    pub voice_system_prompt: String,
}

impl AppState {
    pub fn new(
        storage: DocumentStorage,
        extractor: PdfExtractor,
        rag: RagStore,
        llm: Arc<LlmServiceProfiles>,
        voice: Option<VoicePipeline>,
    ) -> Self {
        let contextor = Contextor::new(rag.clone(), llm.clone());
        let voice_system_prompt = system_prompt_from_env();
        Self {
            storage,
            extractor,
            rag,
            contextor,
            llm,
            voice,
            voice_system_prompt,
        }
    }

    /// Load shared state from environment variables.
    ///
    /// OCR and voice are optional: missing credentials disable them with a
    /// warning, anything else misconfigured is an error.
    pub async fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(LlmServiceProfiles::from_env()?);

        let rag = RagStore::from_config(RagConfig::from_env()?, llm.clone())?;
        if let Err(e) = rag.ensure_ready().await {
            warn!(error = %e, "vector index not ready at startup; will retry on first upload");
        }

        let ocr: Option<Arc<dyn PageOcr>> = match AzureReadConfig::from_env()? {
            Some(cfg) => Some(Arc::new(AzureReadOcr::new(cfg)?)),
            None => {
                warn!("OCR_ENDPOINT/OCR_KEY not set; OCR fallback disabled");
                None
            }
        };
        let extractor = PdfExtractor::with_ocr(ocr);

        let voice = match SpeechConfig::from_env() {
            Ok(cfg) => {
                let speech = Arc::new(AzureSpeechClient::new(cfg)?);
                Some(VoicePipeline::new(speech.clone(), speech, llm.clone()))
            }
            Err(SpeechError::MissingConfig(var)) => {
                warn!(missing = var, "speech not configured; /ws disabled");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let storage = DocumentStorage::new(StorageConfig::from_env());
        info!(
            upload_dir = %storage.config().upload_dir.display(),
            ocr = extractor.ocr_enabled(),
            voice = voice.is_some(),
            "application state ready"
        );

        Ok(Self::new(storage, extractor, rag, llm, voice))
    }
}
