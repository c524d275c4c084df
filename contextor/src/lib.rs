//! RAG + LLM gateway for uploaded documents.
//!
//! [`Contextor`] embeds a query, retrieves top-K chunks from `rag-store`,
//! joins them in ranked order and fills one of the fixed templates in
//! [`prompt`]. The model is called once per request.
//!
//! - [`Contextor::ask`]: free-text answer with context and sources
//! - [`Contextor::generate_qa`] / [`Contextor::generate_mcq`]: JSON output
//!   parsed into fixed types, failing with [`ContextorError::MalformedOutput`]
//! - [`Contextor::summarize`]: document summary

mod api_types;
mod error;
mod llm;
pub mod prompt;
mod retrieve;

use std::sync::Arc;

pub use api_types::{
    DocumentSummary, McqChoices, MultipleChoiceQuestion, QueryAnswer, QuestionAnswer, Source,
};
pub use error::ContextorError;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use rag_store::RagStore;
use tracing::info;

/// Query used to retrieve context for MCQs when the caller gives none.
pub const DEFAULT_MCQ_QUERY: &str = "create MCQs";
/// Query used to retrieve context for the summary.
pub const SUMMARY_QUERY: &str = "Create a Summary of the document";

#[derive(Clone)]
pub struct Contextor {
    store: RagStore,
    svc: Arc<LlmServiceProfiles>,
}

impl Contextor {
    pub fn new(store: RagStore, svc: Arc<LlmServiceProfiles>) -> Self {
        Self { store, svc }
    }

    pub fn store(&self) -> &RagStore {
        &self.store
    }

    /// Answers `question` from the top-`k` chunks (default `RAG_QUERY_TOP_K`).
    ///
    /// # Errors
    /// - [`ContextorError::EmptyQuery`] for a blank question
    /// - [`ContextorError::InvalidTopK`] for `k == Some(0)`
    /// - [`ContextorError::NoIndex`] if nothing was ingested; no remote call is made
    /// - [`ContextorError::UpstreamUnavailable`] if embedding, search or chat fails
    pub async fn ask(&self, question: &str, k: Option<u64>) -> Result<QueryAnswer, ContextorError> {
        let question = non_empty(question)?;
        let top_k = match k {
            Some(0) => return Err(ContextorError::InvalidTopK),
            Some(k) => k,
            None => self.store.config().query_top_k,
        };

        let retrieved = retrieve::retrieve(&self.store, question, top_k).await?;
        let prompt = prompt::build_query_prompt(&retrieved.context, question);
        let answer = llm::generate(&self.svc, &prompt).await?;

        info!(top_k, sources = retrieved.hits.len(), "query answered");
        Ok(QueryAnswer {
            answer: answer.trim().to_string(),
            sources: retrieved.sources(),
            context: retrieved.context,
        })
    }

    /// Three open-ended questions with concise answers.
    pub async fn generate_qa(&self, query: &str) -> Result<Vec<QuestionAnswer>, ContextorError> {
        let query = non_empty(query)?;
        let retrieved =
            retrieve::retrieve(&self.store, query, self.store.config().default_top_k).await?;
        let raw = llm::generate(&self.svc, &prompt::build_qa_prompt(&retrieved.context)).await?;
        llm::parse_structured(&raw, "questions")
    }

    /// `num_questions` multiple-choice questions with options `A`-`D`.
    pub async fn generate_mcq(
        &self,
        query: Option<&str>,
        num_questions: u32,
    ) -> Result<Vec<MultipleChoiceQuestion>, ContextorError> {
        let query = non_empty(query.unwrap_or(DEFAULT_MCQ_QUERY))?;
        let retrieved =
            retrieve::retrieve(&self.store, query, self.store.config().default_top_k).await?;
        let prompt = prompt::build_mcq_prompt(&retrieved.context, num_questions);
        let raw = llm::generate(&self.svc, &prompt).await?;
        llm::parse_structured(&raw, "MCQ")
    }

    pub async fn summarize(&self) -> Result<DocumentSummary, ContextorError> {
        let retrieved =
            retrieve::retrieve(&self.store, SUMMARY_QUERY, self.store.config().default_top_k)
                .await?;
        let summary =
            llm::generate(&self.svc, &prompt::build_summary_prompt(&retrieved.context)).await?;
        Ok(DocumentSummary {
            summary: summary.trim().to_string(),
            context: retrieved.context,
        })
    }
}

fn non_empty(q: &str) -> Result<&str, ContextorError> {
    let q = q.trim();
    if q.is_empty() {
        return Err(ContextorError::EmptyQuery);
    }
    Ok(q)
}
