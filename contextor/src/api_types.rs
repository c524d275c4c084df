//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::{Deserialize, Serialize};

/// One retrieved chunk as reported to callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Source {
    pub content: String,
    pub score: f32,
}

/// Answer of a RAG query together with the exact context passed to the model.
#[derive(Clone, Debug, Serialize)]
pub struct QueryAnswer {
    pub answer: String,
    /// Chunk texts in ranked order, joined by `\n`.
    pub context: String,
    pub sources: Vec<Source>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// The four options of a multiple-choice question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqChoices {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    pub question: String,
    pub choices: McqChoices,
    pub correct_answer: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct DocumentSummary {
    pub summary: String,
    pub context: String,
}
