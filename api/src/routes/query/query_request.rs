use serde::Deserialize;

/// Query string of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// Natural language question.
    pub query: String,
    /// Optional override of the number of retrieved chunks.
    #[serde(default)]
    pub k: Option<u64>,
}
