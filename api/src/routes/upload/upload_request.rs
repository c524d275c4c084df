use serde::{Deserialize, Serialize};

/// Query string of `POST /upload`.
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Optional sub-directory under the upload and text roots.
    #[serde(default)]
    pub directory: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    /// Path of the extracted text mirror.
    pub text_file: String,
    /// Records added to the vector index.
    pub chunks: usize,
}
