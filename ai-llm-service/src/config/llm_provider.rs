/// Represents the provider (backend) used for chat completions and embeddings.
///
/// Both variants speak the OpenAI wire format; they differ in URL layout and
/// authentication header:
///
/// - [`LlmProvider::OpenAI`] → `{endpoint}/v1/...` with `Authorization: Bearer`
/// - [`LlmProvider::AzureOpenAI`] → `{endpoint}/openai/deployments/{model}/...?api-version=`
///   with `api-key`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Public OpenAI API (or any OpenAI-compatible gateway).
    OpenAI,
    /// Azure OpenAI resource; `model` is the deployment name.
    AzureOpenAI,
}

impl LlmProvider {
    /// Parses the `LLM_KIND` value (`openai` | `azure`), case-insensitive.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" => Some(LlmProvider::OpenAI),
            "azure" | "azure_openai" | "azure-openai" => Some(LlmProvider::AzureOpenAI),
            _ => None,
        }
    }
}
