//! Single-shot generation on the document profile and strict output parsing.

use std::time::Instant;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::error::ContextorError;

/// Calls the chat model once. No retry.
pub async fn generate(svc: &LlmServiceProfiles, prompt: &str) -> Result<String, ContextorError> {
    let started = Instant::now();
    let out = svc.generate_document(prompt, None).await?;
    info!(
        prompt_chars = prompt.len(),
        answer_chars = out.len(),
        latency_ms = started.elapsed().as_millis(),
        "generation completed"
    );
    Ok(out)
}

/// Parses model output as JSON into `T`. The text is taken as-is: no fence
/// stripping and no repair.
pub fn parse_structured<T: DeserializeOwned>(
    raw: &str,
    what: &'static str,
) -> Result<T, ContextorError> {
    serde_json::from_str(raw).map_err(|e| {
        error!(what, error = %e, raw_chars = raw.len(), "model output is not valid JSON");
        ContextorError::MalformedOutput {
            what,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_types::{MultipleChoiceQuestion, QuestionAnswer};

    #[test]
    fn parses_question_list() {
        let qs: Vec<QuestionAnswer> =
            parse_structured(r#"[{"question":"Why?","answer":"Because."}]"#, "questions").unwrap();
        assert_eq!(qs[0].answer, "Because.");
    }

    #[test]
    fn code_fences_are_not_stripped() {
        let err = parse_structured::<Vec<QuestionAnswer>>(
            "```json\n[{\"question\":\"q\",\"answer\":\"a\"}]\n```",
            "questions",
        )
        .unwrap_err();
        assert!(matches!(err, ContextorError::MalformedOutput { what: "questions", .. }));
    }

    #[test]
    fn mcq_requires_all_four_choices() {
        let raw = r#"[{"question":"q","choices":{"A":"1","B":"2","C":"3"},"correct_answer":"A"}]"#;
        assert!(parse_structured::<Vec<MultipleChoiceQuestion>>(raw, "MCQ").is_err());
    }
}
