//! Prompt templates. Each is filled once per request; context is inserted
//! verbatim, without truncation.

pub const QUERY_TEMPLATE: &str = "Use the following context to answer the user's question.\n\nContext: {context}\n\nQuestion: {question}\n\nAnswer:";

pub const QA_TEMPLATE: &str = "Generate 3 open-ended questions based on the following text. For each question, also provide a concise answer. Format your response as a JSON array of objects with the keys \"question\" and \"answer\":\n\n{context}";

pub const MCQ_TEMPLATE: &str = r#"Create {num_questions} multiple-choice questions with 4 options each based on the following text. Format your response as a JSON list of questions:

[
    {
        "question": "Your question here",
        "choices": {
            "A": "First option",
            "B": "Second option",
            "C": "Third option",
            "D": "Fourth option"
        },
        "correct_answer": "A"
    }
]

Text: {context}"#;

pub const SUMMARY_TEMPLATE: &str =
    "Provide a comprehensive summary of the following text:\n\n{context}";

/// Replaces `{name}` slots. Values are not re-scanned, so a context that
/// itself contains `{question}` is left alone.
fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    'scan: while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        for (name, value) in slots {
            let key = format!("{{{name}}}");
            if tail.starts_with(&key) {
                out.push_str(value);
                rest = &tail[key.len()..];
                continue 'scan;
            }
        }
        out.push('{');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

pub fn build_query_prompt(context: &str, question: &str) -> String {
    fill(QUERY_TEMPLATE, &[("context", context), ("question", question)])
}

pub fn build_qa_prompt(context: &str) -> String {
    fill(QA_TEMPLATE, &[("context", context)])
}

pub fn build_mcq_prompt(context: &str, num_questions: u32) -> String {
    let n = num_questions.to_string();
    fill(MCQ_TEMPLATE, &[("context", context), ("num_questions", &n)])
}

pub fn build_summary_prompt(context: &str) -> String {
    fill(SUMMARY_TEMPLATE, &[("context", context)])
}
