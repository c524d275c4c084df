use contextor::{MultipleChoiceQuestion, QuestionAnswer};
use serde::{Deserialize, Serialize};

/// Query string of `POST /qa`.
#[derive(Debug, Deserialize)]
pub struct QaParams {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QaResponse {
    pub questions: Vec<QuestionAnswer>,
}

/// Query string of `POST /mcq`. Both fields are optional.
#[derive(Debug, Deserialize)]
pub struct McqParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
}

fn default_num_questions() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct McqResponse {
    pub multiple_choice_questions: Vec<MultipleChoiceQuestion>,
}
