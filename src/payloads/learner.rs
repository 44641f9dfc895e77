use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    pub init_data: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnrollPayload {
    pub course_id: i64,
}

/// One selected option index per question, in question order.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizSubmitPayload {
    pub answers: Vec<i32>,
}
