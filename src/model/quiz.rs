use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub points: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_index: usize,
    pub selected_answer: i32,
    pub correct_answer: i32,
    pub correct: bool,
    pub points: i32,
}

/// Scored outcome of a single quiz submission.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: i32,
    pub total_score: i32,
    pub percentage: u32,
    pub results: Vec<QuestionResult>,
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub course_completed: bool,
}

impl QuizResult {
    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.correct).count()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizRetakeResponse {
    pub success: bool,
    pub lesson_id: i64,
    pub attempts_used: u32,
    pub max_attempts: Option<u32>,
    pub can_retake: bool,
}
