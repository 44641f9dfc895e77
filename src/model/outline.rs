use crate::model::course::EnrollmentStatus;
use crate::model::lesson::{LessonStatus, LessonType};
use serde::{Deserialize, Serialize};

/// Per-lesson projection computed by the backend. The client renders it as-is.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonOutlineItem {
    pub id: i64,
    pub title: String,
    pub order: i32,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub status: LessonStatus,
    pub is_current: bool,
    pub can_open: bool,

    // quiz only
    #[serde(default)]
    pub is_quiz: bool,
    #[serde(default)]
    pub attempts_used: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub can_retake: Option<bool>,
    #[serde(default)]
    pub last_score: Option<i32>,
    #[serde(default)]
    pub last_score_percent: Option<u32>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOutlineItem {
    pub id: i64,
    pub title: String,
    pub order: i32,
    pub progress_percent: u32,
    pub lessons: Vec<LessonOutlineItem>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseOutline {
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub completion_percent: u32,
    pub current_lesson_id: Option<i64>,
    pub next_lesson_id: Option<i64>,

    pub allow_retake_quiz: bool,
    pub max_quiz_attempts: Option<u32>,

    pub is_drip: bool,
    pub drip_interval_days: Option<u32>,

    pub enrollment_status: EnrollmentStatus,
    pub modules: Vec<ModuleOutlineItem>,
}
