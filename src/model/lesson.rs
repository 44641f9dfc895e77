use crate::model::quiz::QuizQuestion;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Locked,
    NotStarted,
    InProgress,
    Completed,
}

impl LessonStatus {
    pub fn is_completed(self) -> bool {
        self == LessonStatus::Completed
    }

    pub fn label(self) -> &'static str {
        match self {
            LessonStatus::Locked => "Locked",
            LessonStatus::NotStarted => "Not started",
            LessonStatus::InProgress => "In progress",
            LessonStatus::Completed => "Completed",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
    Text,
    Video,
    File,
    Quiz,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    File,
    Link,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub label: String,
    pub url: String,
}

/// Lesson content as returned by `GET /webapp/courses/{id}/lessons/{lessonId}`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetail {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub resources: Option<Vec<Resource>>,
    #[serde(default)]
    pub questions: Option<Vec<QuizQuestion>>,
    #[serde(default)]
    pub can_play_in_webapp: bool,
    pub status: LessonStatus,
}

impl LessonDetail {
    pub fn resources(&self) -> &[Resource] {
        self.resources.as_deref().unwrap_or_default()
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        self.questions.as_deref().unwrap_or_default()
    }

    /// A video with a direct source plays in place, otherwise it is delivered to the chat.
    pub fn playable_video_url(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub course_completed: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct VideoRequestResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
