use crate::model::lesson::{LessonStatus, LessonType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    #[serde(rename = "none")]
    NotEnrolled,
    Active,
    Blocked,
    Completed,
}

impl EnrollmentStatus {
    /// Blocked or absent enrollments open nothing, whatever the lesson says.
    pub fn allows_access(self) -> bool {
        matches!(self, EnrollmentStatus::Active | EnrollmentStatus::Completed)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithProgress {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub enrollment_id: i64,
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub status: EnrollmentStatus,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCourse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub total_lessons: u32,
}

impl AvailableCourse {
    /// Paid courses are bought through the bot, only free ones enroll from here.
    pub fn is_free(&self) -> bool {
        self.price.is_none_or(|price| price <= 0.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CoursesResponse {
    pub my_courses: Vec<CourseWithProgress>,
    pub available_courses: Vec<AvailableCourse>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    pub enrollment_id: i64,
    pub course_id: i64,
    pub title: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LessonWithStatus {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub order: i32,
    pub status: LessonStatus,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModuleWithLessons {
    pub id: i64,
    pub title: String,
    pub order: i32,
    pub lessons: Vec<LessonWithStatus>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub enrollment_id: i64,
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub modules: Vec<ModuleWithLessons>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NextLessonResponse {
    pub lesson_id: Option<i64>,
    pub module_id: Option<i64>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub unlock_date: Option<DateTime<Utc>>,
}
