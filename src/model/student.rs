use crate::model::course::{AvailableCourse, CourseWithProgress};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub telegram_user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl Student {
    /// Full name if any part is known, otherwise the username, otherwise a placeholder.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !full.is_empty() {
            return full;
        }

        match &self.username {
            Some(username) if !username.is_empty() => format!("@{}", username),
            _ => "Student".to_string(),
        }
    }

    /// Single letter for the avatar badge.
    pub fn initial(&self) -> char {
        self.first_name
            .as_deref()
            .and_then(|name| name.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

/// Snapshot returned by `POST /webapp/init/{botId}`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub web_token: String,
    pub student: Student,
    pub bot_id: i64,
    pub my_courses: Vec<CourseWithProgress>,
    pub available_courses: Vec<AvailableCourse>,
}
