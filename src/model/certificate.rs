use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub certificate_code: String,
    pub completed_at: DateTime<Utc>,
    pub student_name: String,
}
