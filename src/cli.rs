use clap::{Parser, Subcommand};
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Backend API base URL (e.g., "https://example.com/api")
    /// Can also be set using the API_URL environment variable.
    /// Default value: http://localhost:3000/api
    #[arg(long, env = "API_URL", default_value = "http://localhost:3000/api")]
    pub api_url: Url,

    /// Base URL the media proxy is served from
    /// Can also be set using the MEDIA_BASE_URL environment variable.
    /// Default value: http://localhost:3000
    #[arg(long, env = "MEDIA_BASE_URL", default_value = "http://localhost:3000")]
    pub media_base_url: Url,

    /// Bot the mini app was opened from
    /// Can also be set using the BOT_ID environment variable.
    #[arg(long, env = "BOT_ID")]
    pub bot_id: Option<i64>,

    /// Full launch URL; its `botId` query parameter is used when --bot-id is absent
    /// Can also be set using the LAUNCH_URL environment variable.
    #[arg(long, env = "LAUNCH_URL")]
    pub launch_url: Option<Url>,

    /// Signed Telegram init data
    /// Can also be set using the TELEGRAM_INIT_DATA environment variable.
    #[arg(long, env = "TELEGRAM_INIT_DATA", hide_env_values = true)]
    pub init_data: Option<String>,

    /// Log level (e.g., "info")
    /// Can also be set using the RUST_LOG environment variable.
    /// Default value: info
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List enrolled and available courses
    Courses,
    /// Enroll into a free course
    Enroll { course_id: i64 },
    /// Show the syllabus of a course
    Outline { course_id: i64 },
    /// Show which lesson comes next and when it unlocks
    Next { course_id: i64 },
    /// Show a lesson
    Lesson { course_id: i64, lesson_id: i64 },
    /// Mark a text, file or video lesson as completed
    Complete { course_id: i64, lesson_id: i64 },
    /// Answer a quiz; one zero-based option index per question
    Quiz {
        course_id: i64,
        lesson_id: i64,
        #[arg(required = true, num_args = 1..)]
        answers: Vec<usize>,
    },
    /// Start a new quiz attempt
    Retake { course_id: i64, lesson_id: i64 },
    /// Have the bot send a lesson video to the chat
    Watch { course_id: i64, lesson_id: i64 },
    /// Summarize progress over all enrolled courses
    Progress,
    /// List earned certificates
    Certificates,
    /// Print the proxied URL of a media asset
    Media { media_id: i64 },
}
