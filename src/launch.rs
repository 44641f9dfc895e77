use crate::errors::AppError;
use tracing::{debug, error};
use url::Url;

pub const MISSING_INIT_DATA: &str = "No Telegram initData found. Please open this app from Telegram.";
pub const MISSING_BOT_ID: &str = "No botId found in URL.";

/// What the host hands over when the mini app is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchParams {
    pub bot_id: i64,
    pub init_data: String,
}

impl LaunchParams {
    /// Validates launch data. Both parts are required; a missing one is fatal.
    pub fn new(init_data: Option<String>, bot_id: Option<i64>) -> Result<Self, AppError> {
        let init_data = match init_data {
            Some(data) if !data.trim().is_empty() => data,
            _ => {
                error!("Launch rejected: init data is missing");
                return Err(AppError::Initialization(MISSING_INIT_DATA.to_string()));
            }
        };

        let Some(bot_id) = bot_id else {
            error!("Launch rejected: bot id is missing");
            return Err(AppError::Initialization(MISSING_BOT_ID.to_string()));
        };

        debug!("Launch parameters accepted for bot {}", bot_id);
        Ok(LaunchParams { bot_id, init_data })
    }

    /// Reads the bot id from the `botId` query parameter of the launch URL.
    pub fn from_launch_url(url: &Url, init_data: Option<String>) -> Result<Self, AppError> {
        Self::new(init_data, bot_id_from_url(url))
    }
}

/// Returns the `botId` query parameter when it is a valid positive integer.
pub fn bot_id_from_url(url: &Url) -> Option<i64> {
    url.query_pairs()
        .find(|(key, _)| key == "botId")
        .and_then(|(_, value)| value.parse::<i64>().ok())
        .filter(|id| *id > 0)
}
