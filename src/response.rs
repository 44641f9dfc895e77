use crate::errors::AppError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Error body the backend attaches to non-2xx responses.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Prefers `message`, falls back to `error`, ignores blank strings.
    pub fn into_message(self) -> Option<String> {
        self.message
            .into_iter()
            .chain(self.error)
            .find(|text| !text.trim().is_empty())
    }
}

/// Turns a raw backend response into `T` or a classified `AppError`.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, AppError> {
    if status.is_success() {
        debug!("Decoding {} byte response body ({})", body.len(), status);
        return serde_json::from_slice(body).map_err(|err| {
            warn!("Response body did not match the expected shape: {:?}", err);
            AppError::Decode(err)
        });
    }

    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_default();

    warn!("Backend responded with {}: {}", status, message);
    Err(AppError::from_status(status, message))
}
