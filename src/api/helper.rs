use crate::errors::AppError;
use crate::response;
use crate::session::Session;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

/// Attaches the session's bearer token, if one has been issued.
pub(super) fn authorize(request: RequestBuilder, session: &Session) -> RequestBuilder {
    match session.token() {
        Some(token) => request.bearer_auth(token),
        None => {
            warn!("Sending request without a session token");
            request
        }
    }
}

pub(super) async fn send_json<T>(request: RequestBuilder) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    let response = request.send().await.map_err(|transport_err| {
        error!("Request to backend failed: {:?}", transport_err);
        AppError::Transport(transport_err)
    })?;

    let status = response.status();
    debug!("Backend responded with {} for {}", status, response.url());

    let body = response.bytes().await.map_err(|body_err| {
        error!("Failed to read response body: {:?}", body_err);
        AppError::Transport(body_err)
    })?;

    response::decode(status, &body)
}
