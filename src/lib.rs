use crate::api::WebappApi;
use crate::cli::Args;
use crate::errors::AppError;
use crate::launch::LaunchParams;
use crate::session::Session;
use tracing::info;
use url::Url;

pub mod api;
pub mod certificates;
pub mod cli;
pub mod errors;
pub mod launch;
pub mod lesson;
pub mod media;
pub mod model;
pub mod outline;
pub mod payloads;
pub mod progress;
pub mod quiz;
pub mod response;
pub mod session;

/// Builds the API client for the configured backend with a fresh session.
pub fn init_client(args: &Args) -> WebappApi {
    info!("Initializing API client for {}...", args.api_url);
    WebappApi::new(&args.api_url, Session::new())
}

pub fn init_test_client(base_url: &Url, session: Session) -> WebappApi {
    WebappApi::new(base_url, session)
}

/// Validates the launch parameters given on the command line or environment.
pub fn init_launch(args: &Args) -> Result<LaunchParams, AppError> {
    match (&args.bot_id, &args.launch_url) {
        (None, Some(launch_url)) => {
            LaunchParams::from_launch_url(launch_url, args.init_data.clone())
        }
        _ => LaunchParams::new(args.init_data.clone(), args.bot_id),
    }
}
