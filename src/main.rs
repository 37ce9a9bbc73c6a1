use std::process::ExitCode;
use std::sync::Arc;

use structra_session::{ApiRequest, AppShell, ClientConfig, FileStore, SessionEvents};

const DEFAULT_PROBE_PATH: &str = "/auth/me/";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env().expect("invalid client config");
    let store = FileStore::open(&config.session_file).expect("failed to open session file");
    tracing::info!(base_url = %config.base_url, session_file = %store.path().display(), "session probe starting");

    let client = structra_session::SessionClient::new(config, Arc::new(store), SessionEvents::new())
        .expect("failed to build session client");
    let shell = AppShell::new(client, structra_session::routes::HOME_PATH);
    let _listener = shell.spawn_session_listener();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_PROBE_PATH.to_owned());
    match shell.client().send(ApiRequest::get(&path)).await {
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            println!("{status}\n{body}");
            if status.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Err(e) => {
            tracing::error!(error = %e, session_invalid = e.is_session_invalid(), "request failed");
            ExitCode::FAILURE
        }
    }
}
