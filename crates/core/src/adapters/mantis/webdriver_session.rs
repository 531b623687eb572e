use error_stack::ResultExt;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::instrument;

use crate::ports::csv_export_source::ExportSourceError;

const CHROME_ARGS: [&str; 3] = ["--headless", "--no-sandbox", "--disable-dev-shm-usage"];

/// Capabilities asking either Chrome or Firefox for a headless window.
pub fn headless_capabilities() -> serde_json::Map<String, serde_json::Value> {
    let mut capabilities = serde_json::Map::new();
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": CHROME_ARGS }));
    capabilities.insert("moz:firefoxOptions".to_string(), json!({ "args": ["-headless"] }));
    capabilities
}

/// Opens a session on an already running WebDriver server.
#[instrument]
pub async fn connect(webdriver_url: &str) -> error_stack::Result<Client, ExportSourceError> {
    ClientBuilder::native()
        .capabilities(headless_capabilities())
        .connect(webdriver_url)
        .await
        .change_context(ExportSourceError::BrowserUnavailable)
        .attach_printable_lazy(|| format!("Failed to connect to WebDriver at {}", webdriver_url))
}
