use error_stack::ResultExt;
use fantoccini::{Client, Locator};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use tracing::instrument;

use crate::{
    adapters::config::export_config::MantisConfig,
    domain::export::CsvDownload,
    ports::csv_export_source::{CsvExportSource, ExportSourceError},
};

use super::webdriver_session;

const SUBMIT_BUTTON: &str = "input[type='submit']";
/// Only rendered for a logged-in session.
const LOGOUT_LINK: &str = "a[href*='logout_page.php']";

/// Logs into Mantis through a browser, selects the project, then downloads
/// `csv_export.php` with the session cookies.
pub struct MantisCsvExporter {
    config: MantisConfig,
    http: reqwest::Client,
}

impl std::fmt::Debug for MantisCsvExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MantisCsvExporter {{ config: {:?} }}", self.config)
    }
}

impl MantisCsvExporter {
    pub fn new(config: MantisConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.config.host, path)
    }

    #[instrument]
    async fn session_cookies(&self) -> error_stack::Result<String, ExportSourceError> {
        let client = webdriver_session::connect(&self.config.webdriver_url).await?;

        let cookies = self.log_in_and_select_project(&client).await;

        if let Err(error) = client.close().await {
            tracing::warn!("Failed to close WebDriver session: {}", error);
        }

        cookies
    }

    async fn log_in_and_select_project(
        &self,
        client: &Client,
    ) -> error_stack::Result<String, ExportSourceError> {
        tracing::trace!("🔑 Logging into {} as {}", self.config.host, self.config.username);

        client
            .goto(&self.url("login_page.php"))
            .await
            .change_context(ExportSourceError::LoginFailed)?;

        // Username and password are asked on two consecutive pages.
        for (field, value) in [
            ("username", &self.config.username),
            ("password", &self.config.password),
        ] {
            client
                .wait()
                .for_element(Locator::Id(field))
                .await
                .change_context(ExportSourceError::LoginFailed)
                .attach_printable_lazy(|| format!("missing '{}' field", field))?
                .send_keys(value)
                .await
                .change_context(ExportSourceError::LoginFailed)?;

            client
                .find(Locator::Css(SUBMIT_BUTTON))
                .await
                .change_context(ExportSourceError::LoginFailed)?
                .click()
                .await
                .change_context(ExportSourceError::LoginFailed)?;
        }

        client
            .wait()
            .for_element(Locator::Css(LOGOUT_LINK))
            .await
            .change_context(ExportSourceError::LoginFailed)
            .attach_printable("login was not accepted")?;

        let project_id = self.config.project_id;
        client
            .goto(&self.url(&format!("set_project.php?project_id={}", project_id)))
            .await
            .change_context(ExportSourceError::ProjectSelectionFailed(project_id))?;

        let cookies = client
            .get_all_cookies()
            .await
            .change_context(ExportSourceError::LoginFailed)?;

        Ok(cookie_header(
            cookies.iter().map(|cookie| (cookie.name(), cookie.value())),
        ))
    }
}

#[async_trait::async_trait]
impl CsvExportSource for MantisCsvExporter {
    #[instrument]
    async fn download_csv(&self) -> error_stack::Result<CsvDownload, ExportSourceError> {
        let cookies = self.session_cookies().await?;
        let url = self.url("csv_export.php");

        tracing::trace!("📥 Downloading {}", url);
        let response = self
            .http
            .get(&url)
            .header(COOKIE, cookies)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .change_context(ExportSourceError::DownloadFailed)
            .attach_printable_lazy(|| format!("url: {}", url))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .change_context(ExportSourceError::DownloadFailed)?
            .to_vec();

        Ok(CsvDownload { content_type, body })
    }
}

fn join_url(host: &str, path: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), path)
}

/// `Cookie` request header carrying every cookie of the browser session.
fn cookie_header<'a>(cookies: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    cookies
        .into_iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://mantis.example.com/", "csv_export.php"),
            "http://mantis.example.com/csv_export.php"
        );
        assert_eq!(
            join_url("https://tracker.example.com/mantis", "login_page.php"),
            "https://tracker.example.com/mantis/login_page.php"
        );
    }

    #[test]
    fn test_cookie_header() {
        assert_eq!(
            cookie_header([("MANTIS_STRING_COOKIE", "abc"), ("MANTIS_PROJECT_COOKIE", "3")]),
            "MANTIS_STRING_COOKIE=abc; MANTIS_PROJECT_COOKIE=3"
        );
        assert_eq!(cookie_header([]), "");
    }
}
