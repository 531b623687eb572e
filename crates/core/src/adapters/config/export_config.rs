use serde::Deserialize;

pub const DEFAULT_MANTIS_HOST: &str = "http://mantis.example.com";
pub const DEFAULT_PROJECT_ID: u32 = 1;
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Login and project of a Mantis instance.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct MantisConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_project_id")]
    pub project_id: u32,
    /// Running WebDriver server (chromedriver, geckodriver) used for the login.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

impl std::fmt::Debug for MantisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MantisConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("webdriver_url", &self.webdriver_url)
            .finish()
    }
}

/// One tracker-to-mailbox export job.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub name: String,
    #[serde(flatten)]
    pub mantis: MantisConfig,
    /// `From` address. Must be the mailbox the Gmail credentials act for.
    pub sender: String,
    /// Defaults to `sender`.
    #[serde(default)]
    pub recipient: Option<String>,
}

impl ExportConfig {
    pub fn recipient(&self) -> &str {
        self.recipient.as_deref().unwrap_or(&self.sender)
    }
}

fn default_host() -> String {
    DEFAULT_MANTIS_HOST.to_string()
}

fn default_project_id() -> u32 {
    DEFAULT_PROJECT_ID
}

fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}
