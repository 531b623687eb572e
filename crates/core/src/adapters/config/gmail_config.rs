use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GmailConfig {
    /// Path to the service account key JSON.
    pub priv_key: Box<str>,
    /// Mailbox addressed by the API. `me` is the impersonated user.
    #[serde(default = "default_user")]
    pub user: Box<str>,
    /// User impersonated through domain-wide delegation.
    #[serde(default)]
    pub subject: Option<Box<str>>,
}

fn default_user() -> Box<str> {
    "me".into()
}
