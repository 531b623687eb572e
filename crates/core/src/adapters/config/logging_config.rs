use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}
