use std::collections::HashSet;

use config::{Config, Environment, File, FileFormat};
use error_stack::{report, ResultExt};
use serde::Deserialize;
use thiserror::Error;

use super::{
    export_config::ExportConfig, gmail_config::GmailConfig, import_config::ImportConfig,
    logging_config::LoggingConfig, sheets_config::SpreadsheetConfig,
};

pub const DEFAULT_CONFIG_PATH: &str = "Config";
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
const ENV_PREFIX: &str = "MAIL_CSV_IMPORT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config file '{0}'")]
    Read(String),
    #[error("Failed to deserialize config field '{0}'")]
    Deserialize(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SpreadsheetConfig,
    pub gmail: GmailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub imports: Vec<ImportConfig>,
    #[serde(default)]
    pub exports: Vec<ExportConfig>,
}

impl AppConfig {
    /// Loads the config file at `path` (extension optional), then applies
    /// `MAIL_CSV_IMPORT__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> error_stack::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .change_context_lazy(|| ConfigError::Read(path.to_string()))?;

        Self::from_config(config)
    }

    /// Resolves the config path from an explicit value, `CONFIG_PATH`, or the
    /// default `Config` file.
    pub fn load_from(path: Option<&str>) -> error_stack::Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_string(),
            None => std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into()),
        };
        Self::load(&path)
    }

    pub fn from_toml_str(contents: &str) -> error_stack::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .change_context_lazy(|| ConfigError::Read("<inline>".to_string()))?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> error_stack::Result<Self, ConfigError> {
        let value = config
            .try_deserialize::<serde_json::Value>()
            .change_context_lazy(|| ConfigError::Deserialize("<root>".to_string()))?;

        let app_config: AppConfig = serde_path_to_error::deserialize(value).map_err(|err| {
            let path = err.path().to_string();
            report!(ConfigError::Deserialize(path)).attach_printable(err.into_inner().to_string())
        })?;

        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> error_stack::Result<(), ConfigError> {
        if self.imports.is_empty() && self.exports.is_empty() {
            return Err(report!(ConfigError::Invalid(
                "at least one [[imports]] or [[exports]] entry is required".to_string()
            )));
        }

        let mut names = HashSet::new();
        let job_names = self
            .imports
            .iter()
            .map(|import| import.name.as_str())
            .chain(self.exports.iter().map(|export| export.name.as_str()));
        for name in job_names {
            if !names.insert(name) {
                return Err(report!(ConfigError::Invalid(format!(
                    "duplicate job name '{}'",
                    name
                ))));
            }
        }

        for import in &self.imports {
            if import.result_limit == 0 {
                return Err(report!(ConfigError::Invalid(format!(
                    "imports.{}.result_limit must be at least 1",
                    import.name
                ))));
            }
        }

        Ok(())
    }

    pub fn import(&self, name: &str) -> Option<&ImportConfig> {
        self.imports.iter().find(|import| import.name == name)
    }

    pub fn export(&self, name: &str) -> Option<&ExportConfig> {
        self.exports.iter().find(|export| export.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::config::export_config::{DEFAULT_PROJECT_ID, DEFAULT_WEBDRIVER_URL};
    use crate::adapters::config::import_config::{DEFAULT_QUERY, DEFAULT_SHEET_NAME};
    use crate::domain::RaggedRowPolicy;

    const MINIMAL: &str = r#"
[sheets]
priv_key = "key.json"
spreadsheet_id = "sheet-id"

[gmail]
priv_key = "key.json"

[[imports]]
name = "mantis"
"#;

    #[test]
    fn test_import_defaults() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();
        let import = config.import("mantis").unwrap();

        assert_eq!(import, &ImportConfig::named("mantis"));
        assert_eq!(import.query, DEFAULT_QUERY);
        assert_eq!(import.result_limit, 10);
        assert_eq!(import.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(import.ragged_rows, RaggedRowPolicy::Pad);
        assert_eq!(config.sheets.value_input_option.as_ref(), "RAW");
        assert_eq!(config.gmail.user.as_ref(), "me");
        assert_eq!(config.gmail.subject, None);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_overrides() {
        let contents = r#"
[sheets]
priv_key = "key.json"
spreadsheet_id = "sheet-id"
value_input_option = "USER_ENTERED"

[gmail]
priv_key = "key.json"
subject = "ops@example.com"

[logging]
file = "import.log"

[[imports]]
name = "weekly"
query = "subject:weekly has:attachment is:unread"
result_limit = 3
sheet_name = "Weekly"
ragged_rows = "reject"
verify_after_write = true
"#;
        let config = AppConfig::from_toml_str(contents).unwrap();
        let import = config.import("weekly").unwrap();

        assert_eq!(import.result_limit, 3);
        assert_eq!(import.sheet_name, "Weekly");
        assert_eq!(import.ragged_rows, RaggedRowPolicy::Reject);
        assert!(import.verify_after_write);
        assert_eq!(config.gmail.subject.as_deref(), Some("ops@example.com"));
        assert_eq!(config.logging.file.as_deref(), Some("import.log"));
    }

    #[test]
    fn test_missing_field_reports_path() {
        let contents = r#"
[sheets]
priv_key = "key.json"

[gmail]
priv_key = "key.json"

[[imports]]
name = "mantis"
"#;
        let report = AppConfig::from_toml_str(contents).unwrap_err();
        match report.current_context() {
            ConfigError::Deserialize(path) => assert_eq!(path, "sheets"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_import_names_rejected() {
        let contents = format!("{MINIMAL}\n[[imports]]\nname = \"mantis\"\n");
        let report = AppConfig::from_toml_str(&contents).unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_result_limit_rejected() {
        let contents = MINIMAL.replace("name = \"mantis\"", "name = \"mantis\"\nresult_limit = 0");
        let report = AppConfig::from_toml_str(&contents).unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::Invalid(_)));
    }

    #[test]
    fn test_digit_only_env_override_stays_a_string() {
        const VAR: &str = "MAIL_CSV_IMPORT__SHEETS__SPREADSHEET_ID";
        let path = std::env::temp_dir().join(format!(
            "mail_csv_import_env_override_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, MINIMAL).unwrap();

        std::env::set_var(VAR, "123456");
        let result = AppConfig::load(path.to_str().unwrap());
        std::env::remove_var(VAR);
        std::fs::remove_file(&path).unwrap();

        let config = result.unwrap();
        assert_eq!(config.sheets.spreadsheet_id.as_ref(), "123456");
        assert_eq!(config.import("mantis").unwrap().result_limit, 10);
    }

    const EXPORT_ONLY: &str = r#"
[sheets]
priv_key = "key.json"
spreadsheet_id = "sheet-id"

[gmail]
priv_key = "key.json"

[[exports]]
name = "mantis-mailer"
username = "reporter"
password = "secret"
sender = "ops@example.com"
"#;

    #[test]
    fn test_export_defaults() {
        let config = AppConfig::from_toml_str(EXPORT_ONLY).unwrap();
        let export = config.export("mantis-mailer").unwrap();

        assert!(config.imports.is_empty());
        assert_eq!(export.mantis.project_id, DEFAULT_PROJECT_ID);
        assert_eq!(export.mantis.webdriver_url, DEFAULT_WEBDRIVER_URL);
        assert_eq!(export.recipient(), "ops@example.com");
        assert!(!format!("{:?}", export).contains("secret"));
    }

    #[test]
    fn test_job_names_unique_across_kinds() {
        let contents = EXPORT_ONLY.replace("mantis-mailer", "mantis");
        let contents = format!("{contents}\n[[imports]]\nname = \"mantis\"\n");
        let report = AppConfig::from_toml_str(&contents).unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::Invalid(_)));
    }

    #[test]
    fn test_no_jobs_rejected() {
        let contents = MINIMAL.replace("[[imports]]\nname = \"mantis\"\n", "");
        let report = AppConfig::from_toml_str(&contents).unwrap_err();
        assert!(matches!(report.current_context(), ConfigError::Invalid(_)));
    }
}
