use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetConfig {
    /// Path to the service account key JSON.
    pub priv_key: Box<str>,
    pub spreadsheet_id: Box<str>,
    #[serde(default = "default_value_input_option")]
    pub value_input_option: Box<str>,
}

fn default_value_input_option() -> Box<str> {
    "RAW".into()
}
