use serde::Deserialize;

use crate::domain::RaggedRowPolicy;

pub const DEFAULT_QUERY: &str = "subject:(MANTIS CSV) has:attachment";
pub const DEFAULT_RESULT_LIMIT: u32 = 10;
pub const DEFAULT_SHEET_NAME: &str = "MANTIS";
pub const DEFAULT_MAIL_NOT_FOUND_MESSAGE: &str =
    "❌ 添付ファイル付きの「MANTIS CSV」メールが見つかりません。";
pub const DEFAULT_ATTACHMENT_NOT_FOUND_MESSAGE: &str = "❌ CSV添付ファイルが見つかりません。";

/// One mailbox-to-sheet import job.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub name: String,
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_mail_not_found_message")]
    pub mail_not_found_message: String,
    #[serde(default = "default_attachment_not_found_message")]
    pub attachment_not_found_message: String,
    #[serde(default)]
    pub ragged_rows: RaggedRowPolicy,
    #[serde(default)]
    pub verify_after_write: bool,
}

impl ImportConfig {
    /// Job with every setting at its default value.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: default_query(),
            result_limit: default_result_limit(),
            sheet_name: default_sheet_name(),
            mail_not_found_message: default_mail_not_found_message(),
            attachment_not_found_message: default_attachment_not_found_message(),
            ragged_rows: RaggedRowPolicy::default(),
            verify_after_write: false,
        }
    }
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_result_limit() -> u32 {
    DEFAULT_RESULT_LIMIT
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

fn default_mail_not_found_message() -> String {
    DEFAULT_MAIL_NOT_FOUND_MESSAGE.to_string()
}

fn default_attachment_not_found_message() -> String {
    DEFAULT_ATTACHMENT_NOT_FOUND_MESSAGE.to_string()
}
