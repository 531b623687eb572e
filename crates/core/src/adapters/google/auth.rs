use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use thiserror::Error;
use tracing::instrument;

use super::http_client::{HttpClient, HttpsConnector};

pub type GoogleAuthenticator = Authenticator<HttpsConnector>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Could not read service account private key at '{0}'")]
    ReadKey(String),
    #[error("Could not create an authenticator")]
    BuildAuthenticator,
}

/// Service account authenticator. With `subject`, tokens are issued on behalf
/// of that user (domain-wide delegation), which Gmail requires.
#[instrument(skip(client))]
pub async fn service_account_auth(
    priv_key_path: &str,
    subject: Option<&str>,
    client: HttpClient,
) -> error_stack::Result<GoogleAuthenticator, AuthError> {
    let secret: oauth2::ServiceAccountKey = oauth2::read_service_account_key(priv_key_path)
        .await
        .change_context_lazy(|| AuthError::ReadKey(priv_key_path.to_string()))?;

    let builder = oauth2::ServiceAccountAuthenticator::with_client(secret, client);
    let builder = match subject {
        Some(subject) => builder.subject(subject),
        None => builder,
    };

    builder
        .build()
        .await
        .change_context(AuthError::BuildAuthenticator)
}
