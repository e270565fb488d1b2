//! Blob-storage credential resolution

use serde::Deserialize;

/// Credential record as supplied by the caller
///
/// Both fields are optional; an incomplete record resolves to no credentials,
/// which leaves the fetcher on the ambient AWS provider chain.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentialRecord {
    #[serde(default, alias = "awsKey", alias = "access_key_id")]
    pub access_key_id: Option<String>,
    #[serde(default, alias = "awsSecret", alias = "secret_access_key")]
    pub secret_access_key: Option<String>,
    #[serde(default, alias = "awsSession", alias = "session_token")]
    pub session_token: Option<String>,
}

impl AwsCredentialRecord {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(secret_access_key.into()),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl std::fmt::Debug for AwsCredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentialRecord")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "[REDACTED]"))
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Resolved static access key pair
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKeyPair {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl AccessKeyPair {
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl std::fmt::Debug for AccessKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessKeyPair")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Resolve an optional credential record into an access key pair.
///
/// Returns `None` unless both the key id and the secret are present and
/// non-blank. Never fails.
pub fn resolve_credentials(record: Option<&AwsCredentialRecord>) -> Option<AccessKeyPair> {
    let record = record?;

    let access_key_id = non_blank(record.access_key_id.as_deref())?;
    let secret_access_key = non_blank(record.secret_access_key.as_deref())?;

    Some(AccessKeyPair {
        access_key_id: access_key_id.to_string(),
        secret_access_key: secret_access_key.to_string(),
        session_token: non_blank(record.session_token.as_deref()).map(str::to_string),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
