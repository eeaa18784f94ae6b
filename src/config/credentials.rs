//! OAuth credential loading.
//!
//! The bot authenticates with a single secret read from a small JSON file
//! (`{"password": "oauth:..."}`). The secret is never written back or logged.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credentials from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse credentials in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OAuthCredentials {
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of the secret used in the `PASS` line. Any error is fatal for
/// the whole run.
pub trait CredentialProvider: Send + Sync {
    fn read_credentials(&self) -> Result<OAuthCredentials, CredentialError>;
}

/// Reads credentials from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for FileCredentials {
    fn read_credentials(&self) -> Result<OAuthCredentials, CredentialError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| CredentialError::Read {
                path: self.path.clone(),
                source,
            })?;
        decode(&contents).map_err(|source| CredentialError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Decode the first JSON value in `contents`. Trailing data is ignored.
/// Empty input decodes to an empty password.
fn decode(contents: &str) -> Result<OAuthCredentials, serde_json::Error> {
    let mut values =
        serde_json::Deserializer::from_str(contents).into_iter::<OAuthCredentials>();
    match values.next() {
        Some(result) => result,
        None => {
            warn!("credential file is empty; authenticating with an empty password");
            Ok(OAuthCredentials::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_password() {
        let file = write_temp(r#"{"password": "oauth:abc"}"#);
        let creds = FileCredentials::new(file.path()).read_credentials().unwrap();
        assert_eq!(creds.password, "oauth:abc");
    }

    #[test]
    fn test_password_is_optional() {
        let file = write_temp(r#"{"user": "someone"}"#);
        let creds = FileCredentials::new(file.path()).read_credentials().unwrap();
        assert_eq!(creds.password, "");
    }

    #[test]
    fn test_empty_file_is_tolerated() {
        let file = write_temp("  \n");
        let creds = FileCredentials::new(file.path()).read_credentials().unwrap();
        assert_eq!(creds, OAuthCredentials::default());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileCredentials::new(dir.path().join("oauth.json"))
            .read_credentials()
            .unwrap_err();
        assert!(matches!(err, CredentialError::Read { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let file = write_temp("{\"password\": ");
        let err = FileCredentials::new(file.path()).read_credentials().unwrap_err();
        assert!(matches!(err, CredentialError::Parse { .. }));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = OAuthCredentials {
            password: "oauth:abc".into(),
        };
        assert!(!format!("{:?}", creds).contains("oauth:abc"));
    }
}
