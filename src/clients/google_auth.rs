//! OAuth state for the Google Calendar client.
//!
//! Two files are read:
//!   credentials: the OAuth client downloaded from the Google console
//!   token:       access/refresh token pair produced by a prior consent flow
//!
//! Expired access tokens are refreshed and written back to the token file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Console downloads nest the client under `installed` or `web`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Installed { installed: GoogleCredentials },
    Web { web: GoogleCredentials },
    Flat(GoogleCredentials),
}

impl GoogleCredentials {
    pub fn load(path: &Path) -> Result<Self, CalendarError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CalendarError::Auth(format!(
                "failed to read credentials from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&contents)
            .map_err(|e| CalendarError::Auth(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        let file: CredentialsFile =
            serde_json::from_str(contents).map_err(|e| format!("invalid credentials: {}", e))?;
        Ok(match file {
            CredentialsFile::Installed { installed } => installed,
            CredentialsFile::Web { web } => web,
            CredentialsFile::Flat(creds) => creds,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl GoogleTokens {
    /// Tokens without a recorded expiry are trusted until the API rejects them.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(EXPIRY_MARGIN_SECS) >= expires_at,
            None => false,
        }
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct GoogleSession {
    credentials_path: PathBuf,
    token_path: PathBuf,
    tokens: Option<GoogleTokens>,
}

impl GoogleSession {
    pub fn new(credentials_path: PathBuf, token_path: PathBuf) -> Self {
        Self {
            credentials_path,
            token_path,
            tokens: None,
        }
    }

    /// A usable access token, loading and refreshing as needed.
    pub async fn access_token(&mut self, http: &reqwest::Client) -> Result<String, CalendarError> {
        let tokens = match self.tokens.take() {
            Some(tokens) => tokens,
            None => self.load_tokens()?,
        };

        let tokens = if tokens.needs_refresh(Utc::now()) {
            log::info!("google access token expired, refreshing");
            let refreshed = self.refresh(http, &tokens).await?;
            self.save_tokens(&refreshed)?;
            refreshed
        } else {
            tokens
        };

        let access_token = tokens.access_token.clone();
        self.tokens = Some(tokens);
        Ok(access_token)
    }

    fn load_tokens(&self) -> Result<GoogleTokens, CalendarError> {
        let path = &self.token_path;
        if !path.exists() {
            return Err(CalendarError::Auth(format!(
                "no Google token at {}; authorize the calendar app first",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CalendarError::Auth(format!("failed to read tokens from {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            CalendarError::Auth(format!("failed to parse tokens from {}: {}", path.display(), e))
        })
    }

    fn save_tokens(&self, tokens: &GoogleTokens) -> Result<(), CalendarError> {
        let path = &self.token_path;
        let contents = serde_json::to_string_pretty(tokens)
            .map_err(|e| CalendarError::Auth(format!("failed to serialize tokens: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| {
            CalendarError::Auth(format!("failed to write tokens to {}: {}", path.display(), e))
        })?;

        // Owner-only, the file holds a refresh token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
                CalendarError::Auth(format!("failed to set permissions on {}: {}", path.display(), e))
            })?;
        }

        Ok(())
    }

    async fn refresh(
        &self,
        http: &reqwest::Client,
        tokens: &GoogleTokens,
    ) -> Result<GoogleTokens, CalendarError> {
        let creds = GoogleCredentials::load(&self.credentials_path)?;
        let response = http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", tokens.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Auth(format!(
                "token refresh failed with status {}: {}",
                status, body
            )));
        }

        let refreshed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| CalendarError::Auth(format!("failed to parse refresh response: {}", e)))?;

        Ok(merge_refresh(tokens, refreshed, Utc::now()))
    }
}

// Google usually omits refresh_token on refresh; keep the old one then.
fn merge_refresh(old: &GoogleTokens, refreshed: RefreshResponse, now: DateTime<Utc>) -> GoogleTokens {
    GoogleTokens {
        access_token: refreshed.access_token,
        refresh_token: refreshed
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| old.refresh_token.clone()),
        expires_at: Some(now + Duration::seconds(refreshed.expires_in)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn credentials_accept_console_download_shapes() {
        let installed = GoogleCredentials::parse(
            r#"{"installed":{"client_id":"id","client_secret":"secret","redirect_uris":["http://localhost"]}}"#,
        )
        .unwrap();
        let flat = GoogleCredentials::parse(r#"{"client_id":"id","client_secret":"secret"}"#).unwrap();
        assert_eq!(installed, flat);
        assert!(GoogleCredentials::parse(r#"{"other":{}}"#).is_err());
    }

    #[test]
    fn refresh_needed_within_margin() {
        let now = Utc.with_ymd_and_hms(2025, 4, 28, 9, 0, 0).unwrap();
        let mut tokens = GoogleTokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Some(now + Duration::seconds(30)),
        };
        assert!(tokens.needs_refresh(now));

        tokens.expires_at = Some(now + Duration::minutes(30));
        assert!(!tokens.needs_refresh(now));

        tokens.expires_at = None;
        assert!(!tokens.needs_refresh(now));
    }

    #[test]
    fn refresh_keeps_old_refresh_token_when_omitted() {
        let now = Utc.with_ymd_and_hms(2025, 4, 28, 9, 0, 0).unwrap();
        let old = GoogleTokens {
            access_token: "old".to_string(),
            refresh_token: "keep-me".to_string(),
            expires_at: None,
        };
        let merged = merge_refresh(
            &old,
            RefreshResponse {
                access_token: "new".to_string(),
                expires_in: 3600,
                refresh_token: None,
            },
            now,
        );
        assert_eq!(merged.access_token, "new");
        assert_eq!(merged.refresh_token, "keep-me");
        assert_eq!(merged.expires_at, Some(now + Duration::hours(1)));
    }

    #[tokio::test]
    async fn missing_token_file_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = GoogleSession::new(dir.path().join("credentials.json"), dir.path().join("token.json"));
        let http = reqwest::Client::new();

        let err = session.access_token(&http).await.unwrap_err();
        assert!(matches!(err, CalendarError::Auth(ref msg) if msg.contains("token.json")));
    }

    #[tokio::test]
    async fn unexpired_token_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        let tokens = GoogleTokens {
            access_token: "live".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        };
        std::fs::write(&token_path, serde_json::to_string(&tokens).unwrap()).unwrap();

        let mut session = GoogleSession::new(dir.path().join("credentials.json"), token_path);
        let http = reqwest::Client::new();
        assert_eq!(session.access_token(&http).await.unwrap(), "live");
    }
}
