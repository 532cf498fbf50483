//! Gmail OAuth2 authentication
//!
//! Implements the OAuth2 installed-app flow for Gmail API access. A local
//! HTTP listener receives the authorization callback; the resulting token
//! is saved to disk and refreshed when it expires.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use crate::config::GmailCredentials;

/// Default token file in the config directory
const TOKEN_FILE: &str = "gmail-tokens.json";

/// Credentials could not be acquired or refreshed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Gmail authentication failed: {0}")]
pub struct AuthError(pub String);

/// OAuth2 configuration and token management for Gmail
pub struct GmailAuth {
    client_id: String,
    client_secret: String,
    token_path: PathBuf,
}

/// Stored token data
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

/// Authorization callback parameters
#[derive(Debug, PartialEq, Eq)]
struct Callback {
    code: Option<String>,
    error: Option<String>,
}

impl GmailAuth {
    /// Gmail API OAuth2 endpoints
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Labels are added, never read beyond minimal metadata
    const GMAIL_MODIFY_SCOPE: &'static str = "https://www.googleapis.com/auth/gmail.modify";

    /// Seconds before expiry at which a token is considered stale
    const EXPIRY_MARGIN_SECS: i64 = 300;

    /// Create a new GmailAuth saving its token at `token_path`
    pub fn new(credentials: &GmailCredentials, token_path: PathBuf) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            token_path,
        }
    }

    /// Get the default token storage path (~/.config/gmailtools/gmail-tokens.json)
    pub fn default_token_path() -> Result<PathBuf> {
        config::config_path(TOKEN_FILE).context("Could not determine config directory")
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Get a valid access token, refreshing or re-authenticating as needed
    pub fn get_access_token(&self) -> Result<String> {
        if let Ok(token) = self.load_token() {
            if let Some(expires_at) = token.expires_at {
                let now = chrono::Utc::now().timestamp();
                if expires_at > now + Self::EXPIRY_MARGIN_SECS {
                    return Ok(token.access_token);
                }
            }

            if let Some(refresh_token) = token.refresh_token {
                info!("Auth: refreshing expired existing token");
                match self.refresh_access_token(&refresh_token) {
                    Ok(new_token) => {
                        self.save_token_response(&new_token)?;
                        return Ok(new_token.access_token);
                    }
                    Err(e) => warn!("Auth: token refresh failed: {:#}", e),
                }
            }
        }

        info!("Auth: requesting new token");
        let token = self.authorization_code_auth()?;
        self.save_token_response(&token)?;
        Ok(token.access_token)
    }

    /// Perform authorization code flow authentication
    fn authorization_code_auth(&self) -> Result<TokenResponse> {
        let listener =
            TcpListener::bind("127.0.0.1:0").context("Failed to bind OAuth callback listener")?;
        let port = listener
            .local_addr()
            .context("Failed to read OAuth callback address")?
            .port();
        let redirect_uri = format!("http://localhost:{}", port);

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            Self::AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&redirect_uri),
            urlencoding::encode(Self::GMAIL_MODIFY_SCOPE),
        );

        println!("\n=== Gmail Authentication Required ===");
        println!("If the browser doesn't open, visit: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            warn!("Failed to open browser: {}. Please open the URL manually.", e);
        }

        let code = self.wait_for_callback(listener)?;

        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .context("Failed to exchange authorization code")?;

        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")?;

        info!("Auth: authentication successful");
        Ok(token)
    }

    /// Wait for the OAuth callback and extract the authorization code
    fn wait_for_callback(&self, listener: TcpListener) -> Result<String> {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut request_line = String::new();
        BufReader::new(&stream)
            .read_line(&mut request_line)
            .context("Failed to read request")?;

        let callback = parse_callback(&request_line);

        let (status, body) = if callback.code.is_some() {
            ("200 OK", "Authentication successful! You can close this window.")
        } else {
            ("400 Bad Request", "Authentication failed. Please try again.")
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        stream.write_all(response.as_bytes()).ok();

        if let Some(err) = callback.error {
            anyhow::bail!("OAuth error: {}", err);
        }
        callback.code.context("No authorization code received")
    }

    /// Refresh an access token using a refresh token
    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        let mut token: TokenResponse = response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")?;

        // Google omits the refresh token on refresh
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }

        Ok(token)
    }

    fn load_token(&self) -> Result<StoredToken> {
        info!("Auth: loading existing token from {}", self.token_path.display());
        config::load_json_file(&self.token_path)
    }

    fn save_token_response(&self, token: &TokenResponse) -> Result<()> {
        let stored = StoredToken {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at: token
                .expires_in
                .map(|d| chrono::Utc::now().timestamp() + d as i64),
        };
        config::save_json_file(&self.token_path, &stored)
    }
}

/// Extract `code` and `error` from a request line like
/// `GET /?code=AUTH_CODE&scope=... HTTP/1.1`
fn parse_callback(request_line: &str) -> Callback {
    let mut callback = Callback {
        code: None,
        error: None,
    };
    let query = request_line
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.split_once('?'))
        .map(|(_, query)| query)
        .unwrap_or_default();

    for param in query.split('&') {
        match param.split_once('=') {
            Some(("code", value)) => {
                callback.code = Some(urlencoding::decode(value).map_or_else(
                    |_| value.to_string(),
                    |decoded| decoded.into_owned(),
                ));
            }
            Some(("error", value)) => callback.error = Some(value.to_string()),
            _ => {}
        }
    }
    callback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback_code() {
        let callback = parse_callback(
            "GET /?code=4%2F0AX4XfWh&scope=https://www.googleapis.com/auth/gmail.modify HTTP/1.1\r\n",
        );
        assert_eq!(callback.code.as_deref(), Some("4/0AX4XfWh"));
        assert_eq!(callback.error, None);
    }

    #[test]
    fn test_parse_callback_error() {
        let callback = parse_callback("GET /?error=access_denied HTTP/1.1\r\n");
        assert_eq!(callback.code, None);
        assert_eq!(callback.error.as_deref(), Some("access_denied"));
    }

    #[test]
    fn test_parse_callback_without_query() {
        assert_eq!(
            parse_callback("GET /favicon.ico HTTP/1.1\r\n"),
            Callback {
                code: None,
                error: None
            }
        );
    }

    #[test]
    fn test_valid_stored_token_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let stored = StoredToken {
            access_token: "fresh".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(chrono::Utc::now().timestamp() + 3600),
        };
        config::save_json_file(&path, &stored).unwrap();

        let creds = GmailCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        let auth = GmailAuth::new(&creds, path);

        assert_eq!(auth.get_access_token().unwrap(), "fresh");
    }
}
