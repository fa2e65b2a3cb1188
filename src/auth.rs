use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ureq::Agent;
use url::Url;

use crate::error::PlaylistError;
use crate::models::TokenResponse;

const SCOPES: &str =
    "user-read-private user-read-email playlist-modify-private playlist-modify-public playlist-read-private";

/// Supplies the bearer credential for each catalog call
pub trait TokenSupply {
    /// `None` means the user is not signed in
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, e.g. from `SPOTIFY_ACCESS_TOKEN`
pub struct StaticToken(pub Option<String>);

impl TokenSupply for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone().filter(|token| !token.trim().is_empty())
    }
}

/// The single bearer token kept between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub obtained_at: DateTime<Utc>,
    pub expires_in: Option<u64>,
}

/// Keeps the token (and the pending PKCE verifier) in small files on disk
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn verifier_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".pkce");
        self.path.with_file_name(name)
    }

    pub fn load(&self) -> Result<Option<StoredToken>, PlaylistError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let token: StoredToken = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    pub fn save(&self, response: &TokenResponse) -> Result<StoredToken, PlaylistError> {
        let token = StoredToken {
            access_token: response.access_token.clone(),
            obtained_at: Utc::now(),
            expires_in: response.expires_in,
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&token)?)?;
        info!("Saved access token to {}", self.path.display());
        Ok(token)
    }

    /// Remove the stored token; succeeds when there is nothing to remove
    pub fn clear(&self) -> Result<bool, PlaylistError> {
        if let Err(e) = self.take_verifier() {
            debug!("Could not remove pending sign-in file: {e}");
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_verifier(&self, verifier: &str) -> Result<(), PlaylistError> {
        std::fs::write(self.verifier_path(), verifier)?;
        Ok(())
    }

    /// Read and delete the verifier written by `authorize`
    pub fn take_verifier(&self) -> Result<Option<String>, PlaylistError> {
        let path = self.verifier_path();
        if !path.exists() {
            return Ok(None);
        }
        let verifier = std::fs::read_to_string(&path)?.trim().to_string();
        std::fs::remove_file(&path)?;
        Ok(Some(verifier).filter(|v| !v.is_empty()))
    }
}

impl TokenSupply for FileTokenStore {
    fn bearer_token(&self) -> Option<String> {
        match self.load() {
            Ok(token) => token.map(|t| t.access_token),
            Err(e) => {
                debug!("Ignoring unreadable token file {}: {e}", self.path.display());
                None
            }
        }
    }
}

/// PKCE code verifier: 32 random bytes, base64url without padding (43 chars)
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 code challenge for a verifier
pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

pub fn build_authorize_url(
    accounts_base_url: &str,
    client_id: &str,
    redirect_uri: &str,
    challenge: &str,
) -> String {
    format!(
        "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&code_challenge_method=S256&code_challenge={}",
        accounts_base_url.trim_end_matches('/'),
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(SCOPES),
        urlencoding::encode(challenge)
    )
}

/// Accept either the bare authorization code or the whole redirect URL
pub fn extract_code(input: &str) -> Result<String, PlaylistError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PlaylistError::validation("authorization code is empty"));
    }
    // Anything that is not an absolute URL is taken as the code itself
    let Ok(url) = Url::parse(input) else {
        return Ok(input.to_string());
    };

    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => return Ok(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    Err(PlaylistError::validation(match error {
        Some(reason) => format!("authorization was denied: {reason}"),
        None => "redirect URL has no `code` parameter".to_string(),
    }))
}

/// Exchange an authorization code for an access token
pub fn exchange_code_for_token(
    agent: &Agent,
    accounts_base_url: &str,
    client_id: &str,
    client_secret: Option<&str>,
    redirect_uri: &str,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse, PlaylistError> {
    let url = format!("{}/api/token", accounts_base_url.trim_end_matches('/'));
    let mut form = vec![
        ("client_id", client_id),
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("code_verifier", verifier),
    ];
    if let Some(secret) = client_secret {
        form.push(("client_secret", secret));
    }

    match agent.post(&url).send_form(&form) {
        Ok(response) => response
            .into_json::<TokenResponse>()
            .map_err(|e| PlaylistError::upstream(None, format!("Unreadable token response: {e}"))),
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(PlaylistError::upstream(
                Some(status),
                format!("Token exchange failed: {body}"),
            ))
        }
        Err(e) => Err(PlaylistError::upstream(None, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_token_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tempo-playlist-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_code_verifier_shape() {
        let verifier = generate_code_verifier();
        assert_eq!(verifier.len(), 43);
        assert!(
            verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(verifier, generate_code_verifier());
    }

    #[test]
    fn test_code_challenge_is_s256_base64url() {
        let challenge = code_challenge("abcdefghijklmnopqrstuvwxyz0123456789-._~ABCDEFG");
        assert_eq!(challenge, "TDp3C-wPo3aKDK1Bg-ukP78nZ9YiqUD2ToRD96HoaHU");
    }

    #[test]
    fn test_authorize_url_carries_pkce_parameters() {
        let url = build_authorize_url(
            "https://accounts.spotify.com/",
            "client123",
            "http://127.0.0.1:3000/api/spotify/callback",
            "challenge",
        );
        assert!(url.starts_with("https://accounts.spotify.com/authorize?client_id=client123"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("code_challenge=challenge"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A3000%2Fapi%2Fspotify%2Fcallback"));
        assert!(url.contains("playlist-modify-private"));
    }

    #[test]
    fn test_extract_code_from_redirect_url() {
        let code =
            extract_code("http://127.0.0.1:3000/api/spotify/callback?code=AQB%2Dx&state=1")
                .unwrap();
        assert_eq!(code, "AQB-x");
        assert_eq!(extract_code("  plain-code ").unwrap(), "plain-code");
    }

    #[test]
    fn test_extract_code_reports_denied_authorization() {
        let err = extract_code("http://127.0.0.1:3000/cb?error=access_denied").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
        assert!(matches!(extract_code(""), Err(PlaylistError::Validation(_))));
    }

    #[test]
    fn test_extract_code_decodes_form_encoded_values() {
        let err = extract_code("http://127.0.0.1:3000/cb?error=access+denied").unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: authorization was denied: access denied");

        let code = extract_code("http://127.0.0.1:3000/cb?state=1&code=a+b%2Bc#_").unwrap();
        assert_eq!(code, "a b+c");

        assert!(matches!(
            extract_code("http://127.0.0.1:3000/cb?state=1"),
            Err(PlaylistError::Validation(_))
        ));
    }

    #[test]
    fn test_unreadable_token_response_is_upstream() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 8\r\n\r\nnot json")
                .unwrap();
        });

        let err = exchange_code_for_token(
            &ureq::agent(),
            &format!("http://{addr}"),
            "client123",
            None,
            "http://127.0.0.1:3000/api/spotify/callback",
            "code",
            "verifier",
        )
        .unwrap_err();
        assert!(matches!(err, PlaylistError::Upstream { status: None, .. }));
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let store = FileTokenStore::new(temp_token_path("store"));
        let _ = store.clear();
        assert_eq!(store.bearer_token(), None);

        let response = TokenResponse {
            access_token: "BQDtoken".to_string(),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(3600),
            scope: None,
        };
        store.save(&response).unwrap();
        assert_eq!(store.bearer_token().as_deref(), Some("BQDtoken"));

        store.save_verifier("verifier-1").unwrap();
        assert_eq!(store.take_verifier().unwrap().as_deref(), Some("verifier-1"));
        assert_eq!(store.take_verifier().unwrap(), None);

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert_eq!(store.bearer_token(), None);
    }

    #[test]
    fn test_static_token_treats_blank_as_absent() {
        assert_eq!(StaticToken(Some("  ".to_string())).bearer_token(), None);
        assert_eq!(StaticToken(None).bearer_token(), None);
        assert_eq!(
            StaticToken(Some("abc".to_string())).bearer_token().as_deref(),
            Some("abc")
        );
    }
}
