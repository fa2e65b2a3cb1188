use thiserror::Error;

use crate::playlist::TempoSlot;

/// Failures surfaced by playlist generation and the catalog client
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// No bearer token available at all
    #[error("Not signed in. Run `tempo-playlist authorize` and `login` first.")]
    Unauthenticated,

    /// The service rejected the token mid-run; the user has to sign in again
    #[error("Session expired. Sign out and sign in again.")]
    CredentialExpired,

    #[error(
        "No recommendation for slot {} (target {} BPM, window {}-{} BPM)",
        .slot.index,
        .slot.target_bpm,
        .slot.min_bpm,
        .slot.max_bpm
    )]
    NoMatch { slot: TempoSlot },

    #[error("No tracks found for your seeds.")]
    NoSeedMatches,

    #[error("{}", upstream_message(.status, .message, .chunk))]
    Upstream {
        status: Option<u16>,
        message: String,
        /// Zero-based append chunk that failed, when the failure happened during assembly
        chunk: Option<usize>,
    },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn upstream_message(status: &Option<u16>, message: &str, chunk: &Option<usize>) -> String {
    let mut text = match status {
        Some(code) => format!("Spotify API error {code}: {message}"),
        None => format!("Spotify request failed: {message}"),
    };
    if let Some(index) = chunk {
        text.push_str(&format!(" (append chunk {index})"));
    }
    text
}

impl PlaylistError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        PlaylistError::Upstream {
            status,
            message: message.into(),
            chunk: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PlaylistError::Validation(message.into())
    }

    /// True for the two conditions that require the user to sign in (again)
    pub fn needs_sign_in(&self) -> bool {
        matches!(
            self,
            PlaylistError::Unauthenticated | PlaylistError::CredentialExpired
        )
    }
}
