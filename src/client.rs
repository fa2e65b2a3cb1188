use crate::auth::TokenSupply;
use crate::config::Config;
use crate::error::PlaylistError;
use crate::models::{
    CreatePlaylistResponse, CreatedPlaylist, RecommendationsResponse, ResolvedTrack,
    SearchResponse, SearchResults, SpotifyTrack, UserProfile,
};
use crate::playlist::RecommendationQuery;
use log::{debug, trace};
use serde::de::DeserializeOwned;
use ureq::{Agent, AgentBuilder, Request};
use urlencoding::encode;

/// Kinds of catalog objects a search can return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Artist,
    Track,
}

impl SearchKind {
    fn as_str(self) -> &'static str {
        match self {
            SearchKind::Artist => "artist",
            SearchKind::Track => "track",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub kinds: Vec<SearchKind>,
    pub limit: u32,
    pub market: Option<String>,
}

/// The remote music catalog: search, lookup, recommendations and playlists
#[cfg_attr(test, mockall::automock)]
pub trait CatalogService {
    fn search(&self, query: &SearchQuery) -> Result<SearchResults, PlaylistError>;

    fn get_track(&self, id: &str, market: &str) -> Result<ResolvedTrack, PlaylistError>;

    /// Tracks matching a tempo window and seed set, best first
    fn recommend(&self, query: &RecommendationQuery) -> Result<Vec<ResolvedTrack>, PlaylistError>;

    fn create_playlist(
        &self,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist, PlaylistError>;

    /// Append up to 100 URIs to the end of a playlist
    fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), PlaylistError>;

    fn current_user(&self) -> Result<UserProfile, PlaylistError>;
}

/// Blocking Spotify Web API client
pub struct SpotifyClient {
    agent: Agent,
    base_url: String,
    tokens: Box<dyn TokenSupply>,
}

impl SpotifyClient {
    pub fn new(config: &Config, tokens: Box<dyn TokenSupply>) -> Self {
        let agent = AgentBuilder::new().timeout(config.http_timeout).build();

        SpotifyClient {
            agent,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Shared agent, also used for the token exchange
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach a fresh bearer token, failing early when the user is signed out
    fn authorized(&self, request: Request) -> Result<Request, PlaylistError> {
        let token = self
            .tokens
            .bearer_token()
            .ok_or(PlaylistError::Unauthenticated)?;
        Ok(request.set("Authorization", &format!("Bearer {token}")))
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: Request,
        body: Option<serde_json::Value>,
    ) -> Result<T, PlaylistError> {
        let request = self.authorized(request)?;
        trace!("{} {}", request.method(), request.url());
        let result = match body {
            Some(json) => request.send_json(json),
            None => request.call(),
        };
        let response = result.map_err(map_http_error)?;
        let text = response
            .into_string()
            .map_err(|e| PlaylistError::upstream(None, e.to_string()))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn send_without_body(
        &self,
        request: Request,
        body: serde_json::Value,
    ) -> Result<(), PlaylistError> {
        let request = self.authorized(request)?;
        request.send_json(body).map_err(map_http_error)?;
        Ok(())
    }
}

/// Translate a ureq failure into the error taxonomy
fn map_http_error(error: ureq::Error) -> PlaylistError {
    match error {
        ureq::Error::Status(401, _) => PlaylistError::CredentialExpired,
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            debug!("Spotify returned {status}: {body}");
            PlaylistError::upstream(Some(status), body)
        }
        ureq::Error::Transport(transport) => PlaylistError::upstream(None, transport.to_string()),
    }
}

/// A 403 on append means the token lacks the playlist scopes
fn map_append_error(error: PlaylistError) -> PlaylistError {
    match error {
        PlaylistError::Upstream {
            status: Some(403), ..
        } => PlaylistError::upstream(
            Some(403),
            "Permission denied. Sign out and sign in again so the app can save playlists to your account.",
        ),
        other => other,
    }
}

impl CatalogService for SpotifyClient {
    fn search(&self, query: &SearchQuery) -> Result<SearchResults, PlaylistError> {
        let kinds: Vec<&str> = query.kinds.iter().map(|k| k.as_str()).collect();
        let mut request = self
            .agent
            .get(&self.url("/search"))
            .query("q", query.query.trim())
            .query("type", &kinds.join(","))
            .query("limit", &query.limit.to_string());
        if let Some(market) = &query.market {
            request = request.query("market", market);
        }
        let response: SearchResponse = self.send(request, None)?;
        Ok(response.into())
    }

    fn get_track(&self, id: &str, market: &str) -> Result<ResolvedTrack, PlaylistError> {
        let request = self
            .agent
            .get(&self.url(&format!("/tracks/{}", encode(id))))
            .query("market", market);
        let track: SpotifyTrack = self.send(request, None)?;
        Ok(track.into())
    }

    fn recommend(&self, query: &RecommendationQuery) -> Result<Vec<ResolvedTrack>, PlaylistError> {
        let mut request = self
            .agent
            .get(&self.url("/recommendations"))
            .query("limit", &query.limit.to_string())
            .query("min_tempo", &query.min_tempo.to_string())
            .query("max_tempo", &query.max_tempo.to_string());
        if let Some(target) = query.target_tempo {
            request = request.query("target_tempo", &target.to_string());
        }
        if !query.seeds.artists.is_empty() {
            request = request.query("seed_artists", &query.seeds.artists.join(","));
        }
        if !query.seeds.tracks.is_empty() {
            request = request.query("seed_tracks", &query.seeds.tracks.join(","));
        }
        let response: RecommendationsResponse = self.send(request, None)?;
        Ok(response.tracks.into_iter().map(ResolvedTrack::from).collect())
    }

    fn create_playlist(
        &self,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist, PlaylistError> {
        let mut body = serde_json::json!({ "name": name, "public": public });
        if !description.is_empty() {
            body["description"] = serde_json::Value::from(description);
        }
        let request = self.agent.post(&self.url("/me/playlists"));
        let response: CreatePlaylistResponse = self.send(request, Some(body))?;
        Ok(response.into())
    }

    fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), PlaylistError> {
        let request = self
            .agent
            .post(&self.url(&format!("/playlists/{}/items", encode(playlist_id))));
        let body = serde_json::json!({ "uris": uris });
        self.send_without_body(request, body).map_err(map_append_error)
    }

    fn current_user(&self) -> Result<UserProfile, PlaylistError> {
        let request = self.agent.get(&self.url("/me"));
        self.send(request, None)
    }
}
