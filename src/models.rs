use serde::{Deserialize, Serialize};

/// A catalog track matched for a slot or a seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub duration_ms: u64,
    pub artists: Vec<String>,
    pub artwork_url: Option<String>,
}

impl ResolvedTrack {
    pub fn artist_display(&self) -> String {
        if self.artists.is_empty() {
            "Unknown".to_string()
        } else {
            self.artists.join(", ")
        }
    }
}

/// Track object as returned by the Spotify Web API
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

impl From<SpotifyTrack> for ResolvedTrack {
    fn from(track: SpotifyTrack) -> Self {
        let artwork_url = track
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|image| image.url);
        ResolvedTrack {
            id: track.id,
            uri: track.uri,
            name: track.name,
            duration_ms: track.duration_ms.unwrap_or(0),
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            artwork_url,
        }
    }
}

/// Response of `GET /recommendations`
#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<SpotifyTrack>,
}

/// Response of `GET /search`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub artists: Option<Paging<SpotifyArtist>>,
    pub tracks: Option<Paging<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Artist hit from a search, usable as an artist seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistSummary {
    pub id: String,
    pub name: String,
}

/// Search results split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub artists: Vec<ArtistSummary>,
    pub tracks: Vec<ResolvedTrack>,
}

impl From<SearchResponse> for SearchResults {
    fn from(response: SearchResponse) -> Self {
        let artists = response
            .artists
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|artist| {
                artist.id.map(|id| ArtistSummary {
                    id,
                    name: artist.name,
                })
            })
            .collect();
        let tracks = response
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .map(ResolvedTrack::from)
            .collect();
        SearchResults { artists, tracks }
    }
}

/// Response of `GET /me`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
}

/// Response of `POST /me/playlists`
#[derive(Debug, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// A playlist created in the user's account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub url: String,
}

impl From<CreatePlaylistResponse> for CreatedPlaylist {
    fn from(response: CreatePlaylistResponse) -> Self {
        let url = response
            .external_urls
            .and_then(|urls| urls.spotify)
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", response.id));
        CreatedPlaylist {
            id: response.id,
            url,
        }
    }
}

/// Response of the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}
