use log::{debug, warn};

use super::assembly::dedupe_tracks;
use super::config::SeedRequest;
use crate::client::{CatalogService, SearchKind, SearchQuery};
use crate::config::is_market_code;
use crate::error::PlaylistError;
use crate::models::ResolvedTrack;

/// Tracks fetched per artist seed
pub const TRACKS_PER_ARTIST: u32 = 10;

/// Pick the catalog market from the user's country, falling back to `default_market`
pub fn resolve_market<C: CatalogService + ?Sized>(
    catalog: &C,
    default_market: &str,
) -> Result<String, PlaylistError> {
    match catalog.current_user() {
        Ok(user) => match user.country {
            Some(country) if is_market_code(&country) => Ok(country.to_uppercase()),
            _ => Ok(default_market.to_string()),
        },
        Err(PlaylistError::CredentialExpired) => Err(PlaylistError::CredentialExpired),
        Err(e) => {
            debug!("Could not read user country, using {default_market}: {e}");
            Ok(default_market.to_string())
        }
    }
}

/// Builds the plain seed playlist: artist-name searches plus direct track lookups
pub struct SeedTrackLookup<'a, C: CatalogService + ?Sized> {
    catalog: &'a C,
    market: String,
}

impl<'a, C: CatalogService + ?Sized> SeedTrackLookup<'a, C> {
    pub fn new(catalog: &'a C, market: impl Into<String>) -> Self {
        Self {
            catalog,
            market: market.into(),
        }
    }

    pub fn collect(&self, request: &SeedRequest) -> Result<Vec<ResolvedTrack>, PlaylistError> {
        let mut tracks = Vec::new();

        for artist in &request.seed_artists {
            let name = artist.name.replace('"', "");
            let name = name.trim();
            if name.is_empty() {
                debug!("Skipping artist seed {} without a name", artist.id);
                continue;
            }
            let query = SearchQuery {
                query: name.to_string(),
                kinds: vec![SearchKind::Track],
                limit: TRACKS_PER_ARTIST,
                market: Some(self.market.clone()),
            };
            match self.catalog.search(&query) {
                Ok(results) => tracks.extend(results.tracks),
                Err(e) => skip_unless_auth(e, || format!("search for artist '{name}'"))?,
            }
        }

        for track_id in &request.seed_tracks {
            match self.catalog.get_track(track_id, &self.market) {
                Ok(track) => tracks.push(track),
                Err(e) => skip_unless_auth(e, || format!("lookup of track {track_id}"))?,
            }
        }

        let tracks = dedupe_tracks(tracks);
        if tracks.is_empty() {
            return Err(PlaylistError::NoSeedMatches);
        }
        Ok(tracks)
    }
}

/// Individual seed failures are skipped; sign-in problems abort the lookup
fn skip_unless_auth(
    error: PlaylistError,
    what: impl FnOnce() -> String,
) -> Result<(), PlaylistError> {
    if error.needs_sign_in() {
        return Err(error);
    }
    warn!("Skipping {}: {error}", what());
    Ok(())
}
