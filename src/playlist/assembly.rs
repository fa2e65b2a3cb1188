use std::collections::HashSet;

use log::info;

use crate::client::CatalogService;
use crate::error::PlaylistError;
use crate::models::{CreatedPlaylist, ResolvedTrack};

/// Maximum URIs per append call
pub const APPEND_CHUNK_SIZE: usize = 100;

/// Name and description for a playlist about to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
}

/// Drop repeated catalog ids, keeping the first occurrence
pub fn dedupe_tracks(tracks: Vec<ResolvedTrack>) -> Vec<ResolvedTrack> {
    let mut seen_ids = HashSet::new();
    tracks
        .into_iter()
        .filter(|track| seen_ids.insert(track.id.clone()))
        .collect()
}

/// Saves an ordered track list as a new private playlist
pub struct PlaylistAssembler<'a, C: CatalogService + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: CatalogService + ?Sized> PlaylistAssembler<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Create the playlist and append the URIs in chunks of 100.
    ///
    /// A failing chunk is reported with its index; chunks appended before it
    /// stay in the playlist.
    pub fn assemble(
        &self,
        draft: &PlaylistDraft,
        tracks: &[ResolvedTrack],
    ) -> Result<CreatedPlaylist, PlaylistError> {
        let uris: Vec<String> = dedupe_tracks(tracks.to_vec())
            .into_iter()
            .map(|track| track.uri)
            .collect();
        if uris.is_empty() {
            return Err(PlaylistError::validation("no tracks to save"));
        }

        let playlist = self
            .catalog
            .create_playlist(&draft.name, &draft.description, false)?;
        info!("Created playlist '{}' ({})", draft.name, playlist.id);

        for (chunk_index, chunk) in uris.chunks(APPEND_CHUNK_SIZE).enumerate() {
            self.catalog
                .append_tracks(&playlist.id, chunk)
                .map_err(|e| match e {
                    PlaylistError::Upstream {
                        status, message, ..
                    } => PlaylistError::Upstream {
                        status,
                        message,
                        chunk: Some(chunk_index),
                    },
                    other => other,
                })?;
            info!(
                "Appended chunk {} ({} tracks) to playlist {}",
                chunk_index,
                chunk.len(),
                playlist.id
            );
        }

        Ok(playlist)
    }
}
