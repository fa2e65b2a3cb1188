use std::collections::HashSet;

use super::slots::TempoSlot;
use crate::models::ResolvedTrack;

/// A generated playlist ready to be printed or saved
#[derive(Debug, Clone)]
pub struct GeneratedPlaylist {
    pub name: String,
    pub description: String,
    pub tracks: Vec<ResolvedTrack>,
    /// Empty for seed-based playlists
    pub slots: Vec<TempoSlot>,
    pub metadata: PlaylistMetadata,
}

/// Metadata about the playlist composition
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistMetadata {
    pub total_duration_ms: u64,
    pub total_tracks: usize,
    pub artist_count: usize,
    /// Lowest and highest target tempo of the plan
    pub bpm_range: Option<(u32, u32)>,
    pub average_target_bpm: Option<f32>,
}

impl PlaylistMetadata {
    pub fn calculate(tracks: &[ResolvedTrack], slots: &[TempoSlot]) -> Self {
        let artists: HashSet<&str> = tracks
            .iter()
            .flat_map(|track| track.artists.iter().map(String::as_str))
            .collect();

        let targets = slots.iter().map(|slot| slot.target_bpm);
        let bpm_range = targets
            .clone()
            .min()
            .zip(targets.clone().max());
        let average_target_bpm = if slots.is_empty() {
            None
        } else {
            Some(targets.sum::<u32>() as f32 / slots.len() as f32)
        };

        Self {
            total_duration_ms: tracks.iter().map(|track| track.duration_ms).sum(),
            total_tracks: tracks.len(),
            artist_count: artists.len(),
            bpm_range,
            average_target_bpm,
        }
    }

    /// `m:ss` style total length
    pub fn duration_display(&self) -> String {
        let total_secs = self.total_duration_ms / 1000;
        format!("{}m{:02}s", total_secs / 60, total_secs % 60)
    }
}
