use std::collections::HashSet;

use log::info;

use super::acquisition::TrackAcquisition;
use super::config::{ActivityProfile, GenerationRequest, SeedRequest, ValidatedGeneration};
use super::metadata::{GeneratedPlaylist, PlaylistMetadata};
use super::seeds::{SeedTrackLookup, resolve_market};
use super::slots::{TempoSlot, generate_slots};
use super::utils::{DEFAULT_SEED_PLAYLIST_NAME, PlaylistNaming};
use crate::client::CatalogService;
use crate::error::PlaylistError;
use crate::models::ResolvedTrack;

/// Tempo plan for a workout, computed without touching the network
#[derive(Debug, Clone)]
pub struct WorkoutPlan {
    pub profile: ActivityProfile,
    pub slots: Vec<TempoSlot>,
}

impl WorkoutPlan {
    pub fn new(request: &ValidatedGeneration) -> Self {
        Self {
            profile: request.profile,
            slots: generate_slots(request.duration_minutes, &request.profile, request.progression),
        }
    }
}

/// Main playlist generator
pub struct PlaylistGenerator<'a, C: CatalogService + ?Sized> {
    catalog: &'a C,
    default_market: String,
}

impl<'a, C: CatalogService + ?Sized> PlaylistGenerator<'a, C> {
    pub fn new(catalog: &'a C, default_market: impl Into<String>) -> Self {
        Self {
            catalog,
            default_market: default_market.into(),
        }
    }

    /// Validate, plan the tempo slots and resolve one track per slot
    pub fn generate_workout(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedPlaylist, PlaylistError> {
        let validated = request.validate()?;
        let plan = WorkoutPlan::new(&validated);
        info!(
            "Planned {} slots for {} minutes of {} ({})",
            plan.slots.len(),
            validated.duration_minutes,
            plan.profile.label,
            validated.progression.label()
        );

        let tracks = TrackAcquisition::new(self.catalog, &validated.seeds).acquire(&plan.slots)?;
        let description = PlaylistNaming::workout_description(&plan.slots);
        let (tracks, slots) = dedupe_slotted(tracks, plan.slots);

        Ok(GeneratedPlaylist {
            name: PlaylistNaming::workout_name(&plan.profile, validated.progression),
            description,
            metadata: PlaylistMetadata::calculate(&tracks, &slots),
            tracks,
            slots,
        })
    }

    /// Plain playlist from the seeds' tracks, no tempo matching
    pub fn generate_from_seeds(
        &self,
        request: &SeedRequest,
    ) -> Result<GeneratedPlaylist, PlaylistError> {
        let request = request.validate()?;
        let market = resolve_market(self.catalog, &self.default_market)?;
        info!("Looking up seed tracks in market {market}");

        let tracks = SeedTrackLookup::new(self.catalog, market).collect(&request)?;

        Ok(GeneratedPlaylist {
            name: DEFAULT_SEED_PLAYLIST_NAME.to_string(),
            description: PlaylistNaming::seed_description(),
            metadata: PlaylistMetadata::calculate(&tracks, &[]),
            tracks,
            slots: Vec::new(),
        })
    }
}

/// Drop repeated tracks along with the slots they filled, keeping first occurrences
fn dedupe_slotted(
    tracks: Vec<ResolvedTrack>,
    slots: Vec<TempoSlot>,
) -> (Vec<ResolvedTrack>, Vec<TempoSlot>) {
    let planned = tracks.len();
    let mut seen_ids = HashSet::new();
    let kept: (Vec<_>, Vec<_>) = tracks
        .into_iter()
        .zip(slots)
        .filter(|(track, _)| seen_ids.insert(track.id.clone()))
        .unzip();
    if kept.0.len() < planned {
        info!(
            "Dropped {} repeated recommendations, {} unique tracks remain",
            planned - kept.0.len(),
            kept.0.len()
        );
    }
    kept
}
