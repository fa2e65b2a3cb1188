use log::{debug, info};
use serde::Serialize;

use super::config::SeedSet;
use super::slots::TempoSlot;
use crate::client::CatalogService;
use crate::error::PlaylistError;
use crate::models::ResolvedTrack;

/// One recommendation request against the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationQuery {
    /// `None` for the untargeted retry
    pub target_tempo: Option<u32>,
    pub min_tempo: u32,
    pub max_tempo: u32,
    pub seeds: SeedSet,
    pub limit: u32,
}

impl RecommendationQuery {
    /// Target tempo plus the slot's ±10 BPM window
    pub fn strict(slot: &TempoSlot, seeds: &SeedSet) -> Self {
        Self {
            target_tempo: Some(slot.target_bpm),
            min_tempo: slot.min_bpm,
            max_tempo: slot.max_bpm,
            seeds: seeds.clone(),
            limit: 1,
        }
    }

    /// No target hint, ±25 BPM window; keeps the seeds intact
    pub fn widened(slot: &TempoSlot, seeds: &SeedSet) -> Self {
        let (min_tempo, max_tempo) = slot.widened();
        Self {
            target_tempo: None,
            min_tempo,
            max_tempo,
            seeds: seeds.clone(),
            limit: 1,
        }
    }
}

enum SlotState {
    Querying,
    Retrying,
    Resolved(ResolvedTrack),
    Failed,
}

/// Resolves tempo slots to tracks, one slot at a time and in order
pub struct TrackAcquisition<'a, C: CatalogService + ?Sized> {
    catalog: &'a C,
    seeds: &'a SeedSet,
}

impl<'a, C: CatalogService + ?Sized> TrackAcquisition<'a, C> {
    pub fn new(catalog: &'a C, seeds: &'a SeedSet) -> Self {
        Self { catalog, seeds }
    }

    /// Resolve every slot; the first failure aborts the rest of the run
    pub fn acquire(&self, slots: &[TempoSlot]) -> Result<Vec<ResolvedTrack>, PlaylistError> {
        if self.seeds.is_empty() {
            return Err(PlaylistError::validation("add at least one artist or track seed"));
        }

        let mut tracks = Vec::with_capacity(slots.len());
        for slot in slots {
            let track = self.resolve_slot(slot)?;
            debug!(
                "Slot {} ({} BPM): \"{}\" by {}",
                slot.index,
                slot.target_bpm,
                track.name,
                track.artist_display()
            );
            tracks.push(track);
        }
        Ok(tracks)
    }

    pub fn resolve_slot(&self, slot: &TempoSlot) -> Result<ResolvedTrack, PlaylistError> {
        let mut state = SlotState::Querying;
        loop {
            state = match state {
                SlotState::Querying => {
                    match self.first_candidate(&RecommendationQuery::strict(slot, self.seeds))? {
                        Some(track) => SlotState::Resolved(track),
                        None => {
                            info!(
                                "No match for slot {} at {}-{} BPM, widening the tempo window",
                                slot.index, slot.min_bpm, slot.max_bpm
                            );
                            SlotState::Retrying
                        }
                    }
                }
                SlotState::Retrying => {
                    match self.first_candidate(&RecommendationQuery::widened(slot, self.seeds))? {
                        Some(track) => SlotState::Resolved(track),
                        None => SlotState::Failed,
                    }
                }
                SlotState::Resolved(track) => return Ok(track),
                SlotState::Failed => return Err(PlaylistError::NoMatch { slot: *slot }),
            };
        }
    }

    fn first_candidate(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Option<ResolvedTrack>, PlaylistError> {
        Ok(self.catalog.recommend(query)?.into_iter().next())
    }
}
