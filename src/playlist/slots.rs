use serde::{Deserialize, Serialize};

use super::config::{
    ActivityProfile, ProgressionShape, AVG_TRACK_DURATION_MS, MAX_CATALOG_BPM, MIN_CATALOG_BPM,
    TEMPO_MARGIN, WIDENED_MARGIN,
};

/// One planned playlist position with its acceptable tempo window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoSlot {
    pub index: usize,
    pub target_bpm: u32,
    pub min_bpm: u32,
    pub max_bpm: u32,
}

impl TempoSlot {
    /// Build a slot with the strict ±10 BPM window, clamped to the catalog range
    pub fn new(index: usize, target_bpm: u32) -> Self {
        let (min_bpm, max_bpm) = tempo_window(target_bpm, TEMPO_MARGIN);
        Self {
            index,
            target_bpm,
            min_bpm,
            max_bpm,
        }
    }

    /// The ±25 BPM window used when the strict query comes back empty
    pub fn widened(&self) -> (u32, u32) {
        tempo_window(self.target_bpm, WIDENED_MARGIN)
    }
}

fn tempo_window(target_bpm: u32, margin: u32) -> (u32, u32) {
    let min = target_bpm
        .saturating_sub(margin)
        .clamp(MIN_CATALOG_BPM, MAX_CATALOG_BPM);
    let max = target_bpm
        .saturating_add(margin)
        .clamp(MIN_CATALOG_BPM, MAX_CATALOG_BPM);
    (min, max)
}

/// Number of tracks for a workout, one per 3.5 minutes, never fewer than one
pub fn track_count(duration_minutes: f64) -> usize {
    let total_ms = duration_minutes * 60_000.0;
    let count = (total_ms / AVG_TRACK_DURATION_MS as f64).floor();
    if count.is_finite() && count >= 1.0 {
        count as usize
    } else {
        1
    }
}

fn linear_bpm(index: usize, total_tracks: usize, bpm_start: u32, bpm_end: u32) -> u32 {
    let start = bpm_start as f64;
    let end = bpm_end as f64;
    if total_tracks <= 1 {
        return ((start + end) / 2.0).round() as u32;
    }
    let t = index as f64 / (total_tracks - 1) as f64;
    (start + t * (end - start)).round() as u32
}

fn interval_bpm(index: usize, peak_bpm: u32, rest_bpm: u32) -> u32 {
    if index % 2 == 0 { peak_bpm } else { rest_bpm }
}

/// Map a workout onto an ordered sequence of tempo slots.
///
/// Pure: identical inputs always yield identical slots, and every slot keeps
/// `min_bpm <= target_bpm <= max_bpm` inside the 40-200 BPM catalog range.
pub fn generate_slots(
    duration_minutes: f64,
    profile: &ActivityProfile,
    shape: ProgressionShape,
) -> Vec<TempoSlot> {
    let total_tracks = track_count(duration_minutes);

    (0..total_tracks)
        .map(|index| {
            let target_bpm = match shape {
                ProgressionShape::Linear => {
                    linear_bpm(index, total_tracks, profile.bpm_min, profile.bpm_max)
                }
                ProgressionShape::Interval => {
                    interval_bpm(index, profile.bpm_max, profile.bpm_min)
                }
            };
            TempoSlot::new(index, target_bpm)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::config::ActivityLevel;

    fn profile(bpm_min: u32, bpm_max: u32) -> ActivityProfile {
        ActivityProfile {
            level: ActivityLevel::Low,
            label: "Test",
            bpm_min,
            bpm_max,
        }
    }

    #[test]
    fn test_track_count_uses_three_and_a_half_minute_tracks() {
        assert_eq!(track_count(45.0), 12);
        assert_eq!(track_count(5.0), 1);
        assert_eq!(track_count(7.0), 2);
        assert_eq!(track_count(180.0), 51);
        // Below one average track still yields a single slot
        assert_eq!(track_count(1.0), 1);
    }

    #[test]
    fn test_track_count_matches_formula_over_valid_range() {
        for minutes in 5..=180u32 {
            let expected = std::cmp::max(1, (minutes as u64 * 60_000 / 210_000) as usize);
            assert_eq!(track_count(minutes as f64), expected, "duration {minutes}");
        }
    }

    #[test]
    fn test_linear_ramp_hits_both_endpoints() {
        // 5 tracks need 17.5..21 minutes
        let slots = generate_slots(18.0, &profile(100, 120), ProgressionShape::Linear);
        let targets: Vec<u32> = slots.iter().map(|s| s.target_bpm).collect();
        assert_eq!(targets, vec![100, 105, 110, 115, 120]);
    }

    #[test]
    fn test_linear_ramp_is_monotonic() {
        let high = ActivityLevel::High.profile();
        let slots = generate_slots(90.0, &high, ProgressionShape::Linear);
        assert_eq!(slots.first().unwrap().target_bpm, 130);
        assert_eq!(slots.last().unwrap().target_bpm, 170);
        for pair in slots.windows(2) {
            assert!(pair[0].target_bpm <= pair[1].target_bpm);
        }
    }

    #[test]
    fn test_single_track_linear_uses_midpoint() {
        let slots = generate_slots(5.0, &ActivityLevel::Relaxed.profile(), ProgressionShape::Linear);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].target_bpm, 75);
        assert_eq!((slots[0].min_bpm, slots[0].max_bpm), (65, 85));
    }

    #[test]
    fn test_interval_alternates_peak_and_rest() {
        let high = ActivityLevel::High.profile();
        for minutes in [5.0, 12.0, 45.0, 61.0] {
            let slots = generate_slots(minutes, &high, ProgressionShape::Interval);
            for slot in &slots {
                let expected = if slot.index % 2 == 0 { 170 } else { 130 };
                assert_eq!(slot.target_bpm, expected);
            }
        }
    }

    #[test]
    fn test_windows_are_clamped_to_catalog_range() {
        let low_edge = TempoSlot::new(0, 45);
        assert_eq!((low_edge.min_bpm, low_edge.max_bpm), (40, 55));

        let high_edge = TempoSlot::new(0, 195);
        assert_eq!((high_edge.min_bpm, high_edge.max_bpm), (185, 200));

        assert_eq!(TempoSlot::new(0, 50).widened(), (40, 75));
        assert_eq!(TempoSlot::new(0, 190).widened(), (165, 200));
        assert_eq!(TempoSlot::new(0, 120).widened(), (95, 145));
    }

    #[test]
    fn test_every_slot_contains_its_target() {
        for level in [ActivityLevel::Relaxed, ActivityLevel::Low, ActivityLevel::High] {
            for shape in [ProgressionShape::Linear, ProgressionShape::Interval] {
                for minutes in (5..=180).step_by(7) {
                    let slots = generate_slots(minutes as f64, &level.profile(), shape);
                    assert_eq!(slots.len(), track_count(minutes as f64));
                    for (position, slot) in slots.iter().enumerate() {
                        assert_eq!(slot.index, position);
                        assert!(slot.min_bpm <= slot.target_bpm);
                        assert!(slot.target_bpm <= slot.max_bpm);
                        assert!(slot.min_bpm >= MIN_CATALOG_BPM);
                        assert!(slot.max_bpm <= MAX_CATALOG_BPM);
                        assert_eq!(slot.min_bpm, (slot.target_bpm - 10).clamp(40, 200));
                        assert_eq!(slot.max_bpm, (slot.target_bpm + 10).clamp(40, 200));
                    }
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let low = ActivityLevel::Low.profile();
        let first = generate_slots(45.0, &low, ProgressionShape::Linear);
        let second = generate_slots(45.0, &low, ProgressionShape::Linear);
        assert_eq!(first, second);
    }
}
