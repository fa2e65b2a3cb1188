use chrono::{Local, NaiveDate};

use super::config::{ActivityProfile, ProgressionShape};
use super::slots::TempoSlot;

const CURVE_WIDTH: usize = 30;
pub const DEFAULT_SEED_PLAYLIST_NAME: &str = "My playlist";
const DESCRIPTION: &str = "Created with TempoFlow";

/// Playlist naming utilities
pub struct PlaylistNaming;

impl PlaylistNaming {
    /// Name a workout playlist after its intensity, curve and weekday
    pub fn workout_name(profile: &ActivityProfile, shape: ProgressionShape) -> String {
        Self::workout_name_on(profile, shape, Local::now().date_naive())
    }

    fn workout_name_on(
        profile: &ActivityProfile,
        shape: ProgressionShape,
        day: NaiveDate,
    ) -> String {
        format!("{} {} {}", profile.label, shape.label(), day.format("%A")).to_lowercase()
    }

    pub fn workout_description(slots: &[TempoSlot]) -> String {
        let low = slots.iter().map(|s| s.target_bpm).min();
        let high = slots.iter().map(|s| s.target_bpm).max();
        match low.zip(high) {
            Some((low, high)) if low == high => format!("{DESCRIPTION} · {low} BPM"),
            Some((low, high)) => format!("{DESCRIPTION} · {low}-{high} BPM"),
            None => DESCRIPTION.to_string(),
        }
    }

    pub fn seed_description() -> String {
        DESCRIPTION.to_string()
    }
}

/// Text rendering of the tempo curve, one bar per slot.
///
/// Bars are scaled between the lowest and highest target; a flat curve
/// draws every bar at full width.
pub fn render_curve(slots: &[TempoSlot]) -> Vec<String> {
    let Some(low) = slots.iter().map(|s| s.target_bpm).min() else {
        return Vec::new();
    };
    let high = slots.iter().map(|s| s.target_bpm).max().unwrap_or(low);
    let span = high - low;

    slots
        .iter()
        .map(|slot| {
            let filled = if span == 0 {
                CURVE_WIDTH
            } else {
                // Keep at least one cell so the lowest slot stays visible
                1 + ((slot.target_bpm - low) as usize * (CURVE_WIDTH - 1)) / span as usize
            };
            format!(
                "{:>3}. {:>3} BPM |{}",
                slot.index + 1,
                slot.target_bpm,
                "#".repeat(filled)
            )
        })
        .collect()
}
