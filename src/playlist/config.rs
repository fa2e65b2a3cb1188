use serde::{Deserialize, Serialize};

use crate::error::PlaylistError;

/// Average track length used to turn a workout duration into a track count (3.5 minutes)
pub const AVG_TRACK_DURATION_MS: u64 = 210_000;
/// ± BPM around a slot's target tempo for the strict recommendation query
pub const TEMPO_MARGIN: u32 = 10;
/// ± BPM for the untargeted retry when the strict query returns nothing
pub const WIDENED_MARGIN: u32 = 25;
pub const MIN_CATALOG_BPM: u32 = 40;
pub const MAX_CATALOG_BPM: u32 = 200;
pub const MIN_DURATION_MINUTES: f64 = 5.0;
pub const MAX_DURATION_MINUTES: f64 = 180.0;
/// The recommendation endpoint accepts at most five seeds of each kind
pub const MAX_SEEDS: usize = 5;

/// Intensity tier of a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    #[serde(alias = "yoga")]
    #[value(alias = "yoga")]
    Relaxed,
    Low,
    High,
}

/// BPM bounds for an activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityProfile {
    pub level: ActivityLevel,
    pub label: &'static str,
    pub bpm_min: u32,
    pub bpm_max: u32,
}

const ACTIVITY_PROFILES: [ActivityProfile; 3] = [
    ActivityProfile {
        level: ActivityLevel::Relaxed,
        label: "Relaxed",
        bpm_min: 60,
        bpm_max: 90,
    },
    ActivityProfile {
        level: ActivityLevel::Low,
        label: "Low Intensity",
        bpm_min: 100,
        bpm_max: 120,
    },
    ActivityProfile {
        level: ActivityLevel::High,
        label: "High Intensity",
        bpm_min: 130,
        bpm_max: 170,
    },
];

impl ActivityLevel {
    pub fn profile(self) -> ActivityProfile {
        let index = match self {
            ActivityLevel::Relaxed => 0,
            ActivityLevel::Low => 1,
            ActivityLevel::High => 2,
        };
        ACTIVITY_PROFILES[index]
    }
}

/// Overall tempo curve across the playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProgressionShape {
    /// Monotonic ramp from the profile minimum to its maximum
    Linear,
    /// Alternating peak/rest, starting at peak
    #[serde(alias = "hiit")]
    #[value(alias = "hiit")]
    Interval,
}

impl ProgressionShape {
    pub fn label(self) -> &'static str {
        match self {
            ProgressionShape::Linear => "Linear Ramp",
            ProgressionShape::Interval => "HIIT Intervals",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedKind {
    #[default]
    Artist,
    Track,
}

/// A user-chosen artist or track biasing the recommendations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: SeedKind,
}

impl SeedItem {
    pub fn artist(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: SeedKind::Artist,
        }
    }

    pub fn track(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: SeedKind::Track,
        }
    }

    /// Parse a command-line seed written as `ID` or `ID=Display Name`
    pub fn parse(raw: &str, kind: SeedKind) -> Self {
        let (id, name) = match raw.split_once('=') {
            Some((id, name)) => (id, name),
            None => (raw, ""),
        };
        let id = normalize_seed_id(id, kind);
        match kind {
            SeedKind::Artist => Self::artist(id, name.trim()),
            SeedKind::Track => Self::track(id, name.trim()),
        }
    }
}

/// Trim a seed id and strip a `spotify:artist:` / `spotify:track:` URI prefix
pub fn normalize_seed_id(raw: &str, kind: SeedKind) -> String {
    let prefix = match kind {
        SeedKind::Artist => "spotify:artist:",
        SeedKind::Track => "spotify:track:",
    };
    let trimmed = raw.trim();
    trimmed.strip_prefix(prefix).unwrap_or(trimmed).trim().to_string()
}

/// Seed ids sent with every recommendation query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSet {
    pub artists: Vec<String>,
    pub tracks: Vec<String>,
}

impl SeedSet {
    /// Keeps the first five seeds of each kind
    pub fn new(artists: Vec<String>, tracks: Vec<String>) -> Self {
        Self {
            artists: artists.into_iter().take(MAX_SEEDS).collect(),
            tracks: tracks.into_iter().take(MAX_SEEDS).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty() && self.tracks.is_empty()
    }
}

/// Parameters of a tempo-progression ("workout") playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub duration_minutes: f64,
    pub activity: ActivityLevel,
    pub progression: ProgressionShape,
    #[serde(default)]
    pub seed_artists: Vec<String>,
    #[serde(default)]
    pub seed_tracks: Vec<String>,
}

/// A generation request that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedGeneration {
    pub duration_minutes: f64,
    pub profile: ActivityProfile,
    pub progression: ProgressionShape,
    pub seeds: SeedSet,
}

/// Workout length must be a finite number of minutes within 5..=180
pub fn validate_duration(duration_minutes: f64) -> Result<(), PlaylistError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(PlaylistError::validation(format!(
            "duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes, got {duration_minutes}"
        )));
    }
    Ok(())
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<ValidatedGeneration, PlaylistError> {
        validate_duration(self.duration_minutes)?;

        let artists = normalize_ids(&self.seed_artists, SeedKind::Artist);
        let tracks = normalize_ids(&self.seed_tracks, SeedKind::Track);
        check_seed_counts(artists.len(), tracks.len())?;

        Ok(ValidatedGeneration {
            duration_minutes: self.duration_minutes,
            profile: self.activity.profile(),
            progression: self.progression,
            seeds: SeedSet::new(artists, tracks),
        })
    }
}

/// Parameters of a plain seed-based playlist (no tempo matching)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedRequest {
    #[serde(default)]
    pub seed_artists: Vec<SeedItem>,
    #[serde(default)]
    pub seed_tracks: Vec<String>,
}

impl SeedRequest {
    /// Normalize ids, drop empty ones and apply the seed count rules
    pub fn validate(&self) -> Result<SeedRequest, PlaylistError> {
        let seed_artists: Vec<SeedItem> = self
            .seed_artists
            .iter()
            .map(|artist| SeedItem {
                id: normalize_seed_id(&artist.id, SeedKind::Artist),
                name: artist.name.trim().to_string(),
                kind: SeedKind::Artist,
            })
            .filter(|artist| !artist.id.is_empty())
            .collect();
        let seed_tracks = normalize_ids(&self.seed_tracks, SeedKind::Track);
        check_seed_counts(seed_artists.len(), seed_tracks.len())?;

        Ok(SeedRequest {
            seed_artists,
            seed_tracks,
        })
    }
}

fn normalize_ids(raw: &[String], kind: SeedKind) -> Vec<String> {
    raw.iter()
        .map(|id| normalize_seed_id(id, kind))
        .filter(|id| !id.is_empty())
        .collect()
}

fn check_seed_counts(artists: usize, tracks: usize) -> Result<(), PlaylistError> {
    if artists == 0 && tracks == 0 {
        return Err(PlaylistError::validation("add at least one artist or track seed"));
    }
    if artists > MAX_SEEDS {
        return Err(PlaylistError::validation(format!(
            "at most {MAX_SEEDS} artist seeds are allowed, got {artists}"
        )));
    }
    if tracks > MAX_SEEDS {
        return Err(PlaylistError::validation(format!(
            "at most {MAX_SEEDS} track seeds are allowed, got {tracks}"
        )));
    }
    Ok(())
}
