#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::PlaylistError;

    fn create_test_request(duration_minutes: f64) -> GenerationRequest {
        GenerationRequest {
            duration_minutes,
            activity: ActivityLevel::High,
            progression: ProgressionShape::Linear,
            seed_artists: vec!["4NHQUGzhtTLFvgF5SZesLK".to_string()],
            seed_tracks: vec![],
        }
    }

    fn ids(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("id{i}")).collect()
    }

    #[test]
    fn test_activity_profiles_table() {
        let relaxed = ActivityLevel::Relaxed.profile();
        let low = ActivityLevel::Low.profile();
        let high = ActivityLevel::High.profile();

        assert_eq!((relaxed.bpm_min, relaxed.bpm_max), (60, 90));
        assert_eq!((low.bpm_min, low.bpm_max), (100, 120));
        assert_eq!((high.bpm_min, high.bpm_max), (130, 170));

        for profile in [relaxed, low, high] {
            assert!(profile.bpm_min < profile.bpm_max);
            assert!(profile.bpm_min >= MIN_CATALOG_BPM && profile.bpm_max <= MAX_CATALOG_BPM);
        }
    }

    #[test]
    fn test_duration_bounds() {
        assert!(create_test_request(5.0).validate().is_ok());
        assert!(create_test_request(180.0).validate().is_ok());

        for bad in [4.9, 180.5, 0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = create_test_request(bad).validate();
            assert!(
                matches!(result, Err(PlaylistError::Validation(_))),
                "duration {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_requires_at_least_one_seed() {
        let mut request = create_test_request(45.0);
        request.seed_artists = vec!["   ".to_string(), "spotify:artist:".to_string()];
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn test_seed_limits() {
        let mut request = create_test_request(45.0);
        request.seed_artists = ids(5);
        request.seed_tracks = ids(5);
        let validated = request.validate().unwrap();
        assert_eq!(validated.seeds.artists.len(), 5);
        assert_eq!(validated.seeds.tracks.len(), 5);

        request.seed_tracks = ids(6);
        assert!(matches!(request.validate(), Err(PlaylistError::Validation(_))));
    }

    #[test]
    fn test_seed_ids_are_normalized() {
        let mut request = create_test_request(30.0);
        request.seed_artists = vec![" spotify:artist:abc ".to_string()];
        request.seed_tracks = vec!["spotify:track:xyz".to_string(), "".to_string()];
        let validated = request.validate().unwrap();
        assert_eq!(validated.seeds.artists, vec!["abc".to_string()]);
        assert_eq!(validated.seeds.tracks, vec!["xyz".to_string()]);
        assert_eq!(validated.profile, ActivityLevel::High.profile());
    }

    #[test]
    fn test_seed_set_keeps_first_five() {
        let seeds = SeedSet::new(ids(7), ids(2));
        assert_eq!(seeds.artists, ids(5));
        assert_eq!(seeds.tracks, ids(2));
        assert!(SeedSet::default().is_empty());
    }

    #[test]
    fn test_seed_request_validation() {
        let request = SeedRequest {
            seed_artists: vec![
                SeedItem::artist("spotify:artist:a1", " Daft Punk "),
                SeedItem::artist("  ", "Nobody"),
            ],
            seed_tracks: vec![],
        };
        let validated = request.validate().unwrap();
        assert_eq!(validated.seed_artists, vec![SeedItem::artist("a1", "Daft Punk")]);

        assert!(SeedRequest::default().validate().is_err());
    }

    #[test]
    fn test_cli_seed_parsing() {
        let artist = SeedItem::parse(
            "spotify:artist:4tZwfgrHOc3mvqYlEYSvVi=Daft Punk",
            SeedKind::Artist,
        );
        assert_eq!(artist, SeedItem::artist("4tZwfgrHOc3mvqYlEYSvVi", "Daft Punk"));

        let track = SeedItem::parse("0DiWol3AO6WpXZgp0goxAV", SeedKind::Track);
        assert_eq!(track, SeedItem::track("0DiWol3AO6WpXZgp0goxAV", ""));
    }

    #[test]
    fn test_request_deserializes_with_aliases() {
        let json = r#"{
            "duration_minutes": 45,
            "activity": "yoga",
            "progression": "hiit",
            "seed_tracks": ["t1"]
        }"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.activity, ActivityLevel::Relaxed);
        assert_eq!(request.progression, ProgressionShape::Interval);
        assert!(request.seed_artists.is_empty());
    }
}
