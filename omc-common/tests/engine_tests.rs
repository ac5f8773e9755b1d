//! Scenario tests against the bundled rule data in `data/`

use std::path::PathBuf;

use omc_common::{
    Availability, ComplianceEngine, ComplianceFailureReason, ComplianceStatus, RankStatus,
    ResultAggregator, RuleSet, TrackMetadata, TrackRecord, Verdict,
};

fn data_folder() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data")
}

fn rules() -> RuleSet {
    RuleSet::load(&data_folder()).expect("bundled rule data should load")
}

fn evaluate(rules: &RuleSet, metadata: TrackMetadata) -> Verdict {
    ComplianceEngine::new(rules).evaluate(&metadata)
}

fn with_artist_title(artist: &str, title: &str) -> TrackMetadata {
    TrackMetadata {
        availability: Some(Availability::default()),
        ..TrackMetadata::new(artist, title)
    }
}

#[test]
fn test_bundled_data_loads() {
    let rules = rules();
    assert!(rules.artists().len() >= 7);
    assert_eq!(rules.overrides().len(), 2);
    assert!(!rules.banned_sources().is_empty());
    assert_eq!(rules.labels().catalogs().len(), 1);
    assert_eq!(rules.labels().catalogs()[0].name(), "MEGAREX");
}

#[test]
fn test_disallowed_artist() {
    let rules = rules();
    let verdict = evaluate(&rules, with_artist_title("Igorrr", "Very Noise"));
    assert_eq!(verdict.status(), ComplianceStatus::Disallowed);
    assert_eq!(verdict.reason(), Some(ComplianceFailureReason::DisallowedArtist));
    assert_eq!(
        verdict.notes(),
        Some("The artist has prohibited usage of their tracks.")
    );
}

#[test]
fn test_licensed_disallowed_artist_is_ok() {
    let rules = rules();
    let mut metadata = with_artist_title("Igorrr", "Very Noise");
    metadata.license_track_id = Some(1234);
    assert!(evaluate(&rules, metadata).is_ok());
}

#[test]
fn test_ranked_set_with_banned_source_is_ok() {
    let rules = rules();
    let mut metadata = with_artist_title("Test Artist", "Test Title");
    metadata.rank_status = RankStatus::Ranked;
    metadata.source = Some("MEGAREX".to_string());
    assert!(evaluate(&rules, metadata).is_ok());
}

#[test]
fn test_ranked_set_with_takedown_is_dmca() {
    let rules = rules();
    let mut metadata = with_artist_title("Test Artist", "Test Title");
    metadata.rank_status = RankStatus::Ranked;
    metadata.availability = Some(Availability {
        download_disabled: true,
        takedown_notice: None,
    });
    let verdict = evaluate(&rules, metadata);
    assert_eq!(verdict.reason(), Some(ComplianceFailureReason::Dmca));
}

#[test]
fn test_label_catalog_tracks() {
    let rules = rules();
    for (artist, title) in [
        ("lapix", "Cave of Points"),
        ("lapix", "NEO GRAVITY (Extended)"),
        ("lapix & Camellia", "Dead Music"),
        ("Zekk", "Swampgator"),
        ("Blacklolita", "FlashWarehouse(^-^)"),
    ] {
        let verdict = evaluate(&rules, with_artist_title(artist, title));
        assert_eq!(
            verdict.reason(),
            Some(ComplianceFailureReason::DisallowedByRightsholder),
            "{artist} - {title}"
        );
    }

    assert!(evaluate(&rules, with_artist_title("lapix", "Not In The MEGAREX List")).is_ok());
}

#[test]
fn test_banned_source_variants() {
    let rules = rules();
    for source in ["DJ Max", "DJMAX Portable 3", "megarex"] {
        let mut metadata = with_artist_title("Someone", "Something");
        metadata.source = Some(source.to_string());
        assert_eq!(
            evaluate(&rules, metadata).reason(),
            Some(ComplianceFailureReason::DisallowedSource),
            "{source}"
        );
    }
}

#[test]
fn test_banned_tag() {
    let rules = rules();
    let mut metadata = with_artist_title("Someone", "Something");
    metadata.tags = vec!["rhythm".to_string(), "neowiz".to_string()];
    assert_eq!(
        evaluate(&rules, metadata).reason(),
        Some(ComplianceFailureReason::DisallowedSource)
    );
}

#[test]
fn test_fa_only_artist() {
    let rules = rules();
    let verdict = evaluate(&rules, with_artist_title("Akira Complex", "Heavenly"));
    assert_eq!(verdict.reason(), Some(ComplianceFailureReason::FaTracksOnly));
    assert_eq!(
        verdict.notes(),
        Some("This artist prohibits usage of tracks which are not licensed through the Featured Artist program.")
    );
}

#[test]
fn test_potential_artist_carries_registry_notes() {
    let rules = rules();
    let verdict = evaluate(&rules, with_artist_title("a_hisa", "Alexithymia"));
    assert_eq!(verdict.status(), ComplianceStatus::PotentiallyDisallowed);
    assert_eq!(verdict.reason(), None);
    assert!(verdict.notes().unwrap().contains("a-hisa.bandcamp.com"));
}

#[test]
fn test_noma_word_boundaries() {
    let rules = rules();
    assert!(evaluate(&rules, with_artist_title("NOMANOA", "Song")).is_ok());
    assert!(evaluate(&rules, with_artist_title("Tsunomaki Watame", "Song")).is_ok());
    assert!(evaluate(&rules, with_artist_title("Binomaly", "Song")).is_ok());
    assert!(!evaluate(&rules, with_artist_title("NOMA vs. Someone", "Song")).is_ok());
    assert!(!evaluate(&rules, with_artist_title("Track (NOMA Remix)", "Song")).is_ok());
}

#[test]
fn test_restricted_artist_credited_in_title() {
    let rules = rules();
    let verdict = evaluate(&rules, with_artist_title("Camellia", "Flower (Igorrr Remix)"));
    assert_eq!(verdict.reason(), Some(ComplianceFailureReason::DisallowedArtist));

    let verdict = evaluate(&rules, with_artist_title("Camellia", "Song (Hatsuki Yura Remix)"));
    assert_eq!(verdict.reason(), Some(ComplianceFailureReason::DisallowedArtist));
}

#[test]
fn test_overrides() {
    let rules = rules();
    assert!(evaluate(&rules, with_artist_title("Morimori Atsushi", "Night Drive Anthem")).is_ok());

    let verdict = evaluate(
        &rules,
        with_artist_title("Lusumi", "/execution_program.wav"),
    );
    assert_eq!(verdict.status(), ComplianceStatus::Disallowed);
    assert_eq!(
        verdict.reason(),
        Some(ComplianceFailureReason::DisallowedByRightsholder)
    );
}

#[test]
fn test_aggregate_mixed_batch() {
    let rules = rules();
    let aggregator = ResultAggregator::new(ComplianceEngine::new(&rules));

    let record = |id, set_id, metadata: Option<TrackMetadata>| TrackRecord {
        id,
        set_id,
        owner_id: Some(1),
        owner_username: Some("Test Creator".to_string()),
        metadata,
    };
    let records = vec![
        record(10, 1, Some(with_artist_title("Igorrr", "Very Noise"))),
        record(20, 2, None),
        record(11, 1, Some(with_artist_title("Igorrr", "Very Noise"))),
        record(30, 3, Some(with_artist_title("Camellia", "Ghost"))),
    ];

    let results = aggregator.aggregate(&records);
    let sets: Vec<_> = results.iter().map(|r| r.set_id).collect();
    assert_eq!(sets, [1, 3]);
    assert_eq!(results[0].track_ids, [10, 11]);
    assert_eq!(results[0].verdict.status(), ComplianceStatus::Disallowed);
    assert!(results[1].verdict.is_ok());

    let json = serde_json::to_value(&results[0]).unwrap();
    assert_eq!(json["status"], "DISALLOWED");
    assert_eq!(json["reason"], "DISALLOWED_ARTIST");
    assert_eq!(json["owner_username"], "Test Creator");
}
