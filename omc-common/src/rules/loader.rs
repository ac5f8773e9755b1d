//! Rule data folder loading
//!
//! Layout:
//!
//! ```text
//! <data>/artists/restricted.json
//! <data>/overrides/edge-cases.json
//! <data>/sources/banned.json
//! <data>/labels/*.json
//! ```
//!
//! Any unreadable or malformed file aborts the load with an error naming the
//! file. Partial rule sets are never produced.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::artists::{ArtistStatus, RestrictedArtistEntry};
use super::labels::LabelCatalog;
use super::overrides::{OverrideRule, RawOverride};
use crate::{Error, Result};

pub const RESTRICTED_ARTISTS_FILE: &str = "artists/restricted.json";
pub const OVERRIDES_FILE: &str = "overrides/edge-cases.json";
pub const BANNED_SOURCES_FILE: &str = "sources/banned.json";
pub const LABELS_DIR: &str = "labels";

/// Parsed (but not yet compiled) content of a data folder
#[derive(Debug, Default)]
pub struct RuleData {
    pub artists: Vec<RestrictedArtistEntry>,
    pub overrides: Vec<OverrideRule>,
    pub banned_sources: Vec<String>,
    pub labels: Vec<LabelCatalog>,
}

#[derive(Debug, Deserialize)]
struct RawArtistEntry {
    status: ArtistStatus,
    #[serde(default)]
    notes: Option<String>,
}

pub fn load_data_folder(root: &Path) -> Result<RuleData> {
    debug!(path = %root.display(), "Loading rule data");

    Ok(RuleData {
        artists: load_restricted_artists(&root.join(RESTRICTED_ARTISTS_FILE))?,
        overrides: load_overrides(&root.join(OVERRIDES_FILE))?,
        banned_sources: read_json(&root.join(BANNED_SOURCES_FILE))?,
        labels: load_labels(&root.join(LABELS_DIR))?,
    })
}

/// Registry keys keep their file order
pub fn load_restricted_artists(path: &Path) -> Result<Vec<RestrictedArtistEntry>> {
    let raw: Map<String, Value> = read_json(path)?;

    raw.into_iter()
        .map(|(key, value)| {
            let entry: RawArtistEntry = serde_json::from_value(value).map_err(|e| {
                Error::invalid_rule_data(path, format!("artist '{}': {}", key, e))
            })?;
            Ok(RestrictedArtistEntry {
                key,
                status: entry.status,
                notes: entry.notes,
            })
        })
        .collect()
}

pub fn load_overrides(path: &Path) -> Result<Vec<OverrideRule>> {
    let raw: Vec<RawOverride> = read_json(path)?;

    raw.into_iter()
        .map(|row| row.into_rule().map_err(|message| Error::invalid_rule_data(path, message)))
        .collect()
}

/// Every `*.json` file in the folder is one catalog, loaded in file-name order
pub fn load_labels(dir: &Path) -> Result<Vec<LabelCatalog>> {
    let entries = std::fs::read_dir(dir).map_err(|source| Error::RuleDataIo {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| Error::RuleDataIo {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        warn!(path = %dir.display(), "No label catalogs found");
    }

    files
        .iter()
        .map(|path| {
            let value: Value = read_json(path)?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let catalog = LabelCatalog::parse_any(name, &value)
                .map_err(|e| Error::invalid_rule_data(path, e.to_string()))?;
            debug!(
                catalog = catalog.name(),
                tracks = catalog.track_count(),
                "Loaded label catalog"
            );
            Ok(catalog)
        })
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::RuleDataIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| Error::invalid_rule_data(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn minimal_folder() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            RESTRICTED_ARTISTS_FILE,
            r#"{
                "Zeta": { "status": "disallowed", "notes": null },
                "Alpha": { "status": "potential", "notes": "Ask first." },
                "Mid": { "status": "fa_only" }
            }"#,
        );
        write(dir.path(), OVERRIDES_FILE, "[]");
        write(dir.path(), BANNED_SOURCES_FILE, r#"["MEGAREX"]"#);
        fs::create_dir_all(dir.path().join(LABELS_DIR)).unwrap();
        dir
    }

    #[test]
    fn test_registry_keeps_file_order() {
        let dir = minimal_folder();
        let data = load_data_folder(dir.path()).unwrap();
        let keys: Vec<_> = data.artists.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["Zeta", "Alpha", "Mid"]);
        assert_eq!(data.artists[1].notes.as_deref(), Some("Ask first."));
        assert_eq!(data.artists[2].status, ArtistStatus::FaOnly);
        assert!(data.labels.is_empty());
    }

    #[test]
    fn test_unknown_status_names_the_file() {
        let dir = minimal_folder();
        write(
            dir.path(),
            RESTRICTED_ARTISTS_FILE,
            r#"{ "Someone": { "status": "banned" } }"#,
        );
        let err = load_data_folder(dir.path()).unwrap_err();
        match err {
            Error::InvalidRuleData { path, message } => {
                assert!(path.ends_with(RESTRICTED_ARTISTS_FILE));
                assert!(message.contains("Someone"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = minimal_folder();
        fs::remove_file(dir.path().join(BANNED_SOURCES_FILE)).unwrap();
        assert!(matches!(
            load_data_folder(dir.path()),
            Err(Error::RuleDataIo { .. })
        ));
    }

    #[test]
    fn test_missing_labels_dir_is_fatal() {
        let dir = minimal_folder();
        fs::remove_dir(dir.path().join(LABELS_DIR)).unwrap();
        assert!(matches!(
            load_data_folder(dir.path()),
            Err(Error::RuleDataIo { .. })
        ));
    }

    #[test]
    fn test_override_without_matcher_is_rejected() {
        let dir = minimal_folder();
        write(
            dir.path(),
            OVERRIDES_FILE,
            r#"[{ "artist": "A", "meta": { "title": {} }, "resultOverride": "ok" }]"#,
        );
        assert!(matches!(
            load_data_folder(dir.path()),
            Err(Error::InvalidRuleData { .. })
        ));
    }

    #[test]
    fn test_labels_load_in_name_order_in_any_layout() {
        let dir = minimal_folder();
        write(dir.path(), "labels/b.json", r#"{ "Zekk": ["Swampgator"] }"#);
        write(
            dir.path(),
            "labels/a.json",
            r#"[{ "artist": "lapix", "title": "Cave of Points" }]"#,
        );
        write(dir.path(), "labels/notes.txt", "ignored");

        let labels = load_labels(&dir.path().join(LABELS_DIR)).unwrap();
        let names: Vec<_> = labels.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(labels[1].contains("zekk", "Swampgator"));
    }

    #[test]
    fn test_malformed_label_file_is_rejected() {
        let dir = minimal_folder();
        write(dir.path(), "labels/bad.json", r#"{ "Zekk": "Swampgator" }"#);
        assert!(matches!(
            load_labels(&dir.path().join(LABELS_DIR)),
            Err(Error::InvalidRuleData { .. })
        ));
    }
}
