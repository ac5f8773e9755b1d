//! Label catalogs: tracks a rightsholder has withdrawn from use
//!
//! A catalog maps an artist credit to title fragments. Catalog files come in
//! three layouts, see [`LabelFormat`].

use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

use crate::{Error, Result};

/// On-disk layout of a catalog file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// `[{"artist": "...", "title": "..."}]`
    ArtistTitleGroups = 0,
    /// `{"Artist": {"tracks": ["..."]}}`
    ArtistTrackListWithKey = 1,
    /// `{"Artist": ["..."]}`
    ArtistTrackList = 2,
}

impl LabelFormat {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(LabelFormat::ArtistTitleGroups),
            1 => Some(LabelFormat::ArtistTrackListWithKey),
            2 => Some(LabelFormat::ArtistTrackList),
            _ => None,
        }
    }

    /// Guess the layout of an already parsed document
    pub fn detect(value: &Value) -> Option<Self> {
        match value {
            Value::Array(_) => Some(LabelFormat::ArtistTitleGroups),
            Value::Object(map) => match map.values().next() {
                // An empty object is a valid (empty) catalog in either keyed layout
                None => Some(LabelFormat::ArtistTrackList),
                Some(Value::Object(_)) => Some(LabelFormat::ArtistTrackListWithKey),
                Some(Value::Array(_)) => Some(LabelFormat::ArtistTrackList),
                Some(_) => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl FromStr for LabelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(LabelFormat::from_code)
            .ok_or_else(|| {
                Error::InvalidInput(format!("Unknown label format '{}' (expected 0, 1 or 2)", s))
            })
    }
}

/// One rightsholder catalog, artists kept in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCatalog {
    name: String,
    artists: Vec<(String, Vec<String>)>,
}

impl LabelCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artists: Vec::new(),
        }
    }

    /// Append tracks for an artist; a repeated artist is merged into its first entry
    ///
    /// Blank titles are dropped, since an empty fragment is contained in
    /// every title.
    pub fn add_tracks<I, S>(&mut self, artist: &str, tracks: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tracks = tracks
            .into_iter()
            .map(Into::into)
            .filter(|title: &String| !title.trim().is_empty());
        match self.artists.iter_mut().find(|(name, _)| name == artist) {
            Some((_, existing)) => existing.extend(tracks),
            None => self.artists.push((artist.to_string(), tracks.collect())),
        }
    }

    pub fn with_tracks<I, S>(mut self, artist: &str, tracks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_tracks(artist, tracks);
        self
    }

    /// Parse a catalog document in the given layout
    pub fn parse(name: impl Into<String>, value: &Value, format: LabelFormat) -> Result<Self> {
        let mut catalog = LabelCatalog::new(name);

        match format {
            LabelFormat::ArtistTitleGroups => {
                let rows = value
                    .as_array()
                    .ok_or_else(|| Error::InvalidInput("expected an array of {artist, title}".into()))?;
                for (index, row) in rows.iter().enumerate() {
                    let artist = string_field(row, "artist", index)?;
                    let title = string_field(row, "title", index)?;
                    catalog.add_tracks(artist, [title]);
                }
            }
            LabelFormat::ArtistTrackListWithKey => {
                for (artist, info) in expect_object(value)? {
                    let tracks = info
                        .get("tracks")
                        .ok_or_else(|| {
                            Error::InvalidInput(format!("artist '{}' has no \"tracks\" list", artist))
                        })
                        .and_then(|tracks| string_list(artist, tracks))?;
                    catalog.add_tracks(artist, tracks);
                }
            }
            LabelFormat::ArtistTrackList => {
                for (artist, tracks) in expect_object(value)? {
                    catalog.add_tracks(artist, string_list(artist, tracks)?);
                }
            }
        }

        Ok(catalog)
    }

    /// Parse a catalog document, detecting its layout
    pub fn parse_any(name: impl Into<String>, value: &Value) -> Result<Self> {
        let format = LabelFormat::detect(value)
            .ok_or_else(|| Error::InvalidInput("unrecognized label catalog layout".into()))?;
        Self::parse(name, value, format)
    }

    /// NFKC-normalized copy of the catalog
    ///
    /// Full-width and compatibility forms fold to their plain equivalents;
    /// artists that become equal are merged.
    pub fn normalized(&self) -> Self {
        let mut catalog = LabelCatalog::new(self.name.clone());
        for (artist, tracks) in &self.artists {
            let artist: String = artist.nfkc().collect();
            catalog.add_tracks(&artist, tracks.iter().map(|title| title.nfkc().collect::<String>()));
        }
        catalog
    }

    /// Render the catalog in the given layout
    pub fn to_value(&self, format: LabelFormat) -> Value {
        match format {
            LabelFormat::ArtistTitleGroups => Value::Array(
                self.artists
                    .iter()
                    .flat_map(|(artist, tracks)| {
                        tracks
                            .iter()
                            .map(move |title| json!({ "artist": artist, "title": title }))
                    })
                    .collect(),
            ),
            LabelFormat::ArtistTrackListWithKey => Value::Object(
                self.artists
                    .iter()
                    .map(|(artist, tracks)| (artist.clone(), json!({ "tracks": tracks })))
                    .collect::<Map<_, _>>(),
            ),
            LabelFormat::ArtistTrackList => Value::Object(
                self.artists
                    .iter()
                    .map(|(artist, tracks)| (artist.clone(), json!(tracks)))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artists(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.artists
            .iter()
            .map(|(artist, tracks)| (artist.as_str(), tracks.as_slice()))
    }

    pub fn track_count(&self) -> usize {
        self.artists.iter().map(|(_, tracks)| tracks.len()).sum()
    }

    /// Artist equals a catalog key (ignoring case) and one of its title
    /// fragments appears in `title` (ignoring case)
    pub fn contains(&self, artist: &str, title: &str) -> bool {
        let artist = artist.to_lowercase();
        let title = title.to_lowercase();
        self.artists
            .iter()
            .filter(|(name, _)| name.to_lowercase() == artist)
            .flat_map(|(_, tracks)| tracks.iter())
            .any(|fragment| title.contains(&fragment.to_lowercase()))
    }
}

fn expect_object(value: &Value) -> Result<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::InvalidInput("expected an object keyed by artist".into()))
}

fn string_field<'a>(row: &'a Value, field: &str, index: usize) -> Result<&'a str> {
    row.get(field).and_then(Value::as_str).ok_or_else(|| {
        Error::InvalidInput(format!("entry {} is missing string field \"{}\"", index, field))
    })
}

fn string_list<'a>(artist: &str, value: &'a Value) -> Result<Vec<&'a str>> {
    value
        .as_array()
        .and_then(|items| items.iter().map(Value::as_str).collect::<Option<Vec<_>>>())
        .ok_or_else(|| {
            Error::InvalidInput(format!("tracks for artist '{}' must be a list of strings", artist))
        })
}

/// Scans every loaded catalog for a rightsholder withdrawal
#[derive(Debug, Clone, Default)]
pub struct LabelViolationDetector {
    catalogs: Vec<LabelCatalog>,
}

impl LabelViolationDetector {
    pub fn new(catalogs: Vec<LabelCatalog>) -> Self {
        Self { catalogs }
    }

    pub fn is_violation(&self, artist: &str, title: &str) -> bool {
        self.find_catalog(artist, title).is_some()
    }

    /// First catalog listing this (artist, title) pair
    pub fn find_catalog(&self, artist: &str, title: &str) -> Option<&LabelCatalog> {
        if artist.is_empty() || title.is_empty() {
            return None;
        }
        self.catalogs
            .iter()
            .find(|catalog| catalog.contains(artist, title))
    }

    pub fn catalogs(&self) -> &[LabelCatalog] {
        &self.catalogs
    }
}
