//! Per-set aggregation of track records
//!
//! Every track of a set shares the set's metadata, so the engine runs once
//! per set and the verdict is reported with all of the set's track ids.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::engine::ComplianceEngine;
use crate::models::{SetVerdict, TrackMetadata, TrackRecord};

/// Metadata and owner of the first record in a set that carries metadata
struct Representative<'r> {
    metadata: &'r TrackMetadata,
    owner_id: Option<u64>,
    owner_username: Option<&'r str>,
}

struct SetGroup<'r> {
    set_id: u64,
    track_ids: Vec<u64>,
    representative: Option<Representative<'r>>,
}

/// Groups records by set and evaluates each set once
#[derive(Debug, Clone, Copy)]
pub struct ResultAggregator<'a> {
    engine: ComplianceEngine<'a>,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(engine: ComplianceEngine<'a>) -> Self {
        Self { engine }
    }

    /// One verdict per set, in order of first appearance
    ///
    /// Sets with no resolvable metadata are skipped and logged; they never
    /// fail the batch.
    pub fn aggregate(&self, records: &[TrackRecord]) -> Vec<SetVerdict> {
        let mut groups: Vec<SetGroup<'_>> = Vec::new();
        let mut index: HashMap<u64, usize> = HashMap::new();

        for record in records {
            let slot = *index.entry(record.set_id).or_insert_with(|| {
                groups.push(SetGroup {
                    set_id: record.set_id,
                    track_ids: Vec::new(),
                    representative: None,
                });
                groups.len() - 1
            });

            let group = &mut groups[slot];
            if !group.track_ids.contains(&record.id) {
                group.track_ids.push(record.id);
            }
            if group.representative.is_none() {
                group.representative = record.metadata.as_ref().map(|metadata| Representative {
                    metadata,
                    owner_id: record.owner_id,
                    owner_username: record.owner_username.as_deref(),
                });
            }
        }

        let mut results = Vec::with_capacity(groups.len());
        for group in groups {
            let Some(Representative {
                metadata,
                owner_id,
                owner_username,
            }) = group.representative
            else {
                warn!(set_id = group.set_id, tracks = ?group.track_ids, "No metadata for set, skipping");
                continue;
            };

            let verdict = self.engine.evaluate(metadata);
            debug!(set_id = group.set_id, status = ?verdict.status(), "Set evaluated");

            results.push(SetVerdict {
                set_id: group.set_id,
                track_ids: group.track_ids,
                verdict,
                artist: metadata.artist.clone(),
                title: metadata.title.clone(),
                owner_id,
                owner_username: owner_username.map(str::to_string),
            });
        }

        results
    }
}
