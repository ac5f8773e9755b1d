//! # OMC Common Library
//!
//! Track metadata compliance checks shared by the omc binaries:
//! - Track records and verdict types
//! - Rule tables (restricted artists, overrides, banned sources, label catalogs)
//! - The compliance engine and per-set aggregation
//! - Configuration loading

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rules;

pub use aggregate::ResultAggregator;
pub use engine::ComplianceEngine;
pub use error::{Error, Result};
pub use models::{
    Availability, ComplianceFailureReason, ComplianceStatus, RankStatus, SetVerdict,
    TrackMetadata, TrackRecord, Verdict,
};
pub use rules::RuleSet;
