//! Plausibility validation and persistence for OCR-scanned artifact
//! records.
//!
//! The recognition subsystem hands over one raw-field record per item;
//! this crate normalizes the stats, decides whether the combination is
//! achievable under the game's generation rules, dedups against the
//! accepted set and persists the result atomically. Screen capture,
//! automation and the recognition model itself live elsewhere and
//! never appear here.

pub mod artifact;
pub mod error;
pub mod sets;
pub mod slot;
pub mod stat;
pub mod store;
pub mod tables;
pub mod validator;

pub use artifact::{Artifact, RawArtifact};
pub use error::{AddError, ConstructionError, CoreError, CoreErrorCode, ParseError};
pub use slot::Slot;
pub use stat::{StatKind, StatValue};
pub use store::{AddOutcome, ArtifactStore};
pub use tables::ReferenceTables;
