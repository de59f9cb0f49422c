use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::artifact::{Artifact, RawArtifact};
use crate::error::{AddError, CoreError, CoreErrorCode};
use crate::tables::ReferenceTables;

/// Outcome of an insertion attempt. A duplicate is a normal result,
/// not a fault; scanning the same inventory twice is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted,
    Duplicate,
}

/// Order-preserving collection of accepted records with
/// dedup-by-identity and single-file durable persistence.
///
/// Calls are serialized by construction: the surrounding system drives
/// one `add` at a time and never exports concurrently with ingestion.
#[derive(Debug)]
pub struct ArtifactStore {
    records: Vec<Artifact>,
    seen: HashSet<String>,
    path: Option<PathBuf>,
}

impl ArtifactStore {
    /// A store with no durability; useful for dry runs and tests.
    pub fn in_memory() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            path: None,
        }
    }

    /// Opens a durable store backed by a canonical-interchange file.
    /// An existing file is loaded through the normal construction
    /// path, so every stored record is re-validated and re-deduped;
    /// records that no longer pass are skipped with a warning.
    pub fn open(path: &Path, tables: &ReferenceTables) -> Result<Self, CoreError> {
        let mut store = Self {
            records: Vec::new(),
            seen: HashSet::new(),
            path: Some(path.to_path_buf()),
        };

        if path.exists() {
            let bytes = fs::read(path).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::StoreIo,
                    format!("failed to read {}: {e}", path.display()),
                )
            })?;
            let entries: Vec<JsonValue> = serde_json::from_slice(&bytes).map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Parse,
                    format!("failed to parse {}: {e}", path.display()),
                )
            })?;

            let mut skipped = 0usize;
            for entry in &entries {
                match Artifact::from_json(entry, tables) {
                    Ok(artifact) => {
                        // In-memory only while loading; the file
                        // already holds these records.
                        let key = artifact.identity_key();
                        if store.seen.insert(key) {
                            store.records.push(artifact);
                        }
                    }
                    Err(e) => {
                        skipped += 1;
                        warn!(error = %e, "skipping stored record that fails validation");
                    }
                }
            }
            info!(
                loaded = store.records.len(),
                skipped,
                path = %path.display(),
                "restored artifact store"
            );
        }

        Ok(store)
    }

    /// Constructs, validates, dedups and persists a record from raw
    /// recognizer fields.
    pub fn add(
        &mut self,
        raw: &RawArtifact,
        image: Option<Vec<u8>>,
        tables: &ReferenceTables,
    ) -> Result<AddOutcome, AddError> {
        let artifact = Artifact::from_raw(raw, image, tables)?;
        Ok(self.add_artifact(artifact)?)
    }

    /// Inserts an already-validated record. The in-memory insertion and
    /// the durable write succeed or fail together: if the write fails,
    /// the insertion is rolled back before the error is returned, so
    /// the file and the in-memory set never disagree.
    pub fn add_artifact(&mut self, artifact: Artifact) -> Result<AddOutcome, CoreError> {
        let key = artifact.identity_key();
        if self.seen.contains(&key) {
            return Ok(AddOutcome::Duplicate);
        }

        self.seen.insert(key.clone());
        self.records.push(artifact);

        if let Err(e) = self.persist() {
            self.records.pop();
            self.seen.remove(&key);
            return Err(e);
        }

        Ok(AddOutcome::Accepted)
    }

    /// Accepted records in insertion order; this is the export order
    /// for every wire format.
    pub fn records(&self) -> &[Artifact] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the canonical-interchange array, the same format `open`
    /// reads back.
    pub fn export_json(&self, path: &Path) -> Result<(), CoreError> {
        write_atomic(path, &self.canonical_bytes())
    }

    fn persist(&self) -> Result<(), CoreError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        write_atomic(path, &self.canonical_bytes())
    }

    fn canonical_bytes(&self) -> Vec<u8> {
        let array = JsonValue::Array(self.records.iter().map(Artifact::to_json).collect());
        array.to_string().into_bytes()
    }
}

/// Full-file atomic rewrite: serialize to a sibling temp file, then
/// rename over the target. A crash mid-write leaves the previous file
/// intact.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(|e| {
        CoreError::new(
            CoreErrorCode::StoreIo,
            format!("failed to write {}: {e}", tmp.display()),
        )
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        CoreError::new(
            CoreErrorCode::StoreIo,
            format!(
                "failed to move {} into place over {}: {e}",
                tmp.display(),
                path.display()
            ),
        )
    })
}
