use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use crate::error::ConstructionError;
use crate::sets;
use crate::slot::Slot;
use crate::stat::{RawMagnitude, StatValue, decode_magnitude};
use crate::tables::{MAX_RARITY, MIN_RARITY, ReferenceTables, max_level};
use crate::validator;

pub const MAX_SUBSTATS: usize = 4;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond-timestamp identity, bumped past the previous id so
/// records accepted within the same millisecond still get distinct,
/// strictly increasing keys.
fn next_id() -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);
    let mut prev = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(prev + 1);
        match LAST_ID.compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(observed) => prev = observed,
        }
    }
}

/// One raw-field record as handed over by the recognition subsystem:
/// noisy strings, nothing validated yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawArtifact {
    pub name: String,
    pub slot: String,
    /// Possibly of the form `"+N"`.
    pub level: String,
    pub star: u8,
    pub main_name: String,
    pub main_value: String,
    /// Up to four `"<name>+<value>"` descriptions.
    #[serde(default)]
    pub substats: Vec<String>,
    #[serde(default)]
    pub lock: bool,
}

/// A validated, immutable artifact record. Construction fails if any
/// invariant fails; no partially valid record ever exists.
#[derive(Debug, Clone)]
pub struct Artifact {
    id: i64,
    set_id: usize,
    slot: Slot,
    name: String,
    rarity: u8,
    level: u32,
    main: StatValue,
    substats: Vec<StatValue>,
    locked: bool,
    image: Option<Vec<u8>>,
}

impl Artifact {
    /// Builds and validates a record from recognizer output. The
    /// optional thumbnail is kept verbatim and never inspected.
    pub fn from_raw(
        raw: &RawArtifact,
        image: Option<Vec<u8>>,
        tables: &ReferenceTables,
    ) -> Result<Self, ConstructionError> {
        let level = parse_level(&raw.level)?;
        let (set_id, piece_slot) = sets::find_piece(&raw.name)
            .ok_or_else(|| ConstructionError::UnknownPieceName(raw.name.clone()))?;
        let slot = Slot::from_display(&raw.slot).unwrap_or(piece_slot);

        let main = StatValue::main(&raw.main_name, &raw.main_value, raw.star, level, tables)?;

        let mut substats = Vec::with_capacity(raw.substats.len());
        for description in &raw.substats {
            substats.push(parse_substat_description(description)?);
        }

        Self::build(
            next_id(),
            set_id,
            slot,
            raw.name.clone(),
            raw.star,
            level,
            main,
            substats,
            raw.lock,
            image,
            tables,
        )
    }

    /// Reconstructs a record from its canonical-interchange object.
    /// Set and slot identity come back through the piece-name reverse
    /// lookup, and every invariant is re-checked: a round trip through
    /// [`Artifact::to_json`] is lossless and re-passes validation.
    pub fn from_json(
        value: &JsonValue,
        tables: &ReferenceTables,
    ) -> Result<Self, ConstructionError> {
        let id = require_i64(value, "id")?;
        let name = require_str(value, "name")?.to_string();
        let level = require_u32(value, "level")?;
        let rarity = require_u32(value, "stars")? as u8;
        let lock = value.get("lock").and_then(JsonValue::as_bool).unwrap_or(false);

        let (set_id, slot) = sets::find_piece(&name)
            .ok_or_else(|| ConstructionError::UnknownPieceName(name.clone()))?;

        let main_obj = value
            .get("main")
            .ok_or_else(|| ConstructionError::MalformedRecord("missing field main".into()))?;
        let main = StatValue::main(
            require_str(main_obj, "name")?,
            require_str(main_obj, "value")?,
            rarity,
            level,
            tables,
        )?;

        let subs = value
            .get("sub")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| ConstructionError::MalformedRecord("missing field sub".into()))?;
        let mut substats = Vec::with_capacity(subs.len());
        for sub in subs {
            substats.push(StatValue::secondary(
                require_str(sub, "name")?,
                require_str(sub, "value")?,
            )?);
        }

        Self::build(
            id, set_id, slot, name, rarity, level, main, substats, lock, None, tables,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        id: i64,
        set_id: usize,
        slot: Slot,
        name: String,
        rarity: u8,
        level: u32,
        main: StatValue,
        substats: Vec<StatValue>,
        locked: bool,
        image: Option<Vec<u8>>,
        tables: &ReferenceTables,
    ) -> Result<Self, ConstructionError> {
        if !(MIN_RARITY..=MAX_RARITY).contains(&rarity) {
            return Err(ConstructionError::BadLevel(format!(
                "rarity {rarity} outside {MIN_RARITY}..={MAX_RARITY}"
            )));
        }
        let limit = max_level(rarity).unwrap_or(0);
        if level > limit {
            return Err(ConstructionError::BadLevel(format!(
                "level {level} exceeds max {limit} for rarity {rarity}"
            )));
        }

        if !main.kind().valid_primary() {
            return Err(ConstructionError::BadMainStat(format!(
                "{} cannot be a primary stat",
                main.kind().display_name()
            )));
        }

        if substats.len() > MAX_SUBSTATS {
            return Err(ConstructionError::BadSubStats(format!(
                "{} secondary stats, at most {MAX_SUBSTATS} possible",
                substats.len()
            )));
        }
        for stat in &substats {
            if !stat.kind().valid_secondary() {
                return Err(ConstructionError::BadSubStats(format!(
                    "{} cannot roll as a secondary stat",
                    stat.kind().display_name()
                )));
            }
        }

        if !validator::reachable(rarity, level, &substats, tables) {
            return Err(ConstructionError::BadSubStats(format!(
                "no roll decomposition reaches [{}] at rarity {rarity} level {level}",
                substats
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        Ok(Self {
            id,
            set_id,
            slot,
            name,
            rarity,
            level,
            main,
            substats,
            locked,
            image,
        })
    }

    /// Canonical-interchange object, also the store's round-trip load
    /// format.
    pub fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "name": self.name,
            "level": self.level,
            "stars": self.rarity,
            "main": {
                "name": self.main.kind().display_name(),
                "value": self.main.formatted(),
            },
            "sub": self
                .substats
                .iter()
                .map(|s| json!({
                    "name": s.kind().display_name(),
                    "value": s.formatted(),
                }))
                .collect::<Vec<_>>(),
            "lock": self.locked,
        })
    }

    /// Dedup identity: name, level, rarity and the ordered stats. The
    /// id, lock flag and thumbnail say nothing about what was scanned.
    pub fn identity_key(&self) -> String {
        let mut key = format!(
            "{}|{}|{}|{}",
            self.name, self.level, self.rarity, self.main
        );
        for sub in &self.substats {
            key.push('|');
            key.push_str(&sub.to_string());
        }
        key
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&self) -> usize {
        self.set_id
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rarity(&self) -> u8 {
        self.rarity
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn main(&self) -> &StatValue {
        &self.main
    }

    pub fn substats(&self) -> &[StatValue] {
        &self.substats
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

fn parse_level(raw: &str) -> Result<u32, ConstructionError> {
    match decode_magnitude(raw) {
        Ok(RawMagnitude::Flat(v)) if (0..=i64::from(u32::MAX)).contains(&v) => Ok(v as u32),
        _ => Err(ConstructionError::BadLevel(format!(
            "unreadable level {raw:?}"
        ))),
    }
}

/// Splits a `"<name>+<value>"` substat description at its last `+`.
fn parse_substat_description(description: &str) -> Result<StatValue, ConstructionError> {
    let (name, value) = description.rsplit_once('+').ok_or_else(|| {
        ConstructionError::BadSubStats(format!("unreadable substat {description:?}"))
    })?;
    Ok(StatValue::secondary(name, value)?)
}

fn require_str<'a>(value: &'a JsonValue, field: &str) -> Result<&'a str, ConstructionError> {
    value
        .get(field)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ConstructionError::MalformedRecord(format!("missing field {field}")))
}

fn require_i64(value: &JsonValue, field: &str) -> Result<i64, ConstructionError> {
    value
        .get(field)
        .and_then(JsonValue::as_i64)
        .ok_or_else(|| ConstructionError::MalformedRecord(format!("missing field {field}")))
}

fn require_u32(value: &JsonValue, field: &str) -> Result<u32, ConstructionError> {
    value
        .get(field)
        .and_then(JsonValue::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ConstructionError::MalformedRecord(format!("missing field {field}")))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::ConstructionError;
    use crate::stat::StatKind;

    fn tables() -> ReferenceTables {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data");
        ReferenceTables::load_from_dir(&dir).expect("reference tables should load")
    }

    fn five_star_goblet() -> RawArtifact {
        RawArtifact {
            name: "Goblet of Thundering Deep".to_string(),
            slot: "Goblet of Eonothem".to_string(),
            level: "+20".to_string(),
            star: 5,
            main_name: "HP".to_string(),
            main_value: "46.6%".to_string(),
            substats: vec![
                "CRIT Rate+7.0%".to_string(),
                "CRIT DMG+21.8%".to_string(),
                "ATK+37".to_string(),
                "HP+508".to_string(),
            ],
            lock: false,
        }
    }

    #[test]
    fn constructs_and_snaps_the_main_stat() {
        let tables = tables();
        let artifact =
            Artifact::from_raw(&five_star_goblet(), None, &tables).expect("should construct");

        assert_eq!(artifact.slot(), Slot::Goblet);
        assert_eq!(artifact.main().kind(), StatKind::HpPercent);
        assert_eq!(artifact.main().formatted(), "46.6%");
        assert_eq!(artifact.substats().len(), 4);
        assert!(artifact.level() == 20 && artifact.rarity() == 5);
    }

    #[test]
    fn snap_corrects_ocr_rounding_in_the_main_value() {
        let tables = tables();
        let mut raw = five_star_goblet();
        raw.main_value = "46.5%".to_string();
        let artifact = Artifact::from_raw(&raw, None, &tables).expect("should construct");
        assert_eq!(artifact.main().formatted(), "46.6%");
    }

    #[test]
    fn rejects_level_beyond_rarity_maximum() {
        let tables = tables();
        let mut raw = five_star_goblet();
        raw.star = 4;
        raw.level = "+25".to_string();
        // Keep the rest irrelevant; the level bound fails first.
        let err = Artifact::from_raw(&raw, None, &tables).expect_err("level 25 on a 4-star");
        assert!(matches!(err, ConstructionError::BadLevel(_)));
    }

    #[test]
    fn rejects_implausible_substat() {
        let tables = tables();
        let mut raw = five_star_goblet();
        raw.substats[2] = "ATK+38".to_string();
        let err = Artifact::from_raw(&raw, None, &tables).expect_err("misread ATK substat");
        assert!(matches!(err, ConstructionError::BadSubStats(_)));
    }

    #[test]
    fn rejects_unknown_piece_name() {
        let tables = tables();
        let mut raw = five_star_goblet();
        raw.name = "Chalice of Nowhere".to_string();
        let err = Artifact::from_raw(&raw, None, &tables).expect_err("unknown piece");
        assert!(matches!(err, ConstructionError::UnknownPieceName(_)));
    }

    #[test]
    fn rejects_primary_only_kind_in_substats() {
        let tables = tables();
        let mut raw = five_star_goblet();
        raw.substats[3] = "Pyro DMG Bonus+5.8%".to_string();
        let err = Artifact::from_raw(&raw, None, &tables).expect_err("pyro bonus substat");
        assert!(matches!(err, ConstructionError::BadSubStats(_)));
    }

    #[test]
    fn identity_ignores_id_lock_and_image() {
        let tables = tables();
        let a = Artifact::from_raw(&five_star_goblet(), None, &tables).expect("first");
        let mut raw = five_star_goblet();
        raw.lock = true;
        let b = Artifact::from_raw(&raw, Some(vec![1, 2, 3]), &tables).expect("second");

        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn canonical_round_trip_is_lossless() {
        let tables = tables();
        let original = Artifact::from_raw(&five_star_goblet(), None, &tables).expect("construct");
        let reloaded =
            Artifact::from_json(&original.to_json(), &tables).expect("round trip should parse");

        assert_eq!(original, reloaded);
        assert_eq!(original.id(), reloaded.id());
        assert_eq!(original.set_id(), reloaded.set_id());
        assert_eq!(original.slot(), reloaded.slot());
        assert_eq!(original.to_json(), reloaded.to_json());
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let tables = tables();
        let a = Artifact::from_raw(&five_star_goblet(), None, &tables).expect("first");
        let b = Artifact::from_raw(&five_star_goblet(), None, &tables).expect("second");
        assert!(b.id() > a.id());
    }
}
