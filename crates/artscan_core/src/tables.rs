use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CoreError, CoreErrorCode};
use crate::stat::StatKind;

pub const AFFIX_TABLE_FILE: &str = "reliquary_affix.json";
pub const LEVEL_TABLE_FILE: &str = "reliquary_level.json";

pub const MIN_RARITY: u8 = 1;
pub const MAX_RARITY: u8 = 5;

/// Max upgrade level per rarity 1..=5.
const MAX_LEVELS: [u32; 5] = [4, 4, 12, 16, 20];

/// Legal secondary-roll counts granted at creation, per rarity 1..=5.
/// A 5-star piece starts with 3 or 4 rolled secondaries, and so on down.
const BASE_ROLL_COUNTS: [&[usize]; 5] = [&[0], &[0, 1], &[1, 2], &[2, 3], &[3, 4]];

pub fn max_level(rarity: u8) -> Option<u32> {
    if (MIN_RARITY..=MAX_RARITY).contains(&rarity) {
        Some(MAX_LEVELS[rarity as usize - 1])
    } else {
        None
    }
}

pub fn base_roll_counts(rarity: u8) -> &'static [usize] {
    if (MIN_RARITY..=MAX_RARITY).contains(&rarity) {
        BASE_ROLL_COUNTS[rarity as usize - 1]
    } else {
        &[]
    }
}

#[derive(Debug, Deserialize)]
struct AffixRow {
    #[serde(rename = "DepotId")]
    depot_id: u32,
    #[serde(rename = "PropType")]
    prop_type: String,
    #[serde(rename = "PropValue")]
    prop_value: f64,
}

#[derive(Debug, Deserialize)]
struct AddProp {
    #[serde(rename = "PropType")]
    prop_type: String,
    #[serde(rename = "Value")]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct LevelRow {
    #[serde(rename = "Rank")]
    rank: u8,
    // Stored 1-based in the game data: display level + 1.
    #[serde(rename = "Level")]
    level: u32,
    #[serde(rename = "AddProps")]
    add_props: Vec<AddProp>,
}

/// Static game data loaded once at startup and shared read-only from
/// then on. No tables means no validation, so any load failure is
/// fatal to the whole core.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTables {
    data_dir: PathBuf,
    /// (rarity, kind) -> sorted single-roll magnitudes.
    roll_values: BTreeMap<(u8, StatKind), Vec<f64>>,
    /// (rarity, kind, display level) -> exact primary-stat magnitude.
    main_stats: BTreeMap<(u8, StatKind, u32), f64>,
}

impl ReferenceTables {
    pub fn load_from_dir(data_dir: &Path) -> Result<Self, CoreError> {
        let affix_rows: Vec<AffixRow> = read_table(&data_dir.join(AFFIX_TABLE_FILE))?;
        let level_rows: Vec<LevelRow> = read_table(&data_dir.join(LEVEL_TABLE_FILE))?;

        let mut roll_values: BTreeMap<(u8, StatKind), Vec<f64>> = BTreeMap::new();
        for row in affix_rows {
            // Depots are keyed rarity*100+1; anything else is not an
            // artifact substat depot.
            if row.depot_id % 100 != 1 {
                continue;
            }
            let rarity = (row.depot_id / 100) as u8;
            if !(MIN_RARITY..=MAX_RARITY).contains(&rarity) {
                continue;
            }
            // Unknown prop ids are skipped for forward compatibility
            // with newer game-data releases.
            let Some(kind) = StatKind::from_prop_id(&row.prop_type) else {
                continue;
            };
            roll_values
                .entry((rarity, kind))
                .or_default()
                .push(row.prop_value);
        }
        for values in roll_values.values_mut() {
            values.sort_by(|a, b| a.partial_cmp(b).expect("roll magnitudes are finite"));
        }

        let mut main_stats = BTreeMap::new();
        for row in level_rows {
            if !(MIN_RARITY..=MAX_RARITY).contains(&row.rank) || row.level == 0 {
                continue;
            }
            let display_level = row.level - 1;
            for prop in row.add_props {
                let Some(kind) = StatKind::from_prop_id(&prop.prop_type) else {
                    continue;
                };
                main_stats.insert((row.rank, kind, display_level), prop.value);
            }
        }

        if roll_values.is_empty() {
            return Err(CoreError::new(
                CoreErrorCode::ReferenceData,
                format!("no substat roll values in {}", data_dir.display()),
            ));
        }
        if main_stats.is_empty() {
            return Err(CoreError::new(
                CoreErrorCode::ReferenceData,
                format!("no primary-stat magnitudes in {}", data_dir.display()),
            ));
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            roll_values,
            main_stats,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Sorted single-roll magnitudes for a secondary kind at a rarity.
    pub fn roll_values(&self, rarity: u8, kind: StatKind) -> Option<&[f64]> {
        self.roll_values
            .get(&(rarity, kind))
            .map(Vec::as_slice)
    }

    /// Exact tabulated primary-stat magnitude, if the tables cover this
    /// kind at all.
    pub fn main_stat(&self, rarity: u8, kind: StatKind, level: u32) -> Option<f64> {
        self.main_stats.get(&(rarity, kind, level)).copied()
    }
}

fn read_table<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, CoreError> {
    let bytes = fs::read(path).map_err(|e| {
        CoreError::new(
            CoreErrorCode::ReferenceData,
            format!("failed to read {}: {e}", path.display()),
        )
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        CoreError::new(
            CoreErrorCode::ReferenceData,
            format!("failed to parse {}: {e}", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::stat::format_magnitude;

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    #[test]
    fn loads_shipped_tables() {
        let tables = ReferenceTables::load_from_dir(&data_dir()).expect("tables should load");

        let rolls = tables
            .roll_values(5, StatKind::CritRate)
            .expect("5-star crit rate rolls");
        assert_eq!(rolls.len(), 4);
        assert!(rolls.windows(2).all(|w| w[0] <= w[1]));

        let hp_pct = tables
            .main_stat(5, StatKind::HpPercent, 20)
            .expect("5-star HP% at +20");
        assert_eq!(format_magnitude(StatKind::HpPercent, hp_pct), "46.6%");

        let hp_flat = tables
            .main_stat(5, StatKind::Hp, 20)
            .expect("5-star HP at +20");
        assert_eq!(format_magnitude(StatKind::Hp, hp_flat), "4,780");
    }

    #[test]
    fn flat_def_never_appears_as_primary() {
        let tables = ReferenceTables::load_from_dir(&data_dir()).expect("tables should load");
        assert_eq!(tables.main_stat(5, StatKind::Def, 20), None);
    }

    #[test]
    fn missing_dir_is_fatal() {
        let err = ReferenceTables::load_from_dir(&PathBuf::from("/nonexistent/artscan-data"))
            .expect_err("load must fail without data");
        assert_eq!(err.code, CoreErrorCode::ReferenceData);
    }

    #[test]
    fn rarity_limits() {
        assert_eq!(max_level(5), Some(20));
        assert_eq!(max_level(4), Some(16));
        assert_eq!(max_level(1), Some(4));
        assert_eq!(max_level(6), None);
        assert_eq!(base_roll_counts(5), &[3, 4]);
        assert_eq!(base_roll_counts(1), &[0]);
        assert!(base_roll_counts(0).is_empty());
    }
}
