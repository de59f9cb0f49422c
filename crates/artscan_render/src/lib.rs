//! Wire-format serializers for the accepted record set.
//!
//! Each renderer reads the full ordered collection and produces one
//! self-contained JSON document; none of them shares state with
//! ingestion. Field layouts are fixed by the external consumers and
//! must not drift.

use std::fs;
use std::path::Path;

use artscan_core::{Artifact, CoreError, CoreErrorCode, Slot, StatKind, StatValue, sets};
use serde_json::{Value as JsonValue, json};

pub const GOOD_FORMAT: &str = "GOOD";
pub const GOOD_VERSION: u32 = 1;
pub const GOOD_SOURCE: &str = "artscan";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// The store's own interchange schema; also the round-trip load
    /// format.
    Canonical,
    Good,
    GenshinArt,
    MingyuLab,
}

impl ExportFormat {
    pub fn render(self, records: &[Artifact]) -> JsonValue {
        match self {
            Self::Canonical => render_canonical(records),
            Self::Good => render_good(records),
            Self::GenshinArt => render_genshin_art(records),
            Self::MingyuLab => render_mingyu_lab(records),
        }
    }
}

pub fn write_export(
    records: &[Artifact],
    format: ExportFormat,
    path: &Path,
) -> Result<(), CoreError> {
    let document = format.render(records);
    fs::write(path, document.to_string()).map_err(|e| {
        CoreError::new(
            CoreErrorCode::StoreIo,
            format!("failed to write {}: {e}", path.display()),
        )
    })
}

pub fn render_canonical(records: &[Artifact]) -> JsonValue {
    JsonValue::Array(records.iter().map(Artifact::to_json).collect())
}

/// GOOD interchange: one top-level object, artifacts only. Percent
/// substat values are scaled to display units (x100) in this schema.
pub fn render_good(records: &[Artifact]) -> JsonValue {
    let artifacts: Vec<JsonValue> = records
        .iter()
        .map(|art| {
            json!({
                "setKey": set_keys(art).good_key,
                "slotKey": good_slot_key(art.slot()),
                "level": art.level(),
                "rarity": if art.rarity() >= 3 { art.rarity() } else { 0 },
                "mainStatKey": good_stat_key(art.main().kind()),
                "location": "",
                "lock": false,
                "substats": art
                    .substats()
                    .iter()
                    .map(|sub| json!({
                        "key": good_stat_key(sub.kind()),
                        "value": display_number(sub),
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "format": GOOD_FORMAT,
        "version": GOOD_VERSION,
        "source": GOOD_SOURCE,
        "artifacts": artifacts,
    })
}

/// GenshinArt: records bucketed by slot, raw magnitudes (percent stats
/// as fractions of 1.0), export ordinal as the id.
pub fn render_genshin_art(records: &[Artifact]) -> JsonValue {
    let mut buckets: [Vec<JsonValue>; 5] = Default::default();
    for (ordinal, art) in records.iter().enumerate() {
        buckets[art.slot().index()].push(json!({
            "setName": set_keys(art).genshin_art_key,
            "position": genshin_art_slot_key(art.slot()),
            "detailName": art.name(),
            "mainTag": {
                "name": genshin_art_stat_key(art.main().kind()),
                "value": art.main().magnitude(),
            },
            "normalTags": art
                .substats()
                .iter()
                .map(|sub| json!({
                    "name": genshin_art_stat_key(sub.kind()),
                    "value": sub.magnitude(),
                }))
                .collect::<Vec<_>>(),
            "omit": false,
            "id": ordinal,
            "level": art.level(),
            "star": art.rarity(),
        }));
    }

    let [flower, feather, sand, cup, head] = buckets;
    json!({
        "version": "1",
        "flower": flower,
        "feather": feather,
        "sand": sand,
        "cup": cup,
        "head": head,
    })
}

/// MingyuLab: flat array, one object per record, substat values as
/// strings with percent signs and thousands separators stripped.
pub fn render_mingyu_lab(records: &[Artifact]) -> JsonValue {
    let entries: Vec<JsonValue> = records
        .iter()
        .map(|art| {
            let mut entry = json!({
                "asKey": set_keys(art).mingyu_lab_key,
                "rarity": art.rarity(),
                "slot": genshin_art_slot_key(art.slot()),
                "level": art.level(),
                "mainStat": mingyu_lab_stat_key(art.main().kind()),
                "mark": "none",
            });
            let fields = entry
                .as_object_mut()
                .expect("entry is built as an object");
            for (i, sub) in art.substats().iter().enumerate() {
                fields.insert(
                    format!("subStat{}Type", i + 1),
                    JsonValue::from(mingyu_lab_stat_key(sub.kind())),
                );
                fields.insert(
                    format!("subStat{}Value", i + 1),
                    JsonValue::from(stripped_value(sub)),
                );
            }
            entry
        })
        .collect();
    JsonValue::Array(entries)
}

fn set_keys(art: &Artifact) -> &'static sets::SetInfo {
    // Set ids only ever come from catalog lookups during construction.
    sets::set(art.set_id()).expect("validated record carries a known set id")
}

/// Display-unit number for GOOD: percent stats x100 at display
/// precision, flat stats as integers.
fn display_number(stat: &StatValue) -> JsonValue {
    let rendered = stat.formatted();
    if stat.kind().is_percent() {
        let v: f64 = rendered
            .trim_end_matches('%')
            .parse()
            .unwrap_or_default();
        JsonValue::from(v)
    } else {
        let v: i64 = rendered.replace(',', "").parse().unwrap_or_default();
        JsonValue::from(v)
    }
}

/// Rendered magnitude with `%` and `,` stripped, as MingyuLab expects.
fn stripped_value(stat: &StatValue) -> String {
    stat.formatted().replace(['%', ','], "")
}

fn good_slot_key(slot: Slot) -> &'static str {
    match slot {
        Slot::Flower => "flower",
        Slot::Plume => "plume",
        Slot::Sands => "sands",
        Slot::Goblet => "goblet",
        Slot::Circlet => "circlet",
    }
}

fn genshin_art_slot_key(slot: Slot) -> &'static str {
    match slot {
        Slot::Flower => "flower",
        Slot::Plume => "feather",
        Slot::Sands => "sand",
        Slot::Goblet => "cup",
        Slot::Circlet => "head",
    }
}

fn good_stat_key(kind: StatKind) -> &'static str {
    match kind {
        StatKind::CritRate => "critRate_",
        StatKind::CritDmg => "critDMG_",
        StatKind::Atk => "atk",
        StatKind::AtkPercent => "atk_",
        StatKind::ElementalMastery => "eleMas",
        StatKind::EnergyRecharge => "enerRech_",
        StatKind::Hp => "hp",
        StatKind::HpPercent => "hp_",
        StatKind::Def => "def",
        StatKind::DefPercent => "def_",
        StatKind::PhysicalDmgBonus => "physical_dmg_",
        StatKind::HealingBonus => "heal_",
        StatKind::PyroDmgBonus => "pyro_dmg_",
        StatKind::HydroDmgBonus => "hydro_dmg_",
        StatKind::CryoDmgBonus => "cryo_dmg_",
        StatKind::ElectroDmgBonus => "electro_dmg_",
        StatKind::AnemoDmgBonus => "anemo_dmg_",
        StatKind::GeoDmgBonus => "geo_dmg_",
        StatKind::DendroDmgBonus => "dendro_dmg_",
    }
}

fn genshin_art_stat_key(kind: StatKind) -> &'static str {
    match kind {
        StatKind::CritRate => "critical",
        StatKind::CritDmg => "criticalDamage",
        StatKind::Atk => "attackStatic",
        StatKind::AtkPercent => "attackPercentage",
        StatKind::ElementalMastery => "elementalMastery",
        StatKind::EnergyRecharge => "recharge",
        StatKind::Hp => "lifeStatic",
        StatKind::HpPercent => "lifePercentage",
        StatKind::Def => "defendStatic",
        StatKind::DefPercent => "defendPercentage",
        StatKind::PhysicalDmgBonus => "physicalBonus",
        StatKind::HealingBonus => "cureEffect",
        StatKind::PyroDmgBonus => "fireBonus",
        StatKind::HydroDmgBonus => "waterBonus",
        StatKind::CryoDmgBonus => "iceBonus",
        StatKind::ElectroDmgBonus => "thunderBonus",
        StatKind::AnemoDmgBonus => "windBonus",
        StatKind::GeoDmgBonus => "rockBonus",
        StatKind::DendroDmgBonus => "grassBonus",
    }
}

fn mingyu_lab_stat_key(kind: StatKind) -> &'static str {
    match kind {
        StatKind::CritRate => "critRate",
        StatKind::CritDmg => "critDamage",
        StatKind::Atk => "atk",
        StatKind::AtkPercent => "atkPercent",
        StatKind::ElementalMastery => "elementalMastery",
        StatKind::EnergyRecharge => "energyRecharge",
        StatKind::Hp => "hp",
        StatKind::HpPercent => "hpPercent",
        StatKind::Def => "def",
        StatKind::DefPercent => "defPercent",
        StatKind::PhysicalDmgBonus => "physicalDamage",
        StatKind::HealingBonus => "healingBonus",
        StatKind::PyroDmgBonus => "pyroDamage",
        StatKind::HydroDmgBonus => "hydroDamage",
        StatKind::CryoDmgBonus => "cryoDamage",
        StatKind::ElectroDmgBonus => "electroDamage",
        StatKind::AnemoDmgBonus => "anemoDamage",
        StatKind::GeoDmgBonus => "geoDamage",
        StatKind::DendroDmgBonus => "dendroDamage",
    }
}
