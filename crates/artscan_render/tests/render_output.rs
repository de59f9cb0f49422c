use std::path::PathBuf;

use artscan_core::{Artifact, RawArtifact, ReferenceTables};
use artscan_render::{
    ExportFormat, render_canonical, render_genshin_art, render_good, render_mingyu_lab,
};
use serde_json::Value as JsonValue;

fn tables() -> ReferenceTables {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data");
    ReferenceTables::load_from_dir(&dir).expect("reference tables should load")
}

fn goblet(tables: &ReferenceTables) -> Artifact {
    let raw = RawArtifact {
        name: "Goblet of Thundering Deep".to_string(),
        slot: "Goblet of Eonothem".to_string(),
        level: "+20".to_string(),
        star: 5,
        main_name: "Hydro DMG Bonus".to_string(),
        main_value: "46.6%".to_string(),
        substats: vec![
            "HP+508".to_string(),
            "CRIT DMG+21.8%".to_string(),
            "ATK+37".to_string(),
            "CRIT Rate+7.0%".to_string(),
        ],
        lock: true,
    };
    Artifact::from_raw(&raw, None, tables).expect("test goblet should construct")
}

fn flower(tables: &ReferenceTables) -> Artifact {
    let raw = RawArtifact {
        name: "Royal Flora".to_string(),
        slot: "Flower of Life".to_string(),
        level: "+20".to_string(),
        star: 5,
        main_name: "HP".to_string(),
        main_value: "4,780".to_string(),
        substats: vec![
            "CRIT Rate+7.0%".to_string(),
            "CRIT DMG+21.8%".to_string(),
            "ATK+37".to_string(),
            "Elemental Mastery+42".to_string(),
        ],
        lock: false,
    };
    Artifact::from_raw(&raw, None, tables).expect("test flower should construct")
}

#[test]
fn good_layout_and_percent_scaling() {
    let tables = tables();
    let records = [flower(&tables), goblet(&tables)];
    let doc = render_good(&records);

    assert_eq!(doc["format"], "GOOD");
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["source"], "artscan");

    let artifacts = doc["artifacts"].as_array().expect("artifacts array");
    assert_eq!(artifacts.len(), 2);

    let goblet_entry = &artifacts[1];
    assert_eq!(goblet_entry["setKey"], "HeartOfDepth");
    assert_eq!(goblet_entry["slotKey"], "goblet");
    assert_eq!(goblet_entry["rarity"], 5);
    assert_eq!(goblet_entry["mainStatKey"], "hydro_dmg_");
    assert_eq!(goblet_entry["location"], "");
    assert_eq!(goblet_entry["lock"], false);

    let subs = goblet_entry["substats"].as_array().expect("substats");
    assert_eq!(subs[0]["key"], "hp");
    assert_eq!(subs[0]["value"], 508);
    // Percent substats are emitted in display units.
    assert_eq!(subs[1]["key"], "critDMG_");
    assert_eq!(subs[1]["value"], 21.8);
    assert_eq!(subs[3]["key"], "critRate_");
    assert_eq!(subs[3]["value"], 7.0);
}

#[test]
fn good_flags_low_rarity_as_zero() {
    let tables = tables();
    let raw = RawArtifact {
        name: "Royal Plume".to_string(),
        slot: "Plume of Death".to_string(),
        level: "+0".to_string(),
        star: 2,
        main_name: "ATK".to_string(),
        main_value: "17".to_string(),
        substats: vec!["HP+50".to_string()],
        lock: false,
    };
    let record = Artifact::from_raw(&raw, None, &tables).expect("2-star plume");
    let doc = render_good(&[record]);
    assert_eq!(doc["artifacts"][0]["rarity"], 0);
}

#[test]
fn genshin_art_buckets_by_slot() {
    let tables = tables();
    let records = [flower(&tables), goblet(&tables)];
    let doc = render_genshin_art(&records);

    assert_eq!(doc["version"], "1");
    assert_eq!(doc["flower"].as_array().map(Vec::len), Some(1));
    assert_eq!(doc["cup"].as_array().map(Vec::len), Some(1));
    assert_eq!(doc["feather"].as_array().map(Vec::len), Some(0));

    let cup = &doc["cup"][0];
    assert_eq!(cup["setName"], "heartOfDepth");
    assert_eq!(cup["position"], "cup");
    assert_eq!(cup["detailName"], "Goblet of Thundering Deep");
    assert_eq!(cup["mainTag"]["name"], "waterBonus");
    assert_eq!(cup["mainTag"]["value"], 0.466);
    assert_eq!(cup["omit"], false);
    assert_eq!(cup["star"], 5);
    // The ordinal in the full export, not the slot bucket.
    assert_eq!(cup["id"], 1);

    let tags = cup["normalTags"].as_array().expect("normalTags");
    assert_eq!(tags[0]["name"], "lifeStatic");
    assert_eq!(tags[1]["name"], "criticalDamage");
}

#[test]
fn mingyu_lab_strips_signs_and_separators() {
    let tables = tables();
    let doc = render_mingyu_lab(&[flower(&tables)]);
    let entry = &doc[0];

    assert_eq!(entry["asKey"], "noblesse_oblige");
    assert_eq!(entry["slot"], "flower");
    assert_eq!(entry["mainStat"], "hp");
    assert_eq!(entry["mark"], "none");
    assert_eq!(entry["subStat1Type"], "critRate");
    assert_eq!(entry["subStat1Value"], "7.0");
    assert_eq!(entry["subStat2Value"], "21.8");
    assert_eq!(entry["subStat3Value"], "37");
    assert_eq!(entry["subStat4Type"], "elementalMastery");
    assert_eq!(entry["subStat4Value"], "42");
    assert!(entry.get("subStat5Type").is_none());
}

#[test]
fn canonical_render_matches_record_json() {
    let tables = tables();
    let record = goblet(&tables);
    let doc = render_canonical(std::slice::from_ref(&record));
    assert_eq!(doc, JsonValue::Array(vec![record.to_json()]));
}

#[test]
fn write_export_produces_parseable_files() {
    let tables = tables();
    let records = [flower(&tables)];
    let dir = std::env::temp_dir().join(format!(
        "artscan_render_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");

    for (format, file) in [
        (ExportFormat::Canonical, "canonical.json"),
        (ExportFormat::Good, "good.json"),
        (ExportFormat::GenshinArt, "genshin_art.json"),
        (ExportFormat::MingyuLab, "mingyu_lab.json"),
    ] {
        let path = dir.join(file);
        artscan_render::write_export(&records, format, &path).expect("export should write");
        let bytes = std::fs::read(&path).expect("export file should exist");
        let _: JsonValue = serde_json::from_slice(&bytes).expect("export must be valid JSON");
    }

    let _ = std::fs::remove_dir_all(&dir);
}
