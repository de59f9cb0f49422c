use crate::slot::Slot;

/// One artifact-set family: its key in each outbound schema plus the
/// five piece names in slot order. Piece names double as the reverse
/// index from a recognized name to (set, slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetInfo {
    pub good_key: &'static str,
    pub genshin_art_key: &'static str,
    pub mingyu_lab_key: &'static str,
    pub pieces: [&'static str; 5],
}

/// Versioned against the same game-data release as the reference
/// tables under `data/`.
pub const SETS: &[SetInfo] = &[
    SetInfo {
        good_key: "GladiatorsFinale",
        genshin_art_key: "gladiatorFinale",
        mingyu_lab_key: "gladiators_finale",
        pieces: [
            "Gladiator's Nostalgia",
            "Gladiator's Destiny",
            "Gladiator's Longing",
            "Gladiator's Intoxication",
            "Gladiator's Triumphus",
        ],
    },
    SetInfo {
        good_key: "WanderersTroupe",
        genshin_art_key: "wandererTroupe",
        mingyu_lab_key: "wanderers_troupe",
        pieces: [
            "Troupe's Dawnlight",
            "Bard's Arrow Feather",
            "Concert's Final Hour",
            "Wanderer's String-Kettle",
            "Conductor's Top Hat",
        ],
    },
    SetInfo {
        good_key: "NoblesseOblige",
        genshin_art_key: "noblesseOblige",
        mingyu_lab_key: "noblesse_oblige",
        pieces: [
            "Royal Flora",
            "Royal Plume",
            "Royal Pocket Watch",
            "Royal Silver Urn",
            "Royal Masque",
        ],
    },
    SetInfo {
        good_key: "BloodstainedChivalry",
        genshin_art_key: "bloodstainedChivalry",
        mingyu_lab_key: "bloodstained_chivalry",
        pieces: [
            "Bloodstained Flower of Iron",
            "Bloodstained Black Plume",
            "Bloodstained Final Hour",
            "Bloodstained Chevalier's Goblet",
            "Bloodstained Iron Mask",
        ],
    },
    SetInfo {
        good_key: "ViridescentVenerer",
        genshin_art_key: "viridescentVenerer",
        mingyu_lab_key: "viridescent_venerer",
        pieces: [
            "In Remembrance of Viridescent Fields",
            "Viridescent Arrow Feather",
            "Viridescent Venerer's Determination",
            "Viridescent Venerer's Vessel",
            "Viridescent Venerer's Diadem",
        ],
    },
    SetInfo {
        good_key: "ArchaicPetra",
        genshin_art_key: "archaicPetra",
        mingyu_lab_key: "archaic_petra",
        pieces: [
            "Flower of Creviced Cliff",
            "Feather of Jagged Peaks",
            "Sundial of Enduring Jade",
            "Goblet of Chiseled Crag",
            "Mask of Solitude Basalt",
        ],
    },
    SetInfo {
        good_key: "CrimsonWitchOfFlames",
        genshin_art_key: "crimsonWitchOfFlames",
        mingyu_lab_key: "crimson_witch_of_flames",
        pieces: [
            "Witch's Flower of Blaze",
            "Witch's Ever-Burning Plume",
            "Witch's End Time",
            "Witch's Heart Flames",
            "Witch's Scorching Hat",
        ],
    },
    SetInfo {
        good_key: "HeartOfDepth",
        genshin_art_key: "heartOfDepth",
        mingyu_lab_key: "heart_of_depth",
        pieces: [
            "Gilded Corsage",
            "Gust of Nostalgia",
            "Copper Compass",
            "Goblet of Thundering Deep",
            "Wine-Stained Tricorne",
        ],
    },
    SetInfo {
        good_key: "EmblemOfSeveredFate",
        genshin_art_key: "emblemOfSeveredFate",
        mingyu_lab_key: "emblem_of_severed_fate",
        pieces: [
            "Magnificent Tsuba",
            "Sundered Feather",
            "Storm Cage",
            "Scarlet Vessel",
            "Ornate Kabuto",
        ],
    },
    SetInfo {
        good_key: "ShimenawasReminiscence",
        genshin_art_key: "shimenawaReminiscence",
        mingyu_lab_key: "shimenawas_reminiscence",
        pieces: [
            "Entangling Bloom",
            "Shaft of Remembrance",
            "Morning Dew's Moment",
            "Hopeful Heart",
            "Capricious Visage",
        ],
    },
    SetInfo {
        good_key: "HuskOfOpulentDreams",
        genshin_art_key: "huskOfOpulentDreams",
        mingyu_lab_key: "husk_of_opulent_dreams",
        pieces: [
            "Bloom Times",
            "Plume of Luxury",
            "Song of Life",
            "Calabash of Awakening",
            "Skeletal Hat",
        ],
    },
    SetInfo {
        good_key: "OceanHuedClam",
        genshin_art_key: "oceanHuedClam",
        mingyu_lab_key: "ocean_hued_clam",
        pieces: [
            "Sea-Dyed Blossom",
            "Deep Palace's Plume",
            "Cowry of Parting",
            "Pearl Cage",
            "Crown of Watatsumi",
        ],
    },
];

pub fn set(id: usize) -> Option<&'static SetInfo> {
    SETS.get(id)
}

/// Reverse lookup: recognized piece name to (set id, slot).
pub fn find_piece(name: &str) -> Option<(usize, Slot)> {
    let trimmed = name.trim();
    for (set_id, info) in SETS.iter().enumerate() {
        for slot in Slot::ALL {
            if info.pieces[slot.index()] == trimmed {
                return Some((set_id, slot));
            }
        }
    }
    None
}
