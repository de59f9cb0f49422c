use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ParseError;
use crate::tables::ReferenceTables;

/// Added before display rounding so binary representations that sit a
/// hair under a rendered value round the same way the game client does.
const FORMAT_EPSILON: f64 = 1e-5;

/// Every measurable artifact stat. Percent magnitudes are carried as
/// fractions of 1.0 (`46.6%` is stored as `0.466`), matching the
/// game-data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatKind {
    CritRate,
    CritDmg,
    Atk,
    AtkPercent,
    ElementalMastery,
    EnergyRecharge,
    Hp,
    HpPercent,
    Def,
    DefPercent,
    PhysicalDmgBonus,
    HealingBonus,
    PyroDmgBonus,
    HydroDmgBonus,
    CryoDmgBonus,
    ElectroDmgBonus,
    AnemoDmgBonus,
    GeoDmgBonus,
    DendroDmgBonus,
}

impl StatKind {
    pub const ALL: [StatKind; 19] = [
        StatKind::CritRate,
        StatKind::CritDmg,
        StatKind::Atk,
        StatKind::AtkPercent,
        StatKind::ElementalMastery,
        StatKind::EnergyRecharge,
        StatKind::Hp,
        StatKind::HpPercent,
        StatKind::Def,
        StatKind::DefPercent,
        StatKind::PhysicalDmgBonus,
        StatKind::HealingBonus,
        StatKind::PyroDmgBonus,
        StatKind::HydroDmgBonus,
        StatKind::CryoDmgBonus,
        StatKind::ElectroDmgBonus,
        StatKind::AnemoDmgBonus,
        StatKind::GeoDmgBonus,
        StatKind::DendroDmgBonus,
    ];

    /// On-screen stat label. Flat and percent siblings share a label;
    /// the rendered magnitude is what tells them apart.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::CritRate => "CRIT Rate",
            Self::CritDmg => "CRIT DMG",
            Self::Atk | Self::AtkPercent => "ATK",
            Self::ElementalMastery => "Elemental Mastery",
            Self::EnergyRecharge => "Energy Recharge",
            Self::Hp | Self::HpPercent => "HP",
            Self::Def | Self::DefPercent => "DEF",
            Self::PhysicalDmgBonus => "Physical DMG Bonus",
            Self::HealingBonus => "Healing Bonus",
            Self::PyroDmgBonus => "Pyro DMG Bonus",
            Self::HydroDmgBonus => "Hydro DMG Bonus",
            Self::CryoDmgBonus => "Cryo DMG Bonus",
            Self::ElectroDmgBonus => "Electro DMG Bonus",
            Self::AnemoDmgBonus => "Anemo DMG Bonus",
            Self::GeoDmgBonus => "Geo DMG Bonus",
            Self::DendroDmgBonus => "Dendro DMG Bonus",
        }
    }

    /// Prop id used by the game-data reference tables.
    pub fn prop_id(self) -> &'static str {
        match self {
            Self::CritRate => "FIGHT_PROP_CRITICAL",
            Self::CritDmg => "FIGHT_PROP_CRITICAL_HURT",
            Self::Atk => "FIGHT_PROP_ATTACK",
            Self::AtkPercent => "FIGHT_PROP_ATTACK_PERCENT",
            Self::ElementalMastery => "FIGHT_PROP_ELEMENT_MASTERY",
            Self::EnergyRecharge => "FIGHT_PROP_CHARGE_EFFICIENCY",
            Self::Hp => "FIGHT_PROP_HP",
            Self::HpPercent => "FIGHT_PROP_HP_PERCENT",
            Self::Def => "FIGHT_PROP_DEFENSE",
            Self::DefPercent => "FIGHT_PROP_DEFENSE_PERCENT",
            Self::PhysicalDmgBonus => "FIGHT_PROP_PHYSICAL_ADD_HURT",
            Self::HealingBonus => "FIGHT_PROP_HEAL_ADD",
            Self::PyroDmgBonus => "FIGHT_PROP_FIRE_ADD_HURT",
            Self::HydroDmgBonus => "FIGHT_PROP_WATER_ADD_HURT",
            Self::CryoDmgBonus => "FIGHT_PROP_ICE_ADD_HURT",
            Self::ElectroDmgBonus => "FIGHT_PROP_ELEC_ADD_HURT",
            Self::AnemoDmgBonus => "FIGHT_PROP_WIND_ADD_HURT",
            Self::GeoDmgBonus => "FIGHT_PROP_ROCK_ADD_HURT",
            Self::DendroDmgBonus => "FIGHT_PROP_GRASS_ADD_HURT",
        }
    }

    pub fn from_prop_id(prop: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.prop_id() == prop)
    }

    pub fn is_percent(self) -> bool {
        !matches!(
            self,
            Self::Atk | Self::Hp | Self::Def | Self::ElementalMastery
        )
    }

    /// Can this kind appear as an artifact's primary stat? Flat DEF
    /// never does; flat HP/ATK only on the fixed flower/plume slots.
    pub fn valid_primary(self) -> bool {
        !matches!(self, Self::Def)
    }

    /// Can this kind roll as a secondary stat?
    pub fn valid_secondary(self) -> bool {
        matches!(
            self,
            Self::CritRate
                | Self::CritDmg
                | Self::Atk
                | Self::AtkPercent
                | Self::ElementalMastery
                | Self::EnergyRecharge
                | Self::Hp
                | Self::HpPercent
                | Self::Def
                | Self::DefPercent
        )
    }

    /// Flat sibling of a percent kind (and vice versa), where one exists.
    fn percent_sibling(self) -> Option<Self> {
        match self {
            Self::Hp => Some(Self::HpPercent),
            Self::Atk => Some(Self::AtkPercent),
            Self::Def => Some(Self::DefPercent),
            _ => None,
        }
    }

    /// Resolves a recognized stat label plus a decoded magnitude to a
    /// concrete kind. The label alone is ambiguous for HP/ATK/DEF; the
    /// magnitude's shape (integer vs percentage) settles it, exactly as
    /// the on-screen text does.
    pub fn resolve(name: &str, magnitude: RawMagnitude) -> Result<Self, ParseError> {
        let base = lookup_alias(name)
            .ok_or_else(|| ParseError::UnknownStatName(name.to_string()))?;

        match magnitude {
            RawMagnitude::Percent(_) => {
                if base.is_percent() {
                    Ok(base)
                } else if let Some(sibling) = base.percent_sibling() {
                    Ok(sibling)
                } else {
                    Err(ParseError::MagnitudeKindMismatch {
                        name: name.to_string(),
                        value: "percentage".to_string(),
                    })
                }
            }
            RawMagnitude::Flat(_) => {
                if base.is_percent() {
                    Err(ParseError::MagnitudeKindMismatch {
                        name: name.to_string(),
                        value: "integer".to_string(),
                    })
                } else {
                    Ok(base)
                }
            }
        }
    }
}

/// OCR aliases for stat labels. Base (flat-or-ambiguous) kinds only;
/// percent promotion happens in [`StatKind::resolve`].
const STAT_ALIASES: &[(&str, StatKind)] = &[
    ("CRIT Rate", StatKind::CritRate),
    ("Crit Rate", StatKind::CritRate),
    ("CRIT DMG", StatKind::CritDmg),
    ("Crit DMG", StatKind::CritDmg),
    ("ATK", StatKind::Atk),
    ("Atk", StatKind::Atk),
    ("Elemental Mastery", StatKind::ElementalMastery),
    ("Energy Recharge", StatKind::EnergyRecharge),
    ("HP", StatKind::Hp),
    ("DEF", StatKind::Def),
    ("Def", StatKind::Def),
    ("Physical DMG Bonus", StatKind::PhysicalDmgBonus),
    ("Healing Bonus", StatKind::HealingBonus),
    ("Pyro DMG Bonus", StatKind::PyroDmgBonus),
    ("Hydro DMG Bonus", StatKind::HydroDmgBonus),
    ("Cryo DMG Bonus", StatKind::CryoDmgBonus),
    ("Electro DMG Bonus", StatKind::ElectroDmgBonus),
    ("Anemo DMG Bonus", StatKind::AnemoDmgBonus),
    ("Geo DMG Bonus", StatKind::GeoDmgBonus),
    ("Dendro DMG Bonus", StatKind::DendroDmgBonus),
];

fn lookup_alias(name: &str) -> Option<StatKind> {
    let trimmed = name.trim();
    STAT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|&(_, kind)| kind)
}

/// A decoded raw magnitude, before it is bound to a kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawMagnitude {
    Flat(i64),
    /// Fraction of 1.0.
    Percent(f64),
}

impl RawMagnitude {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Flat(v) => v as f64,
            Self::Percent(v) => v,
        }
    }
}

/// Decodes an on-screen magnitude string: `"4,780"` and `"+20"` are
/// flat integers, `"46.6%"` is a percentage. A bare decimal such as
/// `"46.6"` is treated as a percentage whose sign the OCR dropped.
pub fn decode_magnitude(raw: &str) -> Result<RawMagnitude, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::BadMagnitude(raw.to_string()));
    }

    if let Some(body) = trimmed.strip_suffix('%') {
        let value: f64 = body
            .trim()
            .replace(',', "")
            .parse()
            .map_err(|_| ParseError::BadMagnitude(raw.to_string()))?;
        return Ok(RawMagnitude::Percent(value / 100.0));
    }

    let cleaned = trimmed.strip_prefix('+').unwrap_or(trimmed).replace(',', "");
    if cleaned.contains('.') {
        let value: f64 = cleaned
            .parse()
            .map_err(|_| ParseError::BadMagnitude(raw.to_string()))?;
        Ok(RawMagnitude::Percent(value / 100.0))
    } else {
        let value: i64 = cleaned
            .parse()
            .map_err(|_| ParseError::BadMagnitude(raw.to_string()))?;
        Ok(RawMagnitude::Flat(value))
    }
}

/// Renders a magnitude exactly the way the game client does: percent
/// kinds with one decimal and a `%` sign, flat kinds as integers with
/// thousands separators.
pub fn format_magnitude(kind: StatKind, magnitude: f64) -> String {
    if kind.is_percent() {
        format!("{:.1}%", (magnitude + FORMAT_EPSILON) * 100.0)
    } else {
        group_thousands((magnitude + FORMAT_EPSILON).round() as i64)
    }
}

fn group_thousands(n: i64) -> String {
    if n < 0 {
        return format!("-{}", group_thousands(-n));
    }
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

fn decode_formatted(formatted: &str) -> f64 {
    formatted
        .trim_end_matches('%')
        .replace(',', "")
        .parse()
        .unwrap_or(0.0)
}

/// Compares two raw magnitudes of the same kind in display terms: equal
/// when they render identically, otherwise ordered by the rendered
/// values. Only the on-screen text is ever observed, so this is the
/// only ordering that means anything.
pub fn cmp_magnitude(kind: StatKind, a: f64, b: f64) -> Ordering {
    let fa = format_magnitude(kind, a);
    let fb = format_magnitude(kind, b);
    if fa == fb {
        return Ordering::Equal;
    }
    decode_formatted(&fa)
        .partial_cmp(&decode_formatted(&fb))
        .unwrap_or(Ordering::Equal)
}

/// One typed stat reading. Equality, ordering and hashing all go
/// through the formatted string, never the raw float.
#[derive(Debug, Clone)]
pub struct StatValue {
    kind: StatKind,
    magnitude: f64,
}

impl StatValue {
    pub fn new(kind: StatKind, magnitude: f64) -> Self {
        Self { kind, magnitude }
    }

    /// Parses a secondary-stat reading from its recognized label and
    /// magnitude text.
    pub fn secondary(name: &str, raw_value: &str) -> Result<Self, ParseError> {
        let magnitude = decode_magnitude(raw_value)?;
        let kind = StatKind::resolve(name, magnitude)?;
        Ok(Self::new(kind, magnitude.as_f64()))
    }

    /// Parses a primary-stat reading and snaps the magnitude to the
    /// tabulated `(rarity, kind, level)` value when the tables carry
    /// one. The game ties primary magnitudes to level deterministically,
    /// so the table value corrects OCR rounding; kinds the table does
    /// not cover pass through unchanged.
    pub fn main(
        name: &str,
        raw_value: &str,
        rarity: u8,
        level: u32,
        tables: &ReferenceTables,
    ) -> Result<Self, ParseError> {
        let magnitude = decode_magnitude(raw_value)?;
        let kind = StatKind::resolve(name, magnitude)?;
        let snapped = tables
            .main_stat(rarity, kind, level)
            .unwrap_or_else(|| magnitude.as_f64());
        Ok(Self::new(kind, snapped))
    }

    pub fn kind(&self) -> StatKind {
        self.kind
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn formatted(&self) -> String {
        format_magnitude(self.kind, self.magnitude)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.kind.display_name(), self.formatted())
    }
}

impl PartialEq for StatValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.formatted() == other.formatted()
    }
}

impl Eq for StatValue {}

impl Hash for StatValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.formatted().hash(state);
    }
}
