use std::fmt;

/// The five equipment slots, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Flower,
    Plume,
    Sands,
    Goblet,
    Circlet,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Flower,
        Slot::Plume,
        Slot::Sands,
        Slot::Goblet,
        Slot::Circlet,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Flower => "Flower of Life",
            Self::Plume => "Plume of Death",
            Self::Sands => "Sands of Eon",
            Self::Goblet => "Goblet of Eonothem",
            Self::Circlet => "Circlet of Logos",
        }
    }

    pub fn from_display(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|slot| slot.display_name() == trimmed)
    }

    /// Position in catalog order, used as the piece-name index.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
