use serde::{Deserialize, Serialize};

/// Player-set marker on an unrevealed cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    #[default]
    None,
    /// The player believes there is a mine here.
    Warning,
    /// The player is unsure.
    Unknown,
}

impl Mark {
    /// Next marker in the `None -> Warning -> Unknown -> None` cycle.
    pub const fn cycle(self) -> Self {
        match self {
            Self::None => Self::Warning,
            Self::Warning => Self::Unknown,
            Self::Unknown => Self::None,
        }
    }

    pub const fn is_set(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Canonical player-visible state stored by the gameplay engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCell {
    Hidden(Mark),
    Revealed(u8),
    /// A mine that was revealed, either the one that ended the game or any other shown after it.
    Exposed,
}

impl EngineCell {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden(_))
    }

    pub const fn mark(self) -> Mark {
        match self {
            Self::Hidden(mark) => mark,
            Self::Revealed(_) | Self::Exposed => Mark::None,
        }
    }
}

impl Default for EngineCell {
    fn default() -> Self {
        Self::Hidden(Mark::None)
    }
}
