use std::{fmt, str::FromStr};

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::{ContestEntity, DEFAULT_ACCENT_HEX, EntrantEntity, is_accent_hex};

/// RGB accent used to tint a contest in the UI and in exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Raised when an accent string is not `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid accent color `{0}`: expected #RRGGBB")]
pub struct InvalidAccent(pub String);

impl AccentColor {
    /// Build a color from its components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for AccentColor {
    fn default() -> Self {
        // DEFAULT_ACCENT_HEX is well-formed.
        DEFAULT_ACCENT_HEX.parse().unwrap_or(Self::rgb(0x0A, 0x84, 0xFF))
    }
}

impl FromStr for AccentColor {
    type Err = InvalidAccent;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if !is_accent_hex(trimmed) {
            return Err(InvalidAccent(value.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&trimmed[range], 16).map_err(|_| InvalidAccent(value.to_string()))
        };
        Ok(Self {
            r: channel(1..3)?,
            g: channel(3..5)?,
            b: channel(5..7)?,
        })
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A participant whose score is tapped up during a contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    /// Stable identifier for the entrant.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Current score, never negative.
    pub score: u32,
}

impl Entrant {
    /// Fresh entrant starting at zero.
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            score: 0,
        }
    }
}

/// A scored contest owning its entrants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    /// Stable identifier for the contest.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Creation time, kept for display and exports.
    pub created_at: OffsetDateTime,
    /// Entrants in display order; this order drives exports.
    pub entrants: Vec<Entrant>,
    /// Accent color.
    pub accent: AccentColor,
}

impl Contest {
    /// Build an empty contest stamped with the current time.
    pub fn new(name: String, accent: AccentColor) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: now.replace_nanosecond(0).unwrap_or(now),
            entrants: Vec::new(),
            accent,
        }
    }

    /// Look up an entrant by identifier.
    pub fn entrant(&self, id: Uuid) -> Option<&Entrant> {
        self.entrants.iter().find(|entrant| entrant.id == id)
    }

    /// Mutable lookup of an entrant by identifier.
    pub fn entrant_mut(&mut self, id: Uuid) -> Option<&mut Entrant> {
        self.entrants.iter_mut().find(|entrant| entrant.id == id)
    }
}

impl From<EntrantEntity> for Entrant {
    fn from(value: EntrantEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
        }
    }
}

impl From<Entrant> for EntrantEntity {
    fn from(value: Entrant) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
        }
    }
}

impl From<ContestEntity> for Contest {
    fn from(value: ContestEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
            entrants: value.entrants.into_iter().map(Into::into).collect(),
            accent: value.accent_hex.parse().unwrap_or_default(),
        }
    }
}

impl From<Contest> for ContestEntity {
    fn from(value: Contest) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
            entrants: value.entrants.into_iter().map(Into::into).collect(),
            accent_hex: value.accent.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_parses_and_prints_uppercase() {
        let accent: AccentColor = "#ff9500".parse().unwrap();
        assert_eq!(accent, AccentColor::rgb(0xFF, 0x95, 0x00));
        assert_eq!(accent.to_string(), "#FF9500");
    }

    #[test]
    fn accent_rejects_bad_shapes() {
        assert!("ff9500".parse::<AccentColor>().is_err());
        assert!("#ff95".parse::<AccentColor>().is_err());
        assert!("#gg9500".parse::<AccentColor>().is_err());
    }

    #[test]
    fn default_accent_matches_persisted_default() {
        assert_eq!(AccentColor::default().to_string(), DEFAULT_ACCENT_HEX);
    }

    #[test]
    fn new_contest_is_empty() {
        let contest = Contest::new("Jam A".into(), AccentColor::default());
        assert!(contest.entrants.is_empty());
        assert_eq!(contest.created_at.nanosecond(), 0);
    }
}
