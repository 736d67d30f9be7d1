use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;
/// Oldest schema version the loader still accepts.
pub const MIN_SCHEMA_VERSION: u32 = 1;
/// Accent used when a stored contest has no (or an unreadable) accent.
pub const DEFAULT_ACCENT_HEX: &str = "#0A84FF";

/// Whole application state as written to disk and to JSON backups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedState {
    /// Layout version of this document.
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    /// Contests in insertion order.
    pub contests: Vec<ContestEntity>,
    /// Contest highlighted in the UI, if any.
    #[serde(
        rename = "selectedContestID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_contest_id: Option<Uuid>,
}

impl PersistedState {
    /// Empty state tagged with the current schema version.
    pub fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            contests: Vec::new(),
            selected_contest_id: None,
        }
    }

    /// Whether the document is recent enough to be trusted.
    pub fn is_supported(&self) -> bool {
        self.schema_version >= MIN_SCHEMA_VERSION
    }
}

/// Stored representation of a contest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContestEntity {
    /// Stable identifier for the contest.
    pub id: Uuid,
    /// Display name of the contest.
    pub name: String,
    /// Creation timestamp (RFC 3339).
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Entrants in display order.
    #[serde(default)]
    pub entrants: Vec<EntrantEntity>,
    /// `#RRGGBB` accent color; older documents may omit it.
    #[serde(
        rename = "accentHex",
        default = "default_accent_hex",
        deserialize_with = "lenient_accent_hex"
    )]
    pub accent_hex: String,
}

/// Stored representation of an entrant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntrantEntity {
    /// Stable identifier for the entrant.
    pub id: Uuid,
    /// Display name of the entrant.
    pub name: String,
    /// Current score.
    pub score: u32,
}

fn default_accent_hex() -> String {
    DEFAULT_ACCENT_HEX.to_string()
}

/// Accept any accent value without failing the whole document; unreadable
/// values (wrong type, malformed hex) collapse to [`DEFAULT_ACCENT_HEX`].
fn lenient_accent_hex<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .filter(|hex| is_accent_hex(hex))
        .map(str::to_uppercase)
        .unwrap_or_else(default_accent_hex))
}

/// Check the `#RRGGBB` shape.
pub fn is_accent_hex(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
