//! Part-number (Hollander) grammar.
//!
//! A part number is a 3-letter material code, a 5-digit pattern id, one letter,
//! and (for painted variants) a 2-digit paint code with an optional trailing
//! replica marker:
//!
//! ```text
//! ALY12345A        core (bare, unpainted)
//! ALY12345A12      finish
//! ALY12345A12N     replica
//! ```
//!
//! The first [`CORE_KEY_LEN`] characters identify the core shared by every
//! painted finish of the same wheel.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Length of the core identity prefix (`ALY12345A`).
pub const CORE_KEY_LEN: usize = 9;

/// Length of the material code prefix (`ALY`).
pub const MATERIAL_CODE_LEN: usize = 3;

/// Paint codes at or above this value are polished finishes.
pub const POLISHED_PAINT_CODE: u8 = 80;

static FINISH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ALY|STL|FWC)[0-9]{5}[A-Z][0-9]{2}$").expect("finish pattern"));
static REPLICA_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ALY|STL|FWC)[0-9]{5}[A-Z][0-9]{2}N$").expect("replica pattern"));
static CORE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ALY|STL|FWC)[0-9]{5}[A-Z]$").expect("core pattern"));
static ROAD_READY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ALY|STL|FWC)0[0-9]{5}[A-Z][0-9]{2}N?$").expect("road ready pattern"));
static IN_HOUSE_CORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(ALY|STL|FWC)[0-9]{5}[A-Z][0-9]{2}\*CORE$").expect("in-house core pattern")
});

/// Material encoded in the first three characters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    /// `ALY`
    Alloy,
    /// `STL`
    Steel,
    /// `FWC`
    Other,
}

impl Material {
    fn from_code(code: &str) -> Self {
        match code {
            "ALY" => Material::Alloy,
            "STL" => Material::Steel,
            _ => Material::Other,
        }
    }
}

/// Which grammar a part number matched.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Core,
    Finish,
    Replica,
}

/// A validated, upper-cased part number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartNumber {
    raw: String,
    kind: PartKind,
}

impl PartNumber {
    /// Parse a part number (case-insensitive, surrounding whitespace ignored).
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim().to_ascii_uppercase();
        let kind = if FINISH_PATTERN.is_match(&raw) {
            PartKind::Finish
        } else if REPLICA_PATTERN.is_match(&raw) {
            PartKind::Replica
        } else if CORE_PATTERN.is_match(&raw) {
            PartKind::Core
        } else {
            return Err(DomainError::invalid_part_number(raw));
        };
        Ok(Self { raw, kind })
    }

    /// Parse a raw vendor code, repairing the historical "road ready" format
    /// (`ALY0` + pattern id) by dropping the extra digit after the material code.
    pub fn parse_vendor_code(raw: &str) -> DomainResult<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        if ROAD_READY_PATTERN.is_match(&upper) {
            let repaired = format!(
                "{}{}",
                &upper[..MATERIAL_CODE_LEN],
                &upper[MATERIAL_CODE_LEN + 1..]
            );
            return Self::parse(&repaired);
        }
        Self::parse(&upper)
    }

    /// Parse the in-house `*CORE` suffix form (`ALY12345A12*CORE`) into its core.
    ///
    /// Returns `None` when the string is not in that form.
    pub fn parse_in_house_core(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        if !IN_HOUSE_CORE_PATTERN.is_match(&upper) {
            return None;
        }
        Some(Self {
            raw: upper[..CORE_KEY_LEN].to_string(),
            kind: PartKind::Core,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn is_replica(&self) -> bool {
        self.kind == PartKind::Replica
    }

    pub fn material(&self) -> Material {
        Material::from_code(&self.raw[..MATERIAL_CODE_LEN])
    }

    /// The 9-character core identity.
    pub fn core_key(&self) -> &str {
        &self.raw[..CORE_KEY_LEN]
    }

    /// Everything after the core identity (`"12"`, `"12N"`, or `""` for a core).
    ///
    /// Handling-time and cost-adjustment tables are keyed by this substring.
    pub fn paint_suffix(&self) -> &str {
        &self.raw[CORE_KEY_LEN..]
    }

    /// Numeric paint code, absent for cores.
    pub fn paint_code(&self) -> Option<u8> {
        paint_code_of(&self.raw)
    }

    pub fn is_polished(&self) -> bool {
        self.paint_code().is_some_and(|code| code >= POLISHED_PAINT_CODE)
    }

    /// Core key to search when a bare core can stand in for this part.
    ///
    /// `None` for replicas and polished finishes, which are never fungible
    /// with a bare core.
    pub fn core_search_key(&self) -> Option<&str> {
        if self.is_replica() || self.is_polished() {
            return None;
        }
        Some(self.core_key())
    }

    /// This part truncated to its core (identity for cores).
    pub fn to_core(&self) -> PartNumber {
        PartNumber {
            raw: self.core_key().to_string(),
            kind: PartKind::Core,
        }
    }
}

/// Numeric paint code of any stored key (`ALY12345A12` → `Some(12)`).
pub fn paint_code_of(key: &str) -> Option<u8> {
    key.get(CORE_KEY_LEN..CORE_KEY_LEN + 2)?.parse().ok()
}

impl core::fmt::Display for PartNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl core::str::FromStr for PartNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PartNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PartNumber> for String {
    fn from(value: PartNumber) -> Self {
        value.raw
    }
}
