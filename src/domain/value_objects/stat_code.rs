//! Canonical ability codes and the alias table that maps free text onto them

use serde::{Deserialize, Serialize};

/// One of the six canonical ability codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatCode {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

/// Abbreviations and synonyms, already in normalized (lowercase, alphanumeric) form.
///
/// Order matters: whole-word alias matching walks this table front to back.
pub const STAT_ALIASES: &[(&str, StatCode)] = &[
    ("strength", StatCode::Str),
    ("str", StatCode::Str),
    ("dexterity", StatCode::Dex),
    ("agility", StatCode::Dex),
    ("dex", StatCode::Dex),
    ("constitution", StatCode::Con),
    ("stamina", StatCode::Con),
    ("con", StatCode::Con),
    ("intelligence", StatCode::Int),
    ("intellect", StatCode::Int),
    ("int", StatCode::Int),
    ("wisdom", StatCode::Wis),
    ("wis", StatCode::Wis),
    ("charisma", StatCode::Cha),
    ("cha", StatCode::Cha),
    ("chr", StatCode::Cha),
];

impl StatCode {
    pub const ALL: [StatCode; 6] = [
        StatCode::Str,
        StatCode::Dex,
        StatCode::Con,
        StatCode::Int,
        StatCode::Wis,
        StatCode::Cha,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Con => "CON",
            Self::Int => "INT",
            Self::Wis => "WIS",
            Self::Cha => "CHA",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Str => "Strength",
            Self::Dex => "Dexterity",
            Self::Con => "Constitution",
            Self::Int => "Intelligence",
            Self::Wis => "Wisdom",
            Self::Cha => "Charisma",
        }
    }

    /// Map any free-text stat label onto its canonical code
    pub fn canonicalize(label: &str) -> Option<Self> {
        let key = normalize_label(label);
        if key.is_empty() {
            return None;
        }
        STAT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, code)| *code)
    }
}

impl std::fmt::Display for StatCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Lowercase and drop every non-alphanumeric character
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_codes_and_synonyms() {
        assert_eq!(StatCode::canonicalize("STR"), Some(StatCode::Str));
        assert_eq!(StatCode::canonicalize("Strength"), Some(StatCode::Str));
        assert_eq!(StatCode::canonicalize(" dex. "), Some(StatCode::Dex));
        assert_eq!(StatCode::canonicalize("Charisma"), Some(StatCode::Cha));
        assert_eq!(StatCode::canonicalize("Luck"), None);
        assert_eq!(StatCode::canonicalize(""), None);
    }

    #[test]
    fn test_serializes_as_code() {
        let value = serde_json::to_value(StatCode::Wis).unwrap();
        assert_eq!(value, serde_json::json!("WIS"));
        assert_eq!(StatCode::Int.to_string(), "INT");
    }
}
