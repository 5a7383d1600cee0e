//! Disaster categories

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Category of the event that caused the damage
///
/// Parsing is case-insensitive and never fails: unrecognised names are kept
/// as [`DisasterType::Other`] and scored with the default severity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DisasterType {
    Flood,
    Wildfire,
    Storm,
    Earthquake,
    Drought,
    Other(String),
}

impl DisasterType {
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "flood" => DisasterType::Flood,
            "wildfire" => DisasterType::Wildfire,
            "storm" => DisasterType::Storm,
            "earthquake" => DisasterType::Earthquake,
            "drought" => DisasterType::Drought,
            _ => DisasterType::Other(trimmed.to_string()),
        }
    }

    /// Display name as stored on claims ("Flood", "Wildfire", ...)
    pub fn as_str(&self) -> &str {
        match self {
            DisasterType::Flood => "Flood",
            DisasterType::Wildfire => "Wildfire",
            DisasterType::Storm => "Storm",
            DisasterType::Earthquake => "Earthquake",
            DisasterType::Drought => "Drought",
            DisasterType::Other(name) => name,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, DisasterType::Other(name) if name.trim().is_empty())
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisasterType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DisasterType::parse(s))
    }
}

impl From<String> for DisasterType {
    fn from(value: String) -> Self {
        DisasterType::parse(&value)
    }
}

impl From<&str> for DisasterType {
    fn from(value: &str) -> Self {
        DisasterType::parse(value)
    }
}

impl From<DisasterType> for String {
    fn from(value: DisasterType) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(DisasterType::parse("FLOOD"), DisasterType::Flood);
        assert_eq!(DisasterType::parse(" wildFire "), DisasterType::Wildfire);
        assert_eq!("Earthquake".parse::<DisasterType>().unwrap(), DisasterType::Earthquake);
    }

    #[test]
    fn test_unknown_names_are_preserved() {
        let tsunami = DisasterType::parse("Tsunami");
        assert_eq!(tsunami, DisasterType::Other("Tsunami".to_string()));
        assert_eq!(tsunami.to_string(), "Tsunami");
        assert!(!tsunami.is_blank());
        assert!(DisasterType::parse("   ").is_blank());
    }

    #[test]
    fn test_serde_uses_display_name() {
        let json = serde_json::to_string(&DisasterType::Storm).unwrap();
        assert_eq!(json, "\"Storm\"");
        let parsed: DisasterType = serde_json::from_str("\"storm\"").unwrap();
        assert_eq!(parsed, DisasterType::Storm);
    }
}
