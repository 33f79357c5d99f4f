//! Typed model of the on-disk allocation document.
//!
//! The live file is a JSON document of shape
//! `{"Limits": {<section>: {"Shares": {<show>: {"nominal": f, "cap": f}}}}}`
//! where `nominal` and `cap` are fractions in `[0, 1]` stored at 3-decimal
//! precision. The scheduler owns additional keys at every level; those are
//! carried through round-trip untouched so a commit never drops fields this
//! tool does not understand.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while parsing or serializing the allocation document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file content is not well-formed JSON or does not match the
    /// expected shape.
    #[error("Malformed allocation document: {0}")]
    Format(#[from] serde_json::Error),

    /// A named section is missing from the document.
    #[error("Unknown farm section '{0}'")]
    UnknownSection(String),

    /// A named show is missing from a section's shares.
    #[error("Unknown show '{show}' in section '{section}'")]
    UnknownShow { section: String, show: String },
}

/// Per-show share record. `nominal` is the target steady-state fraction,
/// `cap` the hard ceiling. Either may be absent for scheduler-internal
/// entries; farm shows always carry both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowShares {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
    /// Keys owned by the scheduler (priorities, tags, ...), preserved as-is.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// One schedulable pool in the `Limits` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    #[serde(rename = "Shares", skip_serializing_if = "Option::is_none")]
    pub shares: Option<IndexMap<String, ShowShares>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The whole allocation document. Key order is insertion order so a
/// load/commit cycle reproduces the file byte-for-byte apart from the edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDocument {
    #[serde(rename = "Limits")]
    pub limits: IndexMap<String, SectionRecord>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl AllocationDocument {
    /// Parse a document from JSON text, validating the shape once up front.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize with 4-space indentation, matching the format the
    /// scheduler writes and operators diff by eye.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // Serializer output is valid UTF-8 by construction.
        Ok(String::from_utf8(buf).expect("serde_json produced invalid UTF-8"))
    }

    /// True when the named section exists in the `Limits` table.
    pub fn has_section(&self, section: &str) -> bool {
        self.limits.contains_key(section)
    }

    /// Current nominal fraction for a show, if the section and show exist.
    pub fn nominal(&self, section: &str, show: &str) -> Option<f64> {
        self.limits.get(section)?.shares.as_ref()?.get(show)?.nominal
    }

    /// Current cap fraction for a show, if the section and show exist.
    pub fn cap(&self, section: &str, show: &str) -> Option<f64> {
        self.limits.get(section)?.shares.as_ref()?.get(show)?.cap
    }

    /// Write a new nominal fraction for a show.
    pub fn set_nominal(&mut self, section: &str, show: &str, value: f64) -> Result<(), DocumentError> {
        self.share_mut(section, show)?.nominal = Some(value);
        Ok(())
    }

    /// Write a new cap fraction for a show.
    pub fn set_cap(&mut self, section: &str, show: &str, value: f64) -> Result<(), DocumentError> {
        self.share_mut(section, show)?.cap = Some(value);
        Ok(())
    }

    fn share_mut(&mut self, section: &str, show: &str) -> Result<&mut ShowShares, DocumentError> {
        let record = self
            .limits
            .get_mut(section)
            .ok_or_else(|| DocumentError::UnknownSection(section.to_string()))?;
        record
            .shares
            .as_mut()
            .and_then(|shares| shares.get_mut(show))
            .ok_or_else(|| DocumentError::UnknownShow {
                section: section.to_string(),
                show: show.to_string(),
            })
    }
}

/// Convert a stored fraction to a display percentage, one decimal place.
pub fn fraction_to_percent(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}

/// Convert an edited percentage to a stored fraction, three decimal places.
pub fn percent_to_fraction(percent: f64) -> f64 {
    (percent * 10.0).round() / 1000.0
}

/// Round a percentage to the one-decimal precision the editor works in.
pub fn round_percent(percent: f64) -> f64 {
    (percent * 10.0).round() / 10.0
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"{
    "Limits": {
        "linuxfarm": {
            "Shares": {
                "ABC": {
                    "nominal": 0.5,
                    "cap": 0.6
                },
                "XYZ": {
                    "nominal": 0.5,
                    "cap": 0.6,
                    "priority": 2
                }
            },
            "slots": 400
        },
        "_windowsfarm": {
            "Shares": {
                "ABC": {
                    "nominal": 1.0,
                    "cap": 1.0
                }
            }
        },
        "license_nuke": {
            "limit": 40
        }
    },
    "Version": 3
}"#;

    #[test]
    fn test_parse_sample() {
        let doc = AllocationDocument::from_json(SAMPLE).unwrap();
        assert_eq!(doc.nominal("linuxfarm", "ABC"), Some(0.5));
        assert_eq!(doc.cap("linuxfarm", "XYZ"), Some(0.6));
        assert_eq!(doc.nominal("license_nuke", "ABC"), None);
        assert_eq!(doc.extra.get("Version"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_round_trip_preserves_order_and_extras() {
        let doc = AllocationDocument::from_json(SAMPLE).unwrap();
        let text = doc.to_json_pretty().unwrap();
        assert_eq!(text, SAMPLE);
    }

    #[test]
    fn test_malformed_json_is_format_error() {
        let err = AllocationDocument::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DocumentError::Format(_)));
    }

    #[test]
    fn test_set_values() {
        let mut doc = AllocationDocument::from_json(SAMPLE).unwrap();
        doc.set_nominal("linuxfarm", "ABC", 0.6).unwrap();
        doc.set_cap("linuxfarm", "ABC", 0.7).unwrap();
        assert_eq!(doc.nominal("linuxfarm", "ABC"), Some(0.6));
        assert_eq!(doc.cap("linuxfarm", "ABC"), Some(0.7));
    }

    #[test]
    fn test_set_unknown_section_fails() {
        let mut doc = AllocationDocument::from_json(SAMPLE).unwrap();
        let err = doc.set_nominal("gpu_farm", "ABC", 0.5).unwrap_err();
        assert!(matches!(err, DocumentError::UnknownSection(_)));
    }

    #[test]
    fn test_percent_conversions() {
        assert_eq!(fraction_to_percent(0.5), 50.0);
        assert_eq!(fraction_to_percent(0.333), 33.3);
        assert_eq!(percent_to_fraction(60.0), 0.6);
        assert_eq!(percent_to_fraction(33.3), 0.333);
        assert_eq!(round_percent(99.94999), 99.9);
    }
}
