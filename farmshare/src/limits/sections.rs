//! Farm section catalog: discovery, ordering, and sibling groups.
//!
//! Sections are the schedulable pools under `Limits`. The document also
//! carries non-farm entries (license counts, scheduler internals) which are
//! filtered out by name here. Linux sections form a sibling group that can
//! be mass-updated together; the Windows pool stands alone.

use super::document::AllocationDocument;

/// Substrings identifying schedulable farm sections among the `Limits` keys.
const SECTION_MARKERS: [&str; 2] = ["linuxfarm", "_windowsfarm"];

/// List all farm sections in the document, natural-sorted so that
/// `linuxfarm_2` comes before `linuxfarm_10`.
pub fn section_names(document: &AllocationDocument) -> Vec<String> {
    let mut sections: Vec<String> = document
        .limits
        .keys()
        .filter(|name| SECTION_MARKERS.iter().any(|marker| name.contains(marker)))
        .cloned()
        .collect();
    sections.sort_by(|a, b| natural_key(a).cmp(&natural_key(b)));
    sections
}

/// True for Linux pool sections; these carry a sibling group.
pub fn is_linux(section: &str) -> bool {
    section.contains("linuxfarm")
}

/// The sibling group for a section: every Linux section when `section` is
/// itself Linux, empty otherwise. Mass-apply exclusions are handled at
/// apply time, not here.
pub fn sibling_group(document: &AllocationDocument, section: &str) -> Vec<String> {
    if !is_linux(section) {
        return Vec::new();
    }
    section_names(document)
        .into_iter()
        .filter(|name| is_linux(name))
        .collect()
}

/// Operator-facing name: `linuxfarm_2` becomes `Linux Farm 2`,
/// `_windowsfarm` becomes `Windows Farm`.
pub fn display_name(section: &str) -> String {
    let trimmed = section.trim_start_matches('_');
    match trimmed.split_once("farm") {
        Some((prefix, suffix)) => {
            let mut name = format!("{} Farm", capitalize(prefix));
            let suffix = suffix.replace('_', " ");
            let suffix = suffix.trim();
            if !suffix.is_empty() {
                name.push(' ');
                name.push_str(&capitalize(suffix));
            }
            name
        }
        None => capitalize(trimmed),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Digit-aware sort key: runs of digits compare numerically, text runs
/// lexically.
fn natural_key(name: &str) -> Vec<NaturalPart> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();

    for ch in name.chars() {
        if ch.is_ascii_digit() {
            if !text.is_empty() {
                parts.push(NaturalPart::Text(std::mem::take(&mut text)));
            }
            digits.push(ch);
        } else {
            if !digits.is_empty() {
                parts.push(NaturalPart::Number(digits.parse().unwrap_or(0)));
                digits.clear();
            }
            text.push(ch);
        }
    }
    if !text.is_empty() {
        parts.push(NaturalPart::Text(text));
    }
    if !digits.is_empty() {
        parts.push(NaturalPart::Number(digits.parse().unwrap_or(0)));
    }
    parts
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalPart {
    Number(u64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with_sections(names: &[&str]) -> AllocationDocument {
        let limits: serde_json::Map<String, serde_json::Value> = names
            .iter()
            .map(|n| (n.to_string(), serde_json::json!({"Shares": {}})))
            .collect();
        let text = serde_json::json!({ "Limits": limits }).to_string();
        AllocationDocument::from_json(&text).unwrap()
    }

    #[test]
    fn test_filters_non_farm_entries() {
        let doc = document_with_sections(&["linuxfarm", "license_nuke", "_windowsfarm"]);
        assert_eq!(section_names(&doc), ["_windowsfarm", "linuxfarm"]);
    }

    #[test]
    fn test_natural_sort_order() {
        let doc = document_with_sections(&["linuxfarm_10", "linuxfarm_2", "linuxfarm"]);
        assert_eq!(
            section_names(&doc),
            ["linuxfarm", "linuxfarm_2", "linuxfarm_10"]
        );
    }

    #[test]
    fn test_is_linux() {
        assert!(is_linux("linuxfarm"));
        assert!(is_linux("linuxfarm_Denoise"));
        assert!(!is_linux("_windowsfarm"));
    }

    #[test]
    fn test_sibling_group_linux_only() {
        let doc = document_with_sections(&["linuxfarm", "linuxfarm_2", "_windowsfarm"]);
        assert_eq!(
            sibling_group(&doc, "linuxfarm"),
            ["linuxfarm", "linuxfarm_2"]
        );
        assert!(sibling_group(&doc, "_windowsfarm").is_empty());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name("linuxfarm"), "Linux Farm");
        assert_eq!(display_name("linuxfarm_2"), "Linux Farm 2");
        assert_eq!(display_name("_windowsfarm"), "Windows Farm");
        assert_eq!(display_name("linuxfarm_Denoise"), "Linux Farm Denoise");
    }
}
