//! Before/after snapshot of one section's pending edit.

/// Before/after percentages for a single show.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowChange {
    pub show: String,
    pub nominal_before: f64,
    pub nominal_after: f64,
    pub cap_before: f64,
    pub cap_after: f64,
}

impl ShowChange {
    /// True when the edit leaves this show untouched.
    pub fn is_noop(&self) -> bool {
        self.nominal_before == self.nominal_after && self.cap_before == self.cap_after
    }
}

/// An immutable diff between current and proposed values, sorted by show
/// code. Created by a validated submit, consumed once by the confirmation
/// screen and the apply step; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    changes: Vec<ShowChange>,
}

impl ChangeSet {
    /// Build a change set from per-show entries. Entries are sorted by show
    /// code for stable display and deterministic polling order.
    pub fn new(mut changes: Vec<ShowChange>) -> Self {
        changes.sort_by(|a, b| a.show.cmp(&b.show));
        Self { changes }
    }

    pub fn changes(&self) -> &[ShowChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Target nominal percentages, in show order, for convergence polling.
    pub fn nominal_targets(&self) -> impl Iterator<Item = (&str, f64)> {
        self.changes
            .iter()
            .map(|c| (c.show.as_str(), c.nominal_after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(show: &str, nominal: f64) -> ShowChange {
        ShowChange {
            show: show.to_string(),
            nominal_before: 50.0,
            nominal_after: nominal,
            cap_before: 60.0,
            cap_after: 60.0,
        }
    }

    #[test]
    fn test_sorted_by_show_code() {
        let set = ChangeSet::new(vec![change("XYZ", 40.0), change("ABC", 60.0)]);
        let shows: Vec<_> = set.changes().iter().map(|c| c.show.as_str()).collect();
        assert_eq!(shows, ["ABC", "XYZ"]);
    }

    #[test]
    fn test_nominal_targets() {
        let set = ChangeSet::new(vec![change("XYZ", 40.0), change("ABC", 60.0)]);
        let targets: Vec<_> = set.nominal_targets().collect();
        assert_eq!(targets, [("ABC", 60.0), ("XYZ", 40.0)]);
    }

    #[test]
    fn test_noop_detection() {
        let mut c = change("ABC", 50.0);
        assert!(c.is_noop());
        c.cap_after = 70.0;
        assert!(!c.is_noop());
    }
}
