//! Validated in-memory editing of one section's shares.
//!
//! The editor extracts current percentages from the document, accepts a
//! proposed set of new values, and enforces the single invariant the config
//! carries: nominal percentages across a section must sum to exactly 100.0
//! at one-decimal precision. Caps have no cross-show constraint.

use indexmap::IndexMap;
use thiserror::Error;

use super::changeset::{ChangeSet, ShowChange};
use super::document::{fraction_to_percent, round_percent, AllocationDocument};

/// Validation failures surfaced inline on the edit screen. Nothing has been
/// written when one of these is returned; the user corrects and resubmits.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Nominal percentages do not sum to 100.0 at one-decimal precision.
    #[error("The newly set values add up to {sum}, not 100! Try again.")]
    NominalSumMismatch { sum: f64 },

    /// A proposed value was supplied for a show the section does not carry.
    #[error("Show '{0}' is not part of this section")]
    UnknownShow(String),
}

/// Current (nominal%, cap%) pairs per show, in document order.
pub type CurrentValues = IndexMap<String, (f64, f64)>;

/// Extract current percentages for every show in `section`, skipping shows
/// on the `excluded_shows` list (scheduler bookkeeping entries operators
/// must not touch). Percentages are `round(fraction * 100, 1)`.
pub fn load_current(
    document: &AllocationDocument,
    section: &str,
    excluded_shows: &[String],
) -> CurrentValues {
    let mut current = CurrentValues::new();
    let Some(shares) = document
        .limits
        .get(section)
        .and_then(|record| record.shares.as_ref())
    else {
        return current;
    };

    for (show, share) in shares {
        if excluded_shows.iter().any(|word| show.contains(word.as_str())) {
            continue;
        }
        let nominal = fraction_to_percent(share.nominal.unwrap_or(0.0));
        let cap = fraction_to_percent(share.cap.unwrap_or(0.0));
        current.insert(show.clone(), (nominal, cap));
    }

    current
}

/// Validate proposed values and produce a [`ChangeSet`].
///
/// Fails with [`ValidationError::NominalSumMismatch`] iff the proposed
/// nominal percentages, summed and rounded to one decimal, differ from
/// 100.0. Cap values are unconstrained.
pub fn propose_change(
    current: &CurrentValues,
    new_nominals: &IndexMap<String, f64>,
    new_caps: &IndexMap<String, f64>,
) -> Result<ChangeSet, ValidationError> {
    for show in new_nominals.keys().chain(new_caps.keys()) {
        if !current.contains_key(show) {
            return Err(ValidationError::UnknownShow(show.clone()));
        }
    }

    let sum = round_percent(new_nominals.values().sum());
    if sum != 100.0 {
        return Err(ValidationError::NominalSumMismatch { sum });
    }

    let changes = current
        .iter()
        .map(|(show, &(nominal_before, cap_before))| ShowChange {
            show: show.clone(),
            nominal_before,
            nominal_after: round_percent(new_nominals.get(show).copied().unwrap_or(nominal_before)),
            cap_before,
            cap_after: round_percent(new_caps.get(show).copied().unwrap_or(cap_before)),
        })
        .collect();

    Ok(ChangeSet::new(changes))
}
