//! Field label synonyms.

use crate::models::record::{Direction, FieldKind};

/// Normalized label → (field kind, implied direction).
const LABELS: &[(&str, FieldKind, Option<Direction>)] = &[
    ("date", FieldKind::Date, None),
    ("transaction date", FieldKind::Date, None),
    ("txn date", FieldKind::Date, None),
    ("value date", FieldKind::Date, None),
    ("posting date", FieldKind::Date, None),
    ("description", FieldKind::Description, None),
    ("narration", FieldKind::Description, None),
    ("narrative", FieldKind::Description, None),
    ("particulars", FieldKind::Description, None),
    ("details", FieldKind::Description, None),
    ("remarks", FieldKind::Description, None),
    ("amount", FieldKind::Amount, None),
    ("transaction amount", FieldKind::Amount, None),
    ("txn amount", FieldKind::Amount, None),
    ("debit", FieldKind::Amount, Some(Direction::Debit)),
    ("withdrawal", FieldKind::Amount, Some(Direction::Debit)),
    ("credit", FieldKind::Amount, Some(Direction::Credit)),
    ("deposit", FieldKind::Amount, Some(Direction::Credit)),
    ("balance", FieldKind::Balance, None),
    ("balance after transaction", FieldKind::Balance, None),
    ("closing balance", FieldKind::Balance, None),
    ("running balance", FieldKind::Balance, None),
    ("available balance", FieldKind::Balance, None),
];

/// Look up a label, ignoring case, surrounding whitespace and repeated inner spaces.
pub fn lookup_label(label: &str) -> Option<(FieldKind, Option<Direction>)> {
    let normalized = label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    LABELS
        .iter()
        .find(|(name, _, _)| *name == normalized)
        .map(|(_, kind, direction)| (*kind, *direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup_label("DATE"), Some((FieldKind::Date, None)));
        assert_eq!(lookup_label("Narration"), Some((FieldKind::Description, None)));
        assert_eq!(
            lookup_label("  Balance   after  Transaction "),
            Some((FieldKind::Balance, None))
        );
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(
            lookup_label("Debit"),
            Some((FieldKind::Amount, Some(Direction::Debit)))
        );
        assert_eq!(
            lookup_label("deposit"),
            Some((FieldKind::Amount, Some(Direction::Credit)))
        );
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(lookup_label("Reference"), None);
        assert_eq!(lookup_label("UPI"), None);
    }
}
