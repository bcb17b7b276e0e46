//! Business reference numbers for sales, held orders and purchases.
//!
//! Format: `{PREFIX}-{YYYYMMDDHHMMSSmmm}-{XXXX}`, e.g.
//! `SALE-20260114093015123-7F3A`. The time component keeps refs sortable
//! and readable on a receipt; the 4 hex chars come from a fresh UUID so two
//! tills ringing up in the same millisecond still get distinct refs. The
//! database enforces uniqueness as the final guard.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Kind of document a reference is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Sale,
    HeldOrder,
    Purchase,
}

impl RefKind {
    pub const fn prefix(&self) -> &'static str {
        match self {
            RefKind::Sale => "SALE",
            RefKind::HeldOrder => "HELD",
            RefKind::Purchase => "PUR",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Generates a reference for `kind` at instant `now`.
pub fn generate_reference(kind: RefKind, now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();

    format!("{}-{}-{}", kind, now.format("%Y%m%d%H%M%S%3f"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reference_format() {
        let now = Utc.with_ymd_and_hms(2026, 1, 14, 9, 30, 15).unwrap();
        let reference = generate_reference(RefKind::Sale, now);

        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SALE");
        assert_eq!(parts[1], "20260114093015000");
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_prefixes() {
        let now = Utc::now();
        assert!(generate_reference(RefKind::HeldOrder, now).starts_with("HELD-"));
        assert!(generate_reference(RefKind::Purchase, now).starts_with("PUR-"));
    }

    #[test]
    fn test_same_instant_produces_distinct_refs() {
        let now = Utc::now();
        let refs: std::collections::HashSet<String> = (0..50)
            .map(|_| generate_reference(RefKind::Sale, now))
            .collect();
        assert!(refs.len() > 45);
    }
}
