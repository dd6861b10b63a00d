//! Index equivalence checks used when diffing against the live catalog.
//!
//! The engine has no `ALTER INDEX`, so a changed index is dropped and
//! re-created. Whether it changed is decided by an [`IndexComparator`].

/// Decides whether a desired index definition matches the live one.
pub trait IndexComparator {
    /// Returns `true` when `live` (as recorded by the engine) needs no
    /// change to match `desired` (as rendered by the pseudo schema).
    fn is_equivalent(&self, desired: &str, live: &str) -> bool;
}

/// Whitespace-insensitive text comparison of `CREATE INDEX` statements.
///
/// `IF NOT EXISTS` is removed from the desired statement (the engine drops
/// it when recording), then all whitespace is removed from both sides.
/// This is a syntactic check: equivalent statements written differently
/// compare unequal, and differences hidden by the normalization go unseen.
///
/// # Examples
///
/// ```
/// use pseudo_schema_core::{IndexComparator, TextualComparator};
///
/// let desired = "CREATE INDEX IF NOT EXISTS ix ON t(a ASC)";
/// assert!(TextualComparator.is_equivalent(desired, "CREATE INDEX ix ON t(a ASC)"));
/// assert!(TextualComparator.is_equivalent(desired, "CREATE  INDEX ix ON t( a  ASC )"));
/// assert!(!TextualComparator.is_equivalent(desired, "CREATE INDEX ix ON t(a DESC)"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextualComparator;

impl TextualComparator {
    fn strip_whitespace(sql: &str) -> String {
        sql.chars().filter(|c| !c.is_whitespace()).collect()
    }
}

impl IndexComparator for TextualComparator {
    fn is_equivalent(&self, desired: &str, live: &str) -> bool {
        let desired = Self::strip_whitespace(&desired.replace("IF NOT EXISTS", ""));
        Self::strip_whitespace(live) == desired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_flag_difference_detected() {
        assert!(!TextualComparator.is_equivalent(
            "CREATE UNIQUE INDEX IF NOT EXISTS ix ON t(a ASC)",
            "CREATE INDEX ix ON t(a ASC)"
        ));
    }

    #[test]
    fn test_column_difference_detected() {
        assert!(!TextualComparator.is_equivalent(
            "CREATE INDEX IF NOT EXISTS ix ON t(a ASC, b ASC)",
            "CREATE INDEX ix ON t(a ASC)"
        ));
    }

    #[test]
    fn test_newlines_and_tabs_ignored() {
        assert!(TextualComparator.is_equivalent(
            "CREATE INDEX IF NOT EXISTS ix ON t(a ASC)",
            "CREATE INDEX ix\n\tON t(a ASC)"
        ));
    }

    #[test]
    fn test_implicit_ascending_is_a_difference() {
        // Text comparison only: omitting ASC is semantically the same index.
        assert!(!TextualComparator.is_equivalent(
            "CREATE INDEX IF NOT EXISTS ix ON t(a ASC)",
            "CREATE INDEX ix ON t(a)"
        ));
    }
}
