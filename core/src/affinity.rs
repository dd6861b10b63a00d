//! Column type normalization.
//!
//! SQLite stores every value under one of five type affinities. Declared
//! column types are collapsed onto those affinities by substring matching,
//! so loosely written types such as `VARCHAR(255)` or `BIGINT` are accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five SQLite storage affinities.
///
/// # Examples
///
/// ```
/// use pseudo_schema_core::Affinity;
///
/// assert_eq!(Affinity::from_declared("bigint"), Affinity::Integer);
/// assert_eq!(Affinity::from_declared("VARCHAR(255)"), Affinity::Text);
/// assert_eq!(Affinity::from_declared(""), Affinity::Blob);
/// assert_eq!(Affinity::from_declared("double precision"), Affinity::Real);
/// assert_eq!(Affinity::from_declared("DATETIME"), Affinity::Numeric);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Affinity {
    /// `INTEGER`
    Integer,
    /// `TEXT` (the default for name-only columns).
    #[default]
    Text,
    /// `REAL`
    Real,
    /// `NUMERIC`
    Numeric,
    /// `BLOB`
    Blob,
}

impl Affinity {
    /// Classifies a declared type string.
    ///
    /// The checks run in a fixed order on the upper-cased input: `INT`,
    /// then `CHAR`/`CLOB`/`TEXT`, then `BLOB` or empty, then
    /// `REAL`/`FLOA`/`DOUB`; anything else is `NUMERIC`.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.trim().to_uppercase();
        if upper.contains("INT") {
            Self::Integer
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|k| upper.contains(k)) {
            Self::Text
        } else if upper.is_empty() || upper.contains("BLOB") {
            Self::Blob
        } else if ["REAL", "FLOA", "DOUB"].iter().any(|k| upper.contains(k)) {
            Self::Real
        } else {
            Self::Numeric
        }
    }

    /// Returns the canonical SQL keyword for this affinity.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Real => "REAL",
            Self::Numeric => "NUMERIC",
            Self::Blob => "BLOB",
        }
    }
}

impl fmt::Display for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Affinity {
    fn from(declared: &str) -> Self {
        Self::from_declared(declared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_anywhere_is_integer() {
        for declared in ["int", "INTEGER", "tinyint", "UNSIGNED BIG INT", "int8", "Point"] {
            assert_eq!(Affinity::from_declared(declared), Affinity::Integer, "{declared}");
        }
    }

    #[test]
    fn test_character_types_are_text() {
        for declared in ["char(10)", "VARCHAR(255)", "nchar", "clob", "text"] {
            assert_eq!(Affinity::from_declared(declared), Affinity::Text, "{declared}");
        }
    }

    #[test]
    fn test_int_takes_precedence_over_char() {
        // "CHARINT" contains both; INT is checked first.
        assert_eq!(Affinity::from_declared("charint"), Affinity::Integer);
    }

    #[test]
    fn test_empty_and_blob_are_blob() {
        assert_eq!(Affinity::from_declared(""), Affinity::Blob);
        assert_eq!(Affinity::from_declared("   "), Affinity::Blob);
        assert_eq!(Affinity::from_declared("blob"), Affinity::Blob);
    }

    #[test]
    fn test_floating_types_are_real() {
        for declared in ["real", "FLOAT", "double", "DOUBLE PRECISION"] {
            assert_eq!(Affinity::from_declared(declared), Affinity::Real, "{declared}");
        }
    }

    #[test]
    fn test_everything_else_is_numeric() {
        for declared in ["numeric", "DECIMAL(10,5)", "boolean", "date", "datetime"] {
            assert_eq!(Affinity::from_declared(declared), Affinity::Numeric, "{declared}");
        }
    }

    #[test]
    fn test_serde_uses_keyword() {
        let json = serde_json::to_string(&Affinity::Integer).unwrap();
        assert_eq!(json, "\"INTEGER\"");
        let parsed: Affinity = serde_json::from_str("\"REAL\"").unwrap();
        assert_eq!(parsed, Affinity::Real);
    }
}
