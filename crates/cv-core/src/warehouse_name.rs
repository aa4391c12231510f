//! Warehouse name newtype with case-insensitive identity
//!
//! Warehouses are identified by name, and the platforms involved treat those
//! names case-insensitively. Equality, hashing, and ordering therefore all
//! compare the ASCII-lowercased form, while `Display`/`as_str` preserve the
//! casing the name was first seen with.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A non-empty warehouse name.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(transparent)]
pub struct WarehouseName(String);

impl WarehouseName {
    /// Create a new warehouse name, panicking if it is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        let s = name.into();
        assert!(!s.is_empty(), "WarehouseName must not be empty");
        Self(s)
    }

    /// Try to create a new warehouse name, returning `None` if it is empty.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the name as a string slice, original casing preserved.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> serde::Deserialize<'de> for WarehouseName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        WarehouseName::try_new(s)
            .ok_or_else(|| serde::de::Error::custom("WarehouseName must not be empty"))
    }
}

impl PartialEq for WarehouseName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for WarehouseName {}

impl Hash for WarehouseName {
    // Must agree with the case-insensitive Eq: hash the lowercased bytes.
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl PartialOrd for WarehouseName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WarehouseName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .bytes()
            .map(|b| b.to_ascii_lowercase())
            .cmp(other.0.bytes().map(|b| b.to_ascii_lowercase()))
    }
}

impl fmt::Display for WarehouseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WarehouseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for WarehouseName {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for WarehouseName {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_case_insensitive_eq() {
        assert_eq!(WarehouseName::new("Sales"), WarehouseName::new("SALES"));
        assert_eq!(WarehouseName::new("Sales"), WarehouseName::new("sales"));
        assert_ne!(WarehouseName::new("Sales"), WarehouseName::new("Inventory"));
    }

    #[test]
    fn test_case_insensitive_hash() {
        let mut set = HashSet::new();
        set.insert(WarehouseName::new("Sales"));
        assert!(set.contains(&WarehouseName::new("SALES")));
        assert!(!set.insert(WarehouseName::new("sales")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_ordering_ignores_case() {
        let mut names = vec![
            WarehouseName::new("inventory"),
            WarehouseName::new("Finance"),
            WarehouseName::new("SALES"),
        ];
        names.sort();
        let order: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(order, vec!["Finance", "inventory", "SALES"]);
    }

    #[test]
    fn test_display_preserves_casing() {
        assert_eq!(WarehouseName::new("SalesMart").to_string(), "SalesMart");
    }

    #[test]
    fn test_try_new_rejects_empty() {
        assert!(WarehouseName::try_new("").is_none());
        assert!(WarehouseName::try_new("w").is_some());
    }

    #[test]
    fn test_eq_str() {
        let name = WarehouseName::new("Sales");
        assert_eq!(name, "sales");
        assert_eq!(name, *"SALES");
    }
}
