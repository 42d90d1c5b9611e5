//! Cache Namespaces
//!
//! Every cached read belongs to a namespace. Writes invalidate a whole
//! namespace at once instead of scanning for a key prefix.

use std::fmt;

use serde::Serialize;

// == Namespace ==
/// Group of cache entries invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Vehicle list and search results
    Vehicles,
    /// Brand, color and category lists
    Lookups,
}

impl Namespace {
    /// Returns the namespace label, which is also the key prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Vehicles => "vehicles",
            Namespace::Lookups => "lookups",
        }
    }

    /// Builds a cache key inside this namespace.
    pub fn key(&self, suffix: &str) -> String {
        format!("{}:{}", self.as_str(), suffix)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_building() {
        assert_eq!(Namespace::Vehicles.key("all"), "vehicles:all");
        assert_eq!(Namespace::Lookups.key("colors"), "lookups:colors");
    }

    #[test]
    fn test_display_and_serialize_agree() {
        assert_eq!(Namespace::Vehicles.to_string(), "vehicles");
        assert_eq!(
            serde_json::to_value(Namespace::Lookups).unwrap(),
            serde_json::json!("lookups")
        );
    }
}
