//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The externally visible identifier of a directory resource.
///
/// Numeric and string ids are both accepted; the API only ever sees the
/// string form in URL paths.
///
/// # Example
///
/// ```
/// use directory_client::ResourceId;
///
/// let id = ResourceId::from(42u64);
/// assert_eq!(id.as_str(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a new resource id from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for ResourceId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id() {
        let id = ResourceId::new("u-17");
        assert_eq!(id.as_str(), "u-17");
        assert_eq!(id.to_string(), "u-17");
        assert_eq!(ResourceId::from(17u64).as_str(), "17");
    }

    #[test]
    fn test_resource_id_serde_transparent() {
        let id: ResourceId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id, ResourceId::from("abc"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
