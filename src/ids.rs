use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Header carrying a caller-supplied request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request identifier used to correlate log lines of one request.
///
/// Taken verbatim from the `x-request-id` header when the caller sends one,
/// otherwise a freshly generated ULID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(Arc<str>);

impl RequestId {
    pub fn new() -> Self {
        Self::from_ulid(ulid::Ulid::new())
    }

    pub fn from_ulid(id: ulid::Ulid) -> Self {
        Self(Arc::from(id.to_string()))
    }

    /// Use the header value when it is present and non-blank; otherwise generate one.
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self(Arc::from(s)))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.trim().is_empty() {
            return Err(serde::de::Error::custom("empty request id"));
        }
        Ok(RequestId(Arc::from(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_is_kept_verbatim() {
        let id = RequestId::from_header_or_new(Some("req-abc-123"));
        assert_eq!(id.as_str(), "req-abc-123");
    }

    #[test]
    fn test_missing_or_blank_header_generates_ulid() {
        for header in [None, Some(""), Some("   ")] {
            let id = RequestId::from_header_or_new(header);
            assert!(id.as_str().parse::<ulid::Ulid>().is_ok(), "{id}");
        }
    }

    #[test]
    fn test_from_ulid_uses_canonical_text() {
        let ulid = ulid::Ulid::from_parts(1_700_000_000_000, 42);
        let id = RequestId::from_ulid(ulid);
        assert_eq!(id.as_str(), ulid.to_string());
        assert_eq!(id.as_str().parse::<ulid::Ulid>().unwrap(), ulid);
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let id = RequestId::from_header_or_new(Some("abc"));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<RequestId>("\"\"").is_err());
    }
}
