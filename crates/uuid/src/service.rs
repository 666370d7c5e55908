//! Canonical record identifier implementation.

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

use ::uuid::Uuid;

/// A patient record id in canonical form (32 lowercase hex characters, no hyphens).
///
/// Once constructed the value is known to be canonical, so it can be used directly to derive the
/// record's storage directory or echoed back to clients.
///
/// # Construction
/// - [`ShardableUuid::new`] allocates a fresh id for a record being inserted.
/// - [`ShardableUuid::parse`] validates an id supplied from outside the store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardableUuid(Uuid);

impl Default for ShardableUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardableUuid {
    /// Generates a new random (v4) record id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an id that must already be in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not exactly 32 lowercase hex characters.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(e.to_string()))
    }

    /// Returns true if `input` is exactly 32 bytes of `0-9` / `a-f`.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<uuid>/`, where `s1` and `s2` are the first and second pairs
    /// of hex characters of the id.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for ShardableUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for ShardableUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShardableUuid::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ShardableUuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ShardableUuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ShardableUuid::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_id() {
        let id = ShardableUuid::new();
        let canonical = id.to_string();

        assert_eq!(canonical.len(), 32);
        assert!(ShardableUuid::is_canonical(&canonical));
    }

    #[test]
    fn test_new_ids_are_distinct() {
        assert_ne!(ShardableUuid::new(), ShardableUuid::new());
    }

    #[test]
    fn test_parse_valid_canonical_id() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let parsed = ShardableUuid::parse(canonical).unwrap();

        assert_eq!(parsed.to_string(), canonical);
    }

    #[test]
    fn test_parse_rejects_hyphenated_id() {
        let result = ShardableUuid::parse("550e8400-e29b-41d4-a716-446655440000");

        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_is_canonical_invalid() {
        // Uppercase
        assert!(!ShardableUuid::is_canonical(
            "550E8400E29B41D4A716446655440000"
        ));
        // Too short
        assert!(!ShardableUuid::is_canonical(
            "550e8400e29b41d4a71644665544000"
        ));
        // Too long
        assert!(!ShardableUuid::is_canonical(
            "550e8400e29b41d4a7164466554400000"
        ));
        // Non-hex
        assert!(!ShardableUuid::is_canonical(
            "550e8400e29b41d4a716446655440zzz"
        ));
        // Mongo-style ObjectId
        assert!(!ShardableUuid::is_canonical("507f1f77bcf86cd799439011"));
        assert!(!ShardableUuid::is_canonical(""));
    }

    #[test]
    fn test_sharded_dir_structure() {
        let id = ShardableUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        let sharded = id.sharded_dir(Path::new("/patient_data/patients"));

        assert_eq!(
            sharded,
            PathBuf::from("/patient_data/patients/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_from_str_matches_parse() {
        let parsed: Result<ShardableUuid, _> = "aabbccddeeff00112233445566778899".parse();
        assert!(parsed.is_ok());

        let rejected: Result<ShardableUuid, _> = "not-an-id".parse();
        assert!(rejected.is_err());
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let id = ShardableUuid::parse("00112233445566778899aabbccddeeff").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00112233445566778899aabbccddeeff\"");

        let back: ShardableUuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<ShardableUuid, _> = serde_json::from_str("\"XYZ\"");
        assert!(bad.is_err());
    }
}
