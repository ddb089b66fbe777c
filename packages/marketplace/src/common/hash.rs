//! Typed content-addressed hashes.
//!
//! The remote runtime addresses every action and agent by a 32-byte digest.
//! `ContentHash<T>` wraps that digest with a marker type so an agent key can
//! never be passed where an action hash is expected.
//!
//! # Example
//!
//! ```rust
//! use marketplace_core::common::{ActionHash, AgentPubKey};
//!
//! let action = ActionHash::digest(&[b"entry bytes"]);
//! let agent = AgentPubKey::digest(&[b"agent seed"]);
//!
//! // This would be a compile error:
//! // let wrong: ActionHash = agent;
//! # let _ = (action, agent);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

/// Length of every content hash, in bytes.
pub const HASH_LEN: usize = 32;

/// Marker type for action hashes (creates, updates, status changes).
pub struct Action;

/// Marker type for agent public keys.
pub struct Agent;

/// A typed 32-byte content hash.
#[repr(transparent)]
pub struct ContentHash<T>([u8; HASH_LEN], PhantomData<fn() -> T>);

/// Hash of an action recorded by the remote runtime.
pub type ActionHash = ContentHash<Action>;

/// Public key of an agent (the author of an action).
pub type AgentPubKey = ContentHash<Agent>;

impl<T> ContentHash<T> {
    /// Wraps raw digest bytes.
    #[inline]
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes, PhantomData)
    }

    /// SHA-256 over the concatenation of `parts`.
    pub fn digest(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into(), PhantomData)
    }

    /// Parses a hex-encoded hash.
    pub fn parse(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; HASH_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes, PhantomData))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lower-case hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Stable string key used to index caches.
    pub fn cache_key(&self) -> String {
        self.to_hex()
    }
}

impl<T> Clone for ContentHash<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContentHash<T> {}

impl<T> Debug for ContentHash<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = std::any::type_name::<T>().rsplit("::").next().unwrap_or("Hash");
        write!(f, "{}Hash({}…)", name, &self.to_hex()[..12])
    }
}

impl<T> Display for ContentHash<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<T> PartialEq for ContentHash<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for ContentHash<T> {}

impl<T> PartialOrd for ContentHash<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ContentHash<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for ContentHash<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> FromStr for ContentHash<T> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Serialized as hex strings so payloads stay readable JSON.
impl<T> Serialize for ContentHash<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de, T> Deserialize<'de> for ContentHash<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = ActionHash::digest(&[b"one", b"two"]);
        let b = ActionHash::digest(&[b"one", b"two"]);
        let c = ActionHash::digest(&[b"one", b"three"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hex_parse_roundtrip() {
        let hash = ActionHash::digest(&[b"web development"]);
        let parsed: ActionHash = hash.to_string().parse().unwrap();
        assert_eq!(parsed, hash);
        assert_eq!(hash.cache_key().len(), HASH_LEN * 2);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(ActionHash::parse("abcd").is_err());
        assert!(ActionHash::parse("zz").is_err());
    }

    #[test]
    fn serializes_as_hex_string() {
        let hash = AgentPubKey::digest(&[b"agent"]);
        let json = serde_json::to_value(hash).unwrap();
        assert_eq!(json, serde_json::Value::String(hash.to_hex()));

        let back: AgentPubKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn debug_names_the_hash_kind() {
        let hash = ActionHash::digest(&[b"x"]);
        assert!(format!("{:?}", hash).starts_with("ActionHash("));
    }
}
